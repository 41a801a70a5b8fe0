//! Financial upsert client for the target-system gateway.
//!
//! Serializes one contract's classified items into the gateway's envelope
//! format and posts it with a bearer token from the credential cache. The
//! gateway wraps scalar item fields as `{"$": "value"}` objects; top-level
//! entry fields stay plain strings.

use std::sync::Arc;

use async_trait::async_trait;
use finsync_core::{AccessTokenProvider, UpsertGateway};
use finsync_domain::constants::GATEWAY_SUCCESS_STATUS;
use finsync_domain::{ClassifiedItem, GatewayConfig, Result, SyncError};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::HttpClient;

const UPSERT_SERVICE_NAME: &str = "CACSP.incluirAlterarFinanceiro";

/// HTTP implementation of the upsert port.
pub struct GatewayClient {
    http: HttpClient,
    upsert_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GatewayClient {
    pub fn new(
        config: &GatewayConfig,
        http: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self { http, upsert_url: config.upsert_url.clone(), tokens }
    }
}

/// Scalar wrapped in the gateway's `{"$": value}` envelope.
#[derive(Debug, Serialize, Deserialize)]
struct WireField {
    #[serde(rename = "$")]
    value: String,
}

impl WireField {
    fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    #[serde(rename = "serviceName")]
    service_name: &'static str,
    #[serde(rename = "requestBody")]
    request_body: UpsertRequestBody,
}

#[derive(Debug, Serialize)]
struct UpsertRequestBody {
    nota: EntryPayload,
}

#[derive(Debug, Serialize)]
struct EntryPayload {
    nufin: String,
    /// Always "true": every entry may carry items of several payment types.
    #[serde(rename = "isParcelamentoVariosTipTit")]
    split_payment_types: &'static str,
    itens: ItemList,
}

#[derive(Debug, Serialize)]
struct ItemList {
    item: Vec<WireItem>,
}

#[derive(Debug, Serialize)]
struct WireItem {
    #[serde(rename = "DTVENC")]
    due_date: WireField,
    #[serde(rename = "VLRDESDOB")]
    amount: WireField,
    #[serde(rename = "CODTIPTIT")]
    payment_type: WireField,
    #[serde(rename = "QTDPARCELAS")]
    installments: WireField,
    #[serde(rename = "PRAZOPARCELAS")]
    term_days: WireField,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    status: Option<String>,
    #[serde(rename = "statusMessage")]
    status_message: Option<String>,
    #[serde(rename = "responseBody")]
    response_body: Option<UpsertResponseBody>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponseBody {
    pk: Option<ResponseKey>,
}

#[derive(Debug, Deserialize)]
struct ResponseKey {
    #[serde(rename = "NUFIN")]
    entry_key: Option<WireField>,
}

fn build_request(entry_key: &str, due_date: &str, items: &[ClassifiedItem]) -> UpsertRequest {
    let wire_items = items
        .iter()
        .map(|item| {
            // The resolved due date lands on each serialized copy; the
            // caller's items stay untouched.
            let due = item.due_date.as_deref().unwrap_or(due_date);
            WireItem {
                due_date: WireField::new(due),
                amount: WireField::new(item.amount.clone()),
                payment_type: WireField::new(item.payment_type_code.to_string()),
                installments: WireField::new(item.installments.to_string()),
                term_days: WireField::new(item.term_days.to_string()),
            }
        })
        .collect();

    UpsertRequest {
        service_name: UPSERT_SERVICE_NAME,
        request_body: UpsertRequestBody {
            nota: EntryPayload {
                nufin: entry_key.to_string(),
                split_payment_types: "true",
                itens: ItemList { item: wire_items },
            },
        },
    }
}

#[async_trait]
impl UpsertGateway for GatewayClient {
    async fn preflight(&self) -> Result<()> {
        self.tokens.access_token().await.map(|_| ())
    }

    async fn deliver(
        &self,
        contract_id: &str,
        entry_key: &str,
        due_date: &str,
        items: &[ClassifiedItem],
    ) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let payload = build_request(entry_key, due_date, items);

        debug!(contract_id, entry_key, items = items.len(), "posting financial upsert");

        let request = self
            .http
            .request(Method::POST, &self.upsert_url)
            .bearer_auth(token)
            .json(&payload);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| SyncError::Delivery(format!("upsert endpoint unreachable: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Delivery(format!("upsert endpoint returned {status}")));
        }

        let body: UpsertResponse = response
            .json()
            .await
            .map_err(|err| SyncError::Delivery(format!("malformed upsert response: {err}")))?;

        match body.status.as_deref() {
            Some(GATEWAY_SUCCESS_STATUS) => {
                let target_key = body
                    .response_body
                    .and_then(|b| b.pk)
                    .and_then(|pk| pk.entry_key)
                    .map(|field| field.value);
                info!(
                    contract_id,
                    target_entry_key = target_key.as_deref().unwrap_or("unknown"),
                    "upsert accepted"
                );
                Ok(())
            }
            other => {
                let message = body
                    .status_message
                    .unwrap_or_else(|| "no failure message provided".to_string());
                Err(SyncError::Delivery(format!(
                    "gateway reported status {}: {message}",
                    other.unwrap_or("absent")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct StaticTokens;

    #[async_trait]
    impl AccessTokenProvider for StaticTokens {
        async fn access_token(&self) -> Result<String> {
            Ok("tok-static".to_string())
        }
    }

    struct FailingTokens;

    #[async_trait]
    impl AccessTokenProvider for FailingTokens {
        async fn access_token(&self) -> Result<String> {
            Err(SyncError::Auth("grant rejected".into()))
        }
    }

    fn client(server: &MockServer, tokens: Arc<dyn AccessTokenProvider>) -> GatewayClient {
        let config = GatewayConfig {
            auth_url: format!("{}/oauth/token", server.uri()),
            upsert_url: format!("{}/upsert", server.uri()),
            client_id: "client-1".to_string(),
            client_secret: "secret-1".to_string(),
            gateway_token: "xtoken".to_string(),
            timeout_secs: 5,
        };
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .max_attempts(1)
            .build()
            .expect("http client");
        GatewayClient::new(&config, http, tokens)
    }

    fn item(code: i64, installments: u32, term_days: u32, amount: &str) -> ClassifiedItem {
        ClassifiedItem {
            payment_type_code: code,
            installments,
            term_days,
            amount: amount.to_string(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn posts_exact_envelope_with_bearer_token() {
        let server = MockServer::start().await;
        let expected = json!({
            "serviceName": "CACSP.incluirAlterarFinanceiro",
            "requestBody": {
                "nota": {
                    "nufin": "219919",
                    "isParcelamentoVariosTipTit": "true",
                    "itens": {
                        "item": [
                            {
                                "DTVENC": {"$": "20/11/2025"},
                                "VLRDESDOB": {"$": "902.56"},
                                "CODTIPTIT": {"$": "166"},
                                "QTDPARCELAS": {"$": "3"},
                                "PRAZOPARCELAS": {"$": "30"}
                            },
                            {
                                "DTVENC": {"$": "20/11/2025"},
                                "VLRDESDOB": {"$": "240.69"},
                                "CODTIPTIT": {"$": "153"},
                                "QTDPARCELAS": {"$": "1"},
                                "PRAZOPARCELAS": {"$": "0"}
                            }
                        ]
                    }
                }
            }
        });
        Mock::given(method("POST"))
            .and(path("/upsert"))
            .and(header("authorization", "Bearer tok-static"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "responseBody": {"pk": {"NUFIN": {"$": "219919"}}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = vec![item(166, 3, 30, "902.56"), item(153, 1, 0, "240.69")];
        client(&server, Arc::new(StaticTokens))
            .deliver("79297", "219919", "20/11/2025", &items)
            .await
            .expect("delivery accepted");
    }

    #[tokio::test]
    async fn caller_items_are_not_mutated_by_delivery() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upsert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "1"})))
            .mount(&server)
            .await;

        let items = vec![item(166, 1, 30, "10.00")];
        client(&server, Arc::new(StaticTokens))
            .deliver("100", "0", "20/11/2025", &items)
            .await
            .expect("delivery accepted");

        assert_eq!(items[0].due_date, None);
    }

    #[tokio::test]
    async fn gateway_failure_status_surfaces_its_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upsert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "statusMessage": "entry is locked by another session"
            })))
            .mount(&server)
            .await;

        let result = client(&server, Arc::new(StaticTokens))
            .deliver("100", "0", "20/11/2025", &[item(166, 1, 30, "10.00")])
            .await;

        match result {
            Err(SyncError::Delivery(msg)) => {
                assert!(msg.contains("entry is locked by another session"));
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_status_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upsert"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = client(&server, Arc::new(StaticTokens))
            .deliver("100", "0", "20/11/2025", &[item(166, 1, 30, "10.00")])
            .await;

        match result {
            Err(SyncError::Delivery(msg)) => assert!(msg.contains("403")),
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preflight_propagates_token_failure() {
        let server = MockServer::start().await;
        let result = client(&server, Arc::new(FailingTokens)).preflight().await;
        assert!(matches!(result, Err(SyncError::Auth(_))));
    }

    #[tokio::test]
    async fn preflight_succeeds_when_token_is_available() {
        let server = MockServer::start().await;
        client(&server, Arc::new(StaticTokens)).preflight().await.expect("preflight ok");
    }
}
