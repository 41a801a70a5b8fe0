//! Grouping of classified rows into per-contract item lists.
//!
//! The extractor orders rows by contract identifier, so grouping is a
//! single streaming pass; an index map keeps first-seen contract order and
//! absorbs stray non-contiguous rows without a sort.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use finsync_domain::{ClassifiedRow, ContractGroup, SyncError};
use futures::stream::{Stream, TryStreamExt};

/// Collect a classified-row stream into contract groups.
///
/// Deterministic: group order is first-seen contract order and item order
/// within a group is source row order, even when a contract's rows are not
/// contiguous in the input.
pub async fn group_by_contract<S>(stream: S) -> Result<Vec<ContractGroup>, SyncError>
where
    S: Stream<Item = Result<ClassifiedRow, SyncError>>,
{
    futures::pin_mut!(stream);

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ContractGroup> = Vec::new();

    while let Some(row) = stream.try_next().await? {
        match positions.entry(row.contract_id.clone()) {
            Entry::Occupied(entry) => {
                groups[*entry.get()].items.push(row.item);
            }
            Entry::Vacant(entry) => {
                entry.insert(groups.len());
                groups.push(ContractGroup { contract_id: row.contract_id, items: vec![row.item] });
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use finsync_domain::ClassifiedItem;

    use super::*;

    fn classified(contract: &str, index: i64, code: i64) -> ClassifiedRow {
        ClassifiedRow {
            contract_id: contract.to_string(),
            item_index: index,
            item: ClassifiedItem {
                payment_type_code: code,
                installments: 1,
                term_days: 0,
                amount: "1.00".to_string(),
                due_date: None,
            },
        }
    }

    fn stream_of(
        rows: Vec<ClassifiedRow>,
    ) -> impl Stream<Item = Result<ClassifiedRow, SyncError>> {
        futures::stream::iter(rows.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn groups_preserve_first_seen_order_for_non_contiguous_rows() {
        let rows = vec![
            classified("A", 1, 10),
            classified("A", 2, 11),
            classified("B", 1, 20),
            classified("A", 3, 12),
        ];

        let groups = group_by_contract(stream_of(rows)).await.expect("grouping should succeed");

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].contract_id, "A");
        assert_eq!(groups[1].contract_id, "B");
        let codes: Vec<i64> = groups[0].items.iter().map(|i| i.payment_type_code).collect();
        assert_eq!(codes, vec![10, 11, 12]);
        assert_eq!(groups[1].items.len(), 1);
    }

    #[tokio::test]
    async fn single_row_contract_forms_its_own_group() {
        let groups = group_by_contract(stream_of(vec![classified("X", 1, 5)]))
            .await
            .expect("grouping should succeed");

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 1);
    }

    #[tokio::test]
    async fn empty_stream_yields_no_groups() {
        let groups =
            group_by_contract(stream_of(vec![])).await.expect("grouping should succeed");
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_propagates() {
        let stream = futures::stream::iter(vec![
            Ok(classified("A", 1, 10)),
            Err(SyncError::Extraction("query aborted".into())),
        ]);

        let result = group_by_contract(stream).await;
        assert!(matches!(result, Err(SyncError::Extraction(_))));
    }
}
