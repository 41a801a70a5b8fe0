//! Domain constants shared across the pipeline.

/// Placeholder target-entry key sent when reconciliation found no existing
/// financial entry for a contract.
pub const SENTINEL_ENTRY_KEY: &str = "0";

/// Gateway response status value that marks a successful upsert.
pub const GATEWAY_SUCCESS_STATUS: &str = "1";

/// Seconds subtracted from a token's lifetime so it is never presented
/// close enough to expiry to lapse mid-request.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Token lifetime assumed when the identity response omits `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Rows fetched from the source store per round trip.
pub const DEFAULT_CHUNK_SIZE: u32 = 5000;

/// Due-date wire format expected by the gateway.
pub const DUE_DATE_FORMAT: &str = "%d/%m/%Y";
