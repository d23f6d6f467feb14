// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (bearer JWT verified by middleware)
pub mod protected; // /api/events, /api/participants
pub mod public; // /, /health, /api/register, /api/login

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids that do not parse can never match a row, so they read as not-found.
pub(crate) fn parse_path_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
