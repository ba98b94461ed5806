//! Offset/limit pagination shared by the list endpoints

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

pub const DEFAULT_LIMIT: i64 = 10;

pub(crate) fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Plain `skip`/`limit` query used by the author and genre listings
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Number of records to skip
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must be non-negative"))]
    pub skip: i64,
    /// Maximum number of records to return (1-100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Number of pages needed to show `total` rows, `limit` at a time.
pub fn page_count(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// One-based page number containing row `skip`. Only exact when `skip` is a
/// multiple of `limit`.
pub fn page_number(skip: i64, limit: i64) -> i64 {
    skip / limit + 1
}
