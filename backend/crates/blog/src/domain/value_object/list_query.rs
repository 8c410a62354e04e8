//! List Query
//!
//! Pagination and filters shared by blog, comment and per-user listings.

use chrono::NaiveDate;

use crate::error::{BlogError, BlogResult};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Validated listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Rows created on or after this day (UTC)
    pub newer_than: Option<NaiveDate>,
    /// Author username
    pub author: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            newer_than: None,
            author: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    pub fn new(
        newer_than: Option<&str>,
        author: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> BlogResult<Self> {
        let newer_than = newer_than
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    BlogError::Validation("Invalid date format. Use YYYY-MM-DD".to_string())
                })
            })
            .transpose()?;

        let author = author
            .map(platform::sanitize::sanitize_text)
            .filter(|a| !a.is_empty());

        Ok(Self {
            newer_than,
            author,
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        })
    }

    pub fn admits(&self, created_at: chrono::DateTime<chrono::Utc>) -> bool {
        self.newer_than
            .is_none_or(|day| created_at.date_naive() >= day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ListQuery::new(None, None, None, None).unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn test_date_format() {
        let query = ListQuery::new(Some("2024-03-01"), None, None, None).unwrap();
        assert_eq!(query.newer_than, NaiveDate::from_ymd_opt(2024, 3, 1));

        let err = ListQuery::new(Some("03/01/2024"), None, None, None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD");
    }

    #[test]
    fn test_paging_is_clamped() {
        let query = ListQuery::new(None, Some("  "), Some(5000), Some(-3)).unwrap();
        assert_eq!(query.limit, MAX_LIMIT);
        assert_eq!(query.offset, 0);
        assert!(query.author.is_none());
    }
}
