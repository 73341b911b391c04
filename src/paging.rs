use serde::{de, Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
/// Exclusive upper bound; a limit of exactly this value falls back to the default.
pub const MAX_LIMIT: i64 = 100;

/// Page request echoed back in list responses. `total` is output-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default, deserialize_with = "empty_as_zero")]
    pub page: i64,
    #[serde(default, deserialize_with = "empty_as_zero")]
    pub limit: i64,
    #[serde(default, skip_deserializing)]
    pub total: i64,
}

/// Accepts a number or its string form; an empty string reads as `0`.
fn empty_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

/// Row subrange selected by a [`Paging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl Paging {
    /// Resets out-of-range values to their defaults.
    pub fn process(&mut self) {
        if self.page <= 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.limit <= 0 || self.limit >= MAX_LIMIT {
            self.limit = DEFAULT_LIMIT;
        }
    }

    /// Expects `process` to have run first.
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.page - 1).saturating_mul(self.limit),
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: i64, limit: i64) -> Paging {
        Paging {
            page,
            limit,
            total: 0,
        }
    }

    fn processed(page: i64, limit: i64) -> Paging {
        let mut p = request(page, limit);
        p.process();
        p
    }

    #[test]
    fn invalid_limits_fall_back_to_ten() {
        for limit in [0, 100, -5, 250] {
            assert_eq!(processed(1, limit).limit, 10, "limit {limit}");
        }
    }

    #[test]
    fn limits_inside_range_are_kept() {
        assert_eq!(processed(1, 1).limit, 1);
        assert_eq!(processed(1, 99).limit, 99);
    }

    #[test]
    fn non_positive_pages_become_first_page() {
        assert_eq!(processed(0, 10).page, 1);
        assert_eq!(processed(-3, 10).page, 1);
        assert_eq!(processed(4, 10).page, 4);
    }

    #[test]
    fn window_skips_previous_pages() {
        assert_eq!(processed(1, 10).window(), PageWindow { offset: 0, limit: 10 });
        assert_eq!(processed(3, 25).window(), PageWindow { offset: 50, limit: 25 });
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let w = processed(i64::MAX, 99).window();
        assert_eq!(w.offset, i64::MAX);
        assert_eq!(w.limit, 99);
    }

    #[test]
    fn empty_query_values_read_as_zero() {
        let p: Paging = serde_urlencoded::from_str("page=&limit=").unwrap();
        assert_eq!(p, request(0, 0));

        let p: Paging = serde_urlencoded::from_str("page=3&limit=-5").unwrap();
        assert_eq!(p, request(3, -5));
    }

    #[test]
    fn non_numeric_query_values_are_rejected() {
        let err = serde_urlencoded::from_str::<Paging>("page=two").unwrap_err();
        assert!(err.to_string().contains("invalid digit"), "{err}");
    }

    #[test]
    fn total_is_serialized_but_never_read_from_input() {
        let p: Paging = serde_json::from_str(r#"{"page":2,"limit":5,"total":999}"#).unwrap();
        assert_eq!(p, request(2, 5));

        let json = serde_json::to_value(Paging { page: 2, limit: 5, total: 12 }).unwrap();
        assert_eq!(json, serde_json::json!({"page": 2, "limit": 5, "total": 12}));
    }
}
