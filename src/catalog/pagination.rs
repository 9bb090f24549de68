use serde::Serialize;

use crate::{
    config::ParamPolicy,
    error::{AppError, AppResult},
};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Window {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0 }
    }
}

impl Window {
    /// `limit` falls back to 20 when absent or not positive and never exceeds
    /// 100. `offset` is unbounded above.
    pub fn from_query(
        limit: Option<&str>,
        offset: Option<&str>,
        policy: ParamPolicy,
    ) -> AppResult<Self> {
        let limit = match parse("limit", limit, policy)? {
            Some(n) if n > 0 => (n as u64).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = parse("offset", offset, policy)?.map_or(0, |n| n.max(0) as u64);
        Ok(Self { limit, offset })
    }
}

fn parse(name: &str, raw: Option<&str>, policy: ParamPolicy) -> AppResult<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) => Ok(Some(n)),
        Err(_) if policy == ParamPolicy::Strict => {
            Err(AppError::validation(format!("Ugyldig værdi for parameteren {name}: {raw:?}")))
        },
        Err(_) => Ok(None),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(window: Window, returned: usize, total: u64) -> Self {
        Self {
            total,
            limit: window.limit,
            offset: window.offset,
            has_more: window.offset.saturating_add(returned as u64) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(limit: Option<&str>, offset: Option<&str>) -> Window {
        Window::from_query(limit, offset, ParamPolicy::Lenient).unwrap()
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(window(None, None), Window { limit: 20, offset: 0 });
        assert_eq!(window(Some("0"), None).limit, 20);
        assert_eq!(window(Some("-5"), None).limit, 20);
        assert_eq!(window(Some("abc"), None).limit, 20);
        assert_eq!(window(Some("1000"), None).limit, 100);
        assert_eq!(window(Some(" 35 "), None).limit, 35);
    }

    #[test]
    fn offset_defaults_to_zero_and_is_unbounded() {
        assert_eq!(window(None, Some("-3")).offset, 0);
        assert_eq!(window(None, Some("x")).offset, 0);
        assert_eq!(window(None, Some("999999")).offset, 999_999);
    }

    #[test]
    fn strict_policy_rejects_garbage() {
        assert!(Window::from_query(Some("ti"), None, ParamPolicy::Strict).is_err());
        assert_eq!(
            Window::from_query(Some("0"), Some("4"), ParamPolicy::Strict).unwrap(),
            Window { limit: 20, offset: 4 }
        );
    }

    #[test]
    fn has_more_iff_rows_remain() {
        let w = Window { limit: 10, offset: 10 };
        assert!(Pagination::new(w, 10, 21).has_more);
        assert!(!Pagination::new(w, 10, 20).has_more);
        assert!(!Pagination::new(Window { limit: 10, offset: 50 }, 0, 20).has_more);
    }
}
