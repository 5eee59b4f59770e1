use serde::Deserialize;

use super::deserializers::deserialize_lenient_i64;

pub const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    page: Option<i64>,
}

/// Window of rows for a 1-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    /// `None` for pages before the first one, which can never hold anything.
    pub fn page(&self) -> Option<Page> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return None;
        }
        Some(Page {
            limit: QUESTIONS_PER_PAGE,
            offset: (page - 1).saturating_mul(QUESTIONS_PER_PAGE),
        })
    }
}
