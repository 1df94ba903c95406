use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw listing query. `page`/`per_page` take precedence over `limit`/`offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn resolve(&self) -> Page {
        let (limit, offset) = match self.page {
            Some(page) => {
                let page = page.max(1);
                let per_page = clamp_limit(self.per_page.unwrap_or(DEFAULT_PAGE_SIZE));
                (per_page, (page - 1).saturating_mul(per_page))
            }
            None => (
                self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                self.offset.unwrap_or(0),
            ),
        };
        Page {
            limit: clamp_limit(limit),
            offset: offset.max(0),
        }
    }
}

fn clamp_limit(limit: i64) -> i64 {
    if limit < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        limit.min(MAX_PAGE_SIZE)
    }
}
