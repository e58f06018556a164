// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l > 0)
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: PageParams, total: i64) -> Self {
        let limit = params.limit();
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            data,
            meta: PageMeta {
                page: params.page(),
                limit,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let p = PageParams::default();
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 10, 0));
    }

    #[test]
    fn second_page_of_five_skips_five() {
        let p = PageParams { page: Some(2), limit: Some(5) };
        assert_eq!(p.offset(), 5);
        let page = Paginated::new(vec![1, 2, 3, 4, 5], p, 11);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.total, 11);
    }

    #[test]
    fn non_positive_values_fall_back_and_limit_is_capped() {
        let p = PageParams { page: Some(0), limit: Some(1_000) };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), MAX_LIMIT);
    }

    #[test]
    fn huge_page_saturates_instead_of_wrapping() {
        let p = PageParams { page: Some(i64::MAX), limit: Some(10) };
        assert_eq!(p.offset(), i64::MAX);
        assert!(p.offset() > 0);
    }
}
