// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Página pedida pelo chamador (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rejeita a página antes de qualquer ida ao banco.
    pub fn validated(page: Option<u32>, page_size: Option<u32>) -> Result<Self, AppError> {
        let request = Self::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        request.check(MAX_PAGE_SIZE)?;
        Ok(request)
    }

    pub fn check(&self, max_page_size: u32) -> Result<(), AppError> {
        if self.page == 0 {
            return Err(AppError::InvalidRequest(
                "El número de página debe ser mayor o igual a 1.".into(),
            ));
        }
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(AppError::InvalidRequest(format!(
                "El tamaño de página debe estar entre 1 y {}.",
                max_page_size
            )));
        }
        Ok(())
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 25)]
    pub limit: u32,
    #[schema(example = 130)]
    pub total: i64,
    #[schema(example = 6)]
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        // Nada encontrado: sempre página 1, total 0.
        if total <= 0 {
            return Self {
                page: 1,
                limit: request.page_size,
                total: 0,
                total_pages: 0,
                has_next: false,
                has_prev: false,
            };
        }

        let limit = i64::from(request.page_size);
        let total_pages = (total + limit - 1) / limit;
        let page = i64::from(request.page);

        Self {
            page: request.page,
            limit: request.page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let meta = PaginationMeta::new(PageRequest::new(1, 2), 5);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let last = PaginationMeta::new(PageRequest::new(3, 2), 5);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn empty_result_resets_to_first_page() {
        let meta = PaginationMeta::new(PageRequest::new(4, 10), 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.total, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next && !meta.has_prev);
    }

    #[test]
    fn page_beyond_the_end_has_no_next() {
        let meta = PaginationMeta::new(PageRequest::new(9, 10), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(3, 25);
        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn rejects_out_of_bounds_sizes() {
        assert!(PageRequest::validated(Some(0), None).is_err());
        assert!(PageRequest::validated(None, Some(0)).is_err());
        assert!(PageRequest::validated(None, Some(MAX_PAGE_SIZE + 1)).is_err());

        let defaults = PageRequest::validated(None, None).unwrap();
        assert_eq!(defaults, PageRequest::new(1, DEFAULT_PAGE_SIZE));
    }
}
