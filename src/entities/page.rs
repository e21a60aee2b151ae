use thiserror::Error;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug, Clone)]
pub enum PageRequestError {
    #[error("Page must be at least 1")]
    PageOutOfRange,
    #[error("Page size must be between 1 and {}", MAX_PAGE_SIZE)]
    SizeOutOfRange,
}

/// 1-based page request; unset parameters fall back to page 1, size 10.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, size: Option<u32>) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeOutOfRange);
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }
}
