//! 1-based page numbers to `skip`/`limit` query pairs.

/// Default page size of the conversation list
pub const CONVERSATIONS_PAGE_SIZE: u32 = 20;

/// Default page size of a conversation's message list
pub const MESSAGES_PAGE_SIZE: u32 = 50;

/// A 1-based page of `size` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Page {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// The first page of `size` items
    pub fn first(size: u32) -> Self {
        Self::new(1, size)
    }

    /// Zero-based offset: `(page - 1) * size`. Page 0 is treated as page 1.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Query pairs as sent to list endpoints
    pub fn query(&self) -> [(&'static str, u64); 2] {
        [("skip", self.offset()), ("limit", self.limit())]
    }

    /// The following page
    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.size)
    }
}
