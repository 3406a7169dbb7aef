use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

/// Offset cursor for a reference list that loads page by page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: u32,
    next_page: u32,
    exhausted: bool,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            next_page: 1,
            exhausted: false,
        }
    }

    pub fn reset(&mut self) {
        self.next_page = 1;
        self.exhausted = false;
    }

    pub fn next_query(&self) -> Option<PageQuery> {
        if self.exhausted {
            return None;
        }
        Some(PageQuery {
            page: self.next_page,
            limit: self.page_size,
        })
    }

    /// Records a loaded page; a short page means there is nothing further.
    pub fn advance(&mut self, received: usize) {
        self.next_page += 1;
        if received < self.page_size as usize {
            self.exhausted = true;
        }
    }

    /// For endpoints that return everything in one response.
    pub fn finish(&mut self) {
        self.exhausted = true;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
