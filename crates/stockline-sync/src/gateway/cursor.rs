//! # Pagination Cursor
//!
//! Offset/limit state for one collection fetch.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Active(offset) ── full page ──────────────► Active(offset + size)     │
//! │        │                                                                │
//! │        ├── empty page ──────────────────────► Finished                  │
//! │        │                                                                │
//! │        ├── short page, offset == 0 ─────────► Finished                  │
//! │        │                                                                │
//! │        └── short page, offset > 0 ──────────► Confirming(offset + size) │
//! │              (confirm_short_page = true)            │                   │
//! │                                                     │ one request,      │
//! │                                                     │ result ignored    │
//! │                                                     ▼                   │
//! │                                                 Finished                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Some callers depend on the confirmation request being sent. Turn it off
//! with `confirm_short_page = false`.

/// What the cursor does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Next request fetches a page at this offset.
    Active,
    /// Next request only confirms completion at the current offset.
    Confirming,
    /// No more requests.
    Finished,
}

/// Offset/limit position within one collection.
#[derive(Debug, Clone)]
pub struct PageCursor {
    endpoint: String,
    offset: usize,
    page_size: usize,
    confirm_short_page: bool,
    state: CursorState,
}

impl PageCursor {
    /// A cursor at offset 0. A `page_size` of 0 is treated as 1.
    pub fn new(endpoint: impl Into<String>, page_size: usize) -> Self {
        PageCursor {
            endpoint: endpoint.into(),
            offset: 0,
            page_size: page_size.max(1),
            confirm_short_page: true,
            state: CursorState::Active,
        }
    }

    pub fn with_confirmation(mut self, confirm_short_page: bool) -> Self {
        self.confirm_short_page = confirm_short_page;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == CursorState::Finished
    }

    /// `limit` and `offset` query parameters for the next request.
    pub fn params(&self) -> [(String, String); 2] {
        [
            ("limit".to_string(), self.page_size.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }

    /// Records a page of `returned` items fetched at the current offset.
    pub fn advance(&mut self, returned: usize) {
        if self.state != CursorState::Active {
            return;
        }

        if returned == 0 {
            self.state = CursorState::Finished;
        } else if returned < self.page_size {
            if self.offset > 0 && self.confirm_short_page {
                self.offset += self.page_size;
                self.state = CursorState::Confirming;
            } else {
                self.state = CursorState::Finished;
            }
        } else {
            self.offset += self.page_size;
        }
    }

    /// Stops the cursor (confirmation sent, or the API returned nothing).
    pub fn finish(&mut self) {
        self.state = CursorState::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pages_advance() {
        let mut cursor = PageCursor::new("products", 250);
        cursor.advance(250);
        assert_eq!(cursor.offset(), 250);
        assert_eq!(cursor.state(), CursorState::Active);
        assert_eq!(cursor.params()[1], ("offset".to_string(), "250".to_string()));
    }

    #[test]
    fn test_short_first_page_finishes() {
        let mut cursor = PageCursor::new("products", 250);
        cursor.advance(2);
        assert!(cursor.is_finished());
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_short_later_page_confirms() {
        let mut cursor = PageCursor::new("products", 250);
        cursor.advance(250);
        cursor.advance(150);
        assert_eq!(cursor.state(), CursorState::Confirming);
        assert_eq!(cursor.offset(), 500);

        cursor.finish();
        assert!(cursor.is_finished());
    }

    #[test]
    fn test_confirmation_can_be_disabled() {
        let mut cursor = PageCursor::new("products", 250).with_confirmation(false);
        cursor.advance(250);
        cursor.advance(150);
        assert!(cursor.is_finished());
        assert_eq!(cursor.offset(), 250);
    }

    #[test]
    fn test_empty_page_finishes() {
        let mut cursor = PageCursor::new("sales", 10);
        cursor.advance(10);
        cursor.advance(0);
        assert!(cursor.is_finished());
        assert_eq!(cursor.offset(), 10);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        let cursor = PageCursor::new("sales", 0);
        assert_eq!(cursor.page_size(), 1);
    }
}
