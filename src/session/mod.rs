use std::sync::Arc;

use crate::filter::{filter_records, normalize_term};
use crate::pager::{Direction, Pager, DEFAULT_PAGE_SIZE};
use crate::record::SubmissionRecord;

/// Snapshot of one dashboard session: every loaded record, the active
/// search term, the filtered view and the current page.
///
/// Values are never mutated; each transition returns the next state.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    all: Arc<[SubmissionRecord]>,
    term: String,
    filtered: Arc<[SubmissionRecord]>,
    page: usize,
    page_size: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        Self {
            all: Arc::from(Vec::new()),
            term: String::new(),
            filtered: Arc::from(Vec::new()),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replaces the record set, keeps the active term and clamps the page.
    pub fn loaded(&self, records: Vec<SubmissionRecord>) -> Self {
        let filtered = filter_records(&self.term, &records);
        let next = Self {
            all: Arc::from(records),
            term: self.term.clone(),
            filtered: Arc::from(filtered),
            page: self.page,
            page_size: self.page_size,
        };
        next.at_page(self.page)
    }

    /// Applies a new search term and returns to the first page.
    pub fn searched(&self, raw_term: &str) -> Self {
        let term = normalize_term(raw_term);
        let filtered = if term.is_empty() {
            Arc::clone(&self.all)
        } else {
            Arc::from(filter_records(&term, &self.all))
        };
        Self {
            all: Arc::clone(&self.all),
            term,
            filtered,
            page: 1,
            page_size: self.page_size,
        }
    }

    pub fn stepped(&self, direction: Direction) -> Self {
        Self {
            page: self.pager().step(self.page, direction),
            ..self.clone()
        }
    }

    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: self.pager().clamp(page),
            ..self.clone()
        }
    }

    pub fn pager(&self) -> Pager {
        Pager::new(self.page_size, self.filtered.len())
    }

    pub fn all(&self) -> &[SubmissionRecord] {
        &self.all
    }

    pub fn filtered(&self) -> &[SubmissionRecord] {
        &self.filtered
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.pager().total_pages()
    }

    pub fn visible(&self) -> &[SubmissionRecord] {
        self.pager().slice(&self.filtered[..], self.page)
    }
}
