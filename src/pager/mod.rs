use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page arithmetic over a sequence of `len` items with 1-based page numbers.
///
/// There is always at least one page, so an empty sequence shows page 1 of 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "prev" | "p" | "previous" => Some(Self::Prev),
            "next" | "n" => Some(Self::Next),
            _ => None,
        }
    }
}

impl Pager {
    /// `page_size` of 0 is treated as 1; callers validate it earlier.
    pub fn new(page_size: usize, len: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            len,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.len.div_ceil(self.page_size).max(1)
    }

    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    /// Index range of `page` after clamping.
    pub fn range(&self, page: usize) -> Range<usize> {
        let page = self.clamp(page);
        let start = ((page - 1) * self.page_size).min(self.len);
        let end = (page * self.page_size).min(self.len);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        &items[self.range(page)]
    }

    /// One page in `direction`; stays put at either bound.
    pub fn step(&self, page: usize, direction: Direction) -> usize {
        let page = self.clamp(page);
        match direction {
            Direction::Prev => self.clamp(page.saturating_sub(1)),
            Direction::Next => self.clamp(page + 1),
        }
    }

    pub fn has_prev(&self, page: usize) -> bool {
        self.clamp(page) > 1
    }

    pub fn has_next(&self, page: usize) -> bool {
        self.clamp(page) < self.total_pages()
    }
}
