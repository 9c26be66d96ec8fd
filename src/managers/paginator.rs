//! Fixed-size page windows over a sequence.

/// Number of pages for `len` items: `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    len.div_ceil(size).max(1)
}

/// Slices `seq` to page `page` (1-based) and reports the page count.
///
/// Pages outside `[1, total_pages]` are clamped.
pub fn paginate<T>(seq: &[T], page: usize, page_size: usize) -> (&[T], usize) {
    let size = page_size.max(1);
    let total = total_pages(seq.len(), size);
    let page = page.clamp(1, total);
    let start = ((page - 1) * size).min(seq.len());
    let end = (start + size).min(seq.len());
    (&seq[start..end], total)
}

/// Current page position of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current: usize,
    page_size: usize,
}

impl Paginator {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Advances one page; no-op on the last page.
    pub fn next(&mut self, total_pages: usize) {
        if self.current < total_pages.max(1) {
            self.current += 1;
        }
    }

    /// Goes back one page; no-op on the first page.
    pub fn previous(&mut self) {
        if self.current > 1 {
            self.current -= 1;
        }
    }

    /// Jumps to `page`, clamped to `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.current = page.clamp(1, total_pages.max(1));
    }

    /// Pulls the position back in range after the collection shrank.
    pub fn clamp(&mut self, total_pages: usize) {
        self.current = self.current.clamp(1, total_pages.max(1));
    }

    /// Back to page 1; called whenever the filter query changes.
    pub fn reset(&mut self) {
        self.current = 1;
    }
}
