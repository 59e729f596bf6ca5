//! Client-side page window over the IBC tokens of an account.

use crate::rpc::Coin;

/// Selectable page sizes
pub const PAGE_SIZE_PRESETS: [usize; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Balances whose denom is an IBC voucher (`ibc/<hash>`)
pub fn ibc_tokens(balances: &[Coin]) -> Vec<Coin> {
    balances
        .iter()
        .filter(|c| c.denom.starts_with("ibc/"))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    total_items: usize,
    page_size: usize,
    current_page: usize,
}

impl Paginator {
    /// `page_size` is snapped to the nearest preset not below it
    pub fn new(total_items: usize, page_size: usize) -> Self {
        let mut pager = Self {
            total_items,
            page_size: snap_page_size(page_size),
            current_page: 1,
        };
        pager.clamp();
        pager
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Jump to `page`, clamped into `[1, total_pages]`
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
        self.clamp();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = snap_page_size(page_size);
        self.clamp();
    }

    /// Advance to the next preset, wrapping to the smallest
    pub fn cycle_page_size(&mut self) {
        let idx = PAGE_SIZE_PRESETS
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        self.set_page_size(PAGE_SIZE_PRESETS[(idx + 1) % PAGE_SIZE_PRESETS.len()]);
    }

    /// The token set changed; a shrunk set that no longer reaches the
    /// current page sends the view back to page 1
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        if self.current_page > self.total_pages() {
            self.current_page = 1;
        }
        self.clamp();
    }

    /// Index range of the current page
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn page_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        &items[range.start.min(items.len())..range.end.min(items.len())]
    }

    fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }
}

fn snap_page_size(size: usize) -> usize {
    PAGE_SIZE_PRESETS
        .iter()
        .copied()
        .find(|&s| s >= size)
        .unwrap_or(PAGE_SIZE_PRESETS[PAGE_SIZE_PRESETS.len() - 1])
}
