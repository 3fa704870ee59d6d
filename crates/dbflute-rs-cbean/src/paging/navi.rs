//! Page navigation: fixed page groups and sliding page ranges.
//!
//! A page group splits the pages into blocks of `page_group_size`
//! (`1..=10`, `11..=20`, ...) and shows the block holding the current page.
//! A page range shows `page_range_size` pages on each side of the current
//! page, optionally padded to a constant width with `fill_limit`.

use dbflute_rs_core::{CBeanError, CBeanResult};
use serde::Serialize;

/// Option of [`PageGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageGroupOption {
    page_group_size: usize,
}

impl PageGroupOption {
    /// Pages per group; must be at least 2.
    pub const fn new(page_group_size: usize) -> Self {
        Self { page_group_size }
    }

    /// Pages per group.
    pub const fn page_group_size(&self) -> usize {
        self.page_group_size
    }
}

/// The group of page numbers holding the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageGroup {
    current_page_number: usize,
    all_page_count: usize,
    page_group_size: usize,
}

impl PageGroup {
    /// Builds the group for `current_page_number` of `all_page_count` pages.
    pub fn new(
        current_page_number: usize,
        all_page_count: usize,
        option: PageGroupOption,
    ) -> CBeanResult<Self> {
        if option.page_group_size < 2 {
            return Err(CBeanError::IllegalPageNavigation(format!(
                "page group size should be greater than 1: {}",
                option.page_group_size
            )));
        }
        Ok(Self {
            current_page_number: current_page_number.max(1),
            all_page_count: all_page_count.max(1),
            page_group_size: option.page_group_size,
        })
    }

    /// First page number of the group.
    pub const fn group_start_page(&self) -> usize {
        let size = self.page_group_size;
        let current = self.current_page_number;
        let offset = if current % size == 0 { 1 } else { 0 };
        size * (current / size - offset) + 1
    }

    /// Page numbers of the group, capped at the last page.
    pub fn page_number_list(&self) -> Vec<usize> {
        let start = self.group_start_page();
        (start..start + self.page_group_size)
            .take_while(|page| *page <= self.all_page_count)
            .collect()
    }

    /// Whether a previous group exists.
    pub const fn is_exist_pre_group(&self) -> bool {
        self.current_page_number > self.page_group_size
    }

    /// Whether a next group exists.
    pub const fn is_exist_next_group(&self) -> bool {
        self.group_start_page() + self.page_group_size <= self.all_page_count
    }
}

/// Option of [`PageRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRangeOption {
    page_range_size: usize,
    fill_limit: bool,
}

impl PageRangeOption {
    /// Pages on each side of the current page; must be at least 1.
    pub const fn new(page_range_size: usize) -> Self {
        Self {
            page_range_size,
            fill_limit: false,
        }
    }

    /// Pads the range to `2 * size + 1` pages when pages allow it.
    #[must_use]
    pub const fn fill_limit(mut self) -> Self {
        self.fill_limit = true;
        self
    }

    /// Pages on each side.
    pub const fn page_range_size(&self) -> usize {
        self.page_range_size
    }

    /// Whether the range is padded.
    pub const fn is_fill_limit(&self) -> bool {
        self.fill_limit
    }
}

/// Page numbers around the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRange {
    page_number_list: Vec<usize>,
    all_page_count: usize,
}

impl PageRange {
    /// Builds the range for `current_page_number` of `all_page_count` pages.
    pub fn new(
        current_page_number: usize,
        all_page_count: usize,
        option: PageRangeOption,
    ) -> CBeanResult<Self> {
        let size = option.page_range_size;
        if size < 1 {
            return Err(CBeanError::IllegalPageNavigation(format!(
                "page range size should be greater than 0: {size}"
            )));
        }
        let all = all_page_count.max(1);
        let current = current_page_number.clamp(1, all);
        let first = current.saturating_sub(size).max(1);
        let last = (current + size).min(all);
        let mut pages: Vec<usize> = (first..=last).collect();
        if option.fill_limit {
            let limit = size * 2 + 1;
            let mut lower = first;
            while pages.len() < limit && lower > 1 {
                lower -= 1;
                pages.insert(0, lower);
            }
            let mut upper = last;
            while pages.len() < limit && upper < all {
                upper += 1;
                pages.push(upper);
            }
        }
        Ok(Self {
            page_number_list: pages,
            all_page_count: all,
        })
    }

    /// Page numbers in ascending order.
    pub fn page_number_list(&self) -> &[usize] {
        &self.page_number_list
    }

    /// Whether pages exist before the range.
    pub fn is_exist_pre_range(&self) -> bool {
        self.page_number_list.first().is_some_and(|first| *first > 1)
    }

    /// Whether pages exist after the range.
    pub fn is_exist_next_range(&self) -> bool {
        self.page_number_list
            .last()
            .is_some_and(|last| *last < self.all_page_count)
    }
}
