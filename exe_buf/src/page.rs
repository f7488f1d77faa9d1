//! Page granularity of the host and rounding of byte counts up to it.

use std::sync::OnceLock;

use crate::sys;

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// Bytes per page as reported by the OS.
///
/// Queried once, then served from a cache; the answer can't change
/// during the lifetime of the process.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        let size = sys::page_size();
        assert!(size.is_power_of_two(), "page size {} is not a power of two", size);
        log::debug!("page size is {} bytes", size);
        size
    })
}

/// Number of pages needed to hold `requested` bytes. Never zero.
pub fn pages_for(requested: usize) -> usize {
    pages_for_size(requested, page_size())
}

/// Smallest multiple of [`page_size`] that is `>= requested`.
///
/// `0` still gets a whole page. Returns `None` when the rounded size
/// doesn't fit in `usize`.
pub fn round_up_to_pages(requested: usize) -> Option<usize> {
    round_up(requested, page_size())
}

fn pages_for_size(requested: usize, page_size: usize) -> usize {
    // div_ceil can't overflow, unlike (requested + page_size - 1) / page_size
    requested.div_ceil(page_size).max(1)
}

fn round_up(requested: usize, page_size: usize) -> Option<usize> {
    pages_for_size(requested, page_size).checked_mul(page_size)
}
