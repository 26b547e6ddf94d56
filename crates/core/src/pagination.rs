//! Page arithmetic for the item list.

use serde::{Serialize, Serializer};

/// Items per page on the home page.
pub const ITEMS_PER_PAGE: u32 = 20;

/// Above this many pages the pager collapses runs into ellipses.
pub const MAX_PAGES_SHOWN: u32 = 5;

/// One button of the pager.
///
/// Serialises as the page number, or `"..."` for a gap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageSlot {
    Page(u32),
    Ellipsis,
}

impl Serialize for PageSlot {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            PageSlot::Page(p) => s.serialize_u32(*p),
            PageSlot::Ellipsis => s.serialize_str("..."),
        }
    }
}

pub fn total_pages(total_items: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Offset of the first item on `page` (1-based).
pub fn skip_for_page(page: u32, per_page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(per_page)
}

/// Visible page buttons for `current` out of `total` pages.
///
/// First and last pages are always shown; up to three pages around the
/// current one fill the middle, with an ellipsis standing in for each gap.
pub fn page_window(current: u32, total: u32) -> Vec<PageSlot> {
    if total <= MAX_PAGES_SHOWN {
        return (1..=total).map(PageSlot::Page).collect();
    }

    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(1).max(2);
    let mut end = current.saturating_add(1).min(total - 1);
    if current <= 2 {
        end = 4;
    } else if current >= total - 1 {
        start = total - 3;
    }

    let mut slots = vec![PageSlot::Page(1)];
    if start > 2 {
        slots.push(PageSlot::Ellipsis);
    }
    slots.extend((start..=end).map(PageSlot::Page));
    if end < total - 1 {
        slots.push(PageSlot::Ellipsis);
    }
    slots.push(PageSlot::Page(total));
    slots
}
