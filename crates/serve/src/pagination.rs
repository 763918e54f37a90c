// crates/serve/src/pagination.rs

use serde::Serialize;

/// One slot of a pagination bar. Pages are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaginationItem {
    Page { page: usize },
    Divider,
}

/// Pagination bar for `total_pages` pages with `current` selected.
///
/// Up to five pages are all listed. Beyond that the bar keeps the first and
/// last page, the neighbours of `current`, and dividers for the gaps.
pub fn generate_pagination_items(current: usize, total_pages: usize) -> Vec<PaginationItem> {
    use PaginationItem::{Divider, Page};

    if total_pages <= 5 {
        return (0..total_pages).map(|page| Page { page }).collect();
    }

    let mut items = vec![Page { page: 0 }];

    if current > 2 {
        items.push(Divider);
    }

    if current + 3 > total_pages {
        items.push(Page { page: total_pages - 4 });
        if current + 2 > total_pages {
            items.push(Page { page: total_pages - 3 });
        }
    }

    let from = current.saturating_sub(1).max(1);
    let to = (current + 1).min(total_pages - 2);
    items.extend((from..=to).map(|page| Page { page }));

    if current < 2 {
        if current < 1 {
            items.push(Page { page: 2 });
        }
        items.push(Page { page: 3 });
    }

    if current + 3 < total_pages {
        items.push(Divider);
    }

    items.push(Page { page: total_pages - 1 });
    items
}

/// Number of pages needed for `items` entries, never less than one.
pub fn page_count(items: usize, per_page: usize) -> usize {
    items.div_ceil(per_page.max(1)).max(1)
}

/// The slice of `items` shown on `page`.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}
