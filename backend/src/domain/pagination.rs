//! Cursor pagination over lists that are already in display order.

use anyhow::Result;

use crate::domain::errors::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// One page of results plus the cursor of the next page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Cut `items` into the page that starts right after the item with id `after`.
pub fn paginate<T>(
    items: Vec<T>,
    after: Option<&str>,
    limit: Option<u32>,
    id_of: impl Fn(&T) -> &str,
) -> Result<Page<T>> {
    let limit = match limit {
        Some(0) => return Err(DomainError::validation("limit must be at least 1")),
        Some(l) => l.min(MAX_PAGE_SIZE),
        None => DEFAULT_PAGE_SIZE,
    } as usize;

    let start = match after {
        Some(cursor) => match items.iter().position(|item| id_of(item) == cursor) {
            Some(index) => index + 1,
            None => return Err(DomainError::validation(format!("Invalid cursor: {}", cursor))),
        },
        None => 0,
    };

    let mut items: Vec<T> = items.into_iter().skip(start).collect();
    let has_more = items.len() > limit;
    if has_more {
        items.truncate(limit);
    }

    let next_cursor = if has_more {
        items.last().map(|item| id_of(item).to_string())
    } else {
        None
    };

    Ok(Page {
        items,
        has_more,
        next_cursor,
    })
}
