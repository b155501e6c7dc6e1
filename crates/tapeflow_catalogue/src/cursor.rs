//! Forward-only cursors over catalogue and queue contents.

use crate::error::{CatalogueError, Result};
use std::collections::VecDeque;

/// A one-shot, non-rewindable cursor.
///
/// `next_item` may fail mid-iteration (e.g. a backing store read error);
/// callers treat such a failure as terminal.
pub trait Cursor<T>: Send {
    fn has_more(&self) -> bool;

    fn next_item(&mut self) -> Result<T>;
}

/// Cursor over an already materialized list.
#[derive(Debug)]
pub struct VecCursor<T> {
    items: VecDeque<T>,
}

impl<T> VecCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T: Send> Cursor<T> for VecCursor<T> {
    fn has_more(&self) -> bool {
        !self.items.is_empty()
    }

    fn next_item(&mut self) -> Result<T> {
        self.items
            .pop_front()
            .ok_or_else(|| CatalogueError::cursor("cursor advanced past its end"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_cursor_drains_in_order() {
        let mut cursor = VecCursor::new(vec![1, 2, 3]);
        let mut seen = Vec::new();
        while cursor.has_more() {
            seen.push(cursor.next_item().unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(matches!(cursor.next_item(), Err(CatalogueError::Cursor(_))));
    }

    #[test]
    fn test_empty_cursor() {
        let cursor: VecCursor<u8> = VecCursor::empty();
        assert!(!cursor.has_more());
        assert_eq!(cursor.remaining(), 0);
    }
}
