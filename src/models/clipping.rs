use crate::error::{ProcessingError, Result};
use crate::utils::constants::LINE_TERMINATOR;
use std::sync::{Mutex, PoisonError};

/// The partial lines at the edges of one chunk.
///
/// `head` runs from the chunk start through the first newline (inclusive);
/// `tail` runs from just after the last newline to the chunk end. A chunk with
/// no newline at all lies inside a single line: its whole content is the head
/// and the tail is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipping {
    pub head: Vec<u8>,
    pub tail: Vec<u8>,
}

impl Clipping {
    pub fn new(head: &[u8], tail: &[u8]) -> Self {
        Self {
            head: head.to_vec(),
            tail: tail.to_vec(),
        }
    }

    /// Clipping of a chunk that contains no newline.
    pub fn spanning(chunk: &[u8]) -> Self {
        Self {
            head: chunk.to_vec(),
            tail: Vec::new(),
        }
    }

    /// True when the chunk held no newline and the head does not end a line.
    pub fn is_spanning(&self) -> bool {
        self.head.last() != Some(&LINE_TERMINATOR)
    }
}

/// Clippings indexed by chunk sequence number.
///
/// Grows on demand as chunks are claimed. Each worker writes only the slot of
/// the chunk it claimed, so the lock is held for a slot assignment at most.
#[derive(Debug, Default)]
pub struct ClippingStore {
    slots: Mutex<Vec<Option<Clipping>>>,
}

impl ClippingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn record(&self, index: usize, clipping: Clipping) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(clipping);
    }

    /// Clippings in stream order. Every slot up to the highest index must be filled.
    pub fn into_ordered(self) -> Result<Vec<Clipping>> {
        self.slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(ProcessingError::MissingClipping(index)))
            .collect()
    }
}
