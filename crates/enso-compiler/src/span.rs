//! Source locations attached to declarations

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range of a declaration inside its module's source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Byte range usable for slicing the source or building labels
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}
