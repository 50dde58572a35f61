//! Sliding history window for LZ77 back-references.
//!
//! DEFLATE back-references may reach at most 32768 bytes behind the current
//! output position, so the decoder only ever needs the most recent 32 KiB
//! of produced output. `HistoryWindow` keeps exactly that: a fixed circular
//! arena plus a total-produced counter, with logical positions mapped to
//! physical slots modulo the capacity.

use crate::error::{Error, Result};

/// Window size mandated by DEFLATE (32 KiB).
pub const DEFLATE_WINDOW_SIZE: usize = 32768;

/// A fixed-capacity circular buffer over the most recently produced bytes.
///
/// Logical byte positions run from 0 (first byte ever produced) upward;
/// only positions in `[produced - capacity, produced)` remain addressable.
/// Writes overwrite the oldest byte once the arena is full.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    /// The arena.
    buf: Vec<u8>,
    /// Capacity (power of 2).
    capacity: usize,
    /// Mask for modulo indexing (capacity - 1).
    mask: usize,
    /// Total bytes produced, monotone.
    produced: usize,
    /// Physical write cursor (`produced & mask`).
    pos: usize,
}

impl HistoryWindow {
    /// Create a window with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not a power of 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buf: vec![0; capacity],
            capacity,
            mask: capacity - 1,
            produced: 0,
            pos: 0,
        }
    }

    /// Create a window sized for DEFLATE (32 KiB).
    pub fn deflate() -> Self {
        Self::new(DEFLATE_WINDOW_SIZE)
    }

    /// Capacity of the arena.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total bytes produced over the lifetime of the window.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// True iff nothing has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.produced == 0
    }

    /// Append one literal byte.
    pub fn append_literal(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        self.produced += 1;
    }

    /// Copy one byte from `distance` bytes back to the current position.
    ///
    /// A back-reference of length L is realized as L calls, so overlapping
    /// copies (`distance < L`) replicate the repeating pattern one byte at
    /// a time. Fails with [`Error::InvalidBackReference`] unless
    /// `1 <= distance <= produced` and the source byte is still inside the
    /// arena.
    pub fn append_from_back_reference(&mut self, distance: usize) -> Result<()> {
        if distance == 0 || distance > self.produced || distance > self.capacity {
            return Err(Error::invalid_back_reference(distance, self.produced));
        }

        let src = (self.pos + self.capacity - distance) & self.mask;
        let byte = self.buf[src];
        self.append_literal(byte);
        Ok(())
    }

    /// The last `n` bytes produced, oldest first.
    ///
    /// Fails with [`Error::WindowRange`] unless
    /// `n <= min(produced, capacity)`.
    pub fn last_n(&self, n: usize) -> Result<Vec<u8>> {
        let available = self.produced.min(self.capacity);
        if n > available {
            return Err(Error::window_range(format!(
                "n too large (n={}, max={})",
                n, available
            )));
        }

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let idx = (self.pos + self.capacity - n + i) & self.mask;
            out.push(self.buf[idx]);
        }
        Ok(out)
    }

    /// Random read at a logical position, for diagnostics.
    ///
    /// Valid only for `position` in `[produced - capacity, produced)`.
    pub fn byte_at(&self, position: usize) -> Result<u8> {
        let low = self.produced.saturating_sub(self.capacity);
        if position < low || position >= self.produced {
            return Err(Error::window_range(format!(
                "position out of range (position={}, valid range=[{},{}))",
                position, low, self.produced
            )));
        }

        let back = self.produced - position;
        let idx = (self.pos + self.capacity - back) & self.mask;
        Ok(self.buf[idx])
    }
}
