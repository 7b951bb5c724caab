//! In-memory measurement buffer
//!
//! Readings accumulate here between flushes so the flash medium sees one
//! batched append instead of a write per sample. The buffer has a fixed
//! capacity and exactly one owner (the engine); it is never touched
//! concurrently, so there is no internal locking.

use crate::{LogError, Measurement, Result};

/// Fixed-capacity queue of measurements awaiting a batched write
///
/// Insertion is append-only at the tail. The only removal is a full
/// `clear`, performed after the batch is confirmed written; a failed
/// write leaves the contents untouched for retry.
#[derive(Debug)]
pub struct MeasurementBuffer {
    entries: Vec<Measurement>,
    capacity: usize,
}

impl MeasurementBuffer {
    /// Create an empty buffer holding at most `capacity` measurements
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a measurement, returning the new length
    ///
    /// Fails with [`LogError::BufferFull`] when already at capacity; the
    /// caller must flush first.
    pub fn push(&mut self, measurement: Measurement) -> Result<usize> {
        if self.entries.len() >= self.capacity {
            return Err(LogError::BufferFull);
        }
        self.entries.push(measurement);
        Ok(self.entries.len())
    }

    /// The queued batch, oldest first, without consuming it
    pub fn pending(&self) -> &[Measurement] {
        &self.entries
    }

    /// Number of queued measurements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if at capacity
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of queued measurements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all queued measurements
    ///
    /// Only called once the batch is confirmed durable.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(ts: i64) -> Measurement {
        Measurement::new(ts, 20.0, 50.0)
    }

    #[test]
    fn test_push_until_full() {
        let mut buffer = MeasurementBuffer::new(3);

        assert_eq!(buffer.push(m(1)).unwrap(), 1);
        assert_eq!(buffer.push(m(2)).unwrap(), 2);
        assert!(!buffer.is_full());
        assert_eq!(buffer.push(m(3)).unwrap(), 3);
        assert!(buffer.is_full());

        assert!(matches!(buffer.push(m(4)), Err(LogError::BufferFull)));
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_pending_non_consuming() {
        let mut buffer = MeasurementBuffer::new(4);
        buffer.push(m(1)).unwrap();
        buffer.push(m(2)).unwrap();

        let timestamps: Vec<i64> = buffer.pending().iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut buffer = MeasurementBuffer::new(2);
        buffer.push(m(1)).unwrap();
        buffer.push(m(2)).unwrap();

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.pending().is_empty());

        // Cleared buffer accepts new entries again
        assert_eq!(buffer.push(m(3)).unwrap(), 1);
    }
}
