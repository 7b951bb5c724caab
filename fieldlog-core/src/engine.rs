//! Log engine - top-level coordinator
//!
//! One engine instance owns the whole write path: the time gate, the
//! in-memory buffer and the segment store. Callers hand it stamped
//! readings and it decides buffering, flushing and eviction. There is no
//! global state; embedders construct an engine and share it behind
//! whatever lock fits their runtime.

use crate::store::{CapacityPolicy, SegmentStore, StoreConfig};
use crate::{FsUsage, Measurement, MeasurementBuffer, Result, TimeGate, Timestamp, WeekKey};
use tracing::{debug, info, warn};

/// Log engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Segment store configuration
    pub store: StoreConfig,
    /// Measurements buffered between flushes
    pub buffer_capacity: usize,
    /// Reject timestamps from before the floor year
    pub strict_time: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            buffer_capacity: crate::config::DEFAULT_BUFFER_CAPACITY,
            strict_time: true,
        }
    }
}

/// What became of one offered reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Logging is paused; the reading was discarded
    Paused,
    /// The timestamp failed the trust gate; the reading was discarded
    InvalidTime,
    /// Queued without filling the buffer
    Buffered { pending: usize },
    /// Queued, filled the buffer, and the whole batch reached disk
    Flushed { written: usize },
    /// Queued and filled the buffer, but the write failed; the batch
    /// stays queued for retry
    FlushDeferred { pending: usize },
}

/// Result of an explicit flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// This many rows reached disk
    Flushed(usize),
    /// Nothing was pending
    Empty,
}

/// Field data logger engine
pub struct LogEngine {
    store: SegmentStore,
    buffer: MeasurementBuffer,
    gate: TimeGate,
    active: bool,
    last: Option<Measurement>,
}

impl LogEngine {
    /// Create an engine from configuration
    pub fn new(config: EngineConfig) -> Self {
        let store = SegmentStore::open(config.store);
        info!(
            "log engine ready: dir {}, buffer {} rows, strict time {}",
            store.dir().display(),
            config.buffer_capacity,
            config.strict_time
        );
        Self {
            store,
            buffer: MeasurementBuffer::new(config.buffer_capacity),
            gate: TimeGate::new(config.strict_time),
            active: true,
            last: None,
        }
    }

    /// Offer one stamped reading to the logger
    ///
    /// The reading is discarded without error when logging is paused or
    /// the timestamp fails the trust gate. A reading that fills the
    /// buffer triggers a flush in the same call; a failed flush defers
    /// the batch rather than losing it. `Err` means this reading was
    /// dropped: the buffer was still full from an earlier deferral and
    /// the retried flush failed again.
    pub fn record(
        &mut self,
        timestamp: Timestamp,
        temperature: f32,
        humidity: f32,
    ) -> Result<RecordOutcome> {
        if !self.active {
            debug!("paused, discarding reading at {timestamp}");
            return Ok(RecordOutcome::Paused);
        }
        if !self.gate.is_trustworthy(timestamp) {
            warn!("discarding reading with untrusted timestamp {timestamp}");
            return Ok(RecordOutcome::InvalidTime);
        }

        // A full buffer here means an earlier flush failed; retry it
        // before accepting more.
        if self.buffer.is_full() {
            self.write_pending()?;
        }

        let measurement = Measurement::new(timestamp, temperature, humidity);
        let pending = self.buffer.push(measurement)?;
        self.last = Some(measurement);

        if !self.buffer.is_full() {
            return Ok(RecordOutcome::Buffered { pending });
        }

        match self.write_pending() {
            Ok(written) => Ok(RecordOutcome::Flushed { written }),
            Err(e) => {
                warn!("flush failed, keeping {pending} rows buffered: {e}");
                Ok(RecordOutcome::FlushDeferred { pending })
            }
        }
    }

    /// Write the pending batch to its segments
    ///
    /// The buffer is cleared only after the store confirms the write; on
    /// failure it is left intact and the error propagates.
    pub fn flush(&mut self) -> Result<FlushOutcome> {
        if self.buffer.is_empty() {
            return Ok(FlushOutcome::Empty);
        }
        let written = self.write_pending()?;
        Ok(FlushOutcome::Flushed(written))
    }

    /// Switch between active logging and paused
    ///
    /// Pausing flushes the pending batch so nothing sits in memory
    /// indefinitely. The state change sticks even when that flush fails;
    /// the rows stay buffered and the error is returned.
    pub fn set_active(&mut self, active: bool) -> Result<()> {
        let was_active = self.active;
        self.active = active;

        if was_active && !active {
            info!("logging paused");
            if let Err(e) = self.flush() {
                warn!("pause-time flush failed, rows stay buffered: {e}");
                return Err(e);
            }
        } else if !was_active && active {
            info!("logging resumed");
        }
        Ok(())
    }

    /// Whether readings are currently being accepted
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of readings awaiting flush
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// The most recently accepted reading, if any
    pub fn last_measurement(&self) -> Option<Measurement> {
        self.last
    }

    /// The capacity policy in force
    pub fn policy(&self) -> &CapacityPolicy {
        self.store.policy()
    }

    /// All stored week keys, oldest first
    pub fn weeks(&self) -> Result<Vec<WeekKey>> {
        let mut keys = self.store.list()?;
        keys.sort_unstable();
        Ok(keys)
    }

    /// Usage snapshot of the segment directory
    pub fn usage(&self) -> Result<FsUsage> {
        self.store.usage()
    }

    /// Raw contents of one week's segment
    pub fn read_week(&self, key: &WeekKey) -> Result<String> {
        self.store.read(key)
    }

    /// Evict the oldest segment; `false` when the store is empty
    pub fn delete_oldest(&self) -> Result<bool> {
        self.store.delete_oldest()
    }

    /// Delete all segments strictly older than `reference`
    pub fn delete_before(&self, reference: &WeekKey) -> Result<usize> {
        self.store.delete_before(reference)
    }

    /// Delete every segment
    pub fn delete_all(&self) -> Result<usize> {
        self.store.delete_all()
    }

    fn write_pending(&mut self) -> Result<usize> {
        let written = self.store.append(self.buffer.pending())?;
        self.buffer.clear();
        debug!("flushed {written} rows");
        Ok(written)
    }
}
