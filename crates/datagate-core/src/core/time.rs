// crates/datagate-core/src/core/time.rs
// ============================================================================
// Module: Datagate Time Model
// Description: Clock abstraction for cache staleness and response timestamps.
// Purpose: Keep wall-clock access behind an injectable seam.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Core logic never reads wall-clock time directly; hosts inject a [`Clock`]
//! so cache staleness is deterministic under test. [`SystemClock`] is the
//! production implementation and [`ManualClock`] the test one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Clock Trait
// ============================================================================

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually advanced clock with second resolution.
#[derive(Debug)]
pub struct ManualClock {
    /// Current reading in unix seconds.
    now_unix: AtomicI64,
}

impl ManualClock {
    /// Creates a clock pinned to the given unix second.
    #[must_use]
    pub const fn new(start_unix: i64) -> Self {
        Self {
            now_unix: AtomicI64::new(start_unix),
        }
    }

    /// Moves the clock forward by the given number of seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        self.now_unix.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Pins the clock to the given unix second.
    pub fn set_unix(&self, seconds: i64) {
        self.now_unix.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.now_unix.load(Ordering::SeqCst))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats an instant as RFC 3339, falling back to unix seconds.
#[must_use]
pub fn rfc3339(instant: OffsetDateTime) -> String {
    instant.format(&Rfc3339).unwrap_or_else(|_| instant.unix_timestamp().to_string())
}
