//! Shared memory accounting for auxiliary aggregation structures.
//!
//! The execution context owns one [`AggregationLimits`] per request; sources
//! and decorators that build auxiliary buffers borrow it and charge their
//! allocations through a [`ResourceLimitGuard`], which releases them on drop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ValuesSourceError;

/// Memory limit after which resolution-time allocations fail. Defaults to
/// `DEFAULT_MEMORY_LIMIT` (500MB). The counter is shared by all sources
/// resolved for one request.
pub struct AggregationLimits {
    /// The counter shared between all guards of one request.
    memory_consumption: Arc<AtomicU64>,
    /// The memory limit in bytes.
    memory_limit: u64,
}

/// Default memory limit in bytes.
pub const DEFAULT_MEMORY_LIMIT: u64 = 500_000_000;

impl Clone for AggregationLimits {
    fn clone(&self) -> Self {
        Self {
            memory_consumption: Arc::clone(&self.memory_consumption),
            memory_limit: self.memory_limit,
        }
    }
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            memory_consumption: Default::default(),
            memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl AggregationLimits {
    /// `memory_limit` is in bytes and defaults to `DEFAULT_MEMORY_LIMIT`.
    ///
    /// Note: the returned instance contains an Arc-shared counter; clones
    /// account against the same budget.
    pub fn new(memory_limit: Option<u64>) -> Self {
        Self {
            memory_consumption: Default::default(),
            memory_limit: memory_limit.unwrap_or(DEFAULT_MEMORY_LIMIT),
        }
    }

    /// Creates a new ResourceLimitGuard that will release its memory when
    /// dropped.
    pub fn new_guard(&self) -> ResourceLimitGuard {
        ResourceLimitGuard {
            memory_consumption: Arc::clone(&self.memory_consumption),
            memory_limit: self.memory_limit,
            allocated_with_the_guard: 0,
        }
    }

    /// Current estimated consumption in bytes.
    pub fn memory_consumed(&self) -> u64 {
        self.memory_consumption.load(Ordering::Relaxed)
    }
}

fn validate_memory_consumption(
    memory_consumption: &AtomicU64,
    memory_limit: u64,
) -> crate::Result<()> {
    let memory_consumed = memory_consumption.load(Ordering::Relaxed);
    if memory_consumed > memory_limit {
        return Err(ValuesSourceError::MemoryExceeded {
            limit: memory_limit,
            current: memory_consumed,
        });
    }
    Ok(())
}

/// Tracks allocations against the shared budget and releases them on drop.
pub struct ResourceLimitGuard {
    /// The counter shared between all guards of one request.
    memory_consumption: Arc<AtomicU64>,
    /// The memory limit in bytes.
    memory_limit: u64,
    /// Bytes charged through this guard.
    allocated_with_the_guard: u64,
}

impl ResourceLimitGuard {
    /// Charges `num_bytes` against the shared budget, failing when the limit
    /// is exceeded. The charge is kept even on failure and released when the
    /// guard drops.
    pub fn add_memory_consumed(&mut self, num_bytes: u64) -> crate::Result<()> {
        self.allocated_with_the_guard += num_bytes;
        self.memory_consumption
            .fetch_add(num_bytes, Ordering::Relaxed);
        validate_memory_consumption(&self.memory_consumption, self.memory_limit)
    }
}

impl Drop for ResourceLimitGuard {
    /// Removes the memory tracked by this guard from the shared counter.
    fn drop(&mut self) {
        self.memory_consumption
            .fetch_sub(self.allocated_with_the_guard, Ordering::Relaxed);
    }
}
