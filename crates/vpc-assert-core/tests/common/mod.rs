// crates/vpc-assert-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: In-memory providers and record builders for core tests.
// Purpose: Provide deterministic observed state without a cloud backend.
// Dependencies: vpc-assert-core, serde_json
// ============================================================================

//! ## Overview
//! Shared providers: [`StaticProvider`] answers from a fixed record list,
//! [`FlakyProvider`] fails a configurable number of times before answering,
//! [`SlowProvider`] sleeps before answering, and [`GaugeProvider`] sleeps on
//! every call while tracking how many calls overlap.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Value;
use vpc_assert_core::AuditSink;
use vpc_assert_core::FetchAuditEvent;
use vpc_assert_core::ObservedResource;
use vpc_assert_core::ProviderError;
use vpc_assert_core::ResourceClass;
use vpc_assert_core::ResourceFilter;
use vpc_assert_core::ResourceProvider;
use vpc_assert_core::RunAuditEvent;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Builds an observed record from a JSON object literal.
pub fn record(class: ResourceClass, value: Value) -> ObservedResource {
    ObservedResource::from_value(class, value).expect("record must be an object")
}

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Provider answering from a fixed set of records.
pub struct StaticProvider {
    /// Records served for every query.
    pub records: Vec<ObservedResource>,
    /// Number of queries received.
    pub calls: AtomicUsize,
}

impl StaticProvider {
    /// Creates a provider serving `records`.
    pub fn new(records: Vec<ObservedResource>) -> Self {
        Self {
            records,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ResourceProvider for StaticProvider {
    fn query(
        &self,
        class: ResourceClass,
        _filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.iter().filter(|record| record.class == class).cloned().collect())
    }
}

/// Provider that fails with `error` for the first `failures` queries.
pub struct FlakyProvider {
    /// Records served once failures are exhausted.
    pub inner: StaticProvider,
    /// Remaining failures.
    pub failures: AtomicUsize,
    /// Error returned while failing.
    pub error: ProviderError,
}

impl FlakyProvider {
    /// Creates a flaky provider.
    pub fn new(records: Vec<ObservedResource>, failures: usize, error: ProviderError) -> Self {
        Self {
            inner: StaticProvider::new(records),
            failures: AtomicUsize::new(failures),
            error,
        }
    }

    /// Returns the number of queries received.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for FlakyProvider {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err(self.error.clone());
        }
        self.inner.query(class, filter)
    }
}

/// Provider that sleeps before answering queries for one class.
pub struct SlowProvider {
    /// Records served after the delay.
    pub inner: StaticProvider,
    /// Class whose queries are delayed.
    pub slow_class: ResourceClass,
    /// Delay applied to slow queries.
    pub delay: Duration,
}

impl ResourceProvider for SlowProvider {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        if class == self.slow_class {
            std::thread::sleep(self.delay);
        }
        self.inner.query(class, filter)
    }
}

/// Provider that sleeps on every call and records peak concurrency.
pub struct GaugeProvider {
    /// Records served after the delay.
    pub inner: StaticProvider,
    /// Delay applied to every call.
    pub delay: Duration,
    /// Calls currently inside `query`.
    pub in_flight: AtomicUsize,
    /// Highest observed value of `in_flight`.
    pub peak: AtomicUsize,
}

impl GaugeProvider {
    /// Creates a provider that sleeps `delay` before answering.
    pub fn new(records: Vec<ObservedResource>, delay: Duration) -> Self {
        Self {
            inner: StaticProvider::new(records),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Returns the highest number of overlapping calls.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Returns the number of queries received.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl ResourceProvider for GaugeProvider {
    fn query(
        &self,
        class: ResourceClass,
        filter: &ResourceFilter,
    ) -> Result<Vec<ObservedResource>, ProviderError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        let result = self.inner.query(class, filter);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink capturing serialized events.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured JSON lines.
    pub events: Mutex<Vec<Value>>,
}

impl RecordingAuditSink {
    /// Returns captured event names in order.
    pub fn event_names(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("audit lock")
            .iter()
            .filter_map(|event| event.get("event").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record_run(&self, event: &RunAuditEvent) {
        let value = serde_json::to_value(event).expect("serialize run event");
        self.events.lock().expect("audit lock").push(value);
    }

    fn record_fetch(&self, event: &FetchAuditEvent) {
        let value = serde_json::to_value(event).expect("serialize fetch event");
        self.events.lock().expect("audit lock").push(value);
    }
}
