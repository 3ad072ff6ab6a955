// crates/vpc-assert-core/src/runtime/engine.rs
// ============================================================================
// Module: VPC Assert Evaluation Engine
// Description: Plan execution with bounded concurrent fetches.
// Purpose: Fetch observed state, evaluate expectations, and aggregate a report.
// Dependencies: tokio, serde, crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The engine walks an [`EvaluationPlan`]. Precomputed findings are copied
//! through; resource checks are fetched through the provider and compared
//! with [`evaluate`]. Fetches run on blocking worker threads, each under its
//! own timeout. A worker holds its semaphore permit until the provider call
//! returns, so abandoned calls still count against `max_workers`. Transient
//! provider errors are retried with exponential backoff up to a fixed cap; a
//! retry after a timeout waits on the call already in flight instead of
//! issuing another. A failed fetch becomes one provider finding for that
//! instance and the run continues.
//!
//! Findings are reassembled in plan order, so the report does not depend on
//! completion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::audit::AuditSink;
use crate::audit::FetchAuditEvent;
use crate::audit::FetchAuditEventParams;
use crate::audit::NoopAuditSink;
use crate::audit::RunAuditEvent;
use crate::core::expectation::ExpectedState;
use crate::core::finding::Finding;
use crate::core::finding::FindingKind;
use crate::core::finding::Report;
use crate::core::finding::Verdict;
use crate::core::identifiers::ControlName;
use crate::core::resource::ObservedResource;
use crate::interfaces::ProviderError;
use crate::interfaces::ResourceProvider;
use crate::runtime::assertion::evaluate;
use crate::runtime::report::aggregate;

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// One unit of work inside a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "check", rename_all = "snake_case")]
pub enum PlannedCheck {
    /// Expectation that requires fetching observed state.
    Resource(ExpectedState),
    /// Findings computed from the configuration snapshot alone.
    Precomputed(Vec<Finding>),
}

/// Ordered checks for one control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPlan {
    /// Control name.
    pub control: ControlName,
    /// Human-readable control title.
    pub title: String,
    /// Checks in evaluation order.
    pub checks: Vec<PlannedCheck>,
}

impl ControlPlan {
    /// Creates an empty control plan.
    #[must_use]
    pub fn new(control: ControlName, title: impl Into<String>) -> Self {
        Self {
            control,
            title: title.into(),
            checks: Vec::new(),
        }
    }

    /// Appends a resource check.
    pub fn push_resource(&mut self, expected: ExpectedState) {
        self.checks.push(PlannedCheck::Resource(expected));
    }

    /// Appends precomputed findings; empty batches are ignored.
    pub fn push_findings(&mut self, findings: Vec<Finding>) {
        if !findings.is_empty() {
            self.checks.push(PlannedCheck::Precomputed(findings));
        }
    }
}

/// Ordered controls for one evaluation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationPlan {
    /// Controls in evaluation order.
    pub controls: Vec<ControlPlan>,
}

impl EvaluationPlan {
    /// Iterates all checks in plan order.
    pub fn checks(&self) -> impl Iterator<Item = &PlannedCheck> {
        self.controls.iter().flat_map(|control| control.checks.iter())
    }

    /// Returns the number of planned checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.controls.iter().map(|control| control.checks.len()).sum()
    }
}

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Execution limits for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum concurrent fetches.
    pub max_workers: usize,
    /// Time budget for a single fetch attempt.
    pub fetch_timeout: Duration,
    /// Maximum retries after the first attempt for transient errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            fetch_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

impl EngineConfig {
    /// Returns the delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.retry_backoff.saturating_mul(1_u32 << exponent)
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Plan executor bound to a provider.
pub struct Engine<P: ?Sized> {
    /// Provider answering resource queries.
    provider: Arc<P>,
    /// Execution limits.
    config: EngineConfig,
    /// Audit sink for run and fetch events.
    audit: Arc<dyn AuditSink>,
}

impl<P> Engine<P>
where
    P: ResourceProvider + Send + Sync + ?Sized + 'static,
{
    /// Creates an engine with a no-op audit sink.
    #[must_use]
    pub fn new(provider: Arc<P>, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the execution limits.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes the plan with bounded concurrency.
    pub async fn run(&self, plan: &EvaluationPlan) -> Report {
        self.audit.record_run(&RunAuditEvent::started(plan.controls.len(), plan.check_count()));
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));

        let mut pending: Vec<Pending> = Vec::with_capacity(plan.check_count());
        for check in plan.checks() {
            match check {
                PlannedCheck::Precomputed(findings) => pending.push(Pending::Ready(findings.clone())),
                PlannedCheck::Resource(planned) => {
                    let expected = planned.clone();
                    let provider = Arc::clone(&self.provider);
                    let audit = Arc::clone(&self.audit);
                    let semaphore = Arc::clone(&semaphore);
                    let config = self.config;
                    let handle = tokio::spawn(async move {
                        let result =
                            fetch_async(provider, semaphore, &expected, &config, audit.as_ref())
                                .await;
                        findings_for(&expected, result)
                    });
                    pending.push(Pending::Running(Box::new(planned.clone()), handle));
                }
            }
        }

        let mut findings = Vec::new();
        for entry in pending {
            match entry {
                Pending::Ready(batch) => findings.extend(batch),
                Pending::Running(expected, handle) => match handle.await {
                    Ok(batch) => findings.extend(batch),
                    Err(err) => {
                        let err = ProviderError::Invalid(format!("fetch worker failed: {err}"));
                        findings.push(provider_finding(&expected, &err));
                    }
                },
            }
        }

        let report = aggregate(findings);
        self.audit.record_run(&RunAuditEvent::finished(
            plan.controls.len(),
            plan.check_count(),
            &report,
        ));
        report
    }

    /// Executes the plan one provider call at a time.
    ///
    /// Each call runs on a helper thread so the fetch timeout holds even when
    /// the provider hangs. A call abandoned by a timeout must return before
    /// the next one starts, and waiting for it counts against the next
    /// attempt's timeout.
    #[must_use]
    pub fn run_sequential(&self, plan: &EvaluationPlan) -> Report {
        self.audit.record_run(&RunAuditEvent::started(plan.controls.len(), plan.check_count()));
        let mut slot = CallSlot::default();
        let mut findings = Vec::new();
        for check in plan.checks() {
            match check {
                PlannedCheck::Precomputed(batch) => findings.extend(batch.iter().cloned()),
                PlannedCheck::Resource(expected) => {
                    slot.next_check();
                    let result = fetch_blocking(
                        &self.provider,
                        &mut slot,
                        expected,
                        &self.config,
                        self.audit.as_ref(),
                    );
                    findings.extend(findings_for(expected, result));
                }
            }
        }
        let report = aggregate(findings);
        self.audit.record_run(&RunAuditEvent::finished(
            plan.controls.len(),
            plan.check_count(),
            &report,
        ));
        report
    }
}

/// In-flight or completed work for one planned check.
enum Pending {
    /// Findings already available.
    Ready(Vec<Finding>),
    /// Spawned fetch with the expectation it evaluates.
    Running(Box<ExpectedState>, JoinHandle<Vec<Finding>>),
}

// ============================================================================
// SECTION: Fetching
// ============================================================================

/// Result of one provider call.
type QueryResult = Result<Vec<ObservedResource>, ProviderError>;

/// Fetches observed state on a blocking worker with timeout and retries.
async fn fetch_async<P>(
    provider: Arc<P>,
    semaphore: Arc<Semaphore>,
    expected: &ExpectedState,
    config: &EngineConfig,
    audit: &dyn AuditSink,
) -> QueryResult
where
    P: ResourceProvider + Send + Sync + ?Sized + 'static,
{
    let mut attempt = 0_u32;
    let mut in_flight: Option<JoinHandle<QueryResult>> = None;
    loop {
        attempt += 1;
        let mut task = match in_flight.take() {
            Some(task) => task,
            None => {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    return Err(ProviderError::Unsupported("worker pool closed".to_string()));
                };
                let worker_provider = Arc::clone(&provider);
                let class = expected.class;
                let filter = expected.filter.clone();
                tokio::task::spawn_blocking(move || {
                    let result = worker_provider.query(class, &filter);
                    drop(permit);
                    result
                })
            }
        };
        let started = Instant::now();
        let result = match tokio::time::timeout(config.fetch_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(ProviderError::Invalid(format!("provider task failed: {err}"))),
            Err(_) => {
                in_flight = Some(task);
                Err(ProviderError::Timeout(duration_ms(config.fetch_timeout)))
            }
        };
        let result = result.map(|found| retain_matches(expected, found));
        record_fetch(audit, expected, attempt, &result, started);
        match result {
            Err(err) if err.is_transient() && attempt <= config.max_retries => {
                tokio::time::sleep(config.backoff(attempt)).await;
            }
            other => return other,
        }
    }
}

/// Fetches observed state one call at a time with timeout and retries.
fn fetch_blocking<P>(
    provider: &Arc<P>,
    slot: &mut CallSlot,
    expected: &ExpectedState,
    config: &EngineConfig,
    audit: &dyn AuditSink,
) -> QueryResult
where
    P: ResourceProvider + Send + Sync + ?Sized + 'static,
{
    let mut attempt = 0_u32;
    loop {
        attempt += 1;
        let started = Instant::now();
        let result = slot
            .call(provider, expected, config.fetch_timeout)
            .map(|found| retain_matches(expected, found));
        record_fetch(audit, expected, attempt, &result, started);
        match result {
            Err(err) if err.is_transient() && attempt <= config.max_retries => {
                thread::sleep(config.backoff(attempt));
            }
            other => return other,
        }
    }
}

/// The single provider call a sequential run may have outstanding.
#[derive(Default)]
struct CallSlot {
    /// Call that has not returned yet.
    pending: Option<Receiver<QueryResult>>,
    /// Whether `pending` was issued for the current check.
    current: bool,
}

impl CallSlot {
    /// Marks any outstanding call as belonging to an earlier check.
    const fn next_check(&mut self) {
        self.current = false;
    }

    /// Returns the current check's result, or a timeout after `timeout`.
    fn call<P>(
        &mut self,
        provider: &Arc<P>,
        expected: &ExpectedState,
        timeout: Duration,
    ) -> QueryResult
    where
        P: ResourceProvider + Send + Sync + ?Sized + 'static,
    {
        let deadline = Instant::now() + timeout;
        let timed_out = || ProviderError::Timeout(duration_ms(timeout));
        if let Some(receiver) = self.pending.take() {
            match receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(result) if self.current => return result,
                Err(RecvTimeoutError::Disconnected) if self.current => return Err(worker_exited()),
                Ok(_) | Err(RecvTimeoutError::Disconnected) => {}
                Err(RecvTimeoutError::Timeout) => {
                    self.pending = Some(receiver);
                    return Err(timed_out());
                }
            }
        }
        let receiver = spawn_query(Arc::clone(provider), expected)?;
        self.current = true;
        match receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                self.pending = Some(receiver);
                Err(timed_out())
            }
            Err(RecvTimeoutError::Disconnected) => Err(worker_exited()),
        }
    }
}

/// Error for a helper thread that ended without sending a result.
fn worker_exited() -> ProviderError {
    ProviderError::Invalid("provider worker exited without a result".to_string())
}

/// Runs one provider call on a helper thread and returns its result channel.
fn spawn_query<P>(
    provider: Arc<P>,
    expected: &ExpectedState,
) -> Result<Receiver<QueryResult>, ProviderError>
where
    P: ResourceProvider + Send + Sync + ?Sized + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let class = expected.class;
    let filter = expected.filter.clone();
    thread::Builder::new()
        .name("vpc-assert-fetch".to_string())
        .spawn(move || {
            let _ = sender.send(provider.query(class, &filter));
        })
        .map_err(|err| ProviderError::Invalid(format!("cannot start provider worker: {err}")))?;
    Ok(receiver)
}

/// Keeps only records that satisfy the expectation's filter.
fn retain_matches(expected: &ExpectedState, found: Vec<ObservedResource>) -> Vec<ObservedResource> {
    found
        .into_iter()
        .filter(|resource| resource.class == expected.class && expected.filter.matches(resource))
        .collect()
}

/// Emits a fetch audit event.
fn record_fetch(
    audit: &dyn AuditSink,
    expected: &ExpectedState,
    attempt: u32,
    result: &QueryResult,
    started: Instant,
) {
    audit.record_fetch(&FetchAuditEvent::new(FetchAuditEventParams {
        control: expected.control.to_string(),
        resource: expected.resource.to_string(),
        class: expected.class,
        attempt,
        matched: result.as_ref().ok().map(Vec::len),
        error_kind: result.as_ref().err().map(ProviderError::kind),
        duration_ms: started.elapsed().as_millis(),
    }));
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// Converts a fetch result into findings.
fn findings_for(expected: &ExpectedState, result: QueryResult) -> Vec<Finding> {
    match result {
        Ok(observed) => evaluate(expected, &observed),
        Err(err) => vec![provider_finding(expected, &err)],
    }
}

/// Records a provider failure for one expectation.
#[must_use]
pub fn provider_finding(expected: &ExpectedState, err: &ProviderError) -> Finding {
    Finding::new(&expected.control, &expected.resource, FindingKind::Provider)
        .with_values(
            json!({
                "class": expected.class,
                "filter": serde_json::to_value(&expected.filter).unwrap_or(Value::Null),
            }),
            json!({ "error": err.kind() }),
        )
        .with_verdict(Verdict::Error)
        .with_message(err.to_string())
}

/// Converts a duration to whole milliseconds.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
