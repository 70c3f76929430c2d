//! Shutdown coordination.
//!
//! # Responsibilities
//! - Run the transport's serve loop on its own task
//! - Wait for a termination signal, a programmatic trigger, or a serve fault
//! - Drain the transport within a deadline
//! - Fold every failure into one `ShutdownError`
//!
//! # Data Flow
//! ```text
//! Running → AwaitingSignal
//!     → CleanCancel (signal / trigger) | FaultCancel (serve ended first)
//!     → Draining → Drained | TimedOut
//!     → Terminated
//! ```
//!
//! # Design Decisions
//! - The wait is a single `select!`, never a poll loop
//! - The drain deadline is applied once, around `graceful_stop`
//! - Signal subscriptions are dropped as soon as the wait is over

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::ShutdownConfig;
use crate::lifecycle::signals::{Signals, TerminationSignal};
use crate::net::{Transport, TransportError};

/// Why shutdown started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal(TerminationSignal),
    Requested,
    /// The serve loop ended on its own; carries the fault's message.
    ServeFault(String),
}

/// Cloneable shutdown trigger.
///
/// The first `trigger` wins; later calls (and later signals) are no-ops.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Returns `true` only for the call that started it.
    pub fn trigger(&self) -> bool {
        self.trigger_with(ShutdownReason::Requested)
    }

    pub(crate) fn trigger_with(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(reason);
            true
        })
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.tx.borrow().clone()
    }

    /// Resolves once shutdown has been triggered.
    pub async fn triggered(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        let reason = rx.wait_for(Option::is_some).await.map(|state| state.clone());
        match reason {
            Ok(Some(reason)) => reason,
            // The sender lives as long as `self`.
            _ => ShutdownReason::Requested,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do when the serve loop ends on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Still drain the transport within the deadline.
    #[default]
    Drain,
    /// Report the fault without draining.
    Abort,
}

/// Options for a graceful shutdown.
#[derive(Debug, Clone)]
pub struct GracefulOpts {
    pub timeout: Duration,
    pub fault_policy: FaultPolicy,
}

impl GracefulOpts {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }
}

impl Default for GracefulOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            fault_policy: FaultPolicy::Drain,
        }
    }
}

impl From<&ShutdownConfig> for GracefulOpts {
    fn from(config: &ShutdownConfig) -> Self {
        let policy = if config.drain_on_fault {
            FaultPolicy::Drain
        } else {
            FaultPolicy::Abort
        };
        GracefulOpts::new(config.timeout()).fault_policy(policy)
    }
}

/// Coordinator phases, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    AwaitingSignal,
    CleanCancel,
    FaultCancel,
    Draining,
    Drained,
    TimedOut,
    Terminated,
}

fn enter(phase: Phase) {
    tracing::info!(phase = ?phase, "Shutdown coordinator transition");
}

/// Composite shutdown failure.
///
/// Carries the serve fault (if the serve loop failed on its own), the drain
/// fault (if `graceful_stop` failed) and the deadline (if draining took too
/// long). At least one is present.
#[derive(Debug, Default)]
pub struct ShutdownError {
    serve: Option<TransportError>,
    drain: Option<TransportError>,
    timeout: Option<Duration>,
}

impl ShutdownError {
    pub fn timed_out(&self) -> bool {
        self.timeout.is_some()
    }

    pub fn drain_failed(&self) -> bool {
        self.drain.is_some()
    }

    pub fn serve_failed(&self) -> bool {
        self.serve.is_some()
    }

    pub fn serve_error(&self) -> Option<&TransportError> {
        self.serve.as_ref()
    }

    pub fn drain_error(&self) -> Option<&TransportError> {
        self.drain.as_ref()
    }

    /// The deadline that was exceeded.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn into_result(self) -> Result<(), ShutdownError> {
        if self.serve.is_none() && self.drain.is_none() && self.timeout.is_none() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(e) = &self.serve {
            parts.push(format!("serve failed: {e}"));
        }
        if let Some(d) = self.timeout {
            parts.push(format!("drain timed out after {d:?}"));
        }
        if let Some(e) = &self.drain {
            parts.push(format!("drain failed: {e}"));
        }
        if parts.is_empty() {
            return f.write_str("shutdown failed");
        }
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ShutdownError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.serve
            .as_ref()
            .or(self.drain.as_ref())
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Drives one transport from serving to terminated.
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    opts: GracefulOpts,
    os_signals: bool,
}

impl GracefulShutdown {
    /// Listens for SIGINT/SIGTERM in addition to the trigger handle.
    pub fn new(opts: GracefulOpts) -> Self {
        Self {
            opts,
            os_signals: true,
        }
    }

    /// Only the trigger handle (or a serve fault) starts shutdown.
    pub fn without_signals(mut self) -> Self {
        self.os_signals = false;
        self
    }

    pub fn opts(&self) -> &GracefulOpts {
        &self.opts
    }

    /// Serve `transport` until shutdown, then drain it.
    ///
    /// Returns `Ok(())` only when shutdown was requested and the drain
    /// finished in time without error.
    pub async fn run<T: Transport>(
        &self,
        transport: Arc<T>,
        shutdown: &Shutdown,
    ) -> Result<(), ShutdownError> {
        let mut signals = if self.os_signals {
            match Signals::subscribe() {
                Ok(signals) => Some(signals),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to subscribe to termination signals");
                    None
                }
            }
        } else {
            None
        };

        enter(Phase::Running);
        let mut serving = {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { transport.serve().await })
        };

        enter(Phase::AwaitingSignal);
        let fault = tokio::select! {
            reason = next_request(signals.as_mut(), shutdown) => {
                tracing::info!(reason = ?reason, "Shutdown requested");
                shutdown.trigger_with(reason);
                enter(Phase::CleanCancel);
                None
            }
            joined = &mut serving => {
                let fault = match joined {
                    Ok(Ok(())) => TransportError::ExitedEarly,
                    Ok(Err(e)) => e,
                    Err(e) => TransportError::Panicked(e.to_string()),
                };
                shutdown.trigger_with(ShutdownReason::ServeFault(fault.to_string()));
                enter(Phase::FaultCancel);
                tracing::error!(error = %fault, "Serve loop failed");
                Some(fault)
            }
        };
        drop(signals);

        let mut error = ShutdownError {
            serve: fault,
            ..ShutdownError::default()
        };

        if error.serve_failed() && self.opts.fault_policy == FaultPolicy::Abort {
            enter(Phase::Terminated);
            return error.into_result();
        }

        enter(Phase::Draining);
        match tokio::time::timeout(self.opts.timeout, transport.graceful_stop()).await {
            Ok(Ok(())) => {
                enter(Phase::Drained);
                tracing::info!("Transport drained");
            }
            Ok(Err(e)) => {
                enter(Phase::Drained);
                tracing::error!(error = %e, "Transport drain failed");
                error.drain = Some(e);
            }
            Err(_) => {
                enter(Phase::TimedOut);
                tracing::warn!(timeout = ?self.opts.timeout, "Drain deadline exceeded");
                error.timeout = Some(self.opts.timeout);
            }
        }

        if !serving.is_finished() {
            serving.abort();
        }

        enter(Phase::Terminated);
        error.into_result()
    }
}

async fn next_request(signals: Option<&mut Signals>, shutdown: &Shutdown) -> ShutdownReason {
    match signals {
        Some(signals) => tokio::select! {
            signal = signals.recv() => ShutdownReason::Signal(signal),
            reason = shutdown.triggered() => reason,
        },
        None => shutdown.triggered().await,
    }
}

/// Serve `transport` until SIGINT/SIGTERM, then drain it within
/// `opts.timeout`.
pub async fn listen_and_serve_with_graceful_shutdown<T: Transport>(
    transport: Arc<T>,
    opts: GracefulOpts,
) -> Result<(), ShutdownError> {
    GracefulShutdown::new(opts)
        .run(transport, &Shutdown::new())
        .await
}
