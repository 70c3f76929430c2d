//! OS signal handling.
//!
//! # Responsibilities
//! - Subscribe to termination signals (SIGINT, SIGTERM)
//! - Report which one arrived
//! - Stop delivery when the subscription is dropped
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Non-unix targets only get Ctrl-C

use std::fmt;
use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// A termination signal delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Live subscription to termination signals.
///
/// Dropping it stops delivery to this subscription only. Tokio keeps its
/// handler installed for the rest of the process, so once a `Signals` has
/// existed SIGINT/SIGTERM no longer terminate the process by default; an
/// embedder that wants the default behavior back must exit on its own after
/// shutdown completes.
#[derive(Debug)]
pub struct Signals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl Signals {
    /// Must be called from within a Tokio runtime.
    pub fn subscribe() -> io::Result<Self> {
        #[cfg(unix)]
        {
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next termination signal.
    pub async fn recv(&mut self) -> TerminationSignal {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => TerminationSignal::Interrupt,
                _ = self.terminate.recv() => TerminationSignal::Terminate,
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Ctrl-C handler failed");
                std::future::pending::<()>().await;
            }
            TerminationSignal::Interrupt
        }
    }
}
