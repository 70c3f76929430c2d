//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build route table → Start metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal / trigger / serve fault → Stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown has a timeout: the drain is abandoned after the deadline
//! - Repeated signals never start a second drain

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{
    listen_and_serve_with_graceful_shutdown, FaultPolicy, GracefulOpts, GracefulShutdown, Phase,
    Shutdown, ShutdownError, ShutdownReason,
};
pub use signals::{Signals, TerminationSignal};
pub use startup::{build_router, StartupError};
