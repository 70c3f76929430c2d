//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup, or any time under the write lock):
//!     (method, pattern, handler)
//!     → router.rs (validate, duplicate policy)
//!     → tree.rs (one node per segment, method as segment zero)
//!
//! Incoming request (method, path):
//!     → router.rs (shared lock, lookup)
//!     → tree.rs (literal child first, else wildcard + capture)
//!     → params.rs (captured values into request extensions)
//!     → middleware chain → handler, or not-found fallback
//! ```
//!
//! # Design Decisions
//! - Routes only grow; there is no removal
//! - Deterministic: the same registrations always match the same way
//! - A miss is a normal outcome, never an error

pub mod error;
pub mod params;
pub mod router;
pub mod tree;

pub use error::RouteError;
pub use params::Params;
pub use router::{MatchedPattern, RegistrationPolicy, RouteMatch, Router, RouterBuilder, DEFAULT_METHODS};
pub use tree::{Node, Route};
