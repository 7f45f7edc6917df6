//! Action middleware chain
//!
//! Every action passes through an ordered list of [`Middleware`] before the
//! [`Endpoint`] performs it. The first registered middleware is the
//! outermost one; each decides whether, and how often, to call [`Next`].

pub mod builtin;
mod chain;
mod context;

pub use builtin::{
    LoggingMiddleware, RetryMiddleware, TimingMiddleware, TimingRecord, TimingReport,
};
pub use chain::{Endpoint, Middleware, MiddlewareChain, Next};
pub use context::ActionContext;
