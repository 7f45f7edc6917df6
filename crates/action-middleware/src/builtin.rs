//! Middleware shipped with the pipeline

mod logging;
mod retry;
mod timing;

pub use logging::LoggingMiddleware;
pub use retry::RetryMiddleware;
pub use timing::{TimingMiddleware, TimingRecord, TimingReport};
