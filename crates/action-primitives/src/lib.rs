//! Action primitives
//!
//! The innermost layer of the pipeline:
//! - bounded wait/poll resolution of a locator
//! - cache-first element lookup
//! - the concrete actions: locate, click, type text, read text
//! - [`PrimitiveEndpoint`], which plugs all of the above into the middleware chain

mod endpoint;
mod primitives;
mod waiting;

pub use endpoint::PrimitiveEndpoint;
pub use primitives::{apply, execute, locate, Resolved};
pub use waiting::{wait_for_element, WaitOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
