//! Shared primitives for the action resilience pipeline
//!
//! Everything the pipeline crates agree on lives here:
//! - [`Locator`] and [`LocatorStrategy`] (cache keys, heal inputs)
//! - [`ElementHandle`] (opaque reference handed out by the driver)
//! - [`ActionKind`], [`ActionArgs`], [`ActionOutput`]
//! - [`ActionError`] / [`DeviceError`] and their locator-miss classification
//! - the [`Device`] port implemented by the automation driver
//! - [`RecordLog`], the capped append-only history used for reports

pub mod action;
pub mod device;
pub mod errors;
pub mod locator;
pub mod record_log;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use action::*;
pub use device::*;
pub use errors::*;
pub use locator::*;
pub use record_log::*;
