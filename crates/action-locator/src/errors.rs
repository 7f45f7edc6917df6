//! Error types for the healing engine
//!
//! These never leave the crate through `find_element`: a failed heal always
//! surfaces the original lookup error. They exist for logging and for
//! callers driving [`SelfHealer::heal`](crate::SelfHealer::heal) directly.

use resilience_core_types::DeviceError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HealError {
    /// The UI hierarchy could not be fetched
    #[error("Page source unavailable: {0}")]
    PageSource(#[from] DeviceError),

    /// The UI hierarchy is not well-formed XML
    #[error("Unparseable hierarchy: {0}")]
    Hierarchy(String),

    /// No node matched any keyword of the locator
    #[error("No candidates for keywords {0:?}")]
    NoCandidates(Vec<String>),

    /// Candidates were generated but none resolved to a displayed element
    #[error("All {0} candidates failed")]
    Exhausted(usize),
}
