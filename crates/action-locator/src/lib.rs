//! Locator self-healing
//!
//! When a locator stops resolving (typically after an app build renamed an
//! identifier) the healer reads the live UI hierarchy, derives keywords from
//! the broken locator, and tries alternate locators built from matching
//! nodes:
//! - `text_match`: visible text
//! - `content_desc`: accessibility id
//! - `partial_id`: resource id containing the keyword
//! - `class_text`: element type plus visible text
//! - `hint_match`: input hint / placeholder
//!
//! A heal that worked is recorded so the locator can be fixed at the source.

pub mod candidates;
pub mod errors;
pub mod healer;
pub mod hierarchy;
pub mod history;
pub mod keywords;
mod middleware;

pub use candidates::{generate_candidates, xpath_literal, Candidate, Heuristic, DEFAULT_MAX_CANDIDATES};
pub use errors::HealError;
pub use healer::{Resolution, SelfHealer};
pub use hierarchy::{parse_hierarchy, UiNode};
pub use history::{HealHistory, HealRecord};
pub use keywords::extract_keywords;
pub use middleware::{SelfHealingMiddleware, DEFAULT_HEAL_TIMEOUT};
