//! Alternate locator generation

use crate::hierarchy::UiNode;
use resilience_core_types::{Locator, LocatorStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Upper bound on candidates tried per heal
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Heuristics, in the order their candidates are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    TextMatch,
    ContentDesc,
    PartialId,
    ClassText,
    HintMatch,
}

impl Heuristic {
    pub const ALL: [Heuristic; 5] = [
        Heuristic::TextMatch,
        Heuristic::ContentDesc,
        Heuristic::PartialId,
        Heuristic::ClassText,
        Heuristic::HintMatch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Heuristic::TextMatch => "text_match",
            Heuristic::ContentDesc => "content_desc",
            Heuristic::PartialId => "partial_id",
            Heuristic::ClassText => "class_text",
            Heuristic::HintMatch => "hint_match",
        }
    }

    /// Alternate locator for `node`, if the node matches `keyword`
    fn propose(&self, node: &UiNode, keyword: &str) -> Option<Locator> {
        let matches = |value: &str| !value.is_empty() && value.to_lowercase().contains(keyword);
        match self {
            Heuristic::TextMatch if matches(&node.text) => Some(Locator::xpath(format!(
                "//*[@{}={}]",
                node.text_attr,
                xpath_literal(&node.text)
            ))),
            Heuristic::ContentDesc if matches(&node.content_desc) => {
                Some(Locator::accessibility_id(node.content_desc.clone()))
            }
            Heuristic::PartialId if matches(&node.resource_id) => {
                Some(Locator::id(node.resource_id.clone()))
            }
            Heuristic::ClassText if matches(&node.text) => Some(Locator::xpath(format!(
                "//{}[@{}={}]",
                node.tag,
                node.text_attr,
                xpath_literal(&node.text)
            ))),
            Heuristic::HintMatch if matches(&node.hint) => Some(Locator::xpath(format!(
                "//*[@{}={}]",
                node.hint_attr,
                xpath_literal(&node.hint)
            ))),
            _ => None,
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One alternate locator to try
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub heuristic: Heuristic,
    pub locator: Locator,
}

/// Build the ordered, de-duplicated candidate list
///
/// Candidates are grouped by heuristic (see [`Heuristic::ALL`]); within a
/// heuristic they follow keyword order, then document order. `partial_id`
/// is skipped when the broken locator already was an id. Keywords are
/// expected lower-cased.
pub fn generate_candidates(
    original: &Locator,
    nodes: &[UiNode],
    keywords: &[String],
    max_candidates: usize,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for heuristic in Heuristic::ALL {
        if heuristic == Heuristic::PartialId && original.strategy == LocatorStrategy::Id {
            continue;
        }
        for keyword in keywords {
            for node in nodes {
                let Some(locator) = heuristic.propose(node, keyword) else {
                    continue;
                };
                let candidate = Candidate { heuristic, locator };
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                    if candidates.len() >= max_candidates {
                        return candidates;
                    }
                }
            }
        }
    }
    candidates
}

/// Quote `value` as an XPath 1.0 string literal
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value.split('"').map(|part| format!("\"{}\"", part)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
