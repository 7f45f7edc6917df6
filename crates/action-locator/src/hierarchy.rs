//! Flattened view of the UI hierarchy dump

use crate::errors::HealError;

/// Attributes of one hierarchy node that healing looks at
///
/// Android attribute names are read first; iOS (XCUITest) names fill the
/// gaps: `label` for text, `name` for the accessibility id, and
/// `placeholderValue` for the hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiNode {
    pub tag: String,
    pub text: String,
    /// Attribute `text` was read from
    pub text_attr: &'static str,
    pub content_desc: String,
    pub resource_id: String,
    pub hint: String,
    /// Attribute `hint` was read from
    pub hint_attr: &'static str,
}

/// Parse a page-source XML dump into its element nodes, in document order
pub fn parse_hierarchy(xml: &str) -> Result<Vec<UiNode>, HealError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|err| HealError::Hierarchy(err.to_string()))?;

    Ok(document
        .descendants()
        .filter(|node| node.is_element())
        .map(|node| {
            // first non-empty attribute among `names`, else the first name
            let attr = |names: &[&'static str]| -> (&'static str, String) {
                names
                    .iter()
                    .find_map(|name| {
                        node.attribute(*name)
                            .filter(|v| !v.is_empty())
                            .map(|v| (*name, v.to_string()))
                    })
                    .unwrap_or((names[0], String::new()))
            };
            let (text_attr, text) = attr(&["text", "label"]);
            let (hint_attr, hint) = attr(&["hint", "placeholderValue"]);
            UiNode {
                tag: node.tag_name().name().to_string(),
                text,
                text_attr,
                content_desc: attr(&["content-desc", "name"]).1,
                resource_id: attr(&["resource-id"]).1,
                hint,
                hint_attr,
            }
        })
        .collect())
}
