//! Attribute containers and the duplicate-name policy.

use crate::error::{ParseError, Pos};
use crate::options::DuplicatePolicy;

/// Ordered attribute list with map-style lookup.
///
/// Values arrive fully entity-decoded from the tokenizer. Document order is
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Attributes { pairs }
    }

    /// Value of the attribute named `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Name/value pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// First attribute name that appears more than once, if any.
pub(crate) fn find_duplicate(pairs: &[(String, String)]) -> Option<&str> {
    for (i, (name, _)) in pairs.iter().enumerate() {
        if pairs[..i].iter().any(|(n, _)| n == name) {
            return Some(name.as_str());
        }
    }
    None
}

/// Apply the configured duplicate policy to raw pairs from a single tag.
/// `tag_pos` is where the tag started, for the Reject diagnostic.
pub(crate) fn apply_duplicate_policy(
    pairs: Vec<(String, String)>,
    policy: DuplicatePolicy,
    tag_pos: Pos,
) -> Result<Attributes, ParseError> {
    let mut kept: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (name, value) in pairs {
        match kept.iter_mut().find(|(n, _)| *n == name) {
            None => kept.push((name, value)),
            Some(existing) => match policy {
                DuplicatePolicy::Reject => {
                    return Err(ParseError::well_formedness(
                        format!("duplicate attribute '{name}'"),
                        tag_pos,
                    ));
                }
                DuplicatePolicy::KeepFirst => {}
                DuplicatePolicy::KeepLast => existing.1 = value,
            },
        }
    }
    Ok(Attributes::from_pairs(kept))
}
