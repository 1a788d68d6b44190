// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Edge-rule port: may two node types be connected?

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Validator answering whether an edge rule exists between two node types.
///
/// Rules are symmetric: `has_rule(a, b) == has_rule(b, a)`.
pub trait EdgeRules {
    /// Returns `true` when `a` and `b` may be connected.
    fn has_rule(&self, a: &str, b: &str) -> bool;
}

/// Edge rules stored as unordered node-type pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct EdgeRuleSet {
    pairs: BTreeSet<(String, String)>,
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

impl EdgeRuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule between `a` and `b`.
    pub fn allow(&mut self, a: &str, b: &str) -> &mut Self {
        self.pairs.insert(ordered(a, b));
        self
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` when no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl EdgeRules for EdgeRuleSet {
    fn has_rule(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&ordered(a, b))
    }
}

impl From<Vec<(String, String)>> for EdgeRuleSet {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut set = Self::new();
        for (a, b) in &pairs {
            set.allow(a, b);
        }
        set
    }
}

impl From<EdgeRuleSet> for Vec<(String, String)> {
    fn from(set: EdgeRuleSet) -> Self {
        set.pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_symmetric() {
        let mut rules = EdgeRuleSet::new();
        rules.allow("vserver", "generic-vnf");
        assert!(rules.has_rule("generic-vnf", "vserver"));
        assert!(rules.has_rule("vserver", "generic-vnf"));
        assert!(!rules.has_rule("vserver", "pserver"));
        assert_eq!(rules.len(), 1);
    }
}
