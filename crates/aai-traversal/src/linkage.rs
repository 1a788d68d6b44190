// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linkage points: attachment paths onto pre-existing subgraphs.
//!
//! Stored top-down as `a|b|c`, with alternatives separated by commas. The
//! rightmost node type is the one that touches the model first, so chains
//! are walked in reverse.

/// Parsed `linkage-points` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkagePoints {
    chains: Vec<Vec<String>>,
}

impl LinkagePoints {
    /// Parses `a|b|c,d|c`. Empty segments are dropped; returns `None` when
    /// nothing usable remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let chains: Vec<Vec<String>> = raw
            .split(',')
            .map(|alt| {
                alt.split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .filter(|chain| !chain.is_empty())
            .collect();
        (!chains.is_empty()).then_some(Self { chains })
    }

    /// Each alternative in walk order (first contact first).
    pub fn reversed_chains(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.chains
            .iter()
            .map(|chain| chain.iter().rev().map(String::as_str).collect())
    }

    /// Distinct first-contact node types across all alternatives.
    pub fn first_contacts(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for chain in &self.chains {
            if let Some(last) = chain.last() {
                if !out.contains(&last.as_str()) {
                    out.push(last);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn chains_walk_rightmost_first() {
        let lp = LinkagePoints::parse("pserver|p-interface|l-interface").unwrap();
        let chains: Vec<_> = lp.reversed_chains().collect();
        assert_eq!(chains, vec![vec!["l-interface", "p-interface", "pserver"]]);
    }

    #[test]
    fn alternatives_converge_on_one_first_contact() {
        let lp = LinkagePoints::parse("pserver|p-interface|l-interface, generic-vnf|l-interface")
            .unwrap();
        assert_eq!(lp.first_contacts(), vec!["l-interface"]);
        assert_eq!(lp.reversed_chains().count(), 2);
    }

    #[test]
    fn blank_value_is_not_a_linkage_point() {
        assert_eq!(LinkagePoints::parse(" , |"), None);
    }
}
