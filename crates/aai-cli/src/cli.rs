// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface of `aai-walk`.

use std::path::PathBuf;

use aai_traversal::FilterHash;
use clap::{Args, Parser, Subcommand};

/// Model-driven traversal over an AAI graph document.
#[derive(Parser, Debug)]
#[command(name = "aai-walk", author, version, about)]
pub struct Cli {
    /// Graph document (JSON) holding schema, edge rules, definitions and instances.
    #[arg(long, short = 'g', global = true, default_value = "graph.json")]
    pub graph: PathBuf,
    /// Engine settings.
    #[command(flatten)]
    pub settings: SettingsArgs,
    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Where engine settings come from, plus per-run overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Engine settings file (JSON). Defaults to the platform config store.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the query time limit in seconds (0 disables it).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Override the recursion ceiling.
    #[arg(long, global = true)]
    pub max_levels: Option<usize>,
}

/// Model identifiers accepted by query and delete.
#[derive(Args, Debug, Default, Clone)]
pub struct ModelArgs {
    /// model-version-id of the model-ver to walk.
    #[arg(long)]
    pub model_version_id: Option<String>,
    /// model-invariant-id; every version of the model is considered.
    #[arg(long)]
    pub model_invariant_id: Option<String>,
    /// model-name shared by one or more model-vers.
    #[arg(long)]
    pub model_name: Option<String>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the compiled topology of a model-ver.
    Topology {
        /// model-version-id of the model-ver.
        model_version_id: String,
    },
    /// Print the resolved delete flag per trail of a model-ver.
    DeleteKeys {
        /// model-version-id of the model-ver.
        model_version_id: String,
    },
    /// Collect result trees by model.
    Query {
        /// Model identifiers.
        #[command(flatten)]
        model: ModelArgs,
        /// Expected top node type.
        #[arg(long)]
        top_node_type: Option<String>,
        /// Start-node filter `type.prop=value[,type.prop=value…]`; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<FilterHash>,
    },
    /// Run a named query.
    NamedQuery {
        /// named-query-uuid.
        uuid: String,
        /// Start-node filter `type.prop=value[,…]`; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<FilterHash>,
        /// Node type at which secondary filters apply.
        #[arg(long)]
        cut_point: Option<String>,
        /// Secondary filter `type.prop=value[,…]`.
        #[arg(long, value_parser = parse_filter)]
        secondary: Option<FilterHash>,
    },
    /// Delete the instance tree under one start node by model.
    Delete {
        /// model-version-id of the model-ver.
        model_version_id: String,
        /// Filter picking exactly one start node.
        #[arg(long = "filter", value_parser = parse_filter)]
        filter: FilterHash,
        /// Expected resource-version of the start node.
        #[arg(long)]
        resource_version: Option<String>,
        /// Expected top node type.
        #[arg(long)]
        top_node_type: Option<String>,
        /// Print the plan without deleting.
        #[arg(long)]
        dry_run: bool,
        /// Write the updated document here instead of over `--graph`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print effective engine settings.
    Config {
        /// Persist the effective settings to the platform config store.
        #[arg(long)]
        save: bool,
    },
}

/// Parses `type.prop=value[,type.prop=value…]` into one filter hash.
pub fn parse_filter(raw: &str) -> Result<FilterHash, String> {
    let mut out = FilterHash::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got {pair:?}"))?;
        out.insert(key.trim().to_owned(), value.trim().to_owned());
    }
    if out.is_empty() {
        return Err("empty filter".into());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn filters_split_on_commas_and_first_equals() {
        let f = parse_filter("generic-vnf.vnf-id=a=b, generic-vnf.vnf-name=x").unwrap();
        assert_eq!(f.get("generic-vnf.vnf-id").map(String::as_str), Some("a=b"));
        assert_eq!(f.get("generic-vnf.vnf-name").map(String::as_str), Some("x"));
        assert!(parse_filter("generic-vnf.vnf-id").is_err());
        assert!(parse_filter(" , ").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
