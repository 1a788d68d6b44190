// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end runs of the `aai-walk` binary against a fixture document.

use std::path::{Path, PathBuf};

use aai_dry_tests::{inventory_edge_rules, inventory_schema, DefinitionBuilder, Inventory};
use aai_graph::{GraphDocument, GraphStore};
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// vnf model (vnf → vserver → tenant(F) → cloud-region(F)), one instance
/// chain, and named query `nq-1` (vnf → vserver).
fn write_fixture(dir: &Path) -> PathBuf {
    let mut store = GraphStore::new();
    let mut defs = DefinitionBuilder::new(&mut store);
    let vnf_w = defs.widget("generic-vnf");
    let vs_w = defs.widget("vserver");
    let tenant_w = defs.widget("tenant");
    let cr_w = defs.widget("cloud-region");
    let model = defs.model("resource", "vnf-inv", "vnf-ver-1", "vnf-model");
    let top = defs.element(model.ver, vnf_w.ver, "T");
    let vs = defs.element(top, vs_w.ver, "T");
    let tenant = defs.element(vs, tenant_w.ver, "F");
    defs.element(tenant, cr_w.ver, "F");
    let nq = defs.named_query("nq-1");
    let nq_top = defs.nq_element(nq, &vnf_w);
    defs.nq_element(nq_top, &vs_w);

    let mut inv = Inventory::new(&mut store);
    let vnf = inv.stamped(
        "generic-vnf",
        &[("vnf-id", "vnf-1"), ("resource-version", "10")],
        &model,
    );
    let vserver = inv.add("vserver", &[("vserver-id", "vs-1")]);
    let tenant = inv.add("tenant", &[("tenant-id", "t-1")]);
    let region = inv.add("cloud-region", &[("cloud-region-id", "east")]);
    inv.relate(vnf, vserver);
    inv.link(tenant, vserver);
    inv.link(region, tenant);

    let path = dir.join("graph.json");
    GraphDocument::capture(&store, &inventory_schema(), &inventory_edge_rules())
        .write_to(&path)
        .expect("write fixture");
    path
}

struct Sandbox {
    dir: TempDir,
    graph: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let graph = write_fixture(dir.path());
        Self { dir, graph }
    }

    /// `aai-walk --graph <fixture>` with the platform config dir inside the sandbox.
    fn walk(&self) -> Command {
        let mut cmd = Command::cargo_bin("aai-walk").expect("binary built");
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--graph")
            .arg(&self.graph);
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.walk().args(args).output().expect("runs");
        assert!(
            output.status.success(),
            "aai-walk {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}

#[test]
fn topology_prints_trails() {
    let sb = Sandbox::new();
    sb.walk()
        .args(["topology", "vnf-ver-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generic-vnf,vnf-inv,vnf-ver-1|vserver|tenant"));
}

#[test]
fn delete_keys_print_flags() {
    let sb = Sandbox::new();
    let keys = sb.json(&["delete-keys", "vnf-ver-1"]);
    assert_eq!(keys["generic-vnf,vnf-inv,vnf-ver-1"], "T");
    assert_eq!(keys["generic-vnf,vnf-inv,vnf-ver-1|vserver|tenant|cloud-region"], "F");
}

#[test]
fn query_prints_result_trees() {
    let sb = Sandbox::new();
    let results = sb.json(&[
        "query",
        "--model-version-id",
        "vnf-ver-1",
        "--filter",
        "generic-vnf.vnf-id=vnf-1",
    ]);
    let trees = results.as_array().expect("array");
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0]["node_type"], "generic-vnf");
    assert_eq!(trees[0]["children"][0]["node_type"], "vserver");
}

#[test]
fn named_query_runs_under_a_time_limit() {
    let sb = Sandbox::new();
    let results = sb.json(&[
        "--timeout-secs",
        "30",
        "named-query",
        "nq-1",
        "--filter",
        "generic-vnf.vnf-id=vnf-1",
    ]);
    assert_eq!(results[0]["children"].as_array().map(Vec::len), Some(1));
}

#[test]
fn dry_run_leaves_the_document_alone() {
    let sb = Sandbox::new();
    let before = std::fs::read(&sb.graph).expect("read");
    let plan = sb.json(&[
        "delete",
        "vnf-ver-1",
        "--filter",
        "generic-vnf.vnf-id=vnf-1",
        "--dry-run",
    ]);
    assert_eq!(plan.as_object().map(serde_json::Map::len), Some(2));
    assert_eq!(std::fs::read(&sb.graph).expect("read"), before);
}

#[test]
fn delete_rewrites_the_document() {
    let sb = Sandbox::new();
    let deleted = sb.json(&[
        "delete",
        "vnf-ver-1",
        "--filter",
        "generic-vnf.vnf-id=vnf-1",
        "--resource-version",
        "10",
    ]);
    assert_eq!(deleted.as_object().map(serde_json::Map::len), Some(2));

    sb.walk()
        .args(["query", "--model-version-id", "vnf-ver-1", "--filter", "generic-vnf.vnf-id=vnf-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn stale_resource_version_fails() {
    let sb = Sandbox::new();
    sb.walk()
        .args([
            "delete",
            "vnf-ver-1",
            "--filter",
            "generic-vnf.vnf-id=vnf-1",
            "--resource-version",
            "9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resource-version mismatch"));
}

#[test]
fn malformed_filter_is_rejected_by_the_parser() {
    let sb = Sandbox::new();
    sb.walk()
        .args(["query", "--model-version-id", "vnf-ver-1", "--filter", "vnf-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn config_file_and_overrides_are_reported() {
    let sb = Sandbox::new();
    let file = sb.dir.path().join("engine.json");
    std::fs::write(&file, r#"{"max_result_sets": 3}"#).expect("write config");
    let cfg = sb.json(&["--config", file.to_str().expect("utf-8"), "--max-levels", "12", "config"]);
    assert_eq!(cfg["max_result_sets"], 3);
    assert_eq!(cfg["max_levels"], 12);
}

#[test]
fn config_save_persists_to_the_platform_store() {
    let sb = Sandbox::new();
    sb.json(&["--timeout-secs", "4", "config", "--save"]);
    let cfg = sb.json(&["config"]);
    assert_eq!(cfg["query_timeout_secs"], 4);
}
