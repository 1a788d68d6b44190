// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Start-node resolution and query by model.

mod common;

use std::collections::BTreeMap;

use aai_app_core::EngineConfig;
use aai_traversal::{CollectPlan, ModelQuery, ModelSelector, ResultSet, TraversalError};
use common::{filter, trail_of, vnf_instance, vnf_model, vnf_root, World};

fn vnf_filter(id: &str) -> Vec<aai_traversal::FilterHash> {
    vec![filter("generic-vnf.vnf-id", id)]
}

fn node_types(rs: &ResultSet) -> Vec<String> {
    rs.post_order().iter().map(|n| n.node_type.clone()).collect()
}

#[test]
fn explicit_version_contradicting_the_stamp_is_rejected() {
    let mut world = World::new();
    let vnf = world.wver("generic-vnf");
    let mut defs = world.defs();
    let model = defs.model("resource", "vnf-inv", "abc", "vnf-model");
    defs.element(model.ver, vnf, "T");
    let xyz = defs.version(&model, "xyz", "vnf-model");
    defs.element(xyz, vnf, "T");
    let start = world.inv().add("generic-vnf", &[("vnf-id", "vnf-1")]);
    world.inv().stamp(start, "vnf-inv", "xyz");

    let err = world
        .engine()
        .resolve_start_nodes(&ModelSelector::by_version("abc"), &vnf_filter("vnf-1"), "generic-vnf")
        .unwrap_err();
    assert!(
        matches!(err, TraversalError::PersonaMismatch { vertex, .. } if vertex == start),
        "{err:?}"
    );
}

#[test]
fn explicit_invariant_contradicting_the_stamp_is_rejected() {
    let mut world = World::new();
    vnf_model(&mut world, "T");
    let start = world.inv().add("generic-vnf", &[("vnf-id", "vnf-1")]);
    world.inv().stamp(start, "other-inv", "vnf-ver-1");

    let err = world
        .engine()
        .resolve_start_nodes(
            &ModelSelector::by_invariant("vnf-inv"),
            &vnf_filter("vnf-1"),
            "generic-vnf",
        )
        .unwrap_err();
    assert!(matches!(err, TraversalError::PersonaMismatch { .. }), "{err:?}");
}

#[test]
fn model_name_selector_checks_the_stamped_version() {
    let mut world = World::new();
    vnf_model(&mut world, "T");
    let vnf = world.wver("generic-vnf");
    let mut defs = world.defs();
    let other = defs.model("resource", "other-inv", "other-ver", "other-model");
    defs.element(other.ver, vnf, "T");
    world
        .inv()
        .stamped("generic-vnf", &[("vnf-id", "vnf-1")], &other);

    let err = world
        .engine()
        .resolve_start_nodes(&ModelSelector::by_name("vnf-model"), &vnf_filter("vnf-1"), "generic-vnf")
        .unwrap_err();
    assert!(matches!(err, TraversalError::PersonaMismatch { .. }), "{err:?}");
}

#[test]
fn stamped_persona_picks_the_version_when_none_is_given() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let inst = vnf_instance(&mut world, &model.handle, "vnf-1", "east");

    let starts = world
        .engine()
        .resolve_start_nodes(&ModelSelector::default(), &vnf_filter("vnf-1"), "generic-vnf")
        .expect("resolves");
    assert_eq!(starts, BTreeMap::from([(inst.vnf, "vnf-ver-1".to_owned())]));
}

#[test]
fn unstamped_start_needs_an_explicit_version() {
    let mut world = World::new();
    vnf_model(&mut world, "T");
    let start = world.inv().add("generic-vnf", &[("vnf-id", "vnf-1")]);
    let engine = world.engine();

    for selector in [ModelSelector::default(), ModelSelector::by_invariant("vnf-inv")] {
        let err = engine
            .resolve_start_nodes(&selector, &vnf_filter("vnf-1"), "generic-vnf")
            .unwrap_err();
        assert!(matches!(err, TraversalError::BadInput(_)), "{selector:?}: {err:?}");
    }
    let starts = engine
        .resolve_start_nodes(&ModelSelector::by_version("vnf-ver-1"), &vnf_filter("vnf-1"), "generic-vnf")
        .expect("resolves");
    assert_eq!(starts.get(&start).map(String::as_str), Some("vnf-ver-1"));
}

#[test]
fn without_filters_every_stamped_instance_starts() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let vnf = world.wver("generic-vnf");
    let mut defs = world.defs();
    let ver2 = defs.version(&model.handle, "vnf-ver-2", "vnf-model");
    defs.element(ver2, vnf, "T");
    let one = vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    let two = world.inv().add("generic-vnf", &[("vnf-id", "vnf-2")]);
    world.inv().stamp(two, "vnf-inv", "vnf-ver-2");

    let engine = world.engine();
    let by_version = engine
        .resolve_start_nodes(&ModelSelector::by_version("vnf-ver-1"), &[], "generic-vnf")
        .expect("resolves");
    assert_eq!(by_version.keys().copied().collect::<Vec<_>>(), [one.vnf]);

    let by_invariant = engine
        .resolve_start_nodes(&ModelSelector::by_invariant("vnf-inv"), &[], "generic-vnf")
        .expect("resolves");
    assert_eq!(
        by_invariant,
        BTreeMap::from([
            (one.vnf, "vnf-ver-1".to_owned()),
            (two, "vnf-ver-2".to_owned()),
        ])
    );

    assert!(matches!(
        engine.resolve_start_nodes(&ModelSelector::default(), &[], "generic-vnf"),
        Err(TraversalError::BadInput(_))
    ));
}

#[test]
fn conflicting_identifiers_are_bad_input() {
    let mut world = World::new();
    vnf_model(&mut world, "T");
    let selector = ModelSelector {
        model_version_id: Some("vnf-ver-1".into()),
        model_name: Some("pserver".into()),
        ..ModelSelector::default()
    };
    assert!(matches!(
        world.engine().resolve_model_vers(&selector),
        Err(TraversalError::BadInput(_))
    ));
    assert!(matches!(
        world.engine().resolve_model_vers(&ModelSelector::by_version("nope")),
        Err(TraversalError::NotFound(_))
    ));
}

#[test]
fn top_widget_type_is_derived_and_checked() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let pserver = world.wver("pserver");
    let mut defs = world.defs();
    let odd = defs.version(&model.handle, "vnf-ver-odd", "vnf-model");
    defs.element(odd, pserver, "T");

    let engine = world.engine();
    let exact = ModelSelector::by_version("vnf-ver-1");
    assert_eq!(
        engine.model_ver_top_widget_type(&exact, None),
        Ok("generic-vnf".to_owned())
    );
    assert!(matches!(
        engine.model_ver_top_widget_type(&exact, Some("vserver")),
        Err(TraversalError::BadInput(_))
    ));
    assert!(matches!(
        engine.model_ver_top_widget_type(&ModelSelector::by_invariant("vnf-inv"), None),
        Err(TraversalError::Ambiguous(_))
    ));
}

#[test]
fn query_by_model_collects_the_whole_chain() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let inst = vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    vnf_instance(&mut world, &model.handle, "vnf-2", "west");

    let request = ModelQuery {
        selector: ModelSelector::by_version("vnf-ver-1"),
        start_filters: vnf_filter("vnf-1"),
        ..ModelQuery::default()
    };
    let results = world.engine().query_by_model(&request).expect("query runs");
    assert_eq!(results.len(), 1);
    let rs = &results[0];
    assert_eq!(rs.vertex, Some(inst.vnf));
    assert_eq!(rs.trail, vnf_root());
    assert_eq!(
        node_types(rs),
        ["cloud-region", "tenant", "vserver", "generic-vnf"]
    );
    let cr = rs.post_order()[0];
    assert_eq!(cr.vertex, Some(inst.cloud_region));
    assert_eq!(cr.trail, trail_of(&vnf_root(), &["vserver", "tenant", "cloud-region"]));
}

#[test]
fn type_and_filters_alone_are_enough() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let inst = vnf_instance(&mut world, &model.handle, "vnf-1", "east");

    let request = ModelQuery {
        top_node_type: Some("generic-vnf".into()),
        start_filters: vnf_filter("vnf-1"),
        ..ModelQuery::default()
    };
    let results = world.engine().query_by_model(&request).expect("query runs");
    assert_eq!(results[0].size(), 4);
    assert_eq!(results[0].vertex, Some(inst.vnf));

    let err = world
        .engine()
        .query_by_model(&ModelQuery {
            top_node_type: Some("generic-vnf".into()),
            ..ModelQuery::default()
        })
        .unwrap_err();
    assert!(matches!(err, TraversalError::BadInput(_)), "{err:?}");
}

#[test]
fn sub_model_children_must_carry_its_persona() {
    let mut world = World::new();
    let vnf = vnf_model(&mut world, "T");
    let (si, vnf_w) = (world.wver("service-instance"), world.wver("generic-vnf"));
    let mut defs = world.defs();
    let svc = defs.model("service", "svc-inv", "svc-ver-1", "svc-model");
    let top = defs.element(svc.ver, si, "T");
    defs.element(top, vnf.handle.ver, "T");
    let stranger = defs.model("resource", "stranger-inv", "stranger-ver", "stranger");
    defs.element(stranger.ver, vnf_w, "T");

    let member = vnf_instance(&mut world, &vnf.handle, "vnf-1", "east");
    let mut inv = world.inv();
    let service = inv.stamped("service-instance", &[("service-instance-id", "si-1")], &svc);
    let outsider = inv.stamped("generic-vnf", &[("vnf-id", "vnf-x")], &stranger);
    inv.link(service, member.vnf);
    inv.link(service, outsider);

    let request = ModelQuery {
        selector: ModelSelector::by_version("svc-ver-1"),
        start_filters: vec![filter("service-instance.service-instance-id", "si-1")],
        ..ModelQuery::default()
    };
    let results = world.engine().query_by_model(&request).expect("query runs");
    let children: Vec<_> = results[0].children.iter().map(|c| c.vertex).collect();
    assert_eq!(children, [Some(member.vnf)]);
    assert_eq!(results[0].size(), 5);
}

#[test]
fn parallel_edges_do_not_duplicate_children() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let inst = vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    world.inv().link(inst.vserver, inst.vnf);

    let request = ModelQuery {
        selector: ModelSelector::by_version("vnf-ver-1"),
        start_filters: vnf_filter("vnf-1"),
        ..ModelQuery::default()
    };
    let results = world.engine().query_by_model(&request).expect("query runs");
    assert_eq!(results[0].children.len(), 1);
}

#[test]
fn widget_query_returns_single_nodes() {
    let mut world = World::new();
    let host = world.inv().add("pserver", &[("hostname", "h1")]);
    let request = ModelQuery {
        selector: ModelSelector::by_version("pserver-widget-ver"),
        start_filters: vec![filter("pserver.hostname", "h1")],
        ..ModelQuery::default()
    };
    let results = world.engine().query_by_model(&request).expect("query runs");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].vertex, Some(host));
    assert!(results[0].children.is_empty());
    assert_eq!(results[0].trail.to_string(), "pserver");
}

#[test]
fn result_set_cap_is_enforced() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    vnf_instance(&mut world, &model.handle, "vnf-2", "west");

    let config = EngineConfig {
        max_result_sets: 1,
        ..EngineConfig::default()
    };
    let err = world
        .engine()
        .with_config(config)
        .query_by_model(&ModelQuery {
            selector: ModelSelector::by_version("vnf-ver-1"),
            ..ModelQuery::default()
        })
        .unwrap_err();
    assert_eq!(err, TraversalError::TooManyResultSets { found: 2, max: 1 });
    assert_eq!(err.code(), "AAI_6141");
}

#[test]
fn model_query_reads_from_json() {
    let json = r#"{
        "model_invariant_id": "vnf-inv",
        "start_filters": [{"generic-vnf.vnf-id": "vnf-1"}]
    }"#;
    let request: ModelQuery = serde_json::from_str(json).expect("parses");
    assert_eq!(request.selector, ModelSelector::by_invariant("vnf-inv"));
    assert_eq!(request.start_filters, vnf_filter("vnf-1"));
    assert!(request.top_node_type.is_none());
}

#[test]
fn collector_stops_at_the_level_ceiling() {
    let mut world = World::new();
    let model = vnf_model(&mut world, "T");
    let inst = vnf_instance(&mut world, &model.handle, "vnf-1", "east");
    let engine = world.engine();
    let topology = engine.compile_topology(model.handle.ver).expect("compiles");
    let root = engine.root_trail(model.handle.ver).expect("root trail");

    let shallow = engine.with_config(EngineConfig {
        max_levels: 3,
        ..EngineConfig::default()
    });
    let err = shallow
        .collect_instance_data(inst.vnf, &root, CollectPlan::new(&topology))
        .unwrap_err();
    assert_eq!(err, TraversalError::DepthExceeded { max: 3 });

    let tree = world
        .engine()
        .with_config(EngineConfig {
            max_levels: 4,
            ..EngineConfig::default()
        })
        .collect_instance_data(inst.vnf, &root, CollectPlan::new(&topology))
        .expect("four levels fit");
    assert_eq!(tree.post_order().len(), 4);
}
