// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::collections::BTreeMap;

use aai_dry_tests::{
    inventory_edge_rules, inventory_schema, DefinitionBuilder, Inventory, ModelHandle, WidgetModel,
};
use aai_graph::{EdgeRuleSet, GraphStore, StaticSchema, VertexId};
use aai_traversal::{Engine, FilterHash, Persona, StepKey, Trail};

/// Node types that get a widget model in every world.
pub const WIDGETS: &[&str] = &[
    "service-instance",
    "generic-vnf",
    "vf-module",
    "vserver",
    "tenant",
    "cloud-region",
    "complex",
    "pserver",
    "p-interface",
    "l-interface",
];

/// Store, schema, edge rules and the widget models.
pub struct World {
    pub store: GraphStore,
    pub schema: StaticSchema,
    pub rules: EdgeRuleSet,
    pub widgets: BTreeMap<&'static str, WidgetModel>,
}

impl World {
    pub fn new() -> Self {
        let mut store = GraphStore::new();
        let mut widgets = BTreeMap::new();
        for ty in WIDGETS {
            widgets.insert(*ty, DefinitionBuilder::new(&mut store).widget(ty));
        }
        Self {
            store,
            schema: inventory_schema(),
            rules: inventory_edge_rules(),
            widgets,
        }
    }

    pub fn widget(&self, node_type: &str) -> WidgetModel {
        self.widgets
            .get(node_type)
            .cloned()
            .unwrap_or_else(|| panic!("no widget for {node_type}"))
    }

    pub fn wver(&self, node_type: &str) -> VertexId {
        self.widget(node_type).ver
    }

    pub fn defs(&mut self) -> DefinitionBuilder<'_> {
        DefinitionBuilder::new(&mut self.store)
    }

    pub fn inv(&mut self) -> Inventory<'_> {
        Inventory::new(&mut self.store)
    }

    pub fn engine(&self) -> Engine<'_> {
        Engine::new(&self.store, &self.schema, &self.rules)
    }
}

/// vnf(T) → vserver(T) → tenant(F) → cloud-region(F).
pub struct VnfModel {
    pub handle: ModelHandle,
    pub top: VertexId,
    pub vserver: VertexId,
    pub tenant: VertexId,
    pub cloud_region: VertexId,
}

pub fn vnf_model(world: &mut World, top_flag: &str) -> VnfModel {
    let (vnf, vs, tenant, cr) = (
        world.wver("generic-vnf"),
        world.wver("vserver"),
        world.wver("tenant"),
        world.wver("cloud-region"),
    );
    let mut defs = world.defs();
    let handle = defs.model("resource", "vnf-inv", "vnf-ver-1", "vnf-model");
    let top = defs.element(handle.ver, vnf, top_flag);
    let vserver = defs.element(top, vs, "T");
    let tenant = defs.element(vserver, tenant, "F");
    let cloud_region = defs.element(tenant, cr, "F");
    VnfModel {
        handle,
        top,
        vserver,
        tenant,
        cloud_region,
    }
}

/// One live vnf with a vserver, tenant and cloud-region.
pub struct VnfInstance {
    pub vnf: VertexId,
    pub vserver: VertexId,
    pub tenant: VertexId,
    pub cloud_region: VertexId,
}

pub fn vnf_instance(world: &mut World, model: &ModelHandle, vnf_id: &str, region: &str) -> VnfInstance {
    let (vs_id, tenant_id) = (format!("{vnf_id}-vs"), format!("{vnf_id}-t"));
    let mut inv = world.inv();
    let vnf = inv.stamped(
        "generic-vnf",
        &[("vnf-id", vnf_id), ("vnf-name", vnf_id), ("resource-version", "10")],
        model,
    );
    let vserver = inv.add("vserver", &[("vserver-id", vs_id.as_str()), ("vserver-name", "vs")]);
    let tenant = inv.add("tenant", &[("tenant-id", tenant_id.as_str())]);
    let cloud_region = inv.add("cloud-region", &[("cloud-region-id", region), ("region-name", region)]);
    inv.relate(vnf, vserver);
    inv.link(tenant, vserver);
    inv.link(cloud_region, tenant);
    VnfInstance {
        vnf,
        vserver,
        tenant,
        cloud_region,
    }
}

pub fn vnf_root() -> Trail {
    Trail::root(StepKey::with_persona(
        "generic-vnf",
        Persona::new("vnf-inv", "vnf-ver-1"),
    ))
}

pub fn trail_of(root: &Trail, rest: &[&str]) -> Trail {
    rest.iter()
        .fold(root.clone(), |t, ty| t.child(StepKey::plain(*ty)))
}

pub fn filter(key: &str, value: &str) -> FilterHash {
    FilterHash::from([(key.to_owned(), value.to_owned())])
}
