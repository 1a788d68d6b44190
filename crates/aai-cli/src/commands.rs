// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand execution. Every command prints one JSON document.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use aai_app_core::EngineConfig;
use aai_graph::{GraphDocument, LoadedGraph, MODEL_VERSION_ID};
use aai_traversal::vocab::MODEL_VER;
use aai_traversal::{
    run_delete_by_model, DeleteRequest, Engine, ModelQuery, ModelSelector, NamedQueryRequest,
    TimedQueryService,
};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Command, ModelArgs};
use crate::settings;

/// Runs `cli`, writing the JSON result to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = settings::resolve(&cli.settings)?;
    match cli.command {
        Command::Config { save } => {
            if save {
                settings::save(&config)?;
                info!("engine settings saved");
            }
            emit(out, &config)
        }
        Command::Topology { model_version_id } => {
            let graph = load(&cli.graph)?;
            let engine = engine(&graph, &config);
            let ver = engine.node_using_unique_id(MODEL_VER, MODEL_VERSION_ID, &model_version_id)?;
            emit(out, &engine.compile_topology(ver)?)
        }
        Command::DeleteKeys { model_version_id } => {
            let graph = load(&cli.graph)?;
            let engine = engine(&graph, &config);
            let ver = engine.node_using_unique_id(MODEL_VER, MODEL_VERSION_ID, &model_version_id)?;
            emit(out, &engine.resolve_delete_keys(ver)?)
        }
        Command::Query {
            model,
            top_node_type,
            filters,
        } => {
            let service = timed(load(&cli.graph)?, config)?;
            let results = service.query_by_model(ModelQuery {
                selector: selector(model),
                top_node_type,
                start_filters: filters,
            })?;
            emit(out, &results)
        }
        Command::NamedQuery {
            uuid,
            filters,
            cut_point,
            secondary,
        } => {
            let service = timed(load(&cli.graph)?, config)?;
            let results = service.query_by_named_query(NamedQueryRequest {
                named_query_uuid: uuid,
                start_filters: filters,
                secondary_filter_cut_point: cut_point,
                secondary_filters: secondary.unwrap_or_default(),
            })?;
            emit(out, &results)
        }
        Command::Delete {
            model_version_id,
            filter,
            resource_version,
            top_node_type,
            dry_run,
            out: target,
        } => {
            let request = DeleteRequest {
                model_version_id,
                top_node_type,
                start_filter: filter,
                resource_version,
            };
            let mut graph = load(&cli.graph)?;
            if dry_run {
                let plan = engine(&graph, &config).plan_delete_by_model(&request)?;
                let planned: BTreeMap<_, _> = plan
                    .steps()
                    .iter()
                    .map(|s| (s.vertex, s.description.as_str()))
                    .collect();
                return emit(out, &planned);
            }
            let deleted = run_delete_by_model(
                &mut graph.store,
                &graph.schema,
                &graph.edge_rules,
                &config,
                &request,
            )?;
            let target = target.as_deref().unwrap_or(&cli.graph);
            GraphDocument::capture(&graph.store, &graph.schema, &graph.edge_rules)
                .write_to(target)
                .with_context(|| format!("write {}", target.display()))?;
            info!(deleted = deleted.len(), path = %target.display(), "graph document updated");
            emit(out, &deleted)
        }
    }
}

fn load(path: &Path) -> Result<LoadedGraph> {
    let graph = GraphDocument::from_path(path)
        .with_context(|| format!("read graph document {}", path.display()))?
        .load()
        .with_context(|| format!("load graph document {}", path.display()))?;
    info!(
        path = %path.display(),
        vertices = graph.store.vertex_count(),
        edges = graph.store.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

fn engine<'g>(graph: &'g LoadedGraph, config: &EngineConfig) -> Engine<'g> {
    Engine::new(&graph.store, &graph.schema, &graph.edge_rules).with_config(config.clone())
}

fn timed(graph: LoadedGraph, config: EngineConfig) -> Result<TimedQueryService> {
    Ok(TimedQueryService::new(
        Arc::new(graph.store),
        Arc::new(graph.schema),
        Arc::new(graph.edge_rules),
        config,
    )?)
}

fn selector(model: ModelArgs) -> ModelSelector {
    ModelSelector {
        model_version_id: model.model_version_id,
        model_invariant_id: model.model_invariant_id,
        model_name: model.model_name,
    }
}

fn emit<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
