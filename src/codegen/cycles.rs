//! Recursive Reference Detection
//!
//! A struct holding itself by value (directly or through other structs) has
//! infinite size. Fields whose type points back into their own strongly
//! connected component are marked `boxed`. `Vec` and `HashMap` fields already
//! add indirection and never create such edges.
//!
//! Derivation cycles (`A derived_from B derived_from A`) cannot be fixed by
//! boxing a flattened parent and are only reported.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;

use crate::model::DataType;

/// Mark fields that need a `Box`. Returns the number of fields marked.
pub fn mark_recursive_fields(records: &mut [DataType]) -> usize {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(records.len(), records.len() * 2);
    let mut by_name: HashMap<String, NodeIndex> = HashMap::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let node = graph.add_node(idx);
        by_name.entry(record.name.clone()).or_insert(node);
    }

    for (idx, record) in records.iter().enumerate() {
        let from = NodeIndex::new(idx);
        for field in &record.fields {
            if let Some(&to) = by_name.get(field.type_name.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
        if let Some(&to) = by_name.get(record.derived_from.as_str()) {
            graph.add_edge(from, to, ());
        }
    }

    let mut marked = 0;
    for scc in kosaraju_scc(&graph) {
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let recursive = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
        if !recursive {
            continue;
        }
        let names = {
            let mut names: Vec<&str> =
                scc.iter().map(|n| records[graph[*n]].name.as_str()).collect();
            names.sort_unstable();
            names.join(", ")
        };

        for node in &scc {
            let record_idx = graph[*node];
            if derives_from_itself(records, &by_name, record_idx) {
                warn!(
                    data_type = %records[record_idx].fqdtn,
                    cycle = %names,
                    "Derivation cycle, generated code will not compile"
                );
            }
            for field in &mut records[record_idx].fields {
                let closes_cycle = by_name
                    .get(field.type_name.as_str())
                    .is_some_and(|n| members.contains(n));
                if closes_cycle && !field.boxed {
                    field.boxed = true;
                    marked += 1;
                }
            }
        }
    }
    marked
}

/// Whether following `derived_from` links from `start` leads back to it
fn derives_from_itself(
    records: &[DataType],
    by_name: &HashMap<String, NodeIndex>,
    start: usize,
) -> bool {
    let mut current = start;
    for _ in 0..records.len() {
        match by_name.get(records[current].derived_from.as_str()) {
            Some(parent) if parent.index() == start => return true,
            Some(parent) => current = parent.index(),
            None => return false,
        }
    }
    false
}
