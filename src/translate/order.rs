//! Order resolution. Each request sort path is an alias chain plus a
//! terminal field, optionally followed by a direction token. Paths that do
//! not fit that shape fall back to a literal root-entity column so the
//! store can report them like any other unknown column.

use crate::schema::{EntityDef, RelationDef, SchemaGraph};

/// One rendered sort key, in request order.
#[derive(Debug, Clone)]
pub struct SortKey {
    /// Relation hops to the entity owning `field`; empty for root columns.
    pub chain: Vec<&'static RelationDef>,
    pub field: String,
    pub ascending: bool,
}

/// Resolve request sort paths against the graph, rooted at `start`.
/// Infallible: unresolvable paths become literal root columns and surface
/// as unknown-column errors when rendered.
pub fn resolve(
    graph: &SchemaGraph,
    start: &'static EntityDef,
    paths: &[Vec<String>],
) -> Vec<SortKey> {
    paths
        .iter()
        .map(|path| resolve_path(graph, start, path))
        .collect()
}

fn resolve_path(graph: &SchemaGraph, start: &'static EntityDef, path: &[String]) -> SortKey {
    let (ascending, segments) = split_direction(path);
    let (chain, _, tail) = graph.resolve_prefix(start, &segments);
    if tail.len() == 1 {
        return SortKey {
            chain,
            field: tail[0].to_string(),
            ascending,
        };
    }
    // No single terminal field after the alias prefix. Rejoin everything
    // and let the store treat it as a root column.
    SortKey {
        chain: Vec::new(),
        field: segments.join("."),
        ascending,
    }
}

/// Peel a trailing `asc`/`desc` token, case-insensitive. Ascending when
/// absent.
fn split_direction(path: &[String]) -> (bool, Vec<&str>) {
    match path.split_last() {
        Some((last, rest)) if last.eq_ignore_ascii_case("asc") => {
            (true, rest.iter().map(String::as_str).collect())
        }
        Some((last, rest)) if last.eq_ignore_ascii_case("desc") => {
            (false, rest.iter().map(String::as_str).collect())
        }
        _ => (true, path.iter().map(String::as_str).collect()),
    }
}
