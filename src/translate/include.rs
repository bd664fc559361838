//! Include resolution. Request include entries become a tree of
//! [`AttachNode`]s, one per relation hop. A dotted path expands into a
//! chain of single-hop nodes with the entry's projection and filter on the
//! deepest one. Paths that do not resolve keep their raw text and no
//! relation; the read operation refuses such plans before touching the
//! store.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::query::IncludeSpec;
use crate::schema::{EntityDef, RelationDef, Resolution, SchemaGraph};
use crate::translate::filter::{self, Predicate};

/// Hard ceiling on attach-plan nesting, counted in relation hops.
pub const MAX_INCLUDE_DEPTH: usize = 8;

/// One hop of the attachment plan.
#[derive(Debug, Clone)]
pub struct AttachNode {
    /// Key the attached rows appear under in the parent row. The raw
    /// request path when the relation did not resolve.
    pub alias: String,
    pub relation: Option<&'static RelationDef>,
    /// Projection for the attached rows. `None` keeps every column.
    pub attributes: Option<Vec<String>>,
    /// Constrains which related rows attach; never the parent result set.
    pub predicate: Option<Predicate>,
    pub children: Vec<AttachNode>,
}

/// Resolve a request include list against the graph, rooted at `start`.
pub fn resolve(
    graph: &SchemaGraph,
    start: &'static EntityDef,
    specs: &[IncludeSpec],
) -> Result<Vec<AttachNode>, Error> {
    resolve_level(graph, start, specs, 1)
}

fn resolve_level(
    graph: &SchemaGraph,
    start: &'static EntityDef,
    specs: &[IncludeSpec],
    depth: usize,
) -> Result<Vec<AttachNode>, Error> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(Error::BadRequest(format!(
            "include nesting exceeds {MAX_INCLUDE_DEPTH} levels"
        )));
    }
    specs
        .iter()
        .map(|spec| resolve_spec(graph, start, spec, depth))
        .collect()
}

fn resolve_spec(
    graph: &SchemaGraph,
    start: &'static EntityDef,
    spec: &IncludeSpec,
    depth: usize,
) -> Result<AttachNode, Error> {
    let (path, attributes, request_filter, nested) = match spec {
        IncludeSpec::Path(path) => (path.as_str(), None, None, None),
        IncludeSpec::Options(opts) => (
            opts.model.as_str(),
            opts.attributes.clone(),
            opts.filter.as_ref(),
            opts.include.as_deref(),
        ),
    };

    let segments: Vec<&str> = path.split('.').collect();
    match graph.resolve(start, &segments) {
        Resolution::Found { target, chain } => {
            if depth + chain.len() - 1 > MAX_INCLUDE_DEPTH {
                return Err(Error::BadRequest(format!(
                    "include nesting exceeds {MAX_INCLUDE_DEPTH} levels"
                )));
            }
            let children = match nested {
                Some(specs) => resolve_level(graph, target, specs, depth + chain.len())?,
                None => Vec::new(),
            };

            // Deepest hop carries the entry's own options; the hops above
            // it are bare pass-throughs.
            let mut links = chain.iter().rev();
            let deepest = links.next().ok_or_else(|| {
                Error::BadRequest(format!("include path `{path}` resolves to nothing"))
            })?;
            let mut node = AttachNode {
                alias: deepest.alias.to_string(),
                relation: Some(deepest),
                attributes,
                predicate: translate_filter(request_filter),
                children,
            };
            for link in links {
                node = AttachNode {
                    alias: link.alias.to_string(),
                    relation: Some(link),
                    attributes: None,
                    predicate: None,
                    children: vec![node],
                };
            }
            Ok(node)
        }
        Resolution::Literal | Resolution::Unknown { .. } => Ok(AttachNode {
            alias: path.to_string(),
            relation: None,
            attributes,
            predicate: translate_filter(request_filter),
            children: Vec::new(),
        }),
    }
}

fn translate_filter(request_filter: Option<&Map<String, Value>>) -> Option<Predicate> {
    request_filter.and_then(filter::translate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::IncludeOptions;
    use serde_json::json;

    fn graph() -> SchemaGraph {
        SchemaGraph::standard().unwrap()
    }

    fn options(value: serde_json::Value) -> IncludeSpec {
        IncludeSpec::Options(serde_json::from_value::<IncludeOptions>(value).unwrap())
    }

    #[test]
    fn test_bare_path_attaches_relation() {
        let graph = graph();
        let expenses = graph.entity("Expenses").unwrap();
        let plan = resolve(&graph, expenses, &[IncludeSpec::Path("bankRecord".into())]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].alias, "bankRecord");
        assert_eq!(plan[0].relation.unwrap().target.name, "BankMaster");
        assert!(plan[0].children.is_empty());
        assert!(plan[0].predicate.is_none());
    }

    #[test]
    fn test_dotted_path_expands_with_options_on_deepest() {
        let graph = graph();
        let expenses = graph.entity("Expenses").unwrap();
        let spec = options(json!({
            "model": "masterRecord.expenseCategory",
            "attributes": ["category"],
            "filter": { "category": "food" },
        }));
        let plan = resolve(&graph, expenses, &[spec]).unwrap();
        let top = &plan[0];
        assert_eq!(top.alias, "masterRecord");
        assert!(top.attributes.is_none());
        assert!(top.predicate.is_none());
        let deep = &top.children[0];
        assert_eq!(deep.alias, "expenseCategory");
        assert_eq!(deep.attributes.as_deref(), Some(&["category".to_string()][..]));
        assert!(deep.predicate.is_some());
        assert!(deep.children.is_empty());
    }

    #[test]
    fn test_nested_include_hangs_off_resolved_target() {
        let graph = graph();
        let banks = graph.entity("BankMaster").unwrap();
        let spec = options(json!({
            "model": "expenses",
            "include": ["calendarRecord"],
        }));
        let plan = resolve(&graph, banks, &[spec]).unwrap();
        assert_eq!(plan[0].alias, "expenses");
        assert_eq!(plan[0].children[0].alias, "calendarRecord");
        assert_eq!(
            plan[0].children[0].relation.unwrap().target.name,
            "CalendarMaster"
        );
    }

    #[test]
    fn test_unresolved_path_keeps_raw_alias_and_no_relation() {
        let graph = graph();
        let expenses = graph.entity("Expenses").unwrap();
        let plan = resolve(&graph, expenses, &[IncludeSpec::Path("warehouse".into())]).unwrap();
        assert_eq!(plan[0].alias, "warehouse");
        assert!(plan[0].relation.is_none());
    }

    #[test]
    fn test_depth_cap_rejects_long_chain() {
        let graph = graph();
        let expenses = graph.entity("Expenses").unwrap();
        // Nine hops by bouncing between a transaction and its calendar row.
        let path = "calendarRecord.expenses.calendarRecord.expenses.calendarRecord.\
                    expenses.calendarRecord.expenses.calendarRecord";
        let err = resolve(&graph, expenses, &[IncludeSpec::Path(path.into())]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)), "got {err:?}");
    }

    #[test]
    fn test_depth_cap_counts_nested_levels() {
        let graph = graph();
        let expenses = graph.entity("Expenses").unwrap();
        let mut spec = IncludeSpec::Path("calendarRecord".into());
        for hop in ["expenses", "calendarRecord"].iter().cycle().take(8) {
            spec = IncludeSpec::Options(IncludeOptions {
                model: (*hop).to_string(),
                attributes: None,
                filter: None,
                include: Some(vec![spec]),
            });
        }
        // 8 wrapping levels plus the innermost path is nine hops.
        let err = resolve(&graph, expenses, &[spec]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)), "got {err:?}");
    }
}
