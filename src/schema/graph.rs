use std::collections::HashMap;

use crate::error::Error;
use crate::schema::{EntityDef, RelationDef, RelationKind, registry};

/// Outcome of resolving a traversal path against the graph.
#[derive(Debug)]
pub enum Resolution {
    /// Every segment named a relation; `chain` has one link per segment.
    Found {
        target: &'static EntityDef,
        chain: Vec<&'static RelationDef>,
    },
    /// The first segment is not a relation alias. Callers that support it
    /// treat the whole path as a literal field name.
    Literal,
    /// One or more segments matched, then `segment` did not.
    Unknown { segment: String },
}

/// Immutable association graph over the entity declarations. Built once at
/// startup; `resolve` walks alias chains relative to a starting entity.
pub struct SchemaGraph {
    entities: HashMap<&'static str, &'static EntityDef>,
}

impl SchemaGraph {
    /// Build and validate a graph. Duplicate aliases, dangling foreign keys,
    /// and relation pairs without a reciprocal are configuration errors.
    pub fn new(entities: &[&'static EntityDef]) -> Result<Self, Error> {
        let mut map: HashMap<&'static str, &'static EntityDef> = HashMap::new();
        for entity in entities {
            if map.insert(entity.name, entity).is_some() {
                return Err(Error::Configuration(format!(
                    "duplicate entity `{}`",
                    entity.name
                )));
            }
        }

        let graph = Self { entities: map };
        for entity in graph.entities.values() {
            graph.validate_entity(entity)?;
        }
        Ok(graph)
    }

    /// The stock graph over the full entity registry.
    pub fn standard() -> Result<Self, Error> {
        Self::new(registry::ENTITIES)
    }

    fn validate_entity(&self, entity: &'static EntityDef) -> Result<(), Error> {
        for (idx, relation) in entity.relations.iter().enumerate() {
            if entity.relations[..idx]
                .iter()
                .any(|r| r.alias == relation.alias)
            {
                return Err(Error::Configuration(format!(
                    "entity `{}` declares alias `{}` twice",
                    entity.name, relation.alias
                )));
            }

            if !self.entities.contains_key(relation.target.name) {
                return Err(Error::Configuration(format!(
                    "relation `{}.{}` targets unregistered entity `{}`",
                    entity.name, relation.alias, relation.target.name
                )));
            }

            // The foreign key lives on the "many"/owning side.
            let owning = match relation.kind {
                RelationKind::HasMany => relation.target,
                RelationKind::BelongsTo => entity,
            };
            if owning.field(relation.foreign_key).is_none() {
                return Err(Error::Configuration(format!(
                    "relation `{}.{}` names foreign key `{}` missing on `{}`",
                    entity.name, relation.alias, relation.foreign_key, owning.name
                )));
            }

            let reciprocal_kind = match relation.kind {
                RelationKind::HasMany => RelationKind::BelongsTo,
                RelationKind::BelongsTo => RelationKind::HasMany,
            };
            let has_reciprocal = relation.target.relations.iter().any(|r| {
                r.kind == reciprocal_kind
                    && r.foreign_key == relation.foreign_key
                    && std::ptr::eq(r.target, entity)
            });
            if !has_reciprocal {
                return Err(Error::Configuration(format!(
                    "relation `{}.{}` has no reciprocal on `{}` for key `{}`",
                    entity.name, relation.alias, relation.target.name, relation.foreign_key
                )));
            }
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<&'static EntityDef> {
        self.entities.get(name).copied()
    }

    /// Resolve `segments` as an alias chain starting from `start`.
    pub fn resolve(&self, start: &'static EntityDef, segments: &[&str]) -> Resolution {
        let mut current = start;
        let mut chain = Vec::with_capacity(segments.len());
        for (idx, segment) in segments.iter().enumerate() {
            match current.relation(segment) {
                Some(relation) => {
                    chain.push(relation);
                    current = relation.target;
                }
                None if idx == 0 => return Resolution::Literal,
                None => {
                    return Resolution::Unknown {
                        segment: (*segment).to_string(),
                    };
                }
            }
        }
        Resolution::Found {
            target: current,
            chain,
        }
    }

    /// Greedily resolve the longest alias-chain prefix of `segments`.
    /// Returns the chain, the entity it lands on, and the unmatched tail.
    pub fn resolve_prefix<'a>(
        &self,
        start: &'static EntityDef,
        segments: &'a [&'a str],
    ) -> (Vec<&'static RelationDef>, &'static EntityDef, &'a [&'a str]) {
        let mut current = start;
        let mut chain = Vec::new();
        let mut consumed = 0;
        for segment in segments {
            match current.relation(segment) {
                Some(relation) => {
                    chain.push(relation);
                    current = relation.target;
                    consumed += 1;
                }
                None => break,
            }
        }
        (chain, current, &segments[consumed..])
    }
}
