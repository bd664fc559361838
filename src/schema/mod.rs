//! Static schema: entity declarations, relation metadata, and the
//! association graph used to resolve traversal paths.

pub mod graph;
pub mod registry;

pub use graph::{Resolution, SchemaGraph};

/// Scalar type of an entity field. Dates travel as `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    Text,
    Boolean,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Parent exposes a collection of children keyed by a foreign field on
    /// the child.
    HasMany,
    /// Child exposes a single parent via a foreign field it owns.
    BelongsTo,
}

/// A directed edge of the association graph, addressed by `alias` in
/// traversal paths.
pub struct RelationDef {
    pub alias: &'static str,
    pub kind: RelationKind,
    pub target: &'static EntityDef,
    pub foreign_key: &'static str,
}

impl RelationDef {
    pub const fn has_many(
        alias: &'static str,
        target: &'static EntityDef,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            alias,
            kind: RelationKind::HasMany,
            target,
            foreign_key,
        }
    }

    pub const fn belongs_to(
        alias: &'static str,
        target: &'static EntityDef,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            alias,
            kind: RelationKind::BelongsTo,
            target,
            foreign_key,
        }
    }
}

// The graph is cyclic (reciprocal pairs), so Debug prints the target by name.
impl std::fmt::Debug for RelationDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationDef")
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .field("target", &self.target.name)
            .field("foreign_key", &self.foreign_key)
            .finish()
    }
}

/// A record type: typed fields plus its outgoing relations. The identity
/// field `_id` is implicit on every entity and managed by the store, as are
/// the `createdAt`/`updatedAt` stamps when `timestamps` is set.
#[derive(Debug)]
pub struct EntityDef {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub relations: &'static [RelationDef],
    pub timestamps: bool,
}

/// Identity column, auto-assigned, immutable after creation.
pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

impl EntityDef {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation(&self, alias: &str) -> Option<&'static RelationDef> {
        self.relations.iter().find(|r| r.alias == alias)
    }

    /// True for every column present on the physical table, system columns
    /// included.
    pub fn has_column(&self, name: &str) -> bool {
        name == ID_FIELD
            || (self.timestamps && (name == CREATED_AT_FIELD || name == UPDATED_AT_FIELD))
            || self.field(name).is_some()
    }

    pub fn is_system_field(name: &str) -> bool {
        name == ID_FIELD || name == CREATED_AT_FIELD || name == UPDATED_AT_FIELD
    }
}
