//! Persistence boundary. The engine hands fully translated plans to a
//! [`Store`]; the store renders them into parameterized statements and
//! returns JSON-shaped records. One SQLite implementation is provided.

pub mod sqlite;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::schema::EntityDef;
use crate::translate::{AttachNode, Predicate, SortKey};

pub use sqlite::SqliteStore;

/// One row, keyed by column name. Attached relations appear under their
/// alias as a nested object (belongs-to) or array (has-many).
pub type Record = Map<String, Value>;

/// Everything the read operation translated out of a QuerySpec.
#[derive(Debug, Clone, Default)]
pub struct SelectPlan {
    pub predicate: Option<Predicate>,
    /// Projection for the root rows. `None` returns every column.
    pub attributes: Option<Vec<String>>,
    pub attachments: Vec<AttachNode>,
    pub sort: Vec<SortKey>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Async persistence adapter. Each method is one logical round trip; the
/// adapter owns statement atomicity.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Insert every row in one statement and return the created records
    /// with system fields assigned. All-or-nothing.
    async fn insert_many(
        &self,
        entity: &'static EntityDef,
        rows: Vec<Record>,
    ) -> Result<Vec<Record>, Error>;

    /// Execute a select plan: filter, sort, paginate, then attach related
    /// rows per the attachment plan.
    async fn select(
        &self,
        entity: &'static EntityDef,
        plan: SelectPlan,
    ) -> Result<Vec<Record>, Error>;

    /// Apply `changes` to every row matching `predicate`. Returns the
    /// affected-row count.
    async fn update_where(
        &self,
        entity: &'static EntityDef,
        changes: Record,
        predicate: Option<Predicate>,
    ) -> Result<u64, Error>;

    /// Delete every row matching `predicate`. Returns the affected-row
    /// count; zero matches is not an error.
    async fn delete_where(
        &self,
        entity: &'static EntityDef,
        predicate: Option<Predicate>,
    ) -> Result<u64, Error>;
}
