//! fiscus — schema-driven query translation for a personal-finance
//! backend.
//!
//! A static association graph describes twenty record types and their
//! reciprocal relations. Requests arrive as a declarative JSON shape
//! (filter, include, order, pagination); the translators turn that shape
//! into typed plans, and a [`Store`] adapter renders the plans as
//! parameterized SQL. Four generic operations (create, read, update,
//! delete) cover every entity, and the [`router::Router`] binds them to a
//! declarative route table.
//!
//! ```no_run
//! use fiscus::{Engine, QuerySpec, SqliteStore};
//!
//! # async fn demo() -> Result<(), fiscus::Error> {
//! let store = SqliteStore::new_memory().await?;
//! store.init_schema().await?;
//! let engine = Engine::new(store)?;
//!
//! let banks = engine.entity("BankMaster")?;
//! let spec: QuerySpec = serde_json::from_value(serde_json::json!({
//!     "filter": { "name": { "eq": "ABC" } },
//!     "include": ["expenses"],
//!     "order": [["name", "asc"]],
//! }))
//! .map_err(|e| fiscus::Error::BadRequest(e.to_string()))?;
//! let rows = engine.read(banks, spec).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ops;
pub mod query;
pub mod router;
pub mod schema;
pub mod store;
pub mod translate;

use std::sync::Arc;

pub use crate::error::Error;
pub use crate::query::{IncludeOptions, IncludeSpec, QuerySpec};
pub use crate::router::{Route, RouteOptions, Router};
pub use crate::schema::{EntityDef, SchemaGraph};
pub use crate::store::{Record, SelectPlan, SqliteStore, Store};

/// Operation facade: the association graph plus a persistence adapter.
/// Cheap to clone; both halves are shared and read-only.
#[derive(Clone)]
pub struct Engine {
    graph: Arc<SchemaGraph>,
    store: Arc<dyn Store>,
}

impl Engine {
    /// Build over the stock registry graph.
    pub fn new<S: Store>(store: S) -> Result<Self, Error> {
        Ok(Self {
            graph: Arc::new(SchemaGraph::standard()?),
            store: Arc::new(store),
        })
    }

    pub fn with_graph(graph: SchemaGraph, store: Arc<dyn Store>) -> Self {
        Self {
            graph: Arc::new(graph),
            store,
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Look an entity up by registry name.
    pub fn entity(&self, name: &str) -> Result<&'static EntityDef, Error> {
        self.graph
            .entity(name)
            .ok_or_else(|| Error::UnknownPath(format!("unknown entity `{name}`")))
    }
}
