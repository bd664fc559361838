//! Declarative operation routing. A static tree of groups and entity
//! leaves flattens into a dispatch table at startup; each leaf carries an
//! enable matrix over the four generic actions and may add entity-specific
//! extra actions. Misconfigured leaves abort construction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::Engine;
use crate::error::Error;
use crate::query::QuerySpec;
use crate::schema::{EntityDef, ID_FIELD, registry};
use crate::store::Record;

/// Which of the generic actions a route exposes. All enabled by default.
#[derive(Debug, Clone, Copy)]
pub struct RouteOptions {
    pub add: bool,
    pub get: bool,
    pub edit: bool,
    pub delete: bool,
}

impl RouteOptions {
    pub const ALL: Self = Self {
        add: true,
        get: true,
        edit: true,
        delete: true,
    };
    pub const NONE: Self = Self {
        add: false,
        get: false,
        edit: false,
        delete: false,
    };
    pub const READ_ONLY: Self = Self {
        get: true,
        ..Self::NONE
    };
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// A named handler supplementing the four generic actions on one route.
#[async_trait]
pub trait ExtraAction: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(
        &self,
        engine: &Engine,
        entity: &'static EntityDef,
        body: Value,
    ) -> Result<Value, Error>;
}

/// One node of the route tree: a group of nested routes, an entity leaf,
/// or both (an entity that also nests routes under its path).
pub struct Route {
    path: &'static str,
    entity: Option<&'static EntityDef>,
    options: RouteOptions,
    extras: Vec<Arc<dyn ExtraAction>>,
    children: Vec<Route>,
}

impl Route {
    pub fn group(path: &'static str, children: Vec<Route>) -> Self {
        Self {
            path,
            entity: None,
            options: RouteOptions::ALL,
            extras: Vec::new(),
            children,
        }
    }

    pub fn entity(path: &'static str, entity: &'static EntityDef) -> Self {
        Self {
            path,
            entity: Some(entity),
            options: RouteOptions::ALL,
            extras: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn extra(mut self, extra: Arc<dyn ExtraAction>) -> Self {
        self.extras.push(extra);
        self
    }
}

struct RouteTarget {
    entity: &'static EntityDef,
    options: RouteOptions,
    extras: Vec<Arc<dyn ExtraAction>>,
}

/// Flattened dispatch table, built once at startup.
pub struct Router {
    table: HashMap<String, RouteTarget>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("paths", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Result<Self, Error> {
        let mut table = HashMap::new();
        for route in routes {
            flatten("", route, &mut table)?;
        }
        Ok(Self { table })
    }

    /// The stock route table over the full registry.
    pub fn standard() -> Result<Self, Error> {
        Self::new(standard_routes())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Run `action` for the entity mounted at `path`. Unknown paths and
    /// disabled actions both report as `UnknownPath`.
    pub async fn dispatch(
        &self,
        engine: &Engine,
        path: &str,
        action: &str,
        body: Value,
    ) -> Result<Value, Error> {
        let target = self
            .table
            .get(path)
            .ok_or_else(|| Error::UnknownPath(format!("no route at `{path}`")))?;
        debug!(path, action, entity = target.entity.name, "dispatching");
        match action {
            "add" if target.options.add => {
                let docs = parse_docs(&body)?;
                let records = engine.create(target.entity, docs).await?;
                Ok(json!({ "docs": records }))
            }
            "get" if target.options.get => {
                let spec = parse_options(&body)?;
                let records = engine.read(target.entity, spec).await?;
                Ok(json!({ "docs": records }))
            }
            "edit" if target.options.edit => {
                let changes = parse_changes(&body)?;
                let filter = parse_filter(&body)?;
                let count = engine
                    .update(target.entity, changes, filter.as_ref())
                    .await?;
                Ok(json!({ "updatedRecords": count }))
            }
            "delete" if target.options.delete => {
                // A body without `options` is malformed, not a request to
                // clear the table; delete-all is spelled `filter: {}`.
                if body.get("options").is_none_or(Value::is_null) {
                    return Err(Error::BadRequest(
                        "missing `options` on delete".to_string(),
                    ));
                }
                let filter = parse_filter(&body)?;
                let count = engine.delete(target.entity, filter.as_ref()).await?;
                Ok(json!({ "deletedRecords": count }))
            }
            other => {
                if let Some(extra) = target.extras.iter().find(|e| e.name() == other) {
                    return extra.run(engine, target.entity, body).await;
                }
                Err(Error::UnknownPath(format!(
                    "no action `{action}` at `{path}`"
                )))
            }
        }
    }
}

fn flatten(
    prefix: &str,
    route: Route,
    table: &mut HashMap<String, RouteTarget>,
) -> Result<(), Error> {
    let Route {
        path,
        entity,
        options,
        extras,
        children,
    } = route;
    let full = if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    };
    if entity.is_none() && children.is_empty() {
        return Err(Error::Configuration(format!(
            "route `{full}` declares neither an entity nor nested routes"
        )));
    }
    if let Some(entity) = entity {
        let target = RouteTarget {
            entity,
            options,
            extras,
        };
        if table.insert(full.clone(), target).is_some() {
            return Err(Error::Configuration(format!("duplicate route `{full}`")));
        }
    }
    for child in children {
        flatten(&full, child, table)?;
    }
    Ok(())
}

// ── Request-body shapes ──────────────────────────────────────────────────

fn parse_docs(body: &Value) -> Result<Vec<Record>, Error> {
    let docs = body
        .get("docsToAdd")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::BadRequest("missing `docsToAdd`".to_string()))?;
    docs.iter()
        .map(|doc| {
            doc.as_object().cloned().ok_or_else(|| {
                Error::BadRequest("every `docsToAdd` entry must be an object".to_string())
            })
        })
        .collect()
}

fn parse_options(body: &Value) -> Result<QuerySpec, Error> {
    match body.get("options") {
        None | Some(Value::Null) => Ok(QuerySpec::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|err| Error::BadRequest(format!("malformed options: {err}"))),
    }
}

fn parse_changes(body: &Value) -> Result<Record, Error> {
    body.get("docToUpdate")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| Error::BadRequest("missing `docToUpdate`".to_string()))
}

fn parse_filter(body: &Value) -> Result<Option<Map<String, Value>>, Error> {
    match body.get("options").and_then(|o| o.get("filter")) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(Error::BadRequest(
            "`options.filter` must be an object".to_string(),
        )),
    }
}

// ── Extra actions ────────────────────────────────────────────────────────

/// Look up the calendar row for a `YYYY-MM-DD` date and answer its id.
pub struct GetDateId;

#[async_trait]
impl ExtraAction for GetDateId {
    fn name(&self) -> &'static str {
        "get-date-id"
    }

    async fn run(
        &self,
        engine: &Engine,
        entity: &'static EntityDef,
        body: Value,
    ) -> Result<Value, Error> {
        let date = body
            .get("dateToFind")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::BadRequest("missing `dateToFind`".to_string()))?;
        let mut filter = Map::new();
        filter.insert("date".to_string(), json!({ "eq": date }));
        let spec = QuerySpec::new().with_filter(filter).with_limit(1);
        let rows = engine.read(entity, spec).await?;
        let row = rows
            .first()
            .ok_or_else(|| Error::Persistence(format!("no calendar row for `{date}`")))?;
        Ok(json!({ "dateId": row.get(ID_FIELD) }))
    }
}

/// The stock tree: masters and transactions, mirroring the deployed
/// surface. The calendar is populated out of band, so its generic actions
/// are disabled under `masters/` and read-only under `transactions/`.
pub fn standard_routes() -> Vec<Route> {
    vec![
        Route::group(
            "masters",
            vec![
                Route::entity("calendar", &registry::CALENDAR_MASTER)
                    .options(RouteOptions::NONE)
                    .extra(Arc::new(GetDateId)),
                Route::group(
                    "assets",
                    vec![
                        Route::entity("categories", &registry::ASSET_CATEGORY_MASTER),
                        Route::entity("master", &registry::ASSET_MASTER),
                    ],
                ),
                Route::entity("banks", &registry::BANK_MASTER),
                Route::entity("credit-cards", &registry::CREDIT_CARD_MASTER),
                Route::entity("debit-cards", &registry::DEBIT_CARD_MASTER),
                Route::entity("emi", &registry::EMI_MASTER),
                Route::group(
                    "expenses",
                    vec![
                        Route::entity("categories", &registry::EXPENSE_CATEGORY_MASTER),
                        Route::entity("master", &registry::EXPENSE_MASTER),
                    ],
                ),
                Route::group(
                    "incomes",
                    vec![
                        Route::entity("categories", &registry::INCOME_CATEGORY_MASTER),
                        Route::entity("master", &registry::INCOME_MASTER),
                    ],
                ),
                Route::entity("insurances", &registry::INSURANCE_MASTER),
                Route::group(
                    "investments",
                    vec![
                        Route::entity("categories", &registry::INVESTMENT_CATEGORY_MASTER),
                        Route::entity("master", &registry::INVESTMENT_MASTER),
                    ],
                ),
            ],
        ),
        Route::group(
            "transactions",
            vec![
                Route::entity("calendar", &registry::CALENDAR_MASTER)
                    .options(RouteOptions::READ_ONLY),
                Route::entity("expenses", &registry::EXPENSES),
                Route::entity("incomes", &registry::INCOMES),
                Route::entity("investments", &registry::INVESTMENTS),
                Route::entity("market-data", &registry::MARKET_DATA),
                Route::entity("opening-balances", &registry::OPENING_BALANCES),
            ],
        ),
    ]
}
