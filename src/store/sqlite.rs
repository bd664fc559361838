//! SQLite store over sqlx. Plans arrive fully translated; this module
//! renders them into SQL with validated identifiers and `?` placeholders,
//! binding every operand in clause order. One physical table per entity,
//! created by [`SqliteStore::init_schema`].

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{
    Row, Sqlite,
    sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::error::Error;
use crate::schema::{
    CREATED_AT_FIELD, EntityDef, FieldKind, ID_FIELD, RelationDef, RelationKind, UPDATED_AT_FIELD,
    registry,
};
use crate::store::{Record, SelectPlan, Store};
use crate::translate::{AttachNode, CompareOp, LogicalOp, Operand, Predicate};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

fn storage(err: sqlx::Error) -> Error {
    Error::Persistence(err.to_string())
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// File-backed database.
    pub async fn new_file(path: &str) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}?mode=rwc", path))
            .await
            .map_err(storage)?;
        Ok(Self { pool })
    }

    /// In-memory database. A single connection keeps the database alive.
    pub async fn new_memory() -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create every registry table and its foreign-key indexes in one
    /// transaction. Idempotent.
    pub async fn init_schema(&self) -> Result<(), Error> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        for entity in registry::ENTITIES {
            sqlx::query(&create_table_sql(entity))
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
            for key in foreign_key_columns(entity) {
                sqlx::query(&format!(
                    r#"CREATE INDEX IF NOT EXISTS "idx_{table}_{key}" ON "{table}"("{key}")"#,
                    table = entity.table,
                ))
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
            }
        }
        tx.commit().await.map_err(storage)
    }

    async fn fetch_attached(
        &self,
        entity: &'static EntityDef,
        key_column: &str,
        keys: &[i64],
        node: &AttachNode,
    ) -> Result<Vec<Record>, Error> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        let mut binds: Vec<Value> = keys.iter().map(|k| Value::from(*k)).collect();
        let mut sql = format!(
            r#"SELECT * FROM "{}" WHERE "{}" IN ({})"#,
            entity.table, key_column, placeholders
        );
        if let Some(predicate) = &node.predicate {
            let clause = render_predicate(entity, "", predicate, &mut binds)?;
            sql.push_str(" AND (");
            sql.push_str(&clause);
            sql.push(')');
        }
        sql.push_str(&format!(r#" ORDER BY "{}""#, ID_FIELD));

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value)?;
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage)?;
        rows.iter().map(|row| record_from_row(entity, row)).collect()
    }

    /// Attach one plan node to `rows`, recursing into its children before
    /// the node's projection is applied. Recursion is boxed; depth is
    /// bounded upstream by the include resolver.
    fn attach<'a>(
        &'a self,
        parent: &'static EntityDef,
        rows: &'a mut Vec<Record>,
        node: &'a AttachNode,
    ) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
        Box::pin(async move {
            let relation = node.relation.ok_or_else(|| {
                Error::Persistence(format!(
                    "include path `{}` does not name a relation of `{}`",
                    node.alias, parent.name
                ))
            })?;
            let child = relation.target;
            let nested_aliases: Vec<&str> =
                node.children.iter().map(|n| n.alias.as_str()).collect();

            match relation.kind {
                RelationKind::BelongsTo => {
                    let keys = distinct_keys(rows, relation.foreign_key);
                    let mut attached =
                        self.fetch_attached(child, ID_FIELD, &keys, node).await?;
                    for nested in &node.children {
                        self.attach(child, &mut attached, nested).await?;
                    }
                    let mut by_id: HashMap<i64, Record> = HashMap::with_capacity(attached.len());
                    for record in attached {
                        if let Some(id) = record.get(ID_FIELD).and_then(Value::as_i64) {
                            by_id.insert(id, record);
                        }
                    }
                    for row in rows.iter_mut() {
                        let value = row
                            .get(relation.foreign_key)
                            .and_then(Value::as_i64)
                            .and_then(|id| by_id.get(&id).cloned())
                            .map(|mut record| {
                                project(&mut record, node.attributes.as_deref(), &nested_aliases);
                                Value::Object(record)
                            })
                            .unwrap_or(Value::Null);
                        row.insert(node.alias.clone(), value);
                    }
                }
                RelationKind::HasMany => {
                    let keys = distinct_keys(rows, ID_FIELD);
                    let mut attached = self
                        .fetch_attached(child, relation.foreign_key, &keys, node)
                        .await?;
                    for nested in &node.children {
                        self.attach(child, &mut attached, nested).await?;
                    }
                    let mut by_parent: HashMap<i64, Vec<Record>> = HashMap::new();
                    for record in attached {
                        if let Some(key) =
                            record.get(relation.foreign_key).and_then(Value::as_i64)
                        {
                            by_parent.entry(key).or_default().push(record);
                        }
                    }
                    for row in rows.iter_mut() {
                        let group = row
                            .get(ID_FIELD)
                            .and_then(Value::as_i64)
                            .and_then(|id| by_parent.remove(&id))
                            .unwrap_or_default();
                        let items = group
                            .into_iter()
                            .map(|mut record| {
                                project(&mut record, node.attributes.as_deref(), &nested_aliases);
                                Value::Object(record)
                            })
                            .collect();
                        row.insert(node.alias.clone(), Value::Array(items));
                    }
                }
            }
            Ok(())
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_many(
        &self,
        entity: &'static EntityDef,
        rows: Vec<Record>,
    ) -> Result<Vec<Record>, Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut columns: Vec<&str> = entity.fields.iter().map(|f| f.name).collect();
        if entity.timestamps {
            columns.push(CREATED_AT_FIELD);
            columns.push(UPDATED_AT_FIELD);
        }
        let column_list = columns
            .iter()
            .map(|c| format!(r#""{c}""#))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
        let values_clause = vec![row_placeholders; rows.len()].join(", ");
        let sql = format!(
            r#"INSERT INTO "{}" ({}) VALUES {} RETURNING *"#,
            entity.table, column_list, values_clause
        );

        let now = Value::from(Utc::now().to_rfc3339());
        let mut binds = Vec::with_capacity(columns.len() * rows.len());
        for row in &rows {
            for field in entity.fields {
                binds.push(row.get(field.name).cloned().unwrap_or(Value::Null));
            }
            if entity.timestamps {
                binds.push(now.clone());
                binds.push(now.clone());
            }
        }

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value)?;
        }
        let created = query.fetch_all(&self.pool).await.map_err(storage)?;
        created
            .iter()
            .map(|row| record_from_row(entity, row))
            .collect()
    }

    async fn select(
        &self,
        entity: &'static EntityDef,
        plan: SelectPlan,
    ) -> Result<Vec<Record>, Error> {
        let mut binds: Vec<Value> = Vec::new();
        let mut joins: Vec<String> = Vec::new();
        let mut seen_chains: HashMap<String, String> = HashMap::new();

        // Sort chains render as LEFT JOINs, one alias per distinct prefix.
        // A has-many hop fans the root rows out, so those sorts collapse
        // back to one row per root id and order by the extreme child value
        // in the sort direction.
        let mut order_terms = Vec::with_capacity(plan.sort.len());
        let mut group_by_root = false;
        for key in &plan.sort {
            let (alias, owner) = push_join_chain(entity, &key.chain, &mut joins, &mut seen_chains);
            let column = column_ref(owner, &alias, &key.field)?;
            let direction = if key.ascending { "ASC" } else { "DESC" };
            let crosses_many = key
                .chain
                .iter()
                .any(|r| r.kind == RelationKind::HasMany);
            let term = if crosses_many {
                group_by_root = true;
                let aggregate = if key.ascending { "MIN" } else { "MAX" };
                format!("{aggregate}({column}) {direction}")
            } else {
                format!("{column} {direction}")
            };
            order_terms.push(term);
        }

        let mut sql = format!(r#"SELECT t.* FROM "{}" t"#, entity.table);
        for join in &joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let Some(predicate) = &plan.predicate {
            let clause = render_predicate(entity, "t", predicate, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        if group_by_root {
            sql.push_str(&format!(r#" GROUP BY t."{ID_FIELD}""#));
        }
        if !order_terms.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_terms.join(", "));
        }
        match (plan.limit, plan.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                binds.push(Value::from(limit));
                binds.push(Value::from(offset));
            }
            (Some(limit), None) => {
                sql.push_str(" LIMIT ?");
                binds.push(Value::from(limit));
            }
            // SQLite has no bare OFFSET.
            (None, Some(offset)) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                binds.push(Value::from(offset));
            }
            (None, None) => {}
        }

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value)?;
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage)?;
        let mut records: Vec<Record> = rows
            .iter()
            .map(|row| record_from_row(entity, row))
            .collect::<Result<_, _>>()?;

        for node in &plan.attachments {
            self.attach(entity, &mut records, node).await?;
        }
        let attachment_aliases: Vec<&str> =
            plan.attachments.iter().map(|n| n.alias.as_str()).collect();
        for record in &mut records {
            project(record, plan.attributes.as_deref(), &attachment_aliases);
        }
        Ok(records)
    }

    async fn update_where(
        &self,
        entity: &'static EntityDef,
        changes: Record,
        predicate: Option<Predicate>,
    ) -> Result<u64, Error> {
        if changes.is_empty() {
            return Err(Error::BadRequest("empty change set".to_string()));
        }
        let mut binds: Vec<Value> = Vec::new();
        let mut assignments = Vec::with_capacity(changes.len() + 1);
        for (field, value) in &changes {
            if EntityDef::is_system_field(field) || entity.field(field).is_none() {
                return Err(Error::Persistence(format!(
                    "cannot update column `{}` on `{}`",
                    field, entity.name
                )));
            }
            assignments.push(format!(r#""{field}" = ?"#));
            binds.push(value.clone());
        }
        if entity.timestamps {
            assignments.push(format!(r#""{UPDATED_AT_FIELD}" = ?"#));
            binds.push(Value::from(Utc::now().to_rfc3339()));
        }

        let mut sql = format!(
            r#"UPDATE "{}" SET {}"#,
            entity.table,
            assignments.join(", ")
        );
        if let Some(predicate) = &predicate {
            let clause = render_predicate(entity, "", predicate, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value)?;
        }
        let result = query.execute(&self.pool).await.map_err(storage)?;
        Ok(result.rows_affected())
    }

    async fn delete_where(
        &self,
        entity: &'static EntityDef,
        predicate: Option<Predicate>,
    ) -> Result<u64, Error> {
        let mut binds: Vec<Value> = Vec::new();
        let mut sql = format!(r#"DELETE FROM "{}""#, entity.table);
        if let Some(predicate) = &predicate {
            let clause = render_predicate(entity, "", predicate, &mut binds)?;
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value)?;
        }
        let result = query.execute(&self.pool).await.map_err(storage)?;
        Ok(result.rows_affected())
    }
}

// ── DDL ──────────────────────────────────────────────────────────────────

fn create_table_sql(entity: &'static EntityDef) -> String {
    let mut columns = vec![format!(r#""{ID_FIELD}" INTEGER PRIMARY KEY AUTOINCREMENT"#)];
    for field in entity.fields {
        let sql_type = match field.kind {
            FieldKind::Integer | FieldKind::Boolean => "INTEGER",
            FieldKind::Decimal => "REAL",
            FieldKind::Text | FieldKind::Date => "TEXT",
        };
        let null = if field.required { " NOT NULL" } else { "" };
        columns.push(format!(r#""{}" {}{}"#, field.name, sql_type, null));
    }
    if entity.timestamps {
        columns.push(format!(r#""{CREATED_AT_FIELD}" TEXT NOT NULL"#));
        columns.push(format!(r#""{UPDATED_AT_FIELD}" TEXT NOT NULL"#));
    }
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{}" ({})"#,
        entity.table,
        columns.join(", ")
    )
}

fn foreign_key_columns(entity: &'static EntityDef) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = entity
        .relations
        .iter()
        .filter(|r| r.kind == RelationKind::BelongsTo)
        .map(|r| r.foreign_key)
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

// ── Predicate rendering ──────────────────────────────────────────────────

/// Render a predicate tree as a parenthesized SQL condition, appending
/// operand values to `binds` in placeholder order. Identifiers are checked
/// against the entity declaration before interpolation; values only ever
/// travel as binds.
fn render_predicate(
    entity: &'static EntityDef,
    alias: &str,
    predicate: &Predicate,
    binds: &mut Vec<Value>,
) -> Result<String, Error> {
    match predicate {
        Predicate::Literal { field, value } => {
            let column = column_ref(entity, alias, field)?;
            match value {
                Value::Null => Ok(format!("{column} IS NULL")),
                Value::Array(items) => {
                    let operands: Vec<Operand> =
                        items.iter().map(|v| Operand::Value(v.clone())).collect();
                    render_in(&column, &operands, false, binds)
                }
                other => {
                    binds.push(other.clone());
                    Ok(format!("{column} = ?"))
                }
            }
        }
        Predicate::Comparison { field, op, operand } => {
            render_comparison(entity, alias, field, *op, operand, binds)
        }
        Predicate::Logical { op, children } => {
            if children.is_empty() {
                // An empty disjunction admits nothing; the others constrain
                // nothing.
                return Ok(match op {
                    LogicalOp::Or => "1 = 0".to_string(),
                    LogicalOp::And | LogicalOp::Not => "1 = 1".to_string(),
                });
            }
            let parts: Vec<String> = children
                .iter()
                .map(|child| {
                    render_predicate(entity, alias, child, binds).map(|p| format!("({p})"))
                })
                .collect::<Result<_, _>>()?;
            Ok(match op {
                LogicalOp::And => parts.join(" AND "),
                LogicalOp::Or => parts.join(" OR "),
                LogicalOp::Not => format!("NOT ({})", parts.join(" AND ")),
            })
        }
    }
}

fn render_comparison(
    entity: &'static EntityDef,
    alias: &str,
    field: &str,
    op: CompareOp,
    operand: &Operand,
    binds: &mut Vec<Value>,
) -> Result<String, Error> {
    if field.is_empty() {
        return Err(Error::Persistence(format!(
            "operator `{}` is not anchored to a field",
            op.name()
        )));
    }
    let column = column_ref(entity, alias, field)?;
    match op {
        CompareOp::Eq => match operand {
            Operand::Value(Value::Null) => Ok(format!("{column} IS NULL")),
            Operand::Value(value) => {
                binds.push(value.clone());
                Ok(format!("{column} = ?"))
            }
            Operand::List(items) => render_in(&column, items, false, binds),
            Operand::Nested(_) => Err(nested_operand(op)),
        },
        CompareOp::Ne => match operand {
            Operand::Value(Value::Null) => Ok(format!("{column} IS NOT NULL")),
            Operand::Value(value) => {
                binds.push(value.clone());
                Ok(format!("{column} != ?"))
            }
            Operand::List(items) => render_in(&column, items, true, binds),
            Operand::Nested(_) => Err(nested_operand(op)),
        },
        CompareOp::Is => match operand {
            Operand::Value(Value::Null) => Ok(format!("{column} IS NULL")),
            Operand::Value(value) => {
                binds.push(value.clone());
                Ok(format!("{column} IS ?"))
            }
            _ => Err(nested_operand(op)),
        },
        CompareOp::Not => match operand {
            Operand::Value(Value::Null) => Ok(format!("{column} IS NOT NULL")),
            Operand::Value(value) => {
                binds.push(value.clone());
                Ok(format!("{column} IS NOT ?"))
            }
            _ => Err(nested_operand(op)),
        },
        CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
            let symbol = match op {
                CompareOp::Gt => ">",
                CompareOp::Gte => ">=",
                CompareOp::Lt => "<",
                CompareOp::Lte => "<=",
                _ => unreachable!(),
            };
            match operand {
                Operand::Value(value) if !value.is_null() => {
                    binds.push(value.clone());
                    Ok(format!("{column} {symbol} ?"))
                }
                _ => Err(Error::Persistence(format!(
                    "operator `{}` expects a scalar operand",
                    op.name()
                ))),
            }
        }
        CompareOp::Between | CompareOp::NotBetween => {
            let keyword = if op == CompareOp::Between {
                "BETWEEN"
            } else {
                "NOT BETWEEN"
            };
            match operand {
                Operand::List(items) if items.len() == 2 => {
                    for item in items {
                        match item {
                            Operand::Value(value) if !value.is_null() => {
                                binds.push(value.clone())
                            }
                            _ => {
                                return Err(Error::Persistence(format!(
                                    "operator `{}` expects two scalar bounds",
                                    op.name()
                                )));
                            }
                        }
                    }
                    Ok(format!("{column} {keyword} ? AND ?"))
                }
                _ => Err(Error::Persistence(format!(
                    "operator `{}` expects a two-element list",
                    op.name()
                ))),
            }
        }
    }
}

fn render_in(
    column: &str,
    items: &[Operand],
    negated: bool,
    binds: &mut Vec<Value>,
) -> Result<String, Error> {
    if items.is_empty() {
        // IN over nothing matches nothing.
        return Ok(if negated { "1 = 1" } else { "1 = 0" }.to_string());
    }
    for item in items {
        match item {
            Operand::Value(value) => binds.push(value.clone()),
            _ => {
                return Err(Error::Persistence(
                    "membership list elements must be scalar".to_string(),
                ));
            }
        }
    }
    let placeholders = vec!["?"; items.len()].join(", ");
    let keyword = if negated { "NOT IN" } else { "IN" };
    Ok(format!("{column} {keyword} ({placeholders})"))
}

fn nested_operand(op: CompareOp) -> Error {
    Error::Persistence(format!(
        "operator `{}` cannot take a filter object as its operand",
        op.name()
    ))
}

fn column_ref(entity: &'static EntityDef, alias: &str, field: &str) -> Result<String, Error> {
    if !entity.has_column(field) {
        return Err(Error::Persistence(format!(
            "unknown column `{}` on `{}`",
            field, entity.name
        )));
    }
    if alias.is_empty() {
        Ok(format!(r#""{field}""#))
    } else {
        Ok(format!(r#"{alias}."{field}""#))
    }
}

/// Extend the join list with the relation chain, reusing aliases already
/// emitted for a shared prefix. Returns the alias and entity the chain
/// lands on.
fn push_join_chain(
    root: &'static EntityDef,
    chain: &[&'static RelationDef],
    joins: &mut Vec<String>,
    seen: &mut HashMap<String, String>,
) -> (String, &'static EntityDef) {
    let mut parent_alias = "t".to_string();
    let mut current = root;
    let mut path = String::new();
    for relation in chain {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(relation.alias);
        let alias = match seen.get(&path) {
            Some(existing) => existing.clone(),
            None => {
                let alias = format!("j{}", seen.len() + 1);
                let clause = match relation.kind {
                    RelationKind::BelongsTo => format!(
                        r#"LEFT JOIN "{}" {alias} ON {alias}."{ID_FIELD}" = {parent_alias}."{}""#,
                        relation.target.table, relation.foreign_key
                    ),
                    RelationKind::HasMany => format!(
                        r#"LEFT JOIN "{}" {alias} ON {alias}."{}" = {parent_alias}."{ID_FIELD}""#,
                        relation.target.table, relation.foreign_key
                    ),
                };
                joins.push(clause);
                seen.insert(path.clone(), alias.clone());
                alias
            }
        };
        parent_alias = alias;
        current = relation.target;
    }
    (parent_alias, current)
}

// ── Row mapping ──────────────────────────────────────────────────────────

fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q Value) -> Result<SqliteQuery<'q>, Error> {
    Ok(match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => {
            return Err(Error::Persistence(format!(
                "cannot bind `{other}` as a statement parameter"
            )));
        }
    })
}

fn record_from_row(entity: &'static EntityDef, row: &SqliteRow) -> Result<Record, Error> {
    let mut record = Record::new();
    let id: i64 = row.try_get(ID_FIELD).map_err(storage)?;
    record.insert(ID_FIELD.to_string(), Value::from(id));
    for field in entity.fields {
        let value = match field.kind {
            FieldKind::Integer => opt_value(
                row.try_get::<Option<i64>, _>(field.name).map_err(storage)?,
            ),
            FieldKind::Decimal => opt_value(
                row.try_get::<Option<f64>, _>(field.name).map_err(storage)?,
            ),
            FieldKind::Boolean => opt_value(
                row.try_get::<Option<bool>, _>(field.name).map_err(storage)?,
            ),
            FieldKind::Text | FieldKind::Date => opt_value(
                row.try_get::<Option<String>, _>(field.name)
                    .map_err(storage)?,
            ),
        };
        record.insert(field.name.to_string(), value);
    }
    if entity.timestamps {
        for stamp in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
            let value: Option<String> = row.try_get(stamp).map_err(storage)?;
            record.insert(stamp.to_string(), opt_value(value));
        }
    }
    Ok(record)
}

fn opt_value<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

fn distinct_keys(rows: &[Record], column: &str) -> Vec<i64> {
    let mut keys: Vec<i64> = rows
        .iter()
        .filter_map(|row| row.get(column).and_then(Value::as_i64))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Keep only projected columns, plus the keys attachments were written
/// under. `None` keeps everything.
fn project(record: &mut Record, attributes: Option<&[String]>, attachment_aliases: &[&str]) {
    if let Some(attributes) = attributes {
        record.retain(|key, _| {
            attributes.iter().any(|a| a == key) || attachment_aliases.contains(&key.as_str())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::{BANK_MASTER, EXPENSES};
    use serde_json::json;

    fn predicate(value: Value) -> Predicate {
        match value {
            Value::Object(map) => crate::translate::filter::translate(&map).unwrap(),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_render_equality_binds_value() {
        let mut binds = Vec::new();
        let sql =
            render_predicate(&EXPENSES, "t", &predicate(json!({"vendor": "acme"})), &mut binds)
                .unwrap();
        assert_eq!(sql, r#"t."vendor" = ?"#);
        assert_eq!(binds, vec![json!("acme")]);
    }

    #[test]
    fn test_render_null_is_null_without_bind() {
        let mut binds = Vec::new();
        let sql =
            render_predicate(&EXPENSES, "", &predicate(json!({"emi_id": null})), &mut binds)
                .unwrap();
        assert_eq!(sql, r#""emi_id" IS NULL"#);
        assert!(binds.is_empty());
    }

    #[test]
    fn test_render_membership_list() {
        let mut binds = Vec::new();
        let sql = render_predicate(
            &EXPENSES,
            "t",
            &predicate(json!({"bank_id": [1, 2, 3]})),
            &mut binds,
        )
        .unwrap();
        assert_eq!(sql, r#"t."bank_id" IN (?, ?, ?)"#);
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn test_render_between_binds_in_order() {
        let mut binds = Vec::new();
        let sql = render_predicate(
            &EXPENSES,
            "t",
            &predicate(json!({"amount": {"between": [10, 20]}})),
            &mut binds,
        )
        .unwrap();
        assert_eq!(sql, r#"t."amount" BETWEEN ? AND ?"#);
        assert_eq!(binds, vec![json!(10), json!(20)]);
    }

    #[test]
    fn test_render_between_wrong_arity_is_persistence_error() {
        let mut binds = Vec::new();
        let err = render_predicate(
            &EXPENSES,
            "t",
            &predicate(json!({"amount": {"between": [10]}})),
            &mut binds,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
    }

    #[test]
    fn test_render_unknown_column_is_persistence_error() {
        let mut binds = Vec::new();
        let err = render_predicate(
            &EXPENSES,
            "t",
            &predicate(json!({"no_such_column": 1})),
            &mut binds,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
    }

    #[test]
    fn test_render_unanchored_operator_is_persistence_error() {
        let mut binds = Vec::new();
        let err = render_predicate(&EXPENSES, "t", &predicate(json!({"gt": 5})), &mut binds)
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
    }

    #[test]
    fn test_render_or_parenthesizes_alternatives() {
        let mut binds = Vec::new();
        let sql = render_predicate(
            &EXPENSES,
            "t",
            &predicate(json!({"amount": {"or": [{"gt": 500}, {"lt": 10}]}})),
            &mut binds,
        )
        .unwrap();
        assert_eq!(sql, r#"(t."amount" > ?) OR (t."amount" < ?)"#);
        assert_eq!(binds, vec![json!(500), json!(10)]);
    }

    #[test]
    fn test_create_table_sql_marks_required_columns() {
        let sql = create_table_sql(&BANK_MASTER);
        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "MasterBanks""#));
        assert!(sql.contains(r#""_id" INTEGER PRIMARY KEY AUTOINCREMENT"#));
        assert!(sql.contains(r#""name" TEXT"#));
        assert!(sql.contains(r#""createdAt" TEXT NOT NULL"#));
    }

    #[test]
    fn test_join_chain_reuses_shared_prefix() {
        let graph = crate::schema::SchemaGraph::standard().unwrap();
        let expenses = graph.entity("Expenses").unwrap();
        let keys = crate::translate::order::resolve(
            &graph,
            expenses,
            &[
                vec!["masterRecord".into(), "name".into()],
                vec![
                    "masterRecord".into(),
                    "expenseCategory".into(),
                    "category".into(),
                ],
            ],
        );
        let mut joins = Vec::new();
        let mut seen = HashMap::new();
        for key in &keys {
            push_join_chain(expenses, &key.chain, &mut joins, &mut seen);
        }
        assert_eq!(joins.len(), 2, "shared masterRecord hop joins once");
        assert!(joins[0].contains(r#"LEFT JOIN "MasterExpenses" j1"#));
        assert!(joins[1].contains(r#"LEFT JOIN "MasterExpenseCategories" j2"#));
    }

    #[tokio::test]
    async fn test_insert_update_delete_round_trip() {
        let store = SqliteStore::new_memory().await.unwrap();
        store.init_schema().await.unwrap();

        let created = store
            .insert_many(
                &BANK_MASTER,
                vec![
                    json!({"name": "ABC", "account_no": "123"})
                        .as_object()
                        .cloned()
                        .unwrap(),
                    json!({"name": "XYZ"}).as_object().cloned().unwrap(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].get(ID_FIELD), Some(&json!(1)));
        assert!(created[0].get(CREATED_AT_FIELD).unwrap().is_string());
        assert_eq!(created[1].get("account_no"), Some(&Value::Null));

        let changed = store
            .update_where(
                &BANK_MASTER,
                json!({"bank_branch": "main"}).as_object().cloned().unwrap(),
                Some(predicate(json!({"name": "ABC"}))),
            )
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let deleted = store
            .delete_where(&BANK_MASTER, Some(predicate(json!({"name": "nobody"}))))
            .await
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_select_orders_and_paginates() {
        let store = SqliteStore::new_memory().await.unwrap();
        store.init_schema().await.unwrap();
        let rows = [30, 10, 20]
            .iter()
            .map(|amount| {
                json!({
                    "date_id": 1, "date": "2024-04-01", "master_id": 1, "bank_id": 1,
                    "vendor": "v", "remarks": "r", "amount": amount,
                    "tax_allowable_amount": 0,
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect();
        store.insert_many(&EXPENSES, rows).await.unwrap();

        let graph = crate::schema::SchemaGraph::standard().unwrap();
        let sort = crate::translate::order::resolve(
            &graph,
            &EXPENSES,
            &[vec!["amount".into(), "desc".into()]],
        );
        let plan = SelectPlan {
            sort,
            limit: Some(2),
            ..Default::default()
        };
        let records = store.select(&EXPENSES, plan).await.unwrap();
        let amounts: Vec<f64> = records
            .iter()
            .map(|r| r.get("amount").unwrap().as_f64().unwrap())
            .collect();
        assert_eq!(amounts, vec![30.0, 20.0]);
    }
}
