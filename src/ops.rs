//! The four generic per-entity operations. Each one translates its piece
//! of the request eagerly, then makes a single round trip to the store.
//! Validation failures and unresolvable paths never reach the store.

use std::time::Instant;

use chrono::NaiveDate;
use metrics::histogram;
use serde_json::{Map, Value};

use crate::Engine;
use crate::error::Error;
use crate::query::QuerySpec;
use crate::schema::{EntityDef, FieldKind};
use crate::store::{Record, SelectPlan};
use crate::translate::{AttachNode, filter, include, order};

impl Engine {
    /// Insert a batch of payloads. All-or-nothing: the whole batch is
    /// validated first, then inserted in one statement. Returns the created
    /// records with system fields assigned.
    pub async fn create(
        &self,
        entity: &'static EntityDef,
        payloads: Vec<Record>,
    ) -> Result<Vec<Record>, Error> {
        let start = Instant::now();
        for (index, payload) in payloads.iter().enumerate() {
            validate_payload(entity, index, payload)?;
        }
        let records = self.store().insert_many(entity, payloads).await?;
        histogram!("fiscus.create.duration_ms", "entity" => entity.name)
            .record(start.elapsed().as_millis() as f64);
        Ok(records)
    }

    /// Run a QuerySpec. The default spec selects every row with no
    /// ordering and no relations.
    pub async fn read(
        &self,
        entity: &'static EntityDef,
        spec: QuerySpec,
    ) -> Result<Vec<Record>, Error> {
        let start = Instant::now();
        let predicate = spec.filter.as_ref().and_then(filter::translate);
        let attachments = match &spec.include {
            Some(specs) => include::resolve(self.graph(), entity, specs)?,
            None => Vec::new(),
        };
        reject_unresolved(entity, &attachments)?;
        let sort = match &spec.order {
            Some(paths) => order::resolve(self.graph(), entity, paths),
            None => Vec::new(),
        };
        let plan = SelectPlan {
            predicate,
            attributes: spec.attributes,
            attachments,
            sort,
            limit: spec.limit,
            offset: spec.offset,
        };
        let records = self.store().select(entity, plan).await?;
        histogram!("fiscus.read.duration_ms", "entity" => entity.name)
            .record(start.elapsed().as_millis() as f64);
        Ok(records)
    }

    /// Apply a change set to every row matching `filter` in one bulk
    /// statement. Returns the affected-row count.
    pub async fn update(
        &self,
        entity: &'static EntityDef,
        changes: Record,
        filter_spec: Option<&Map<String, Value>>,
    ) -> Result<u64, Error> {
        let start = Instant::now();
        if changes.is_empty() {
            return Err(Error::BadRequest("no fields to update".to_string()));
        }
        validate_changes(entity, &changes)?;
        let predicate = filter_spec.and_then(filter::translate);
        let count = self.store().update_where(entity, changes, predicate).await?;
        histogram!("fiscus.update.duration_ms", "entity" => entity.name)
            .record(start.elapsed().as_millis() as f64);
        Ok(count)
    }

    /// Delete every row matching `filter` in one bulk statement. A filter
    /// matching nothing returns count 0.
    pub async fn delete(
        &self,
        entity: &'static EntityDef,
        filter_spec: Option<&Map<String, Value>>,
    ) -> Result<u64, Error> {
        let start = Instant::now();
        let predicate = filter_spec.and_then(filter::translate);
        let count = self.store().delete_where(entity, predicate).await?;
        histogram!("fiscus.delete.duration_ms", "entity" => entity.name)
            .record(start.elapsed().as_millis() as f64);
        Ok(count)
    }
}

fn validate_payload(
    entity: &'static EntityDef,
    index: usize,
    payload: &Record,
) -> Result<(), Error> {
    for (key, value) in payload {
        if EntityDef::is_system_field(key) {
            return Err(Error::Validation(format!(
                "payload {}: field `{}` is system-managed",
                index + 1,
                key
            )));
        }
        let field = entity.field(key).ok_or_else(|| {
            Error::Validation(format!(
                "payload {}: unknown field `{}` on `{}`",
                index + 1,
                key,
                entity.name
            ))
        })?;
        if !value.is_null() && !value_fits(field.kind, value) {
            return Err(Error::Validation(format!(
                "payload {}: field `{}` expects {}",
                index + 1,
                key,
                kind_name(field.kind)
            )));
        }
    }
    for field in entity.fields {
        if field.required && payload.get(field.name).is_none_or(Value::is_null) {
            return Err(Error::Validation(format!(
                "payload {}: missing required field `{}`",
                index + 1,
                field.name
            )));
        }
    }
    Ok(())
}

fn validate_changes(entity: &'static EntityDef, changes: &Record) -> Result<(), Error> {
    for (key, value) in changes {
        if EntityDef::is_system_field(key) {
            return Err(Error::Validation(format!(
                "field `{}` is system-managed",
                key
            )));
        }
        let field = entity.field(key).ok_or_else(|| {
            Error::Validation(format!("unknown field `{}` on `{}`", key, entity.name))
        })?;
        if !value.is_null() && !value_fits(field.kind, value) {
            return Err(Error::Validation(format!(
                "field `{}` expects {}",
                key,
                kind_name(field.kind)
            )));
        }
    }
    Ok(())
}

fn value_fits(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::Integer => value.as_i64().is_some(),
        FieldKind::Decimal => value.is_number(),
        FieldKind::Text => value.is_string(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Date => value
            .as_str()
            .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer => "an integer",
        FieldKind::Decimal => "a number",
        FieldKind::Text => "a string",
        FieldKind::Boolean => "a boolean",
        FieldKind::Date => "a YYYY-MM-DD date",
    }
}

/// A node without relation metadata means the include path missed the
/// graph. Reported here so nothing half-translated reaches the store.
fn reject_unresolved(entity: &'static EntityDef, nodes: &[AttachNode]) -> Result<(), Error> {
    for node in nodes {
        match node.relation {
            Some(relation) => reject_unresolved(relation.target, &node.children)?,
            None => {
                return Err(Error::UnknownPath(format!(
                    "`{}` is not a relation of `{}`",
                    node.alias, entity.name
                )));
            }
        }
    }
    Ok(())
}
