//! Filter translation. A request filter object becomes a [`Predicate`]
//! tree keyed by operator names from the request dialect. Operand arity is
//! not checked here; malformed shapes travel through and are rejected by
//! the store when the clause is rendered.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Comparison operators of the filter dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Is,
    /// Scalar form of `not`, rendered as `IS NOT`.
    Not,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    NotBetween,
}

impl CompareOp {
    /// Operator name as written in requests.
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Is => "is",
            CompareOp::Not => "not",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Between => "between",
            CompareOp::NotBetween => "notBetween",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Operand>),
    /// A filter object in operand position. Carried through untouched; the
    /// store rejects it wherever the surrounding operator cannot take one.
    Nested(Box<Predicate>),
}

/// Translated filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> operand`.
    Comparison {
        field: String,
        op: CompareOp,
        operand: Operand,
    },
    Logical {
        op: LogicalOp,
        children: Vec<Predicate>,
    },
    /// Bare `field: value` equality. A null value renders as `IS NULL`, an
    /// array value as membership.
    Literal { field: String, value: Value },
}

enum OperatorToken {
    Or,
    Not,
    Compare(CompareOp),
}

static OPERATORS: Lazy<HashMap<&'static str, OperatorToken>> = Lazy::new(|| {
    use CompareOp::*;
    HashMap::from([
        ("eq", OperatorToken::Compare(Eq)),
        ("ne", OperatorToken::Compare(Ne)),
        ("is", OperatorToken::Compare(Is)),
        ("not", OperatorToken::Not),
        ("or", OperatorToken::Or),
        ("gt", OperatorToken::Compare(Gt)),
        ("gte", OperatorToken::Compare(Gte)),
        ("lt", OperatorToken::Compare(Lt)),
        ("lte", OperatorToken::Compare(Lte)),
        ("between", OperatorToken::Compare(Between)),
        ("notBetween", OperatorToken::Compare(NotBetween)),
    ])
});

/// Translate a filter object. `None` means no constraint.
pub fn translate(filter: &Map<String, Value>) -> Option<Predicate> {
    combine(translate_map(filter, None))
}

/// Fold sibling predicates: none stays none, one passes through, several
/// conjoin.
fn combine(mut predicates: Vec<Predicate>) -> Option<Predicate> {
    match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Some(Predicate::Logical {
            op: LogicalOp::And,
            children: predicates,
        }),
    }
}

/// Walk one object level. `context` is the field a surrounding key put
/// these operators under; inner field keys re-anchor it.
fn translate_map(map: &Map<String, Value>, context: Option<&str>) -> Vec<Predicate> {
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        match OPERATORS.get(key.as_str()) {
            Some(OperatorToken::Or) => out.push(translate_or(value, context)),
            Some(OperatorToken::Not) => out.push(translate_not(value, context)),
            Some(OperatorToken::Compare(op)) => out.push(Predicate::Comparison {
                field: context.unwrap_or_default().to_string(),
                op: *op,
                operand: translate_operand(value, context),
            }),
            None => match value {
                // A field key wrapping operators or deeper fields. An empty
                // object constrains nothing.
                Value::Object(inner) => out.extend(translate_map(inner, Some(key))),
                // A bare array means membership.
                Value::Array(items) => out.push(Predicate::Comparison {
                    field: key.clone(),
                    op: CompareOp::Eq,
                    operand: Operand::List(
                        items.iter().map(|v| Operand::Value(v.clone())).collect(),
                    ),
                }),
                other => out.push(Predicate::Literal {
                    field: key.clone(),
                    value: other.clone(),
                }),
            },
        }
    }
    out
}

/// Operand three-way rule: arrays keep element shape, objects become nested
/// predicates, everything else is a value.
fn translate_operand(value: &Value, context: Option<&str>) -> Operand {
    match value {
        Value::Array(items) => Operand::List(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(inner) => nested_operand(inner, context),
                    other => Operand::Value(other.clone()),
                })
                .collect(),
        ),
        Value::Object(inner) => nested_operand(inner, context),
        other => Operand::Value(other.clone()),
    }
}

fn nested_operand(inner: &Map<String, Value>, context: Option<&str>) -> Operand {
    match combine(translate_map(inner, context)) {
        Some(predicate) => Operand::Nested(Box::new(predicate)),
        None => Operand::List(Vec::new()),
    }
}

fn translate_or(value: &Value, context: Option<&str>) -> Predicate {
    let children = match value {
        // Each element is one alternative; an object element conjoins its
        // own keys first.
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(inner) => combine(translate_map(inner, context)),
                other => Some(literal_for(context, other)),
            })
            .collect(),
        Value::Object(inner) => translate_map(inner, context),
        other => vec![literal_for(context, other)],
    };
    Predicate::Logical {
        op: LogicalOp::Or,
        children,
    }
}

fn translate_not(value: &Value, context: Option<&str>) -> Predicate {
    match value {
        Value::Object(inner) => Predicate::Logical {
            op: LogicalOp::Not,
            children: translate_map(inner, context),
        },
        Value::Array(items) => Predicate::Logical {
            op: LogicalOp::Not,
            children: items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(inner) => combine(translate_map(inner, context)),
                    other => Some(literal_for(context, other)),
                })
                .collect(),
        },
        // Scalar negation reads as `IS NOT`.
        other => Predicate::Comparison {
            field: context.unwrap_or_default().to_string(),
            op: CompareOp::Not,
            operand: Operand::Value(other.clone()),
        },
    }
}

fn literal_for(context: Option<&str>, value: &Value) -> Predicate {
    Predicate::Literal {
        field: context.unwrap_or_default().to_string(),
        value: value.clone(),
    }
}
