use std::cmp::Ordering;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::ModelSnapshot;

/// Declarative condition over the data model, used for `visibleIf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: Value },
    Field { path: String },
    IsSet { path: String },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
    Eq { left: Box<Expr>, right: Box<Expr> },
    Ne { left: Box<Expr>, right: Box<Expr> },
    Lt { left: Box<Expr>, right: Box<Expr> },
    Lte { left: Box<Expr>, right: Box<Expr> },
    Gt { left: Box<Expr>, right: Box<Expr> },
    Gte { left: Box<Expr>, right: Box<Expr> },
    In { value: Box<Expr>, options: Vec<Value> },
    Matches { value: Box<Expr>, pattern: String },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field { path: path.into() }
    }

    /// `field == value`, the most common visibility condition.
    pub fn field_equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Eq {
            left: Box::new(Self::field(path)),
            right: Box::new(Self::literal(value)),
        }
    }

    /// Evaluates the expression and returns a JSON value when possible.
    ///
    /// Missing fields read as `null`, mirroring an unset form value.
    pub fn evaluate_value(&self, model: &ModelSnapshot) -> Option<Value> {
        match self {
            Expr::Literal { value } => Some(value.clone()),
            Expr::Field { path } => Some(model.lookup(path).cloned().unwrap_or(Value::Null)),
            Expr::IsSet { path } => {
                let present = model.lookup(path).is_some_and(|value| !value.is_null());
                Some(Value::Bool(present))
            }
            Expr::And { expressions } => Self::evaluate_and(expressions, model),
            Expr::Or { expressions } => Self::evaluate_or(expressions, model),
            Expr::Not { expression } => expression
                .evaluate_bool(model)
                .map(|value| Value::Bool(!value)),
            Expr::Eq { left, right } => {
                let left_value = left.evaluate_value(model)?;
                let right_value = right.evaluate_value(model)?;
                Some(Value::Bool(left_value == right_value))
            }
            Expr::Ne { left, right } => {
                let left_value = left.evaluate_value(model)?;
                let right_value = right.evaluate_value(model)?;
                Some(Value::Bool(left_value != right_value))
            }
            Expr::Lt { left, right } => {
                Self::evaluate_compare(left, right, model, |o| o == Ordering::Less)
            }
            Expr::Lte { left, right } => {
                Self::evaluate_compare(left, right, model, |o| o != Ordering::Greater)
            }
            Expr::Gt { left, right } => {
                Self::evaluate_compare(left, right, model, |o| o == Ordering::Greater)
            }
            Expr::Gte { left, right } => {
                Self::evaluate_compare(left, right, model, |o| o != Ordering::Less)
            }
            Expr::In { value, options } => {
                let value = value.evaluate_value(model)?;
                Some(Value::Bool(options.contains(&value)))
            }
            Expr::Matches { value, pattern } => {
                let value = value.evaluate_value(model)?;
                let regex = Regex::new(pattern).ok()?;
                match value {
                    Value::String(text) => Some(Value::Bool(regex.is_match(&text))),
                    Value::Null => Some(Value::Bool(false)),
                    _ => None,
                }
            }
        }
    }

    /// Evaluates the expression and coerces the result into a boolean when possible.
    pub fn evaluate_bool(&self, model: &ModelSnapshot) -> Option<bool> {
        let value = self.evaluate_value(model)?;
        match value {
            Value::Bool(value) => Some(value),
            Value::Number(number) => number.as_f64().map(|value| value != 0.0),
            Value::String(text) => match text.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" | "" => Some(false),
                _ => None,
            },
            Value::Null => Some(false),
            Value::Array(items) => Some(!items.is_empty()),
            Value::Object(_) => None,
        }
    }

    fn evaluate_and(expressions: &[Expr], model: &ModelSnapshot) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(model) {
                Some(false) => return Some(Value::Bool(false)),
                Some(true) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(true))
        }
    }

    fn evaluate_or(expressions: &[Expr], model: &ModelSnapshot) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(model) {
                Some(true) => return Some(Value::Bool(true)),
                Some(false) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(false))
        }
    }

    fn evaluate_compare<F>(
        left: &Expr,
        right: &Expr,
        model: &ModelSnapshot,
        predicate: F,
    ) -> Option<Value>
    where
        F: Fn(Ordering) -> bool,
    {
        let left_value = left.evaluate_value(model)?;
        let right_value = right.evaluate_value(model)?;
        let ordering = Self::compare_values(&left_value, &right_value)?;
        Some(Value::Bool(predicate(ordering)))
    }

    fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
        match (left, right) {
            (Value::Number(left), Value::Number(right)) => {
                left.as_f64()?.partial_cmp(&right.as_f64()?)
            }
            (Value::String(left_text), Value::String(right_text)) => {
                Some(left_text.cmp(right_text))
            }
            _ if left == right => Some(Ordering::Equal),
            _ => None,
        }
    }
}
