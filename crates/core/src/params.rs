// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimization parameters and their schema.
//!
//! Clients send a flat map of scalar values. The record keeps exactly what
//! was sent; the backend receives the effective values with defaults filled
//! in, rendered as environment variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("input reference must not be empty")]
    EmptyInputRef,
    #[error("input reference contains control characters")]
    InvalidInputRef,
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("parameter {key} must be {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("parameter {key}={value} is outside {min}..={max}")]
    OutOfRange { key: String, value: f64, min: f64, max: f64 },
    #[error("{low_key} ({low}) must not exceed {high_key} ({high})")]
    InvertedRange { low_key: &'static str, low: f64, high_key: &'static str, high: f64 },
    #[error("invalid parameter {0:?}, expected key=value")]
    BadAssignment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Integer,
    Number,
}

struct ParamSpec {
    key: &'static str,
    env: &'static str,
    kind: Kind,
    min: f64,
    max: f64,
    default: f64,
}

const SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        key: "maxIterations",
        env: "MAX_ITERATIONS",
        kind: Kind::Integer,
        min: 1.0,
        max: 100.0,
        default: 3.0,
    },
    ParamSpec {
        key: "minUtilization",
        env: "MIN_UTILIZATION",
        kind: Kind::Number,
        min: 0.0,
        max: 2.0,
        default: 0.7,
    },
    ParamSpec {
        key: "maxUtilization",
        env: "MAX_UTILIZATION",
        kind: Kind::Number,
        min: 0.0,
        max: 2.0,
        default: 1.15,
    },
    ParamSpec {
        key: "optimalRangeMin",
        env: "OPTIMAL_RANGE_MIN",
        kind: Kind::Number,
        min: 0.0,
        max: 2.0,
        default: 0.8,
    },
    ParamSpec {
        key: "optimalRangeMax",
        env: "OPTIMAL_RANGE_MAX",
        kind: Kind::Number,
        min: 0.0,
        max: 2.0,
        default: 1.0,
    },
];

/// Pairs whose first value must not exceed the second.
const ORDERED_PAIRS: &[(&str, &str)] =
    &[("minUtilization", "maxUtilization"), ("optimalRangeMin", "optimalRangeMax")];

/// Parameters exactly as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Parse a `key=value` command-line assignment.
    ///
    /// The value is read as JSON when it parses as such, otherwise kept as a
    /// string, so `maxIterations=5` yields a number.
    pub fn parse_assignment(raw: &str) -> Result<(String, Value), ValidationError> {
        let (key, value) =
            raw.split_once('=').ok_or_else(|| ValidationError::BadAssignment(raw.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::BadAssignment(raw.to_string()));
        }
        let value = serde_json::from_str(value.trim())
            .unwrap_or_else(|_| Value::String(value.trim().to_string()));
        Ok((key.to_string(), value))
    }

    /// Check every value against the schema and resolve defaults.
    pub fn validate(&self) -> Result<EffectiveParameters, ValidationError> {
        if let Some(unknown) = self.0.keys().find(|k| !SCHEMA.iter().any(|s| s.key == *k)) {
            return Err(ValidationError::UnknownParameter(unknown.clone()));
        }

        let mut values = Vec::with_capacity(SCHEMA.len());
        for spec in SCHEMA {
            let value = match self.0.get(spec.key) {
                Some(raw) => coerce(spec, raw)?,
                None => spec.default,
            };
            values.push(value);
        }
        let effective = EffectiveParameters { values };

        for &(low_key, high_key) in ORDERED_PAIRS {
            let (low, high) = (effective.get(low_key), effective.get(high_key));
            if let (Some(low), Some(high)) = (low, high) {
                if low > high {
                    return Err(ValidationError::InvertedRange { low_key, low, high_key, high });
                }
            }
        }
        Ok(effective)
    }
}

impl FromIterator<(String, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn coerce(spec: &ParamSpec, raw: &Value) -> Result<f64, ValidationError> {
    let expected = match spec.kind {
        Kind::Integer => "an integer",
        Kind::Number => "a number",
    };
    let wrong_type = || ValidationError::WrongType { key: spec.key.to_string(), expected };

    let value = match raw {
        Value::Number(n) => n.as_f64().ok_or_else(wrong_type)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| wrong_type())?,
        _ => return Err(wrong_type()),
    };
    if !value.is_finite() || (spec.kind == Kind::Integer && value.fract() != 0.0) {
        return Err(wrong_type());
    }
    if value < spec.min || value > spec.max {
        return Err(ValidationError::OutOfRange {
            key: spec.key.to_string(),
            value,
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(value)
}

/// Validated parameters with defaults applied, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParameters {
    values: Vec<f64>,
}

impl EffectiveParameters {
    pub fn get(&self, key: &str) -> Option<f64> {
        SCHEMA.iter().position(|s| s.key == key).and_then(|i| self.values.get(i).copied())
    }

    /// Environment variables handed to the backend worker.
    pub fn to_env(&self) -> Vec<(String, String)> {
        SCHEMA
            .iter()
            .zip(&self.values)
            .map(|(spec, v)| {
                let rendered = match spec.kind {
                    Kind::Integer => format!("{}", *v as i64),
                    Kind::Number => format!("{v}"),
                };
                (spec.env.to_string(), rendered)
            })
            .collect()
    }
}

/// Reject input references that cannot be an object key.
pub fn validate_input_ref(input_ref: &str) -> Result<(), ValidationError> {
    if input_ref.trim().is_empty() {
        return Err(ValidationError::EmptyInputRef);
    }
    if input_ref.chars().any(char::is_control) {
        return Err(ValidationError::InvalidInputRef);
    }
    Ok(())
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
