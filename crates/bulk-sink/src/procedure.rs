//! Result rows of remote procedure calls.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A numeric column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcedureValue {
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Null,
}

impl fmt::Display for ProcedureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureValue::Int(v) => write!(f, "{v}"),
            ProcedureValue::Float(v) => write!(f, "{v}"),
            ProcedureValue::Decimal(v) => write!(f, "{v}"),
            ProcedureValue::Null => f.write_str("NULL"),
        }
    }
}

/// One row of named columns, in result-set order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcedureRow {
    pub columns: Vec<(String, ProcedureValue)>,
}

impl ProcedureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ProcedureValue) -> Self {
        self.columns.push((name.into(), value));
        self
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&ProcedureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for ProcedureRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
