use indexmap::IndexMap;
use std::sync::Arc;
use tempest_core::{
    schema::Column,
    stmt::{Value, ValueRecord},
    Error, Model, Result,
};

/// A compiled template: SQL text plus everything needed to execute it and
/// interpret the result.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,

    /// One entry per placeholder, in placeholder order
    pub parameters: Vec<Parameter>,

    /// The statement checks or increments a version column.
    pub version_aware: bool,

    /// Names of the key columns the database generates for an INSERT
    pub generated_keys: Vec<String>,

    /// Slots bound per execution, when the statement has deferred values
    pub bind_vars: Option<BindVars>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Value known at compile time
    Bound { name: Option<String>, value: Value },

    /// Value supplied per execution by [`Statement::bind`]
    Deferred { slot: usize },
}

#[derive(Debug, Clone, Default)]
pub struct BindVars {
    pub slots: Vec<BindSlot>,
}

#[derive(Debug, Clone)]
pub enum BindSlot {
    /// A column value extracted from the bound record
    Column { model: Arc<Model>, column: Column },

    /// A named bind variable
    Named(String),
}

/// Values for one execution of a statement with deferred parameters.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub record: Option<ValueRecord>,
    pub named: IndexMap<String, Value>,
}

impl Statement {
    pub fn has_bind_vars(&self) -> bool {
        self.bind_vars.is_some()
    }

    /// Positional values of a statement without deferred parameters.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.parameters
            .iter()
            .map(|param| match param {
                Parameter::Bound { value, .. } => Ok(value.clone()),
                Parameter::Deferred { slot } => Err(Error::sql_template(format!(
                    "parameter {} is a bind variable and has no value; bind it before executing",
                    slot + 1
                ))),
            })
            .collect()
    }

    /// Positional values for one execution, filling deferred parameters from
    /// `bindings`.
    pub fn bind(&self, bindings: &Bindings) -> Result<Vec<Value>> {
        let slots = self.bind_vars.as_ref();

        self.parameters
            .iter()
            .map(|param| match param {
                Parameter::Bound { value, .. } => Ok(value.clone()),
                Parameter::Deferred { slot } => {
                    let slot = slots.and_then(|vars| vars.slots.get(*slot)).ok_or_else(|| {
                        Error::sql_template(format!("unknown bind variable slot {slot}"))
                    })?;
                    slot.value(bindings)
                }
            })
            .collect()
    }
}

impl BindSlot {
    fn value(&self, bindings: &Bindings) -> Result<Value> {
        match self {
            BindSlot::Column { model, column } => {
                let record = bindings.record.as_ref().ok_or_else(|| {
                    Error::sql_template(format!(
                        "statement binds `{}.{}` from a record but none was given",
                        model.name(),
                        column.name
                    ))
                })?;
                model.column_value(record, column)
            }
            BindSlot::Named(name) => bindings.named.get(name).cloned().ok_or_else(|| {
                Error::sql_template(format!("no value for bind variable `{name}`"))
            }),
        }
    }
}

impl Bindings {
    pub fn record(record: ValueRecord) -> Bindings {
        Bindings {
            record: Some(record),
            named: IndexMap::new(),
        }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Bindings {
        self.named.insert(name.into(), value.into());
        self
    }
}
