#[macro_use]
mod fmt;
use fmt::{Ident, Qualified, ToSql};

mod delim;
use delim::Comma;

mod element;

mod scope;
use scope::Scope;

use crate::{
    statement::{BindSlot, BindVars, Parameter, Statement},
    template::{Element, Template},
    Dialect,
};

use tempest_core::{stmt::Value, Result};
use tracing::debug;

/// Compiles templates into statements for one dialect.
///
/// The compiler is stateless; a single instance can be shared by every
/// query against a database.
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Dialect,
}

/// State of one compilation.
struct Formatter<'a> {
    compiler: &'a Compiler,

    /// Tables of the statement and their aliases
    scope: &'a Scope,

    /// Where to write the SQL text
    dst: String,

    /// Parameters, in placeholder order
    params: Vec<Parameter>,

    /// Deferred bind slots
    slots: Vec<BindSlot>,

    /// Tables are referenced through aliases (the statement is a SELECT)
    aliased: bool,

    version_aware: bool,

    generated_keys: Vec<String>,
}

impl Compiler {
    pub fn new(dialect: Dialect) -> Compiler {
        Compiler { dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Compiles `template` in a single pass over its flattened form.
    pub fn compile(&self, template: &Template) -> Result<Statement> {
        let template = template.flatten();
        let elements = template.elements();

        let aliased = elements
            .iter()
            .any(|element| matches!(element, Element::Select(_) | Element::From(_)));

        let scope = if aliased {
            Scope::build(elements, &self.dialect)?
        } else {
            Scope::default()
        };

        let mut f = Formatter {
            compiler: self,
            scope: &scope,
            dst: String::new(),
            params: vec![],
            slots: vec![],
            aliased,
            version_aware: false,
            generated_keys: vec![],
        };

        for (index, (fragment, element)) in template.fragments().iter().zip(elements).enumerate()
        {
            f.dst.push_str(fragment);
            f.element(index, element)?;
        }

        if let Some(last) = template.fragments().last() {
            f.dst.push_str(last);
        }

        debug!(
            sql = %f.dst,
            params = f.params.len(),
            version_aware = f.version_aware,
            "compiled statement"
        );

        let bind_vars = if f.slots.is_empty() {
            None
        } else {
            Some(BindVars { slots: f.slots })
        };

        Ok(Statement {
            sql: f.dst,
            parameters: f.params,
            version_aware: f.version_aware,
            generated_keys: f.generated_keys,
            bind_vars,
        })
    }
}

impl Formatter<'_> {
    fn dialect(&self) -> &Dialect {
        &self.compiler.dialect
    }

    fn placeholder(&mut self) {
        let n = self.params.len();
        let dialect = self.compiler.dialect;
        dialect.write_placeholder(&mut self.dst, n);
    }

    /// Binds a value known now.
    fn bound(&mut self, name: Option<&str>, value: Value) {
        self.params.push(Parameter::Bound {
            name: name.map(str::to_string),
            value,
        });
        self.placeholder();
    }

    /// Binds a value supplied per execution.
    fn deferred(&mut self, slot: BindSlot) {
        let index = self.slots.len();
        self.slots.push(slot);
        self.params.push(Parameter::Deferred { slot: index });
        self.placeholder();
    }
}
