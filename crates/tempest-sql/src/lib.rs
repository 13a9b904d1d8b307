pub mod builder;

pub mod compiler;
pub use compiler::Compiler;

pub mod dialect;
pub use dialect::{ConflictClause, Dialect, UpsertSyntax};

pub mod statement;
pub use statement::{BindSlot, BindVars, Bindings, Parameter, Statement};

#[macro_use]
pub mod template;
pub use template::{Element, Interpolate, Template, TemplateBuilder};
