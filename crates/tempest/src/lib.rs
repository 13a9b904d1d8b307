pub mod db;
pub use db::{Builder, CapturedSql, Db, SqlCapture};

mod entities;
pub use entities::Entities;

pub mod json;

mod prepared;
pub use prepared::PreparedQuery;

mod query;
pub use query::{FromRow, Query};

mod record;
pub use record::{Entity, Projection, Record};

mod reference;
pub use reference::{Ref, RefFactory};

mod result_stream;
pub use result_stream::ResultStream;

mod select;
pub use select::Select;

mod transaction;
pub use transaction::Transaction;

pub use tempest_core::{
    bail, err,
    schema::{self, FieldDef},
    stmt::{Type, Value, ValueRecord},
    Error, Model, Result,
};

pub use tempest_sql::{
    template,
    template::{el, Element},
    Bindings, Dialect, Statement, Template,
};
