//! Templates for the statements the repository layer issues.

use crate::{
    template,
    template::{el, Element, RecordSource, Template},
    Dialect, UpsertSyntax,
};

use std::sync::Arc;
use tempest_core::{
    schema::Column,
    stmt::{Value, ValueRecord},
    Model, Result,
};

/// A SELECT of one model, with optional filters, ordering and paging.
#[derive(Debug, Clone)]
pub struct SelectTemplate {
    model: Arc<Model>,
    filters: Vec<Template>,
    order_by: Vec<Template>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectTemplate {
    pub fn new(model: &Arc<Model>) -> SelectTemplate {
        SelectTemplate {
            model: model.clone(),
            filters: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn where_id(mut self, id: impl Into<Value>) -> SelectTemplate {
        let filter = Template::from_element(el::where_id(&self.model, id));
        self.filters.push(filter);
        self
    }

    pub fn where_ids(mut self, ids: Vec<Value>) -> SelectTemplate {
        let filter = Template::from_element(el::where_ids(&self.model, ids));
        self.filters.push(filter);
        self
    }

    /// Adds a predicate; predicates are combined with `AND`.
    pub fn filter(mut self, filter: impl Into<Template>) -> SelectTemplate {
        self.filters.push(filter.into());
        self
    }

    pub fn order_by(mut self, order: impl Into<Template>) -> SelectTemplate {
        self.order_by.push(order.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> SelectTemplate {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> SelectTemplate {
        self.offset = Some(offset);
        self
    }

    pub fn to_template(&self, dialect: &Dialect) -> Template {
        let select = template!(
            "SELECT " {el::select(&self.model)} " FROM " {el::from(&self.model)}
        );

        let filters = if self.filters.len() > 1 {
            Template::join(self.filters.iter().cloned().map(parenthesize), " AND ")
        } else {
            Template::join(self.filters.iter().cloned(), " AND ")
        };

        let order_by = Template::join(self.order_by.iter().cloned(), ", ");
        let paging = dialect.limit_offset(self.limit, self.offset);

        let t = Template::combine(select, "\nWHERE ", filters);
        let t = Template::combine(t, "\nORDER BY ", order_by);
        Template::combine(t, "\n", paging)
    }
}

fn parenthesize(t: Template) -> Template {
    Template::join([Template::raw("("), t, Template::raw(")")], "")
}

/// `SELECT ... WHERE <key> = ?`
pub fn find_by_id(model: &Arc<Model>, id: impl Into<Value>) -> SelectTemplate {
    SelectTemplate::new(model).where_id(id)
}

pub fn count(model: &Arc<Model>) -> Template {
    template!("SELECT COUNT(*) FROM " {el::table(model)})
}

/// A multi-row INSERT.
pub fn insert(model: &Arc<Model>, records: Vec<ValueRecord>) -> Template {
    template!("INSERT INTO " {el::insert(model)} " VALUES " {el::values(model, records)})
}

/// A single-row INSERT whose values are bound per batch entry.
pub fn insert_deferred(model: &Arc<Model>) -> Template {
    template!("INSERT INTO " {el::insert(model)} " VALUES " {el::values_deferred(model)})
}

/// UPDATE by key, checking and incrementing the version when the model has
/// one.
pub fn update(model: &Arc<Model>, record: ValueRecord) -> Template {
    template!(
        "UPDATE " {el::update(model)} " SET " {el::set(model, record.clone())}
        " WHERE " {el::where_record(model, record)}
    )
}

pub fn update_deferred(model: &Arc<Model>) -> Template {
    template!(
        "UPDATE " {el::update(model)} " SET " {el::set_deferred(model)}
        " WHERE " {el::where_deferred(model)}
    )
}

pub fn delete(model: &Arc<Model>, id: impl Into<Value>) -> Template {
    template!("DELETE FROM " {el::delete(model)} " WHERE " {el::where_id(model, id)})
}

/// DELETE by key, checking the version when the model has one.
pub fn delete_record(model: &Arc<Model>, record: ValueRecord) -> Template {
    template!("DELETE FROM " {el::delete(model)} " WHERE " {el::where_record(model, record)})
}

/// Insert-or-update in one statement.
///
/// `INSERT ... ON DUPLICATE KEY UPDATE` / `ON CONFLICT` dialects append the
/// conflict clause to a regular INSERT. MERGE dialects take a single row.
pub fn upsert(dialect: &Dialect, model: &Arc<Model>, source: RecordSource) -> Result<Template> {
    if dialect.upsert_syntax() == UpsertSyntax::Merge {
        return merge(dialect, model, source);
    }

    let clause = dialect.conflict_clause(model)?;
    let insert = template!(
        "INSERT INTO " {el::insert(model)} " VALUES " {Element::Values(model.clone(), source)}
    );

    Ok(Template::combine(insert, "\n", clause.template))
}

fn merge(dialect: &Dialect, model: &Arc<Model>, source: RecordSource) -> Result<Template> {
    let q = |column: &Column| dialect.quote_identifier(&column.name);

    let on = model
        .primary_key_columns()
        .map(|column| format!("dst.{0} = src.{0}", q(column)))
        .collect::<Vec<_>>()
        .join(" AND ");

    let t = template!(
        "MERGE INTO " {el::update(model)} " dst USING ("
        {Element::SourceRow(model.clone(), source)} ") src ON (" {el::unsafe_sql(on)} ")"
    );

    let mut assignments: Vec<Template> = model
        .columns
        .iter()
        .filter(|column| !column.primary_key && column.updatable && !column.version)
        .map(|column| Template::raw(format!("dst.{0} = src.{0}", q(column))))
        .collect();

    if let Some(version) = model.version_column() {
        let mut b = Template::builder();
        b.push_str(&format!("dst.{} = ", q(version)));
        b.push(el::version_increment(model, Some("dst")));
        assignments.push(b.build());
    }

    let t = Template::combine(
        t,
        "\nWHEN MATCHED THEN UPDATE SET ",
        Template::join(assignments, ", "),
    );

    let inserted: Vec<&Column> = model
        .columns
        .iter()
        .filter(|column| column.insertable && !column.is_identity())
        .collect();

    let names = inserted.iter().map(|&column| q(column)).collect::<Vec<_>>();
    let values = inserted
        .iter()
        .map(|&column| match column.sequence() {
            Some(sequence) => dialect.sequence_next_value(sequence),
            None => Ok(format!("src.{}", q(column))),
        })
        .collect::<Result<Vec<_>>>()?;

    let not_matched = Template::raw(format!(
        "\nWHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
        names.join(", "),
        values.join(", ")
    ));

    Ok(Template::combine(t, "", not_matched))
}
