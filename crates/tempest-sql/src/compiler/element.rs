use super::{Comma, Formatter, Ident, Qualified, ToSql};
use crate::{
    statement::BindSlot,
    template::{ColumnRef, Element, Param, Predicate, RecordSource, TableRef, Template},
};

use std::sync::Arc;
use tempest_core::{
    driver::Flavor,
    err,
    schema::Column,
    stmt::Value,
    Error, Model, Result,
};

impl Formatter<'_> {
    pub(super) fn element(&mut self, index: usize, element: &Element) -> Result<()> {
        match element {
            Element::Table(r) => self.table(index, r),
            Element::From(r) => self.from(index, r),
            Element::Alias(r) => self.alias(r),
            Element::Column(c) => self.column_ref(c),
            Element::Param(p) => self.param(p),
            Element::BindVar(name) => {
                self.deferred(BindSlot::Named(name.clone()));
                Ok(())
            }
            Element::Template(_) => Err(err!("nested template left after flattening")),
            Element::Unsafe(sql) => {
                self.dst.push_str(sql);
                Ok(())
            }
            Element::Select(model) => self.select(model),
            Element::Insert(model) => self.insert(model),
            Element::Values(model, source) => self.values(model, source),
            Element::Update(model) | Element::Delete(model) => self.target(model),
            Element::Set(model, source) => self.set(model, source),
            Element::Where(model, predicate) => self.predicate(model, predicate),
            Element::SourceRow(model, source) => self.source_row(model, source),
            Element::VersionIncrement { model, qualifier } => {
                self.version_increment(model, qualifier.as_deref())
            }
        }
    }

    fn table(&mut self, index: usize, r: &TableRef) -> Result<()> {
        let name = self.dialect().quote_table(r.model.table_name()?);

        if self.aliased {
            let scope = self.scope;
            let entry = scope.element_entry(index)?;
            fmt!(self, name, " ", &entry.alias);
        } else {
            fmt!(self, name);
            if let Some(alias) = &r.alias {
                fmt!(self, " ", alias);
            }
        }

        Ok(())
    }

    fn from(&mut self, index: usize, r: &TableRef) -> Result<()> {
        self.table(index, r)?;

        let scope = self.scope;
        let Some((plan, tables)) = &scope.element_entry(index)?.plan else {
            return Ok(());
        };

        for (i, join) in plan.joins.iter().enumerate() {
            let child = &scope.entries[tables[i + 1]];
            let parent = &scope.entries[tables[join.parent]];

            let kind = if join.nullable {
                "LEFT JOIN"
            } else {
                "INNER JOIN"
            };
            let table = self.dialect().quote_table(&child.table);

            fmt!(self, "\n", kind, " ", table, " ", &child.alias, " ON ");

            let mut s = "";
            for (fk, pk) in &join.on {
                fmt!(
                    self,
                    s,
                    Qualified(Some(parent.alias.as_str()), fk),
                    " = ",
                    Qualified(Some(child.alias.as_str()), pk),
                );
                s = " AND ";
            }
        }

        Ok(())
    }

    fn alias(&mut self, r: &TableRef) -> Result<()> {
        match self.qualifier(r)? {
            Some(alias) => fmt!(self, alias),
            None => {
                let name = self.dialect().quote_table(r.model.table_name()?);
                fmt!(self, name);
            }
        }
        Ok(())
    }

    /// How columns of `r` are qualified: by alias in a SELECT, otherwise only
    /// when an alias was given explicitly.
    fn qualifier(&self, r: &TableRef) -> Result<Option<String>> {
        if self.aliased {
            Ok(Some(self.scope.resolve(r)?.to_string()))
        } else {
            Ok(r.alias.clone())
        }
    }

    fn column_ref(&mut self, c: &ColumnRef) -> Result<()> {
        let column = lookup_column(&c.table.model, &c.name)?;
        let qualifier = self.qualifier(&c.table)?;
        fmt!(self, Qualified(qualifier.as_deref(), &column.name));
        Ok(())
    }

    fn param(&mut self, p: &Param) -> Result<()> {
        let Value::List(items) = &p.value else {
            self.bound(p.name.as_deref(), p.value.clone());
            return Ok(());
        };

        let name = p.name.as_deref().unwrap_or("?");
        if items.is_empty() {
            return Err(Error::sql_template(format!(
                "IN list for parameter `{name}` is empty"
            )));
        }
        self.check_in_list(items.len())?;

        fmt!(self, "(");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                fmt!(self, ", ");
            }
            self.bound(p.name.as_deref(), item.clone());
        }
        fmt!(self, ")");

        Ok(())
    }

    fn check_in_list(&self, len: usize) -> Result<()> {
        let max = self.dialect().max_in_list();
        if len > max {
            return Err(Error::sql_template(format!(
                "IN list of {len} values exceeds the {} maximum of {max}",
                self.dialect().flavor().name()
            )));
        }
        Ok(())
    }

    fn select(&mut self, model: &Arc<Model>) -> Result<()> {
        let scope = self.scope;
        let entry = scope.from_entry(model.table_name()?)?;
        let Some((plan, tables)) = &entry.plan else {
            return Err(err!("`{}` has no select plan", model.name()));
        };

        let columns = plan.columns.iter().map(|column| {
            let alias = &scope.entries[tables[column.table]].alias;
            Qualified(Some(alias.as_str()), &column.column.name)
        });

        fmt!(self, Comma(columns));
        Ok(())
    }

    fn target(&mut self, model: &Arc<Model>) -> Result<()> {
        let name = self.dialect().quote_table(model.table_name()?);
        fmt!(self, name);
        Ok(())
    }

    fn insert(&mut self, model: &Arc<Model>) -> Result<()> {
        let columns = insert_columns(model);
        if columns.is_empty() {
            return Err(Error::sql_template(format!(
                "`{}` has no insertable columns",
                model.name()
            )));
        }

        self.target(model)?;
        fmt!(
            self,
            " (",
            Comma(columns.iter().map(|column| Ident(&column.name))),
            ")",
        );

        self.track_generated_keys(model);
        Ok(())
    }

    /// Records the key columns the database assigns on insert.
    fn track_generated_keys(&mut self, model: &Model) {
        self.generated_keys = model
            .primary_key_columns()
            .filter(|column| column.is_generated())
            .map(|column| column.name.clone())
            .collect();
    }

    fn values(&mut self, model: &Arc<Model>, source: &RecordSource) -> Result<()> {
        let columns = insert_columns(model);

        let rows = match source {
            RecordSource::Records(records) if records.is_empty() => {
                return Err(Error::sql_template(format!(
                    "no records to insert into `{}`",
                    model.name()
                )));
            }
            RecordSource::Records(records) => records
                .iter()
                .map(|record| model.column_values(record).map(Some))
                .collect::<Result<Vec<_>>>()?,
            RecordSource::Deferred => vec![None],
        };

        for (i, values) in rows.iter().enumerate() {
            if i > 0 {
                fmt!(self, ", ");
            }

            fmt!(self, "(");
            for (j, column) in columns.iter().enumerate() {
                if j > 0 {
                    fmt!(self, ", ");
                }

                match column.sequence() {
                    Some(sequence) => {
                        let next = self.dialect().sequence_next_value(sequence)?;
                        fmt!(self, next);
                    }
                    None => self.column_value(model, column, values.as_deref()),
                }
            }
            fmt!(self, ")");
        }

        Ok(())
    }

    fn set(&mut self, model: &Arc<Model>, source: &RecordSource) -> Result<()> {
        let values = single_row(model, source, "SET")?;
        let table = model.table_name()?;

        let mut s = "";
        for column in &model.columns {
            if column.primary_key {
                continue;
            }

            if column.version {
                let increment = self.dialect().version_increment(&table.name, column)?;
                fmt!(self, s, Ident(&column.name), " = ", raw_sql(&increment)?);
                self.version_aware = true;
            } else if column.updatable {
                fmt!(self, s, Ident(&column.name), " = ");
                self.column_value(model, column, values.as_deref());
            } else {
                continue;
            }

            s = ", ";
        }

        if s.is_empty() {
            return Err(Error::sql_template(format!(
                "empty SET list: `{}` has no updatable columns",
                model.name()
            )));
        }

        Ok(())
    }

    fn predicate(&mut self, model: &Arc<Model>, predicate: &Predicate) -> Result<()> {
        let qualifier = self.qualifier(&TableRef::new(model))?;
        let q = qualifier.as_deref();

        let keys: Vec<&Column> = model.primary_key_columns().collect();
        if keys.is_empty() {
            return Err(Error::sql_template(format!(
                "cannot match `{}` by key: model has no primary key",
                model.name()
            )));
        }

        match predicate {
            Predicate::Record(record) => {
                let values = model.column_values(record)?;
                self.record_predicate(model, q, &keys, Some(&values))?;
            }
            Predicate::Deferred => self.record_predicate(model, q, &keys, None)?,
            Predicate::Id(id) => {
                let values = model.key_column_values(id)?;
                self.key_predicate(q, &keys, values)?;
            }
            Predicate::Ids(ids) if ids.is_empty() => fmt!(self, "1 = 0"),
            Predicate::Ids(ids) => {
                self.check_in_list(ids.len())?;

                let keyed = ids
                    .iter()
                    .map(|id| model.key_column_values(id))
                    .collect::<Result<Vec<_>>>()?;

                if let [key] = &keys[..] {
                    fmt!(self, Qualified(q, &key.name), " IN (");
                    for (i, mut values) in keyed.into_iter().enumerate() {
                        if i > 0 {
                            fmt!(self, ", ");
                        }
                        self.bound(Some(&key.name), values.swap_remove(0));
                    }
                    fmt!(self, ")");
                } else {
                    fmt!(self, "(");
                    for (i, values) in keyed.into_iter().enumerate() {
                        if i > 0 {
                            fmt!(self, " OR ");
                        }
                        fmt!(self, "(");
                        self.key_predicate(q, &keys, values)?;
                        fmt!(self, ")");
                    }
                    fmt!(self, ")");
                }
            }
        }

        Ok(())
    }

    /// Matches the key columns, and the version column when the model has
    /// one.
    fn record_predicate(
        &mut self,
        model: &Arc<Model>,
        q: Option<&str>,
        keys: &[&Column],
        values: Option<&[Value]>,
    ) -> Result<()> {
        let version = model.version_column();

        let mut s = "";
        for column in keys.iter().copied().chain(version) {
            fmt!(self, s, Qualified(q, &column.name), " = ");
            self.column_value(model, column, values);
            s = " AND ";
        }

        if version.is_some() {
            self.version_aware = true;
        }

        Ok(())
    }

    fn key_predicate(
        &mut self,
        q: Option<&str>,
        keys: &[&Column],
        values: Vec<Value>,
    ) -> Result<()> {
        let mut s = "";
        for (column, value) in keys.iter().zip(values) {
            fmt!(self, s, Qualified(q, &column.name), " = ");
            self.bound(Some(&column.name), value);
            s = " AND ";
        }
        Ok(())
    }

    fn source_row(&mut self, model: &Arc<Model>, source: &RecordSource) -> Result<()> {
        let values = single_row(model, source, "MERGE source row")?;

        fmt!(self, "SELECT ");
        let mut s = "";
        for column in source_columns(model) {
            fmt!(self, s);
            self.column_value(model, column, values.as_deref());
            fmt!(self, " AS ", Ident(&column.name));
            s = ", ";
        }

        if self.dialect().flavor() == Flavor::Oracle {
            fmt!(self, " FROM dual");
        }

        self.track_generated_keys(model);
        Ok(())
    }

    fn version_increment(&mut self, model: &Arc<Model>, qualifier: Option<&str>) -> Result<()> {
        let column = model.version_column().ok_or_else(|| {
            Error::sql_template(format!("`{}` has no version column", model.name()))
        })?;

        let table = model.table_name()?;
        let increment = self
            .dialect()
            .version_increment(qualifier.unwrap_or(&table.name), column)?;

        fmt!(self, raw_sql(&increment)?);
        self.version_aware = true;
        Ok(())
    }

    /// Binds one column of a record: its value when known, a deferred slot
    /// otherwise.
    fn column_value(&mut self, model: &Arc<Model>, column: &Column, values: Option<&[Value]>) {
        match values {
            Some(values) => {
                let value = values.get(column.index - 1).cloned().unwrap_or_default();
                self.bound(Some(&column.name), value);
            }
            None => self.deferred(BindSlot::Column {
                model: model.clone(),
                column: column.clone(),
            }),
        }
    }
}

/// Columns an INSERT lists: insertable ones, minus identity keys.
pub(crate) fn insert_columns(model: &Model) -> Vec<&Column> {
    model
        .columns
        .iter()
        .filter(|column| column.insertable && !column.is_identity())
        .collect()
}

/// Columns a MERGE source row carries.
pub(crate) fn source_columns(model: &Model) -> impl Iterator<Item = &Column> + '_ {
    model.columns.iter().filter(|column| {
        column.primary_key || column.insertable || column.updatable || column.version
    })
}

/// Finds a column by column name, or by the name of a field that maps to a
/// single column.
fn lookup_column<'a>(model: &'a Model, name: &str) -> Result<&'a Column> {
    if let Some(column) = model.column(name) {
        return Ok(column);
    }

    let by_field = model.field(name).and_then(|field| {
        let mut columns = model
            .columns
            .iter()
            .filter(|column| column.path[0] == field.index);
        match (columns.next(), columns.next()) {
            (Some(column), None) => Some(column),
            _ => None,
        }
    });

    by_field.ok_or_else(|| {
        Error::sql_template(format!(
            "unknown column `{name}` in table `{}`",
            model.name()
        ))
    })
}

fn single_row(
    model: &Model,
    source: &RecordSource,
    clause: &str,
) -> Result<Option<Vec<Value>>> {
    match source {
        RecordSource::Records(records) => match &records[..] {
            [record] => model.column_values(record).map(Some),
            _ => Err(Error::sql_template(format!(
                "{clause} for `{}` takes exactly one record, got {}",
                model.name(),
                records.len()
            ))),
        },
        RecordSource::Deferred => Ok(None),
    }
}

/// SQL text of a template without elements.
fn raw_sql(template: &Template) -> Result<String> {
    if !template.elements().is_empty() {
        return Err(err!("expected SQL text, found a template with elements"));
    }
    Ok(template.fragments().concat())
}
