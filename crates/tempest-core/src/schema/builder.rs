use super::{Column, Field, FieldDef, FieldTy, ForeignKey, Generation, Model, ModelKind, TableName};
use crate::{Error, Result};

use std::sync::Arc;

/// Builds a [`Model`] from field declarations.
#[derive(Debug)]
pub struct ModelBuilder {
    kind: ModelKind,
    table: Option<TableName>,
    fields: Vec<FieldDef>,
}

/// Flags an owning field passes down to the columns it expands into.
#[derive(Clone, Copy)]
struct Inherited {
    primary_key: bool,
    nullable: bool,
    insertable: bool,
    updatable: bool,
}

impl ModelBuilder {
    pub(super) fn new(kind: ModelKind, table: Option<TableName>) -> ModelBuilder {
        ModelBuilder {
            kind,
            table,
            fields: vec![],
        }
    }

    pub fn field(mut self, field: FieldDef) -> ModelBuilder {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<Arc<Model>> {
        let model_name = self
            .table
            .as_ref()
            .map(|table| table.name.clone())
            .unwrap_or_else(|| "<inline>".to_string());

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut primary_key = None;

        for (index, def) in self.fields.into_iter().enumerate() {
            let field = build_field(&model_name, self.kind, index, def)?;

            if field.primary_key {
                if primary_key.is_some() {
                    return Err(Error::sql_template(format!(
                        "model `{model_name}` declares more than one primary key field; \
                         use an inline record for a composite key"
                    )));
                }
                primary_key = Some(index);
            }

            fields.push(field);
        }

        if self.kind == ModelKind::Entity && primary_key.is_none() {
            return Err(Error::sql_template(format!(
                "entity `{model_name}` has no primary key"
            )));
        }

        let mut columns = vec![];
        for field in &fields {
            expand_field(field, &mut columns)?;
        }

        for (i, column) in columns.iter_mut().enumerate() {
            column.index = i + 1;
        }

        if columns.iter().filter(|column| column.version).count() > 1 {
            return Err(Error::sql_template(format!(
                "model `{model_name}` declares more than one version column"
            )));
        }

        Ok(Arc::new(Model {
            kind: self.kind,
            table: self.table,
            fields,
            columns,
            primary_key,
        }))
    }
}

fn build_field(model_name: &str, kind: ModelKind, index: usize, def: FieldDef) -> Result<Field> {
    let name = def.name;

    let ty = match def.ty {
        FieldTy::Inline(_) if def.json => {
            return Err(Error::sql_template(format!(
                "field `{model_name}.{name}` cannot be both inline and json"
            )));
        }
        FieldTy::ForeignKey(fk) => {
            let target = fk.target;

            if target.kind == ModelKind::Inline {
                return Err(Error::sql_template(format!(
                    "foreign key `{model_name}.{name}` targets an inline model"
                )));
            }

            let key_columns: Vec<_> = target.primary_key_columns().collect();
            if key_columns.is_empty() {
                return Err(Error::sql_template(format!(
                    "foreign key `{model_name}.{name}` targets `{}`, which has no primary key",
                    target.name()
                )));
            }

            if kind == ModelKind::Inline && !def.lazy {
                return Err(Error::sql_template(format!(
                    "foreign key `{model_name}.{name}` inside an inline model must be lazy"
                )));
            }

            let columns = match def.fk_columns {
                Some(columns) => columns,
                None if key_columns.len() == 1 => vec![format!("{name}_id")],
                None => key_columns
                    .iter()
                    .map(|column| format!("{name}_{}", column.name))
                    .collect(),
            };

            if columns.len() != key_columns.len() {
                return Err(Error::sql_template(format!(
                    "foreign key `{model_name}.{name}` names {} columns but `{}` has {} key columns",
                    columns.len(),
                    target.name(),
                    key_columns.len()
                )));
            }

            FieldTy::ForeignKey(ForeignKey {
                target,
                columns,
                lazy: def.lazy,
            })
        }
        ty => ty,
    };

    if def.generation != Generation::None {
        if !def.primary_key {
            return Err(Error::sql_template(format!(
                "field `{model_name}.{name}` is generated but not a primary key"
            )));
        }
        if !matches!(ty, FieldTy::Primitive(_)) {
            return Err(Error::sql_template(format!(
                "generated key `{model_name}.{name}` must be a single column"
            )));
        }
    }

    if def.version && !matches!(ty, FieldTy::Primitive(_)) {
        return Err(Error::sql_template(format!(
            "version field `{model_name}.{name}` must be a single column"
        )));
    }

    if def.version && def.primary_key {
        return Err(Error::sql_template(format!(
            "field `{model_name}.{name}` cannot be both a primary key and a version"
        )));
    }

    let column = def.column.unwrap_or_else(|| name.clone());

    Ok(Field {
        index,
        name,
        ty,
        primary_key: def.primary_key,
        nullable: def.nullable,
        insertable: def.insertable,
        updatable: def.updatable,
        version: def.version,
        json: def.json,
        generation: def.generation,
        column,
    })
}

fn expand_field(field: &Field, columns: &mut Vec<Column>) -> Result<()> {
    let inherited = Inherited {
        primary_key: field.primary_key,
        nullable: field.nullable,
        insertable: field.insertable,
        updatable: field.updatable,
    };

    match &field.ty {
        FieldTy::Primitive(ty) => columns.push(Column {
            index: 0,
            name: field.column.clone(),
            ty: if field.json {
                crate::stmt::Type::Json
            } else {
                *ty
            },
            primary_key: field.primary_key,
            foreign_key: false,
            nullable: field.nullable,
            insertable: field.insertable,
            updatable: field.updatable,
            version: field.version,
            lazy: false,
            json: field.json,
            generation: field.generation.clone(),
            path: vec![field.index],
        }),
        FieldTy::Inline(model) => {
            for column in &model.columns {
                columns.push(inherit(column, field.index, &column.path, inherited));
            }
        }
        FieldTy::ForeignKey(fk) => {
            for (name, key) in fk.columns.iter().zip(fk.target.primary_key_columns()) {
                // A lazy field holds the key itself, an eager one the whole
                // target record.
                let within = if fk.lazy { &key.path[1..] } else { &key.path[..] };

                let mut column = inherit(key, field.index, within, inherited);
                column.name = name.clone();
                column.foreign_key = true;
                column.lazy = fk.lazy;
                column.generation = Generation::None;
                column.version = false;
                columns.push(column);
            }
        }
    }

    Ok(())
}

fn inherit(column: &Column, field: usize, within: &[usize], inherited: Inherited) -> Column {
    let mut path = Vec::with_capacity(within.len() + 1);
    path.push(field);
    path.extend_from_slice(within);

    Column {
        index: 0,
        name: column.name.clone(),
        ty: column.ty,
        primary_key: inherited.primary_key,
        foreign_key: column.foreign_key,
        nullable: inherited.nullable || column.nullable,
        insertable: inherited.insertable && column.insertable,
        updatable: inherited.updatable && column.updatable,
        version: column.version,
        lazy: column.lazy,
        json: column.json,
        generation: column.generation.clone(),
        path,
    }
}
