use super::{Generation, Model};
use crate::stmt::Type;

use std::sync::Arc;

/// A declared field of a model, before column expansion.
#[derive(Debug, Clone)]
pub struct Field {
    /// Position of the field in the model's record value
    pub index: usize,

    pub name: String,

    pub ty: FieldTy,

    pub primary_key: bool,

    pub nullable: bool,

    pub insertable: bool,

    pub updatable: bool,

    pub version: bool,

    pub json: bool,

    pub generation: Generation,

    /// Column name of a primitive field
    pub column: String,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    /// A single column
    Primitive(Type),

    /// The fields of another model stored in this model's table
    Inline(Arc<Model>),

    /// A reference to another entity by its primary key
    ForeignKey(ForeignKey),
}

#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub target: Arc<Model>,

    /// Column names holding the target's key, one per target key column
    pub columns: Vec<String>,

    /// The field holds a reference fetched on demand instead of a joined
    /// record.
    pub lazy: bool,
}

impl Field {
    pub fn is_primitive(&self) -> bool {
        matches!(self.ty, FieldTy::Primitive(_))
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        match &self.ty {
            FieldTy::ForeignKey(fk) => Some(fk),
            _ => None,
        }
    }
}

/// Declares one field when building a [`Model`].
///
/// ```
/// # use tempest_core::{schema::FieldDef, stmt::Type, Model};
/// let vet = Model::builder("vet")
///     .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
///     .field(FieldDef::primitive("first_name", Type::String))
///     .field(FieldDef::primitive("last_name", Type::String))
///     .build()
///     .unwrap();
///
/// assert_eq!(vet.columns.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub(super) name: String,
    pub(super) ty: FieldTy,
    pub(super) column: Option<String>,
    pub(super) primary_key: bool,
    pub(super) nullable: bool,
    pub(super) insertable: bool,
    pub(super) updatable: bool,
    pub(super) version: bool,
    pub(super) json: bool,
    pub(super) generation: Generation,
    pub(super) fk_columns: Option<Vec<String>>,
    pub(super) lazy: bool,
}

impl FieldDef {
    fn new(name: impl Into<String>, ty: FieldTy) -> FieldDef {
        FieldDef {
            name: name.into(),
            ty,
            column: None,
            primary_key: false,
            nullable: false,
            insertable: true,
            updatable: true,
            version: false,
            json: false,
            generation: Generation::None,
            fk_columns: None,
            lazy: false,
        }
    }

    pub fn primitive(name: impl Into<String>, ty: Type) -> FieldDef {
        FieldDef::new(name, FieldTy::Primitive(ty))
    }

    pub fn inline(name: impl Into<String>, model: Arc<Model>) -> FieldDef {
        FieldDef::new(name, FieldTy::Inline(model))
    }

    pub fn foreign_key(name: impl Into<String>, target: Arc<Model>) -> FieldDef {
        FieldDef::new(
            name,
            FieldTy::ForeignKey(ForeignKey {
                target,
                columns: vec![],
                lazy: false,
            }),
        )
    }

    /// Overrides the column name, which defaults to the field name.
    pub fn column(mut self, name: impl Into<String>) -> FieldDef {
        self.column = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> FieldDef {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> FieldDef {
        self.generation = Generation::Identity;
        self
    }

    pub fn sequence(mut self, name: impl Into<String>) -> FieldDef {
        self.generation = Generation::Sequence(name.into());
        self
    }

    pub fn version(mut self) -> FieldDef {
        self.version = true;
        self
    }

    pub fn nullable(mut self) -> FieldDef {
        self.nullable = true;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> FieldDef {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> FieldDef {
        self.updatable = updatable;
        self
    }

    pub fn json(mut self) -> FieldDef {
        self.json = true;
        self
    }

    /// Column names of a foreign key, one per target key column.
    pub fn columns<I>(mut self, names: I) -> FieldDef
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.fk_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// The foreign key is exposed as a lazily fetched reference.
    pub fn lazy(mut self) -> FieldDef {
        self.lazy = true;
        self
    }
}
