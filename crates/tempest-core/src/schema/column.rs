use crate::stmt::Type;

/// One physical column of a model, after inline and foreign-key expansion.
///
/// Columns compare structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// 1-based position within the owning model's expanded column list
    pub index: usize,

    pub name: String,

    pub ty: Type,

    pub primary_key: bool,

    pub foreign_key: bool,

    pub nullable: bool,

    pub insertable: bool,

    pub updatable: bool,

    pub version: bool,

    /// The column belongs to a lazily fetched reference.
    pub lazy: bool,

    /// The column stores a JSON document.
    pub json: bool,

    pub generation: Generation,

    /// Field indexes leading from the record value to this column's value.
    pub path: Vec<usize>,
}

/// How the database assigns a column's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Generation {
    #[default]
    None,

    /// Auto-increment / identity column
    Identity,

    /// Value drawn from the named sequence
    Sequence(String),
}

impl Column {
    /// The database assigns this key column.
    pub fn is_generated(&self) -> bool {
        self.primary_key && self.generation != Generation::None
    }

    pub fn is_identity(&self) -> bool {
        self.generation == Generation::Identity
    }

    pub fn sequence(&self) -> Option<&str> {
        match &self.generation {
            Generation::Sequence(name) => Some(name),
            _ => None,
        }
    }
}
