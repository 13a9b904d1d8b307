mod keywords;

use crate::template::{el, Template};

use std::{fmt::Write, sync::Arc};
use tempest_core::{
    driver::Flavor,
    schema::{Column, Model, TableName},
    Error, Result,
};

/// SQL syntax facts of one database.
///
/// Every operation is pure. The compiler asks the dialect for each
/// database-specific decision and stays dialect-agnostic itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    flavor: Flavor,

    /// Quote every identifier, not only the ones that need it
    quote_all: bool,
}

/// How a dialect expresses insert-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertSyntax {
    /// `INSERT ... ON DUPLICATE KEY UPDATE`
    OnDuplicateKey,

    /// `INSERT ... ON CONFLICT (...) DO UPDATE SET` / `DO NOTHING`
    OnConflict,

    /// `MERGE INTO ... USING ...`
    Merge,
}

/// The tail appended to an INSERT to make it an upsert.
#[derive(Debug, Clone)]
pub struct ConflictClause {
    pub template: Template,

    /// The clause increments the version column.
    pub version_aware: bool,
}

impl Dialect {
    pub const fn new(flavor: Flavor) -> Dialect {
        Dialect {
            flavor,
            quote_all: false,
        }
    }

    pub const fn mysql() -> Dialect {
        Dialect::new(Flavor::Mysql)
    }

    pub const fn postgresql() -> Dialect {
        Dialect::new(Flavor::Postgresql)
    }

    pub const fn sqlite() -> Dialect {
        Dialect::new(Flavor::Sqlite)
    }

    pub const fn oracle() -> Dialect {
        Dialect::new(Flavor::Oracle)
    }

    pub const fn h2() -> Dialect {
        Dialect::new(Flavor::H2)
    }

    pub const fn with_quote_all(mut self, quote_all: bool) -> Dialect {
        self.quote_all = quote_all;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn quote_char(&self) -> char {
        match self.flavor {
            Flavor::Mysql => '`',
            _ => '"',
        }
    }

    /// Quotes `name` when it needs it: special characters, a leading digit, a
    /// reserved word, or when quoting is forced for every identifier.
    pub fn quote_identifier(&self, name: &str) -> String {
        if !self.needs_quote(name) {
            return name.to_string();
        }

        let q = self.quote_char();
        let mut ret = String::with_capacity(name.len() + 2);
        ret.push(q);
        for c in name.chars() {
            if c == q {
                ret.push(q);
            }
            ret.push(c);
        }
        ret.push(q);
        ret
    }

    fn needs_quote(&self, name: &str) -> bool {
        if self.quote_all {
            return true;
        }

        let mut chars = name.chars();
        match chars.next() {
            None => true,
            Some(c) if c.is_ascii_digit() => true,
            Some(_) if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => true,
            Some(_) => self.is_keyword(name),
        }
    }

    /// Quotes each part of a possibly schema-qualified table name.
    pub fn quote_table(&self, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(&table.name)
            ),
            None => self.quote_identifier(&table.name),
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        keywords::is_reserved(word)
    }

    /// Writes the placeholder of the `n`th (1-based) parameter.
    pub fn write_placeholder(&self, dst: &mut String, n: usize) {
        match self.flavor {
            Flavor::Postgresql => {
                let _ = write!(dst, "${n}");
            }
            _ => dst.push('?'),
        }
    }

    /// Builds the LIMIT/OFFSET clause. Returns an empty template when neither
    /// is set.
    pub fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> Template {
        let sql = match self.flavor {
            Flavor::Mysql | Flavor::Postgresql | Flavor::Sqlite => match (limit, offset) {
                (None, None) => String::new(),
                (Some(n), None) => format!("LIMIT {n}"),
                (Some(n), Some(m)) => format!("LIMIT {n} OFFSET {m}"),
                (None, Some(m)) => match self.flavor {
                    Flavor::Mysql => format!("LIMIT {} OFFSET {m}", u64::MAX),
                    Flavor::Sqlite => format!("LIMIT -1 OFFSET {m}"),
                    _ => format!("OFFSET {m}"),
                },
            },
            Flavor::Oracle | Flavor::H2 => match (limit, offset) {
                (None, None) => String::new(),
                (Some(n), None) => format!("FETCH FIRST {n} ROWS ONLY"),
                (Some(n), Some(m)) => format!("OFFSET {m} ROWS FETCH NEXT {n} ROWS ONLY"),
                (None, Some(m)) => format!("OFFSET {m} ROWS"),
            },
        };

        Template::raw(sql)
    }

    pub fn upsert_syntax(&self) -> UpsertSyntax {
        match self.flavor {
            Flavor::Mysql => UpsertSyntax::OnDuplicateKey,
            Flavor::Postgresql | Flavor::Sqlite => UpsertSyntax::OnConflict,
            Flavor::Oracle | Flavor::H2 => UpsertSyntax::Merge,
        }
    }

    /// Builds the upsert tail for an INSERT into `model`.
    ///
    /// Every non-key updatable column takes the inserted value and the
    /// version column is incremented. A model with nothing to update gets
    /// the dialect's explicit no-op, never an empty assignment list. MERGE
    /// dialects have no tail; see [`crate::builder::upsert`].
    pub fn conflict_clause(&self, model: &Arc<Model>) -> Result<ConflictClause> {
        let table = model.table_name()?;

        let keys: Vec<&Column> = model.primary_key_columns().collect();
        if keys.is_empty() {
            return Err(Error::sql_template(format!(
                "cannot upsert `{}`: model has no primary key",
                model.name()
            )));
        }

        let assigned: Vec<&Column> = model
            .columns
            .iter()
            .filter(|column| !column.primary_key && column.updatable && !column.version)
            .collect();

        let version = model.version_column();
        if let Some(version) = version {
            // Fails early for unsupported version types
            self.version_increment(&table.name, version)?;
        }

        let mut assignments = vec![];

        let template = match self.upsert_syntax() {
            UpsertSyntax::OnDuplicateKey => {
                if let [key] = &keys[..] {
                    if key.is_identity() {
                        let key = self.quote_identifier(&key.name);
                        assignments.push(Template::raw(format!(
                            "{key} = LAST_INSERT_ID({key})"
                        )));
                    }
                }

                for column in &assigned {
                    let name = self.quote_identifier(&column.name);
                    assignments.push(Template::raw(format!("{name} = VALUES({name})")));
                }

                if let Some(version) = version {
                    assignments.push(self.version_assignment(model, version));
                }

                if assignments.is_empty() {
                    // MySQL has no DO NOTHING; assign the key to itself
                    let key = self.quote_identifier(&keys[0].name);
                    assignments.push(Template::raw(format!("{key} = {key}")));
                }

                Template::combine(
                    Template::raw("ON DUPLICATE KEY UPDATE "),
                    "",
                    Template::join(assignments, ", "),
                )
            }
            UpsertSyntax::OnConflict => {
                let target = keys
                    .iter()
                    .map(|column| self.quote_identifier(&column.name))
                    .collect::<Vec<_>>()
                    .join(", ");

                for column in &assigned {
                    let name = self.quote_identifier(&column.name);
                    assignments.push(Template::raw(format!("{name} = EXCLUDED.{name}")));
                }

                if let Some(version) = version {
                    assignments.push(self.version_assignment(model, version));
                }

                if assignments.is_empty() {
                    Template::raw(format!("ON CONFLICT ({target}) DO NOTHING"))
                } else {
                    Template::combine(
                        Template::raw(format!("ON CONFLICT ({target}) DO UPDATE SET ")),
                        "",
                        Template::join(assignments, ", "),
                    )
                }
            }
            UpsertSyntax::Merge => {
                return Err(Error::unsupported_feature(format!(
                    "{} upserts with MERGE and has no conflict clause",
                    self.flavor.name()
                )));
            }
        };

        Ok(ConflictClause {
            template,
            version_aware: version.is_some(),
        })
    }

    fn version_assignment(&self, model: &Arc<Model>, version: &Column) -> Template {
        let mut b = Template::builder();
        b.push_str(&self.quote_identifier(&version.name));
        b.push_str(" = ");
        b.push(el::version_increment(model, None));
        b.build()
    }

    /// The next value of a version column.
    ///
    /// Integer versions count up from the current value; temporal versions
    /// take the current time. Any other type is a configuration error.
    pub fn version_increment(&self, qualifier: &str, column: &Column) -> Result<Template> {
        if column.ty.is_integer() {
            Ok(Template::raw(format!(
                "{}.{} + 1",
                self.quote_identifier(qualifier),
                self.quote_identifier(&column.name)
            )))
        } else if matches!(
            column.ty,
            tempest_core::stmt::Type::Timestamp | tempest_core::stmt::Type::DateTime
        ) {
            Ok(Template::raw("CURRENT_TIMESTAMP"))
        } else {
            Err(Error::sql_template(format!(
                "Unsupported version type {} for column `{}`",
                column.ty, column.name
            )))
        }
    }

    /// Expression drawing the next value from a sequence.
    pub fn sequence_next_value(&self, sequence: &str) -> Result<String> {
        let name = self.quote_identifier(sequence);
        match self.flavor {
            Flavor::Postgresql => Ok(format!("nextval('{}')", name.replace('\'', "''"))),
            Flavor::Oracle => Ok(format!("{name}.NEXTVAL")),
            Flavor::H2 => Ok(format!("NEXT VALUE FOR {name}")),
            Flavor::Mysql | Flavor::Sqlite => Err(Error::unsupported_feature(format!(
                "{} has no sequences",
                self.flavor.name()
            ))),
        }
    }

    /// Largest number of values accepted in one `IN` list.
    pub fn max_in_list(&self) -> usize {
        match self.flavor {
            Flavor::Mysql | Flavor::H2 => 65535,
            Flavor::Postgresql => 32767,
            Flavor::Sqlite => 32766,
            Flavor::Oracle => 1000,
        }
    }
}
