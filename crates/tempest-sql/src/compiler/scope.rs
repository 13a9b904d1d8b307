use crate::{
    template::{Element, TableRef},
    Dialect,
};

use std::collections::{HashMap, HashSet};
use tempest_core::{
    schema::{SelectPlan, TableName},
    Error, Result,
};

/// Tables visible in one statement and the aliases assigned to them.
#[derive(Debug, Default)]
pub(super) struct Scope {
    pub(super) entries: Vec<Entry>,

    /// Entry registered by the `Table` / `From` element at a given position
    by_element: HashMap<usize, usize>,
}

#[derive(Debug)]
pub(super) struct Entry {
    pub(super) table: TableName,
    pub(super) alias: String,

    /// Added by a `From` element for an eagerly loaded foreign key
    joined: bool,

    /// Set for `From` entries: the select plan and the entry of each plan
    /// table, root first
    pub(super) plan: Option<(SelectPlan, Vec<usize>)>,
}

impl Scope {
    /// Registers every table and join and assigns aliases.
    ///
    /// Explicit aliases are reserved before any alias is generated so a
    /// generated alias never shadows an explicit one.
    pub(super) fn build(elements: &[Element], dialect: &Dialect) -> Result<Scope> {
        let mut used: HashSet<String> = elements
            .iter()
            .filter_map(|element| match element {
                Element::Table(r) | Element::From(r) => r.alias.clone(),
                _ => None,
            })
            .collect();

        let mut scope = Scope::default();

        for (index, element) in elements.iter().enumerate() {
            let (r, from) = match element {
                Element::Table(r) => (r, false),
                Element::From(r) => (r, true),
                _ => continue,
            };

            let table = r.model.table_name()?.clone();
            let alias = match &r.alias {
                Some(alias) => alias.clone(),
                None => generate_alias(&table.name, &mut used, dialect),
            };

            let root = scope.push(table, alias, false);
            scope.by_element.insert(index, root);

            if from {
                let plan = r.model.select_plan();
                let mut tables = vec![root];

                for join in &plan.joins {
                    let table = join.model.table_name()?.clone();
                    let alias = generate_alias(&table.name, &mut used, dialect);
                    tables.push(scope.push(table, alias, true));
                }

                scope.entries[root].plan = Some((plan, tables));
            }
        }

        Ok(scope)
    }

    fn push(&mut self, table: TableName, alias: String, joined: bool) -> usize {
        self.entries.push(Entry {
            table,
            alias,
            joined,
            plan: None,
        });
        self.entries.len() - 1
    }

    pub(super) fn element_entry(&self, index: usize) -> Result<&Entry> {
        self.by_element
            .get(&index)
            .map(|entry| &self.entries[*entry])
            .ok_or_else(|| tempest_core::err!("no table registered for element {index}"))
    }

    /// The alias a table reference stands for.
    ///
    /// A reference matching several tables resolves to the one named
    /// directly by a `Table` / `From` element, ignoring joined copies.
    pub(super) fn resolve<'a>(&'a self, r: &'a TableRef) -> Result<&'a str> {
        if let Some(alias) = &r.alias {
            return Ok(alias);
        }

        let table = r.model.table_name()?;
        let entry = self.unique(table, |entry| &entry.table == table)?;
        Ok(&entry.alias)
    }

    /// The `From` entry whose root reads `table`.
    pub(super) fn from_entry(&self, table: &TableName) -> Result<&Entry> {
        self.unique(table, |entry| entry.plan.is_some() && &entry.table == table)
    }

    fn unique(&self, table: &TableName, pred: impl Fn(&Entry) -> bool) -> Result<&Entry> {
        let matches: Vec<&Entry> = self.entries.iter().filter(|entry| pred(entry)).collect();

        match &matches[..] {
            [] => Err(Error::sql_template(format!(
                "unresolved table reference `{table}`: the table is not part of the statement"
            ))),
            [entry] => Ok(entry),
            _ => {
                let direct: Vec<&&Entry> = matches.iter().filter(|entry| !entry.joined).collect();
                match &direct[..] {
                    [entry] => Ok(entry),
                    _ => Err(Error::sql_template(format!(
                        "ambiguous table reference `{table}`: the table appears {} times; give it an explicit alias",
                        matches.len()
                    ))),
                }
            }
        }
    }
}

/// Initials of the snake_case words of a table name, suffixed with a number
/// when already taken or reserved.
fn generate_alias(table: &str, used: &mut HashSet<String>, dialect: &Dialect) -> String {
    let mut base: String = table
        .split('_')
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if base.is_empty() {
        base.push('t');
    }

    let mut alias = base.clone();
    let mut n = 1;
    while used.contains(&alias) || dialect.is_keyword(&alias) {
        alias = format!("{base}{n}");
        n += 1;
    }

    used.insert(alias.clone());
    alias
}
