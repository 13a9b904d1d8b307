use super::{Column, FieldTy, Model};

use std::sync::Arc;

/// The tables and columns a SELECT of a model reads.
///
/// Table `0` is the model's own table. Every eagerly loaded foreign key adds a
/// join, numbered from `1` in depth-first field order. Columns are listed in
/// the order [`Model::read`] consumes them.
#[derive(Debug, Clone)]
pub struct SelectPlan {
    pub root: Arc<Model>,
    pub joins: Vec<Join>,
    pub columns: Vec<PlanColumn>,
}

#[derive(Debug, Clone)]
pub struct Join {
    pub model: Arc<Model>,

    /// Table holding the foreign key columns
    pub parent: usize,

    /// Pairs of (foreign key column on the parent, key column on the target)
    pub on: Vec<(String, String)>,

    /// The join must keep parent rows without a match (`LEFT JOIN`).
    pub nullable: bool,

    /// Field indexes from the root record to the joined record
    pub field_path: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct PlanColumn {
    pub table: usize,
    pub column: Column,
}

impl Model {
    pub fn select_plan(self: &Arc<Self>) -> SelectPlan {
        let mut plan = SelectPlan {
            root: self.clone(),
            joins: vec![],
            columns: vec![],
        };
        build(self, 0, &[], false, &mut plan);
        plan
    }
}

impl SelectPlan {
    /// Model read from the given table.
    pub fn model(&self, table: usize) -> &Arc<Model> {
        match table {
            0 => &self.root,
            n => &self.joins[n - 1].model,
        }
    }
}

fn build(model: &Arc<Model>, table: usize, path: &[usize], nullable: bool, plan: &mut SelectPlan) {
    for field in &model.fields {
        match &field.ty {
            FieldTy::ForeignKey(fk) if !fk.lazy => {
                let on = fk
                    .columns
                    .iter()
                    .cloned()
                    .zip(fk.target.primary_key_columns().map(|c| c.name.clone()))
                    .collect();

                let mut field_path = path.to_vec();
                field_path.push(field.index);

                let nullable = nullable || field.nullable;

                plan.joins.push(Join {
                    model: fk.target.clone(),
                    parent: table,
                    on,
                    nullable,
                    field_path: field_path.clone(),
                });

                let child = plan.joins.len();
                build(&fk.target, child, &field_path, nullable, plan);
            }
            _ => {
                for column in &model.columns {
                    if column.path[0] == field.index {
                        plan.columns.push(PlanColumn {
                            table,
                            column: column.clone(),
                        });
                    }
                }
            }
        }
    }
}
