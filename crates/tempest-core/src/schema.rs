mod builder;
pub use builder::ModelBuilder;

mod column;
pub use column::{Column, Generation};

mod field;
pub use field::{Field, FieldDef, FieldTy, ForeignKey};

mod model;
pub use model::{Model, ModelKind, TableName};

mod read;

mod select_plan;
pub use select_plan::{Join, PlanColumn, SelectPlan};
