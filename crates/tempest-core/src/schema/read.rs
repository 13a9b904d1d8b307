use super::{FieldTy, Model};
use crate::{
    stmt::{Type, Value, ValueRecord},
    Result,
};

impl Model {
    /// Rebuilds a record from a row selected with [`Model::select_plan`].
    ///
    /// Eager foreign keys become nested records, lazy ones their key value.
    /// A nullable nested record whose columns are all null reads as `Null`.
    pub fn read(&self, row: impl IntoIterator<Item = Value>) -> Result<ValueRecord> {
        let mut values = row.into_iter();
        let record = self.read_fields(&mut values)?;

        if values.next().is_some() {
            crate::bail!(
                "row has more columns than `{}` selects ({})",
                self.name(),
                self.select_width()
            );
        }

        Ok(record)
    }

    fn read_fields(&self, values: &mut dyn Iterator<Item = Value>) -> Result<ValueRecord> {
        let mut fields = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let value = match &field.ty {
                FieldTy::Primitive(_) if field.json => self.next_value(values)?.coerce(Type::Json)?,
                FieldTy::Primitive(ty) => self.next_value(values)?.coerce(*ty)?,
                FieldTy::Inline(model) => {
                    let record = model.read_fields(values)?;
                    nest(record, field.nullable)
                }
                FieldTy::ForeignKey(fk) if fk.lazy => {
                    let mut key = Vec::with_capacity(fk.columns.len());
                    for column in fk.target.primary_key_columns() {
                        key.push(self.next_value(values)?.coerce(column.ty)?);
                    }

                    if key.iter().all(Value::is_null) {
                        Value::Null
                    } else if key.len() == 1 {
                        key.remove(0)
                    } else {
                        let target_key = fk.target.primary_key_field().map(|f| &f.ty);
                        match target_key {
                            Some(FieldTy::Inline(key_model)) => {
                                key_model.read_fields(&mut key.into_iter())?.into()
                            }
                            _ => Value::record_from_vec(key),
                        }
                    }
                }
                FieldTy::ForeignKey(fk) => {
                    let width = fk.target.select_width();
                    let mut nested = Vec::with_capacity(width);
                    for _ in 0..width {
                        nested.push(self.next_value(values)?);
                    }

                    if nested.iter().all(Value::is_null) {
                        Value::Null
                    } else {
                        fk.target.read_fields(&mut nested.into_iter())?.into()
                    }
                }
            };

            fields.push(value);
        }

        Ok(ValueRecord::from_vec(fields))
    }

    fn next_value(&self, values: &mut dyn Iterator<Item = Value>) -> Result<Value> {
        values.next().ok_or_else(|| {
            crate::err!(
                "row has fewer columns than `{}` selects ({})",
                self.name(),
                self.select_width()
            )
        })
    }
}

fn nest(record: ValueRecord, nullable: bool) -> Value {
    if nullable && record.iter().all(Value::is_null) {
        Value::Null
    } else {
        record.into()
    }
}
