use super::{Element, Param, Template, TemplateBuilder};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tempest_core::stmt::Value;

/// A value that can appear in braces inside [`template!`](crate::template).
pub trait Interpolate {
    fn interpolate(self, builder: &mut TemplateBuilder);
}

impl Interpolate for Element {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push(self);
    }
}

impl Interpolate for Template {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push_template(self);
    }
}

impl Interpolate for &Template {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push_template(self.clone());
    }
}

impl Interpolate for Param {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push(self);
    }
}

impl Interpolate for Value {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push_param(self);
    }
}

impl<T: Into<Value>> Interpolate for Option<T> {
    fn interpolate(self, builder: &mut TemplateBuilder) {
        builder.push_param(self);
    }
}

macro_rules! impl_interpolate_param {
    ( $( $ty:ty ),* ) => {
        $(
            impl Interpolate for $ty {
                fn interpolate(self, builder: &mut TemplateBuilder) {
                    builder.push_param(self);
                }
            }
        )*
    };
}

impl_interpolate_param!(
    bool,
    i16,
    i32,
    i64,
    f64,
    String,
    &String,
    &str,
    Vec<u8>,
    Vec<Value>,
    uuid::Uuid,
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
    serde_json::Value
);
