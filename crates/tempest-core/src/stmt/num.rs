use super::Value;
use crate::{Error, Result};

macro_rules! impl_num {
    (
        $(
            $variant:ident($ty:ty) $( < $( $narrow:ty ),* > )?
        )*
    ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<&$ty> for Value {
                fn from(value: &$ty) -> Self {
                    Self::$variant(*value)
                }
            }

            $($(
                impl From<$narrow> for Value {
                    fn from(value: $narrow) -> Self {
                        Self::$variant(value.into())
                    }
                }
            )*)?
        )*
    };
}

impl_num! {
    I16(i16) <i8, u8>
    I32(i32) <u16>
    I64(i64) <u32>
    F64(f64) <f32>
}

macro_rules! impl_try_from_unsigned {
    ( $( $ty:ty ),* ) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    let Some(v) = value.as_i64() else {
                        return Err(Error::type_conversion(value, stringify!($ty)));
                    };
                    <$ty>::try_from(v).map_err(|_| Error::type_conversion(value, stringify!($ty)))
                }
            }
        )*
    };
}

impl_try_from_unsigned!(u32, u64, usize);
