use super::Formatter;
use tempest_core::Result;

macro_rules! fmt {
    ($f:expr, $( $fragments:expr ),* $(,)?) => {{
        $(
            $fragments.to_sql($f)?;
        )*
    }};
}

pub(super) trait ToSql {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()>;
}

impl ToSql for &str {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()> {
        f.dst.push_str(self);
        Ok(())
    }
}

impl ToSql for &String {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()> {
        f.dst.push_str(self);
        Ok(())
    }
}

impl ToSql for String {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()> {
        f.dst.push_str(&self);
        Ok(())
    }
}

/// An identifier, quoted as the dialect requires
pub(super) struct Ident<'a>(pub(super) &'a str);

impl ToSql for Ident<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()> {
        let quoted = f.compiler.dialect.quote_identifier(self.0);
        f.dst.push_str(&quoted);
        Ok(())
    }
}

/// A column, prefixed by its table alias when there is one
pub(super) struct Qualified<'a>(pub(super) Option<&'a str>, pub(super) &'a str);

impl ToSql for Qualified<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) -> Result<()> {
        if let Some(qualifier) = self.0 {
            fmt!(f, qualifier, ".");
        }
        fmt!(f, Ident(self.1));
        Ok(())
    }
}
