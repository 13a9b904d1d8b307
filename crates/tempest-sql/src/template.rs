pub mod el;

mod element;
pub use element::{ColumnRef, Element, Param, Predicate, RecordSource, TableRef};

mod interpolate;
pub use interpolate::Interpolate;

use tempest_core::stmt::Value;

/// Builds a [`Template`] from SQL text and interpolated values.
///
/// String literals are copied as SQL text. A braced expression is passed to
/// [`Interpolate`]: elements and templates are inserted as such, every other
/// value becomes a bound parameter.
///
/// ```
/// use tempest_sql::{template, template::el};
/// # use tempest_core::{schema::FieldDef, stmt::Type, Model};
/// # let owner = Model::builder("owner")
/// #     .field(FieldDef::primitive("id", Type::I32).primary_key())
/// #     .field(FieldDef::primitive("last_name", Type::String))
/// #     .build()
/// #     .unwrap();
/// let name = "Davis";
/// let t = template!(
///     "SELECT " {el::select(&owner)} " FROM " {el::from(&owner)}
///     " WHERE " {el::column(&owner, "last_name")} " = " {name}
/// );
/// assert_eq!(t.parameters().len(), 1);
/// ```
#[macro_export]
macro_rules! template {
    (@munch $b:ident; ) => {};
    (@munch $b:ident; $s:literal $($rest:tt)*) => {
        $b.push_str($s);
        $crate::template!(@munch $b; $($rest)*);
    };
    (@munch $b:ident; { $e:expr } $($rest:tt)*) => {
        $crate::Interpolate::interpolate($e, &mut $b);
        $crate::template!(@munch $b; $($rest)*);
    };
    ($($t:tt)*) => {{
        let mut builder = $crate::Template::builder();
        $crate::template!(@munch builder; $($t)*);
        builder.build()
    }};
}

/// SQL text interleaved with typed elements.
///
/// There is always exactly one more fragment than there are elements: the
/// template reads `fragments[0] elements[0] fragments[1] ... fragments[n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    fragments: Vec<String>,
    elements: Vec<Element>,
}

#[derive(Debug, Default)]
pub struct TemplateBuilder {
    fragments: Vec<String>,
    elements: Vec<Element>,
    current: String,
}

impl Template {
    /// The empty template, the identity of [`Template::combine`].
    pub fn empty() -> Template {
        Template {
            fragments: vec![String::new()],
            elements: vec![],
        }
    }

    /// SQL text without elements.
    pub fn raw(sql: impl Into<String>) -> Template {
        Template {
            fragments: vec![sql.into()],
            elements: vec![],
        }
    }

    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn from_element(element: impl Into<Element>) -> Template {
        Template {
            fragments: vec![String::new(), String::new()],
            elements: vec![element.into()],
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.fragments.iter().all(String::is_empty)
    }

    /// Concatenates two templates with `separator` between them.
    ///
    /// An empty template on either side is dropped together with the
    /// separator.
    pub fn combine(a: Template, separator: &str, b: Template) -> Template {
        if a.is_empty() {
            return b;
        }
        if b.is_empty() {
            return a;
        }

        let Template {
            mut fragments,
            mut elements,
        } = a;

        let mut rest = b.fragments.into_iter();
        if let Some(last) = fragments.last_mut() {
            last.push_str(separator);
            if let Some(first) = rest.next() {
                last.push_str(&first);
            }
        }

        fragments.extend(rest);
        elements.extend(b.elements);

        Template {
            fragments,
            elements,
        }
    }

    /// Combines any number of templates, skipping empty ones.
    pub fn join(templates: impl IntoIterator<Item = Template>, separator: &str) -> Template {
        templates
            .into_iter()
            .fold(Template::empty(), |acc, t| Template::combine(acc, separator, t))
    }

    /// Inlines nested templates, recursively.
    ///
    /// Element order is preserved, so parameters keep their depth-first,
    /// left-to-right order. Flattening a flat template returns an equal
    /// template.
    pub fn flatten(&self) -> Template {
        let mut builder = Template::builder();
        self.flatten_into(&mut builder);
        builder.build()
    }

    fn flatten_into(&self, builder: &mut TemplateBuilder) {
        for (fragment, element) in self.fragments.iter().zip(&self.elements) {
            builder.push_str(fragment);
            match element {
                Element::Template(nested) => nested.flatten_into(builder),
                element => {
                    builder.push(element.clone());
                }
            }
        }

        if let Some(last) = self.fragments.last() {
            builder.push_str(last);
        }
    }

    /// Values of the parameter elements, in depth-first order.
    pub fn parameters(&self) -> Vec<&Value> {
        let mut ret = vec![];
        self.collect_parameters(&mut ret);
        ret
    }

    fn collect_parameters<'a>(&'a self, out: &mut Vec<&'a Value>) {
        for element in &self.elements {
            match element {
                Element::Param(param) => out.push(&param.value),
                Element::Template(nested) => nested.collect_parameters(out),
                _ => {}
            }
        }
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::empty()
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Template::raw(value)
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Template::raw(value)
    }
}

impl TemplateBuilder {
    pub fn push_str(&mut self, sql: &str) -> &mut Self {
        self.current.push_str(sql);
        self
    }

    pub fn push(&mut self, element: impl Into<Element>) -> &mut Self {
        self.fragments.push(std::mem::take(&mut self.current));
        self.elements.push(element.into());
        self
    }

    pub fn push_param(&mut self, value: impl Into<Value>) -> &mut Self {
        self.push(Element::Param(Param::positional(value)))
    }

    pub fn push_template(&mut self, template: Template) -> &mut Self {
        self.push(Element::Template(template))
    }

    pub fn build(mut self) -> Template {
        self.fragments.push(self.current);
        Template {
            fragments: self.fragments,
            elements: self.elements,
        }
    }
}
