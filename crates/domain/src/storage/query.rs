use std::collections::BTreeMap;

/// A single `field eq value` predicate. The value is kept raw; rendering
/// escapes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    field: String,
    value: String,
}

impl FieldFilter {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders `field eq 'value'`, doubling embedded single quotes.
    pub fn render(&self) -> String {
        format!("{} eq '{}'", self.field, self.value.replace('\'', "''"))
    }
}

/// Parameterized query against a named table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    table: String,
    filters: Vec<FieldFilter>,
    select: Vec<String>,
}

impl RecordQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            select: Vec::new(),
        }
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn select<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.select
    }

    /// Filter in the `field eq 'literal'` predicate language, terms joined
    /// with ` and `.
    pub fn filter_expression(&self) -> String {
        self.filters
            .iter()
            .map(FieldFilter::render)
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// A fetched record: selected field names mapped to their textual values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_field(mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
