//! Table field schema
//!
//! A table is described by one designated key field followed by an ordered
//! list of value fields. Row shapes are derived from it:
//!
//! - snapshot row: `key, values...` (width = values + 1)
//! - delta row: `op, key, values...` (width = values + 2)

use serde::{Deserialize, Serialize};

/// Field layout of the tracked table
///
/// # Examples
///
/// ```
/// use consolidator::domain::schema::TableSchema;
///
/// let schema = TableSchema::person();
/// assert_eq!(schema.snapshot_width(), 3);
/// assert_eq!(schema.delta_width(), 4);
/// assert_eq!(schema.header(), vec!["PersonID", "FullName", "City"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    key_field: String,
    value_fields: Vec<String>,
}

impl TableSchema {
    /// Creates a schema from a key field and ordered value fields
    ///
    /// # Errors
    ///
    /// Returns an error if the key field is empty, a value field is empty,
    /// or two fields share a name.
    pub fn new(
        key_field: impl Into<String>,
        value_fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, String> {
        let key_field = key_field.into();
        let value_fields: Vec<String> = value_fields.into_iter().map(Into::into).collect();

        if key_field.trim().is_empty() {
            return Err("key field name cannot be empty".to_string());
        }
        if value_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("value field names cannot be empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        seen.insert(key_field.as_str());
        for field in &value_fields {
            if !seen.insert(field.as_str()) {
                return Err(format!("duplicate field name '{field}'"));
            }
        }

        Ok(Self {
            key_field,
            value_fields,
        })
    }

    /// The `PersonID, FullName, City` table the pipeline was first built for
    pub fn person() -> Self {
        Self {
            key_field: "PersonID".to_string(),
            value_fields: vec!["FullName".to_string(), "City".to_string()],
        }
    }

    /// Name of the key field
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Ordered value field names
    pub fn value_fields(&self) -> &[String] {
        &self.value_fields
    }

    /// Number of value fields
    pub fn value_count(&self) -> usize {
        self.value_fields.len()
    }

    /// Width of a snapshot row (key + values)
    pub fn snapshot_width(&self) -> usize {
        self.value_fields.len() + 1
    }

    /// Width of a delta row (operation code + key + values)
    pub fn delta_width(&self) -> usize {
        self.value_fields.len() + 2
    }

    /// Column names of the published file, in snapshot order
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(self.key_field.as_str())
            .chain(self.value_fields.iter().map(String::as_str))
            .collect()
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::person()
    }
}
