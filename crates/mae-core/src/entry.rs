//! Entries of a category collection and the form used to submit them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{CategorySchema, FieldDefault, FieldKind};
use crate::error::{MaeError, Result};

/// Field values as sent to and received from the backend.
pub type Fields = Map<String, Value>;

const ID_KEY: &str = "_id";
const OWNER_KEY: &str = "user_id";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Backend-assigned identifier of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record of a category collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub fields: Fields,
}

impl Entry {
    pub fn new(id: EntryId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Decodes a backend document: `_id` becomes the id, the ownership column
    /// is dropped and everything else is kept as a field.
    pub fn from_document(document: Value) -> Result<Self> {
        let Value::Object(mut fields) = document else {
            return Err(MaeError::Serialization {
                format: "JSON".to_string(),
                message: "entry is not an object".to_string(),
            });
        };

        let id = match fields.remove(ID_KEY) {
            Some(Value::String(id)) => EntryId(id),
            Some(other) => EntryId(other.to_string()),
            None => {
                return Err(MaeError::Serialization {
                    format: "JSON".to_string(),
                    message: format!("entry has no '{}'", ID_KEY),
                });
            }
        };
        fields.remove(OWNER_KEY);

        Ok(Self { id, fields })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field rendered as plain text, empty when absent.
    pub fn text(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Raw input of a create or edit submission.
///
/// Values stay strings until [`EntryForm::to_fields`] checks required fields
/// and coerces them to the types the backend expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    values: BTreeMap<String, String>,
}

impl EntryForm {
    /// Blank form with the schema defaults filled in.
    pub fn with_defaults(schema: &CategorySchema, collection_len: usize) -> Self {
        let mut values = BTreeMap::new();
        for field in schema.fields {
            let value = match field.default {
                FieldDefault::Empty => String::new(),
                FieldDefault::Value(v) => v.to_string(),
                FieldDefault::NextNumber => (collection_len + 1).to_string(),
            };
            values.insert(field.name.to_string(), value);
        }
        Self { values }
    }

    /// Form pre-filled with an existing entry, for editing.
    pub fn from_entry(schema: &CategorySchema, entry: &Entry) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| (field.name.to_string(), entry.text(field.name)))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    /// Checks required fields and converts the input into backend fields.
    ///
    /// Names that are not part of the schema are rejected; absent optional
    /// fields are sent as empty strings.
    pub fn to_fields(&self, schema: &CategorySchema) -> Result<Fields> {
        if let Some(unknown) = self.values.keys().find(|k| schema.field(k).is_none()) {
            return Err(MaeError::validation(
                unknown.clone(),
                format!("not a field of '{}'", schema.key),
            ));
        }

        let mut fields = Fields::new();
        for spec in schema.fields {
            let value = self.get(spec.name).unwrap_or("");
            let raw = value.trim();

            if raw.is_empty() {
                if spec.required {
                    return Err(MaeError::validation(spec.name, "required"));
                }
                fields.insert(spec.name.to_string(), Value::String(String::new()));
                continue;
            }

            let value = match spec.kind {
                // Free text is sent as typed
                FieldKind::Text | FieldKind::LongText => Value::String(value.to_string()),
                FieldKind::Date => {
                    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                        MaeError::validation(spec.name, "expected a date as YYYY-MM-DD")
                    })?;
                    Value::String(raw.to_string())
                }
                FieldKind::Number => {
                    let n: i64 = raw
                        .parse()
                        .map_err(|_| MaeError::validation(spec.name, "expected a number"))?;
                    Value::from(n)
                }
                FieldKind::Choice(options) => {
                    if !options.contains(&raw) {
                        return Err(MaeError::validation(
                            spec.name,
                            format!("expected one of {}", options.join(", ")),
                        ));
                    }
                    Value::String(raw.to_string())
                }
            };
            fields.insert(spec.name.to_string(), value);
        }

        Ok(fields)
    }
}
