use crate::schema::{FieldShape, SchemaSource};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use storyweb_types::EntityKind;

/// A partial payload split against the schema.
///
/// `fields` holds plain data keyed by internal attribute name; `links` holds
/// the entity-valued fields, which the caller must resolve through the
/// identity cache instead of storing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partial {
    pub fields: Map<String, Value>,
    pub links: Vec<Link>,
}

/// An entity-valued field lifted out of a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Internal attribute name (e.g. `"user"`, `"stories"`).
    pub name: &'static str,
    pub kind: EntityKind,
    /// `true` for collection fields (`Entities`), whose `payload` is an array.
    pub many: bool,
    pub payload: Value,
}

impl Partial {
    /// Splits a decoded payload object, translating wire aliases to internal
    /// names. Keys unknown to the schema are kept verbatim.
    pub fn split(schema: &dyn SchemaSource, kind: EntityKind, payload: Map<String, Value>) -> Self {
        let mut partial = Partial::default();
        for (wire, value) in payload {
            let Some(spec) = schema.by_wire(kind, &wire).copied() else {
                partial.fields.insert(wire, value);
                continue;
            };
            match spec.shape {
                FieldShape::Entity(nested) => partial.links.push(Link {
                    name: spec.name,
                    kind: nested,
                    many: false,
                    payload: value,
                }),
                FieldShape::Entities(nested) => partial.links.push(Link {
                    name: spec.name,
                    kind: nested,
                    many: true,
                    payload: value,
                }),
                FieldShape::Scalar | FieldShape::Value(_) => {
                    partial.fields.insert(spec.name.to_string(), value);
                }
            }
        }
        partial
    }

    /// Removes and returns a link by internal name.
    pub fn take_link(&mut self, name: &str) -> Option<Link> {
        let idx = self.links.iter().position(|l| l.name == name)?;
        Some(self.links.remove(idx))
    }
}

/// The known fields of one entity, keyed by internal attribute name.
///
/// Merging is last-writer-wins per field: a key present in the incoming
/// partial replaces the stored value (even with `null`), a key absent from it
/// leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStore {
    fields: Map<String, Value>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites every field present in `fields`. Returns how many were written.
    pub fn merge(&mut self, fields: Map<String, Value>) -> usize {
        let written = fields.len();
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
        written
    }

    /// Sets a single field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Decodes a field into a typed value. A missing field, an explicit
    /// `null`, or a shape mismatch all yield `None`.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        match self.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => T::deserialize(value).ok(),
        }
    }

    /// Decodes the whole store into a typed snapshot.
    pub fn snapshot<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(Value::Object(self.fields.clone()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Internal names of every known field, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}
