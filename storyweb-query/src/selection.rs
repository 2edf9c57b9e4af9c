//! Field selection trees.
//!
//! [`Include`] is what callers write: "nothing", "everything", or an explicit
//! per-field tree. [`FieldSelection`] is the resolved form sent to the
//! serializer, where every `true` has been expanded against the schema.

use crate::error::{QueryError, QueryResult};
use std::fmt;
use storyweb_model::{FieldShape, SchemaSource};
use storyweb_types::EntityKind;

/// A caller's request for fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Include {
    /// No optional fields. Endpoint-mandatory fields are still forced.
    #[default]
    None,
    /// Every field the schema knows for the kind.
    All,
    /// An explicit, ordered tree.
    Fields(Vec<(String, Include)>),
}

impl Include {
    /// Builds an explicit tree from `(name, include)` pairs.
    pub fn fields<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Include)>,
    {
        Include::Fields(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Shorthand for an explicit tree where every named field is `All`.
    pub fn only<K, I>(names: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        Include::Fields(names.into_iter().map(|k| (k.into(), Include::All)).collect())
    }
}

impl From<bool> for Include {
    fn from(all: bool) -> Self {
        if all { Include::All } else { Include::None }
    }
}

/// How one field participates in a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Exclude,
    Scalar,
    Nested(FieldSelection),
}

/// A resolved, insertion-ordered field selection tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    entries: Vec<(String, Selection)>,
}

impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every declared field of `kind`. Compound fields expand to their
    /// nested kind's full schema; everything else is a scalar.
    pub fn full(schema: &dyn SchemaSource, kind: EntityKind) -> Self {
        let entries = schema
            .fields(kind)
            .iter()
            .map(|spec| {
                let selection = match spec.shape.nested_kind() {
                    Some(nested) => Selection::Nested(Self::full(schema, nested)),
                    None => Selection::Scalar,
                };
                (spec.wire.to_string(), selection)
            })
            .collect();
        Self { entries }
    }

    /// Resolves a caller's [`Include`] for `kind`.
    pub fn resolve(schema: &dyn SchemaSource, kind: EntityKind, include: &Include) -> QueryResult<Self> {
        Self::resolve_in(schema, Some(kind), include)
    }

    /// `kind` is `None` inside value-typed or unknown fields, where nothing
    /// is compound and `All` means a plain scalar.
    fn resolve_in(schema: &dyn SchemaSource, kind: Option<EntityKind>, include: &Include) -> QueryResult<Self> {
        match include {
            Include::None => Ok(Self::new()),
            Include::All => Ok(kind.map_or_else(Self::new, |k| Self::full(schema, k))),
            Include::Fields(entries) => {
                let mut selection = Self::new();
                for (name, sub) in entries {
                    validate_name(name)?;
                    let shape = kind.and_then(|k| schema.by_wire(k, name)).map(|spec| spec.shape);
                    let nested_kind = shape.and_then(FieldShape::nested_kind);
                    let resolved = match sub {
                        Include::None => Selection::Exclude,
                        Include::All => match nested_kind {
                            Some(nested) => Selection::Nested(Self::full(schema, nested)),
                            None => Selection::Scalar,
                        },
                        Include::Fields(_) => {
                            Selection::Nested(Self::resolve_in(schema, nested_kind, sub)?)
                        }
                    };
                    selection.insert(name.clone(), resolved);
                }
                Ok(selection)
            }
        }
    }

    /// Sets a field, replacing it in place if present, appending otherwise.
    pub fn insert(&mut self, name: impl Into<String>, selection: Selection) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = selection,
            None => self.entries.push((name, selection)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Selection> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Selection> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Forces `name` to at least a scalar include. A nested selection is
    /// left as it is.
    pub fn require(&mut self, name: &str) {
        match self.get_mut(name) {
            None => self.entries.push((name.to_string(), Selection::Scalar)),
            Some(slot) => {
                if matches!(slot, Selection::Exclude) {
                    *slot = Selection::Scalar;
                }
            }
        }
    }

    /// Forces `sub` inside `name`, but only when `name` already carries a
    /// nested selection.
    pub fn require_within(&mut self, name: &str, sub: &str) {
        if let Some(Selection::Nested(inner)) = self.get_mut(name) {
            inner.require(sub);
        }
    }

    /// Guarantees `name` is requested as a nested selection containing
    /// `sub`. Absent, excluded, or scalar entries become `name(sub)`.
    pub fn require_nested(&mut self, name: &str, sub: &str) {
        match self.get_mut(name) {
            Some(Selection::Nested(inner)) => inner.require(sub),
            Some(slot) => {
                let mut inner = Self::new();
                inner.require(sub);
                *slot = Selection::Nested(inner);
            }
            None => {
                let mut inner = Self::new();
                inner.require(sub);
                self.entries.push((name.to_string(), Selection::Nested(inner)));
            }
        }
    }

    /// Whether `name` is requested at all.
    pub fn includes(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Selection::Scalar | Selection::Nested(_)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when serializing would produce an empty string.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, s)| matches!(s, Selection::Exclude))
    }

    /// Serializes to the wire grammar: `field,parent(child,child),field`.
    pub fn to_query(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, selection) in &self.entries {
            if matches!(selection, Selection::Exclude) {
                continue;
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(name)?;
            if let Selection::Nested(inner) = selection {
                write!(f, "({inner})")?;
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> QueryResult<()> {
    if name.is_empty() || name.contains([',', '(', ')', '&', '=', ' ']) {
        return Err(QueryError::InvalidFieldName(name.to_string()));
    }
    Ok(())
}
