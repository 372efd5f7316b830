//! Tri-state field for partial updates
//!
//! A `Patch<T>` field is `Missing` when the key was absent from the request
//! body and `Value` when it was present. Pair it with `#[serde(default)]` on
//! the field. For a clearable field use `Patch<Option<T>>`, so an explicit
//! `null` becomes `Value(None)` instead of collapsing into "not sent".

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Missing,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Value(v) => Patch::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Missing => Patch::Missing,
            Self::Value(v) => Patch::Value(f(v)),
        }
    }

    /// `Some` if the field was provided.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Missing => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl<T, E> Patch<Result<T, E>> {
    pub fn transpose(self) -> Result<Patch<T>, E> {
        match self {
            Self::Missing => Ok(Patch::Missing),
            Self::Value(Ok(v)) => Ok(Patch::Value(v)),
            Self::Value(Err(e)) => Err(e),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Value)
    }
}

impl<T: JsonSchema> JsonSchema for Patch<T> {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        T::schema_name()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        gen.subschema_for::<T>()
    }
}
