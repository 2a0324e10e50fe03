//! Response values and resolver source values

mod object;

use std::{any::Any, fmt, sync::Arc};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

pub use self::object::Object;

/// Serializable value returned from query execution
///
/// Mirrors the JSON data model. Insertion order of object fields is kept, so
/// the response comes out in the order the query selected its fields.
#[derive(Clone, Debug, Default, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Construct a null value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Does this value represent null?
    ///
    /// A float NaN has no JSON representation, so it counts as null too.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// View the underlying int value, if present.
    pub fn as_int_value(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// View the underlying float value, if present.
    pub fn as_float_value(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// View the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// View the underlying boolean value, if present.
    pub fn as_bool_value(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// View the underlying object value, if present.
    pub fn as_object_value(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable view into the underlying object value, if present.
    pub fn as_mut_object_value(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// View the underlying list value, if present.
    pub fn as_list_value(&self) -> Option<&Vec<Value>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_nan() => serializer.serialize_none(),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Self::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.field_count()))?;
                for (k, v) in o.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Self::List(l)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(a) => Self::List(a.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(o) => {
                Self::Object(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// A value produced by a resolver, before completion
///
/// Resolvers either hand back data that already has a response shape
/// ([`Resolved::Value`]), a list of further sources, or an opaque host object
/// that downstream resolvers pick apart (this is what the introspection
/// resolvers do with their reflection handles).
#[derive(Clone)]
pub enum Resolved {
    /// JSON-shaped data; the default resolver can index into objects inside.
    Value(Value),
    /// A list of sources, each completed against the list's inner type.
    List(Vec<Resolved>),
    /// An opaque host object, passed as the source value to sub-resolvers.
    Host(Arc<dyn Any + Send + Sync>),
}

impl Resolved {
    /// Construct a null source value.
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Wraps an opaque host object.
    pub fn host<T: Any + Send + Sync>(host: T) -> Self {
        Self::Host(Arc::new(host))
    }

    /// Wraps an already shared host object.
    pub fn shared_host(host: Arc<dyn Any + Send + Sync>) -> Self {
        Self::Host(host)
    }

    /// Does this source represent null?
    pub fn is_null(&self) -> bool {
        match self {
            Self::Value(v) => v.is_null(),
            _ => false,
        }
    }

    /// Attempts to downcast the host object to a concrete type.
    pub fn downcast_host<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Self::Host(h) => h.downcast_ref(),
            _ => None,
        }
    }

    /// View the JSON-shaped data, if this source carries some.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::List(l) => f.debug_tuple("List").field(l).finish(),
            Self::Host(_) => f.debug_tuple("Host").finish(),
        }
    }
}

impl<T: Into<Value>> From<T> for Resolved {
    fn from(v: T) -> Self {
        Self::Value(v.into())
    }
}
