//! Shape introspection for the values the walker compares.
//!
//! Every comparable value implements [`Diffable`], which exposes a borrowed,
//! tagged view of the value ([`Node`]) together with its JSON encoding. User
//! records implement it through `#[derive(Diffable)]`.

use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::hash::BuildHasher;

/// A value the walker can descend into.
pub trait Diffable: Any {
    /// Borrowed view of this value's shape and children.
    fn node(&self) -> Node<'_>;

    /// JSON encoding used as the `value` of emitted operations.
    fn to_json(&self) -> serde_json::Result<Value>;

    /// Access to the concrete type for typed predicates and handlers.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Diffable + '_ {
    /// Downcast to the concrete type behind the trait object.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A named child of a record.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: &'a dyn Diffable,
}

/// Tagged view over the finite set of shapes the walker understands.
#[derive(Clone)]
pub enum Node<'a> {
    Record(Vec<Field<'a>>),
    Optional(Option<&'a dyn Diffable>),
    Sequence(Vec<&'a dyn Diffable>),
    /// Key/value pairs; keys must present as [`Node::Text`].
    Mapping(Vec<(&'a dyn Diffable, &'a dyn Diffable)>),
    /// An open value; `None` is undefined.
    Dynamic(Option<&'a dyn Diffable>),
    Text(&'a str),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// A value the walker has no comparison for.
    Unsupported(&'static str),
}

/// Shape names used for matching both sides and for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Record,
    Optional,
    Sequence,
    Mapping,
    Dynamic,
    Text,
    Bool,
    Number,
    Absent,
    Unsupported,
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Shape::Record => "record",
            Shape::Optional => "optional",
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
            Shape::Dynamic => "dynamic",
            Shape::Text => "text",
            Shape::Bool => "bool",
            Shape::Number => "number",
            Shape::Absent => "absent",
            Shape::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

impl<'a> Node<'a> {
    /// Integers and floats share one shape; they are compared numerically.
    pub fn shape(&self) -> Shape {
        match self {
            Node::Record(_) => Shape::Record,
            Node::Optional(_) => Shape::Optional,
            Node::Sequence(_) => Shape::Sequence,
            Node::Mapping(_) => Shape::Mapping,
            Node::Dynamic(_) => Shape::Dynamic,
            Node::Text(_) => Shape::Text,
            Node::Bool(_) => Shape::Bool,
            Node::Int(_) | Node::Uint(_) | Node::Float(_) => Shape::Number,
            Node::Unsupported(_) => Shape::Unsupported,
        }
    }

    /// Text form of a scalar, used as identity key by order-insensitive
    /// sequences.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::Text(s) => Some((*s).to_owned()),
            Node::Bool(b) => Some(b.to_string()),
            Node::Int(i) => Some(i.to_string()),
            Node::Uint(u) => Some(u.to_string()),
            Node::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

macro_rules! impl_diffable_scalar {
    ($variant:ident as $target:ty => $($t:ty),+) => {
        $(
            impl Diffable for $t {
                fn node(&self) -> Node<'_> {
                    Node::$variant(*self as $target)
                }

                fn to_json(&self) -> serde_json::Result<Value> {
                    serde_json::to_value(self)
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )+
    };
}

impl_diffable_scalar!(Int as i64 => i8, i16, i32, i64, isize);
impl_diffable_scalar!(Uint as u64 => u8, u16, u32, u64, usize);
impl_diffable_scalar!(Float as f64 => f32, f64);
impl_diffable_scalar!(Bool as bool => bool);

impl Diffable for String {
    fn node(&self) -> Node<'_> {
        Node::Text(self)
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Diffable> Diffable for Option<T> {
    fn node(&self) -> Node<'_> {
        Node::Optional(self.as_ref().map(|v| v as &dyn Diffable))
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            Some(v) => v.to_json(),
            None => Ok(Value::Null),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Diffable> Diffable for Vec<T> {
    fn node(&self) -> Node<'_> {
        Node::Sequence(self.iter().map(|v| v as &dyn Diffable).collect())
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        self.iter()
            .map(Diffable::to_json)
            .collect::<serde_json::Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn key_to_string(key: &dyn Diffable) -> serde_json::Result<String> {
    Ok(match key.to_json()? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn entries_to_json<'a, K, V, I>(entries: I) -> serde_json::Result<Value>
where
    K: Diffable + 'a,
    V: Diffable + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut map = serde_json::Map::new();
    for (k, v) in entries {
        map.insert(key_to_string(k)?, v.to_json()?);
    }
    Ok(Value::Object(map))
}

impl<K, V, S> Diffable for HashMap<K, V, S>
where
    K: Diffable,
    V: Diffable,
    S: BuildHasher + 'static,
{
    fn node(&self) -> Node<'_> {
        Node::Mapping(
            self.iter()
                .map(|(k, v)| (k as &dyn Diffable, v as &dyn Diffable))
                .collect(),
        )
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        entries_to_json(self.iter())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<K: Diffable, V: Diffable> Diffable for BTreeMap<K, V> {
    fn node(&self) -> Node<'_> {
        Node::Mapping(
            self.iter()
                .map(|(k, v)| (k as &dyn Diffable, v as &dyn Diffable))
                .collect(),
        )
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        entries_to_json(self.iter())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// JSON values are open: their shape is decided by the runtime variant, and
/// `null` is the undefined dynamic value.
impl Diffable for Value {
    fn node(&self) -> Node<'_> {
        match self {
            Value::Null => Node::Dynamic(None),
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Node::Uint(u)
                } else {
                    Node::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Node::Text(s),
            Value::Array(arr) => Node::Sequence(arr.iter().map(|v| v as &dyn Diffable).collect()),
            Value::Object(map) => Node::Mapping(
                map.iter()
                    .map(|(k, v)| (k as &dyn Diffable, v as &dyn Diffable))
                    .collect(),
            ),
        }
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        Ok(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A boxed trait object behaves like an open value holding its concrete type.
impl Diffable for Box<dyn Diffable> {
    fn node(&self) -> Node<'_> {
        Node::Dynamic(Some(&**self))
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        (**self).to_json()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
