//! The dynamic state values components work with.
//!
//! Component state is untyped at the edges: a `data` function hands back a
//! keyed map, watch expressions address it by dotted paths, and parents feed
//! children arbitrary props. [`Value`] is the common currency. Containers
//! ([`MapRef`], [`ListRef`]) are reference types - cloning a `Value` clones a
//! handle, never the contents - which is what makes the write-skip check
//! ("same value, don't notify") meaningful.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dep::Dep;
use crate::observer::Observer;
use crate::vnode::VNode;

/// A dynamically typed state value.
///
/// `Node` carries a rendered vnode; it is the one variant the observer will
/// never wrap.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Map(MapRef),
    Node(Rc<VNode>),
}

impl Value {
    /// Identity comparison used by reactive setters: containers compare by
    /// reference, primitives by value, and NaN counts as equal to itself so
    /// a NaN write does not notify forever.
    pub fn same(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::List(x), Value::List(y)) => Rc::ptr_eq(&x.0, &y.0),
            (Value::Map(x), Value::Map(y)) => Rc::ptr_eq(&x.0, &y.0),
            (Value::Node(x), Value::Node(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a keyed or ordered container.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Truthiness for conditional rendering: null and empty-ish primitives
    /// are false, containers are always true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Node(_) => true,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// Structural equality, mostly for assertions. The reactive write path uses
// `Value::same` instead.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::List(x), Value::List(y)) => {
                Rc::ptr_eq(&x.0, &y.0) || x.to_vec() == y.to_vec()
            }
            (Value::Map(x), Value::Map(y)) => {
                Rc::ptr_eq(&x.0, &y.0) || x.to_entries() == y.to_entries()
            }
            _ => Value::same(self, other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, item) in l.to_vec().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.to_entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Node(_) => write!(f, "[node]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}
impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Rc::from(v))
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Rc::from(v.as_str()))
    }
}
impl From<MapRef> for Value {
    fn from(v: MapRef) -> Self {
        Value::Map(v)
    }
}
impl From<ListRef> for Value {
    fn from(v: ListRef) -> Self {
        Value::List(v)
    }
}
impl From<Rc<VNode>> for Value {
    fn from(v: Rc<VNode>) -> Self {
        Value::Node(v)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// One key's storage inside a keyed container: the value plus the key's own
/// subscription broker, allocated when the key is made reactive.
pub(crate) struct Slot {
    pub(crate) value: Value,
    pub(crate) dep: Option<Rc<Dep>>,
}

pub(crate) struct MapInner {
    pub(crate) entries: RefCell<IndexMap<Rc<str>, Slot>>,
    pub(crate) observer: RefCell<Option<Rc<Observer>>>,
    pub(crate) frozen: bool,
}

/// A shared, interior-mutable keyed container. Insertion order is preserved
/// and observable in render output.
#[derive(Clone)]
pub struct MapRef(pub(crate) Rc<MapInner>);

impl MapRef {
    pub fn new() -> Self {
        MapRef(Rc::new(MapInner {
            entries: RefCell::new(IndexMap::new()),
            observer: RefCell::new(None),
            frozen: false,
        }))
    }

    /// A map the observer will refuse to wrap.
    pub fn frozen(entries: Vec<(&str, Value)>) -> Self {
        let mut map: IndexMap<Rc<str>, Slot> = IndexMap::new();
        for (k, v) in entries {
            map.insert(Rc::from(k), Slot { value: v, dep: None });
        }
        MapRef(Rc::new(MapInner {
            entries: RefCell::new(map),
            observer: RefCell::new(None),
            frozen: true,
        }))
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.entries.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.entries.borrow().keys().cloned().collect()
    }

    /// Raw insert that bypasses reactivity; used while building maps that are
    /// not observed yet.
    pub fn insert(&self, key: &str, value: impl Into<Value>) {
        self.0.entries.borrow_mut().insert(
            Rc::from(key),
            Slot {
                value: value.into(),
                dep: None,
            },
        );
    }

    /// Raw read without dependency tracking.
    pub fn peek(&self, key: &str) -> Value {
        self.0
            .entries
            .borrow()
            .get(key)
            .map(|s| s.value.clone())
            .unwrap_or(Value::Null)
    }

    pub(crate) fn observer(&self) -> Option<Rc<Observer>> {
        self.0.observer.borrow().clone()
    }

    pub fn to_entries(&self) -> Vec<(Rc<str>, Value)> {
        self.0
            .entries
            .borrow()
            .iter()
            .map(|(k, s)| (k.clone(), s.value.clone()))
            .collect()
    }
}

impl Default for MapRef {
    fn default() -> Self {
        MapRef::new()
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Map(self.clone()))
    }
}

pub(crate) struct ListInner {
    pub(crate) items: RefCell<Vec<Value>>,
    pub(crate) observer: RefCell<Option<Rc<Observer>>>,
}

/// A shared, interior-mutable ordered container.
#[derive(Clone)]
pub struct ListRef(pub(crate) Rc<ListInner>);

impl ListRef {
    pub fn new() -> Self {
        ListRef(Rc::new(ListInner {
            items: RefCell::new(Vec::new()),
            observer: RefCell::new(None),
        }))
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        ListRef(Rc::new(ListInner {
            items: RefCell::new(items),
            observer: RefCell::new(None),
        }))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    pub(crate) fn observer(&self) -> Option<Rc<Observer>> {
        self.0.observer.borrow().clone()
    }
}

impl Default for ListRef {
    fn default() -> Self {
        ListRef::new()
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::List(self.clone()))
    }
}

/// Build a [`MapRef`] literal: `vmap! { "a" => 1, "b" => "two" }`.
#[macro_export]
macro_rules! vmap {
    () => { $crate::MapRef::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let map = $crate::MapRef::new();
        $( map.insert($key, $value); )+
        map
    }};
}

/// Build a [`ListRef`] literal: `vlist![1, 2, 3]`.
#[macro_export]
macro_rules! vlist {
    () => { $crate::ListRef::new() };
    ($($item:expr),+ $(,)?) => {
        $crate::ListRef::from_values(vec![ $( $crate::Value::from($item) ),+ ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_treats_nan_as_equal() {
        let nan = Value::Float(f64::NAN);
        assert!(Value::same(&nan, &Value::Float(f64::NAN)));
        assert!(!Value::same(&Value::Float(1.0), &nan));
    }

    #[test]
    fn containers_compare_by_reference() {
        let a = vmap! { "x" => 1 };
        let b = vmap! { "x" => 1 };
        assert!(!Value::same(&Value::Map(a.clone()), &Value::Map(b.clone())));
        assert!(Value::same(&Value::Map(a.clone()), &Value::Map(a)));
        // structural equality still sees through the handles
        assert_eq!(Value::Map(vmap! { "x" => 1 }), Value::Map(b));
    }
}
