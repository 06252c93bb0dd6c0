//! The boundary to the host object model.
//!
//! Everything the facade layer knows about a host object goes through the
//! four primitives of [`HostObject`]: `get`, `set`, `call` and identity. A
//! [`Handle`] is a cheap, non-owning reference to one such object; the host
//! decides when the object itself goes away.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use thiserror::Error;

use crate::error::{BridgeError, Result};

pub mod memory;

/// Host identity of an object. Two handles are equal iff their ids are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("host exception: {0}")]
    Exception(String),
    #[error("'{name}' is not callable")]
    NotCallable { name: String },
    #[error("host object is no longer reachable")]
    Detached,
}

/// The primitives a host must provide for every object it hands out.
pub trait HostObject: fmt::Debug {
    fn id(&self) -> ObjectId;
    fn get(&self, name: &str) -> Result<Value, HostError>;
    fn set(&self, name: &str, value: Value) -> Result<(), HostError>;
    fn call(&self, method: &str, args: &[Value]) -> Result<Value, HostError>;
}

/// Opaque reference to a host-resident object.
#[derive(Clone)]
pub struct Handle(Rc<dyn HostObject>);

impl Handle {
    pub fn new(object: Rc<dyn HostObject>) -> Self {
        Self(object)
    }

    pub fn id(&self) -> ObjectId {
        self.0.id()
    }

    pub fn get(&self, name: &str) -> Result<Value, HostError> {
        self.0.get(name)
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), HostError> {
        self.0.set(name, value.into())
    }

    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, HostError> {
        self.0.call(method, args)
    }

    /// Read a property and convert it to a static type.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name)?;
        T::from_value(value).map_err(|found| BridgeError::UnexpectedValue {
            property: name.to_string(),
            expected: T::EXPECTED,
            found,
        })
    }

    /// Call a method and convert its result to a static type.
    pub fn call_as<T: FromValue>(&self, method: &str, args: &[Value]) -> Result<T> {
        let value = self.call(method, args)?;
        T::from_value(value).map_err(|found| BridgeError::UnexpectedValue {
            property: format!("{method}()"),
            expected: T::EXPECTED,
            found,
        })
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id())
    }
}

type CallbackFn = dyn Fn(&[Value]) -> Result<Value, HostError>;

/// A Rust function the host can invoke, e.g. an event listener adapter.
///
/// Equality is allocation identity: a clone of a callback is the same
/// callback, two callbacks built from identical closures are not.
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + 'static,
    {
        Self(Rc::new(function))
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, HostError> {
        (self.0)(args)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A value crossing the host boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(Handle),
    Function(Callback),
}

impl Value {
    /// The null/undefined short-circuit: `None` for "no object".
    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Value::Object(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_handle(self) -> Option<Handle> {
        match self {
            Value::Object(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Handle> for Value {
    fn from(v: Handle) -> Self {
        Value::Object(v)
    }
}

impl From<&Handle> for Value {
    fn from(v: &Handle) -> Self {
        Value::Object(v.clone())
    }
}

impl From<Callback> for Value {
    fn from(v: Callback) -> Self {
        Value::Function(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion from a host value into a static Rust type.
///
/// On failure the conversion reports the kind of value it found, which the
/// caller turns into [`BridgeError::UnexpectedValue`].
pub trait FromValue: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Result<Self, &'static str>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        Ok(value)
    }
}

impl FromValue for () {
    const EXPECTED: &'static str = "any";

    fn from_value(_value: Value) -> Result<Self, &'static str> {
        Ok(())
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::String(s) => Ok(s),
            Value::Undefined | Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(format_number(n)),
            other => Err(other.kind()),
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Undefined | Value::Null => Ok(false),
            other => Err(other.kind()),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(other.kind()),
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        f64::from_value(value).map(|n| n as i64)
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        f64::from_value(value).map(|n| n as i32)
    }
}

impl FromValue for u32 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        f64::from_value(value).map(|n| n as u32)
    }
}

impl FromValue for usize {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        f64::from_value(value).map(|n| if n > 0.0 { n as usize } else { 0 })
    }
}

impl FromValue for Handle {
    const EXPECTED: &'static str = "object";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Object(handle) => Ok(handle),
            other => Err(other.kind()),
        }
    }
}

impl FromValue for Option<Handle> {
    const EXPECTED: &'static str = "object or null";

    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Object(handle) => Ok(Some(handle)),
            Value::Undefined | Value::Null => Ok(None),
            other => Err(other.kind()),
        }
    }
}

/// Render a number the way the host prints it (`3`, not `3.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        String::from("NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            String::from("Infinity")
        } else {
            String::from("-Infinity")
        }
    } else {
        n.to_string()
    }
}
