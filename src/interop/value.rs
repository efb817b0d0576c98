//! Host values
//!
//! Dynamically typed values as the host language sees them. Classification
//! is nominal: the variant is the host's own type, never inferred from shape.

use super::argument::{BufferView, ForeignHandle};
use super::types::{GType, InterfaceInfo};
use std::borrow::Cow;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Tuple(Vec<HostValue>),
    List(Vec<HostValue>),
    Callable(HostCallable),
    Wrapped(Wrapped),
}

impl HostValue {
    pub fn tuple(items: impl IntoIterator<Item = HostValue>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Name of the host type, as reported in type errors
    pub fn type_name(&self) -> Cow<'_, str> {
        match self {
            Self::None => Cow::Borrowed("NoneType"),
            Self::Bool(_) => Cow::Borrowed("bool"),
            Self::Int(_) => Cow::Borrowed("int"),
            Self::Float(_) => Cow::Borrowed("float"),
            Self::Str(_) => Cow::Borrowed("str"),
            Self::Tuple(_) => Cow::Borrowed("tuple"),
            Self::List(_) => Cow::Borrowed("list"),
            Self::Callable(_) => Cow::Borrowed("function"),
            Self::Wrapped(Wrapped::Object(object)) => Cow::Borrowed(object.class().name()),
            Self::Wrapped(Wrapped::Struct(instance)) => Cow::Borrowed(instance.class().name()),
            Self::Wrapped(Wrapped::Type(_)) => Cow::Borrowed("GType"),
        }
    }

    /// Host truth value
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Tuple(items) | Self::List(items) => !items.is_empty(),
            Self::Callable(_) | Self::Wrapped(_) => true,
        }
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for HostValue {
    fn from(value: u64) -> Self {
        Self::Int(value.into())
    }
}

impl From<i128> for HostValue {
    fn from(value: i128) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Host-visible wrapper around something foreign
#[derive(Debug, Clone, PartialEq)]
pub enum Wrapped {
    Object(ObjectRef),
    Struct(StructInstance),
    Type(GType),
}

/// Host callable, identified by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostCallable {
    name: String,
}

impl HostCallable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Host class generated for a registered interface type
#[derive(Debug, Clone, PartialEq)]
pub struct HostClass {
    info: Rc<InterfaceInfo>,
}

impl HostClass {
    pub fn new(info: Rc<InterfaceInfo>) -> Self {
        Self { info }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.info.name()
    }

    #[inline]
    pub fn info(&self) -> &Rc<InterfaceInfo> {
        &self.info
    }
}

/// Host wrapper of a foreign object; the wrapper owns the reference
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    handle: ForeignHandle,
    class: HostClass,
}

impl ObjectRef {
    pub fn new(handle: ForeignHandle, class: HostClass) -> Self {
        Self { handle, class }
    }

    #[inline]
    pub fn handle(&self) -> ForeignHandle {
        self.handle
    }

    #[inline]
    pub fn class(&self) -> &HostClass {
        &self.class
    }
}

/// Instance of a struct class, exposing its memory as a raw buffer
#[derive(Debug, Clone, PartialEq)]
pub struct StructInstance {
    class: HostClass,
    buffer: Option<BufferView>,
}

impl StructInstance {
    /// Bare instance with no buffer attached yet
    pub fn bare(class: HostClass) -> Self {
        Self {
            class,
            buffer: None,
        }
    }

    pub fn with_buffer(class: HostClass, buffer: BufferView) -> Self {
        Self {
            class,
            buffer: Some(buffer),
        }
    }

    pub fn attach(&mut self, buffer: BufferView) {
        self.buffer = Some(buffer);
    }

    #[inline]
    pub fn class(&self) -> &HostClass {
        &self.class
    }

    #[inline]
    pub fn buffer(&self) -> Option<&BufferView> {
        self.buffer.as_ref()
    }
}
