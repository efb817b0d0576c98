//! In-process runtime
//!
//! Registry-backed implementation of every collaborator trait, for embedders
//! without a live host interpreter and for tests.

use super::argument::{Argument, ClosureHandle, ForeignHandle, GValue, Pointer};
use super::bridge::{ClosureFactory, GTypeResolver, HostModule, ModuleResolver, ObjectWrapper, ValueBridge};
use super::coerce;
use super::types::{GType, InterfaceInfo};
use super::value::{HostCallable, HostClass, HostValue, ObjectRef, Wrapped};
use crate::errors::{ConversionError, ErrorKind, Result};
use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::CString;
use std::rc::Rc;

/// Host module holding the classes of one namespace
#[derive(Debug, Clone, Default)]
pub struct MemoryModule {
    namespace: String,
    classes: HashMap<String, HostClass>,
}

impl MemoryModule {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            classes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl HostModule for MemoryModule {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn attribute(&self, name: &str) -> Option<HostClass> {
        self.classes.get(name).cloned()
    }
}

#[derive(Debug)]
pub struct MemoryRuntime {
    modules: HashMap<String, Rc<MemoryModule>>,
    by_gtype: HashMap<GType, HostClass>,
    type_names: HashMap<String, GType>,
    next_closure: Cell<u64>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        let type_names = [
            GType::NONE,
            GType::INTERFACE,
            GType::BOOLEAN,
            GType::INT,
            GType::INT64,
            GType::ENUM,
            GType::DOUBLE,
            GType::STRING,
            GType::BOXED,
            GType::OBJECT,
            GType::VALUE,
            GType::CLOSURE,
        ]
        .into_iter()
        .map(|gtype| (gtype.to_string(), gtype))
        .collect();

        Self {
            modules: HashMap::new(),
            by_gtype: HashMap::new(),
            type_names,
            next_closure: Cell::new(1),
        }
    }

    /// Register an interface type and return its host class
    ///
    /// The class becomes an attribute of the module for its namespace, and
    /// its type name (namespace and name concatenated) resolves to its gtype.
    pub fn register_class(&mut self, info: InterfaceInfo) -> HostClass {
        let class = HostClass::new(Rc::new(info));
        let info = class.info();

        let module = self
            .modules
            .entry(info.namespace().to_string())
            .or_insert_with(|| Rc::new(MemoryModule::new(info.namespace())));
        // Copy-on-write: modules already handed out keep their old contents
        Rc::make_mut(module)
            .classes
            .insert(info.name().to_string(), class.clone());

        if info.gtype().is_valid() {
            self.by_gtype.insert(info.gtype(), class.clone());
            self.type_names
                .insert(format!("{}{}", info.namespace(), info.name()), info.gtype());
        }
        class
    }

    /// Host wrapper around a foreign object of a registered class
    pub fn new_object(&self, handle: ForeignHandle, class: &HostClass) -> HostValue {
        self.wrap_object(handle, class)
    }

    /// Closures built so far
    pub fn closures_created(&self) -> u64 {
        self.next_closure.get() - 1
    }

    pub fn class_of(&self, gtype: GType) -> Option<&HostClass> {
        self.by_gtype.get(&gtype)
    }
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectWrapper for MemoryRuntime {
    fn wrap_object(&self, handle: ForeignHandle, class: &HostClass) -> HostValue {
        HostValue::Wrapped(Wrapped::Object(ObjectRef::new(handle, class.clone())))
    }
}

impl ModuleResolver for MemoryRuntime {
    fn resolve(&self, namespace: &str) -> Option<Rc<dyn HostModule>> {
        self.modules
            .get(namespace)
            .map(|module| module.clone() as Rc<dyn HostModule>)
    }
}

impl ValueBridge for MemoryRuntime {
    fn value_from_host(&self, gvalue: &mut GValue, value: &HostValue) -> Result<()> {
        if !gvalue.is_initialized() {
            return Err(ConversionError::type_mismatch(
                "an initialized GValue",
                &gvalue.gtype().to_string(),
            ));
        }

        let data = match value {
            HostValue::None => Argument::null(),
            HostValue::Bool(b) => Argument::Boolean(*b),
            HostValue::Int(_) => {
                let i = coerce::integer_in_range(value, i64::MIN.into(), i64::MAX.into())?;
                Argument::Int64(i as i64)
            }
            HostValue::Float(f) => Argument::Double(*f),
            HostValue::Str(s) => match CString::new(s.as_str()) {
                Ok(s) => Argument::Pointer(Pointer::Owned(s)),
                Err(_) => {
                    return Err(ConversionError::new(
                        ErrorKind::Value,
                        "String contains a NUL byte",
                    ))
                }
            },
            HostValue::Wrapped(Wrapped::Object(object)) => {
                Argument::Pointer(Pointer::Borrowed(object.handle()))
            }
            HostValue::Wrapped(Wrapped::Type(gtype)) => Argument::GType(*gtype),
            other => {
                return Err(ConversionError::type_mismatch(
                    "a GValue-compatible value",
                    &other.type_name(),
                ))
            }
        };
        gvalue.set(data);
        Ok(())
    }

    fn value_to_host(&self, gvalue: &GValue, _copy: bool) -> Result<HostValue> {
        // Every payload read back here is already an independent copy.
        let data = match gvalue.get() {
            Some(data) => data,
            None => return Ok(HostValue::None),
        };

        let value = match data {
            Argument::Boolean(b) => HostValue::Bool(*b),
            Argument::Int64(i) => HostValue::from(*i),
            Argument::Double(f) => HostValue::Float(*f),
            Argument::GType(gtype) => HostValue::Wrapped(Wrapped::Type(*gtype)),
            Argument::Pointer(Pointer::Null) => HostValue::None,
            Argument::Pointer(Pointer::Owned(s)) => {
                HostValue::Str(s.to_string_lossy().into_owned())
            }
            Argument::Pointer(Pointer::Borrowed(handle)) => {
                match self.by_gtype.get(&gvalue.gtype()) {
                    Some(class) => self.wrap_object(*handle, class),
                    None => {
                        return Err(ConversionError::type_mismatch(
                            "a registered object type",
                            &gvalue.gtype().to_string(),
                        ))
                    }
                }
            }
            other => {
                return Err(ConversionError::type_mismatch(
                    "a GValue-compatible value",
                    other.kind(),
                ))
            }
        };
        Ok(value)
    }
}

impl ClosureFactory for MemoryRuntime {
    fn closure_new(&self, callable: &HostCallable) -> ClosureHandle {
        let id = self.next_closure.get();
        self.next_closure.set(id + 1);
        ClosureHandle::new(id, callable.clone())
    }
}

impl GTypeResolver for MemoryRuntime {
    fn gtype_from_value(&self, value: &HostValue) -> GType {
        match value {
            HostValue::Wrapped(Wrapped::Type(gtype)) => *gtype,
            HostValue::Wrapped(Wrapped::Object(object)) => object.class().info().gtype(),
            HostValue::Wrapped(Wrapped::Struct(instance)) => instance.class().info().gtype(),
            HostValue::Str(name) => self.type_names.get(name).copied().unwrap_or(GType::INVALID),
            HostValue::Int(i) => usize::try_from(*i).map(GType).unwrap_or(GType::INVALID),
            _ => GType::INVALID,
        }
    }

    fn gtype_of_type(&self, value: &HostValue) -> GType {
        match value {
            HostValue::None => GType::NONE,
            HostValue::Bool(_) => GType::BOOLEAN,
            HostValue::Int(_) => GType::INT64,
            HostValue::Float(_) => GType::DOUBLE,
            HostValue::Str(_) => GType::STRING,
            HostValue::Wrapped(Wrapped::Object(object)) => object.class().info().gtype(),
            HostValue::Wrapped(Wrapped::Struct(instance)) => instance.class().info().gtype(),
            HostValue::Tuple(_)
            | HostValue::List(_)
            | HostValue::Callable(_)
            | HostValue::Wrapped(Wrapped::Type(_)) => GType::INVALID,
        }
    }
}
