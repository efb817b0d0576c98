//! Collaborator interfaces
//!
//! The conversion core never wraps objects, imports modules or boxes generic
//! values itself; it asks the host runtime through these traits.

use super::argument::{ClosureHandle, ForeignHandle, GValue};
use super::types::{GType, InterfaceInfo};
use super::value::{HostCallable, HostClass, HostValue, Wrapped};
use crate::errors::Result;
use std::rc::Rc;

/// Host-object wrapping layer
pub trait ObjectWrapper {
    /// Build a host wrapper around a foreign object handle, taking whatever
    /// reference the foreign object model requires.
    fn wrap_object(&self, handle: ForeignHandle, class: &HostClass) -> HostValue;

    /// Borrow the foreign handle inside a wrapper
    fn unwrap_object(&self, value: &HostValue) -> Option<ForeignHandle> {
        match value {
            HostValue::Wrapped(Wrapped::Object(object)) => Some(object.handle()),
            _ => None,
        }
    }

    /// Interface type a wrapped value was created for
    fn wrapped_info(&self, value: &HostValue) -> Option<Rc<InterfaceInfo>> {
        match value {
            HostValue::Wrapped(Wrapped::Object(object)) => Some(object.class().info().clone()),
            HostValue::Wrapped(Wrapped::Struct(instance)) => Some(instance.class().info().clone()),
            _ => None,
        }
    }
}

/// Host module generated for one namespace
pub trait HostModule {
    fn namespace(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<HostClass>;
}

/// Namespace to host module resolution
pub trait ModuleResolver {
    fn resolve(&self, namespace: &str) -> Option<Rc<dyn HostModule>>;
}

/// Generic value boxing and unboxing
pub trait ValueBridge {
    /// Store `value` into an initialized container
    fn value_from_host(&self, gvalue: &mut GValue, value: &HostValue) -> Result<()>;

    /// Read a container back; `copy` asks for contents independent of it
    fn value_to_host(&self, gvalue: &GValue, copy: bool) -> Result<HostValue>;
}

/// Closure adapter construction
pub trait ClosureFactory {
    fn closure_new(&self, callable: &HostCallable) -> ClosureHandle;
}

/// Foreign type-id resolution
pub trait GTypeResolver {
    /// Type handle a host value designates, `GType::INVALID` if none
    fn gtype_from_value(&self, value: &HostValue) -> GType;

    /// Type handle of the host value's own type
    fn gtype_of_type(&self, value: &HostValue) -> GType;
}

/// Everything the conversion core consumes from the host runtime
pub trait Runtime: ObjectWrapper + ModuleResolver + ValueBridge + ClosureFactory + GTypeResolver {}

impl<T> Runtime for T where
    T: ObjectWrapper + ModuleResolver + ValueBridge + ClosureFactory + GTypeResolver
{
}

/// Resolve the host class of a registered type through its namespace module
pub fn resolve_class(runtime: &dyn Runtime, info: &InterfaceInfo) -> Option<HostClass> {
    runtime.resolve(info.namespace())?.attribute(info.name())
}
