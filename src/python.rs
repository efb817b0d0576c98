//! Python host bridge
//!
//! Converts Python objects to `HostValue` and back, maps conversion errors
//! onto Python exceptions, and exposes the scalar checks as the
//! `gimarshal` extension module.

use crate::errors::{ConversionError, ErrorKind};
use crate::interop::{
    argument_to_value, check_representable, value_to_argument, HostCallable, HostValue, MemoryRuntime,
    TypeInfo, TypeTag, Wrapped,
};
use pyo3::exceptions::{PyNotImplementedError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyFloat, PyList, PyLong, PyString, PyTuple};

impl From<ConversionError> for PyErr {
    fn from(error: ConversionError) -> Self {
        match error.kind() {
            ErrorKind::Type => PyTypeError::new_err(error.to_string()),
            ErrorKind::Value | ErrorKind::Size => PyValueError::new_err(error.to_string()),
            ErrorKind::Unsupported(_) => PyNotImplementedError::new_err(error.to_string()),
        }
    }
}

impl<'source> FromPyObject<'source> for HostValue {
    fn extract(obj: &'source PyAny) -> PyResult<Self> {
        if obj.is_none() {
            return Ok(HostValue::None);
        }
        // bool is a subclass of int, test it first
        if let Ok(b) = obj.downcast::<PyBool>() {
            return Ok(HostValue::Bool(b.is_true()));
        }
        if obj.is_instance_of::<PyLong>() {
            return Ok(HostValue::Int(obj.extract::<i128>()?));
        }
        if let Ok(f) = obj.downcast::<PyFloat>() {
            return Ok(HostValue::Float(f.value()));
        }
        if let Ok(s) = obj.downcast::<PyString>() {
            return Ok(HostValue::Str(s.to_str()?.to_string()));
        }
        if let Ok(tuple) = obj.downcast::<PyTuple>() {
            return tuple.iter().map(HostValue::extract).collect::<PyResult<_>>().map(HostValue::Tuple);
        }
        if let Ok(list) = obj.downcast::<PyList>() {
            return list.iter().map(HostValue::extract).collect::<PyResult<_>>().map(HostValue::List);
        }
        if obj.is_callable() {
            let name = obj
                .getattr("__qualname__")
                .and_then(|name| name.extract::<String>())
                .unwrap_or_else(|_| String::from("<callable>"));
            return Ok(HostValue::Callable(HostCallable::new(name)));
        }

        Err(PyTypeError::new_err(format!(
            "Cannot convert {} to a host value",
            obj.get_type().name()?
        )))
    }
}

/// Python object for a host value
///
/// Foreign wrappers have no Python class here: objects become their handle
/// address, structs a copy of their buffer, and type handles their id.
pub fn host_value_into_py(py: Python<'_>, value: &HostValue) -> PyObject {
    match value {
        HostValue::None => py.None(),
        HostValue::Bool(b) => b.to_object(py),
        HostValue::Int(i) => i.to_object(py),
        HostValue::Float(f) => f.to_object(py),
        HostValue::Str(s) => s.to_object(py),
        HostValue::Tuple(items) => {
            let items: Vec<PyObject> = items.iter().map(|item| host_value_into_py(py, item)).collect();
            PyTuple::new(py, items).into_py(py)
        }
        HostValue::List(items) => {
            let items: Vec<PyObject> = items.iter().map(|item| host_value_into_py(py, item)).collect();
            PyList::new(py, items).into_py(py)
        }
        HostValue::Callable(callable) => callable.name().to_object(py),
        HostValue::Wrapped(Wrapped::Object(object)) => object.handle().addr().into_py(py),
        HostValue::Wrapped(Wrapped::Struct(instance)) => match instance.buffer() {
            Some(buffer) => PyBytes::new(py, &buffer.to_vec()).into_py(py),
            None => py.None(),
        },
        HostValue::Wrapped(Wrapped::Type(gtype)) => gtype.0.into_py(py),
    }
}

fn scalar_type(tag: &str) -> PyResult<TypeInfo> {
    let tag: TypeTag = tag.parse().map_err(PyValueError::new_err)?;
    TypeInfo::scalar(tag)
        .ok_or_else(|| PyValueError::new_err(format!("{} needs type parameters", tag)))
}

/// Check that `value` is representable as the scalar tag `tag`
#[pyfunction]
fn check(value: HostValue, tag: &str) -> PyResult<()> {
    let ty = scalar_type(tag)?;
    check_representable(&MemoryRuntime::new(), &value, &ty)?;
    Ok(())
}

/// Convert `value` to an argument slot of `tag` and back
#[pyfunction]
fn round_trip(py: Python<'_>, value: HostValue, tag: &str) -> PyResult<PyObject> {
    let ty = scalar_type(tag)?;
    let runtime = MemoryRuntime::new();
    let argument = value_to_argument(&runtime, &value, &ty)?;
    let back = argument_to_value(&runtime, argument, &ty)?;
    Ok(host_value_into_py(py, &back))
}

#[pymodule]
fn gimarshal(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(check, m)?)?;
    m.add_function(wrap_pyfunction!(round_trip, m)?)?;
    Ok(())
}
