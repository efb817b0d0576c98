//! Host value ↔ argument slot conversions
//!
//! Design: the raw conversions narrow natively and never range-check;
//! `check_representable` is the validating path. A host value of the wrong
//! kind, or a tag left unimplemented, is still an error rather than a
//! fabricated default.

use super::argument::{Argument, GValue, Pointer};
use super::array::{self, PackedArray};
use super::bridge::{resolve_class, Runtime};
use super::check::check_representable;
use super::coerce;
use super::list::{self, ListKind};
use super::types::{InfoType, InterfaceInfo, StructRepr, TypeInfo, TypeTag};
use super::value::{HostValue, StructInstance, Wrapped};
use crate::config::MarshalConfig;
use crate::errors::{ConversionError, ErrorKind, Result};
use crate::logging;
use std::ffi::CString;
use tracing::{debug_span, warn};

/// Convert a host value into an argument slot for `ty`
///
/// Out-of-range numbers wrap or truncate like a native cast. Strings are
/// copied into an owned buffer; wrapped objects and struct buffers are
/// borrowed.
pub fn value_to_argument(runtime: &dyn Runtime, value: &HostValue, ty: &TypeInfo) -> Result<Argument> {
    logging::log_conversion("to_argument", ty.tag());

    let argument = match ty {
        TypeInfo::Void => Argument::Void,
        TypeInfo::Boolean => Argument::Boolean(value.is_truthy()),
        TypeInfo::Int8 => Argument::Int8(coerce::integer_like(value)? as _),
        TypeInfo::UInt8 => Argument::UInt8(coerce::integer_like(value)? as _),
        TypeInfo::Int16 => Argument::Int16(coerce::integer_like(value)? as _),
        TypeInfo::UInt16 => Argument::UInt16(coerce::integer_like(value)? as _),
        TypeInfo::Int32 => Argument::Int32(coerce::integer_like(value)? as _),
        TypeInfo::UInt32 => Argument::UInt32(coerce::integer_like(value)? as _),
        TypeInfo::Int64 => Argument::Int64(coerce::integer_like(value)? as _),
        TypeInfo::UInt64 => Argument::UInt64(coerce::integer_like(value)? as _),
        TypeInfo::Short => Argument::Short(coerce::integer_like(value)? as _),
        TypeInfo::UShort => Argument::UShort(coerce::integer_like(value)? as _),
        TypeInfo::Int => Argument::Int(coerce::integer_like(value)? as _),
        TypeInfo::UInt => Argument::UInt(coerce::integer_like(value)? as _),
        TypeInfo::Long => Argument::Long(coerce::integer_like(value)? as _),
        TypeInfo::ULong => Argument::ULong(coerce::integer_like(value)? as _),
        TypeInfo::SSize => Argument::SSize(coerce::integer_like(value)? as _),
        TypeInfo::Size => Argument::Size(coerce::integer_like(value)? as _),
        TypeInfo::Float => Argument::Float(coerce::float_like(value)? as f32),
        TypeInfo::Double => Argument::Double(coerce::float_like(value)?),
        TypeInfo::Utf8 => match value {
            HostValue::None => Argument::null(),
            HostValue::Str(s) => Argument::Pointer(Pointer::Owned(owned_string(s)?)),
            other => return Err(ConversionError::type_mismatch("string", &other.type_name())),
        },
        TypeInfo::Array(_) => Argument::Pointer(Pointer::Array(array::value_to_array(runtime, value, ty)?)),
        TypeInfo::Interface(info) => interface_to_argument(runtime, value, info)?,
        TypeInfo::Error if value.is_none() => Argument::null(),
        TypeInfo::Error | TypeInfo::GType => Argument::GType(runtime.gtype_from_value(value)),
        TypeInfo::TimeT
        | TypeInfo::Filename
        | TypeInfo::GList(_)
        | TypeInfo::GSList(_)
        | TypeInfo::GHash(..) => {
            logging::log_unsupported("to_argument", ty.tag());
            return Err(ConversionError::unsupported(ty.tag(), "to_argument"));
        }
    };
    Ok(argument)
}

fn owned_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|e| {
        ConversionError::new(
            ErrorKind::Value,
            format!("String contains a NUL byte at offset {}", e.nul_position()),
        )
    })
}

fn interface_to_argument(runtime: &dyn Runtime, value: &HostValue, info: &InterfaceInfo) -> Result<Argument> {
    match info.info_type() {
        InfoType::Enum | InfoType::Flags => Ok(Argument::Int(coerce::integer_like(value)? as _)),
        InfoType::Struct | InfoType::Boxed => match info.repr() {
            StructRepr::Value => {
                let mut gvalue = GValue::new();
                gvalue.init(runtime.gtype_of_type(value));
                runtime.value_from_host(&mut gvalue, value)?;
                Ok(Argument::Pointer(Pointer::Value(Box::new(gvalue))))
            }
            StructRepr::Closure => match value {
                HostValue::Callable(callable) => {
                    Ok(Argument::Pointer(Pointer::Closure(runtime.closure_new(callable))))
                }
                other => Err(ConversionError::type_mismatch("callable", &other.type_name())),
            },
            StructRepr::Plain => match value {
                HostValue::None => Ok(Argument::null()),
                HostValue::Wrapped(Wrapped::Struct(instance)) => match instance.buffer() {
                    Some(buffer) => Ok(Argument::Pointer(Pointer::View(buffer.clone()))),
                    None => Err(ConversionError::new(
                        ErrorKind::Value,
                        format!("{} instance has no buffer", instance.class().name()),
                    )),
                },
                other => Err(ConversionError::type_mismatch(info.name(), &other.type_name())),
            },
        },
        InfoType::Object | InfoType::Interface => {
            if value.is_none() {
                return Ok(Argument::null());
            }
            match runtime.unwrap_object(value) {
                Some(handle) => Ok(Argument::Pointer(Pointer::Borrowed(handle))),
                None => Err(ConversionError::type_mismatch(info.name(), &value.type_name())),
            }
        }
        InfoType::Union | InfoType::Callback => {
            logging::log_unsupported("to_argument", TypeTag::Interface);
            Err(ConversionError::unsupported(TypeTag::Interface, "to_argument"))
        }
    }
}

/// Convert an argument slot back into a host value for `ty`
///
/// Consumes the argument: owned payloads (strings, generic values, list
/// backbones) are released once converted. Fails with a type error when the
/// slot does not hold what `ty` describes.
pub fn argument_to_value(runtime: &dyn Runtime, argument: Argument, ty: &TypeInfo) -> Result<HostValue> {
    logging::log_conversion("to_value", ty.tag());

    let tag = ty.tag();
    let value = match (ty, argument) {
        (TypeInfo::Void, _) => {
            warn!(concern = "marshal", "void argument converted to None");
            HostValue::None
        }
        (TypeInfo::Boolean, Argument::Boolean(b)) => HostValue::Bool(b),
        (TypeInfo::Int8, Argument::Int8(v)) => HostValue::Int(v.into()),
        (TypeInfo::UInt8, Argument::UInt8(v)) => HostValue::Int(v.into()),
        (TypeInfo::Int16, Argument::Int16(v)) => HostValue::Int(v.into()),
        (TypeInfo::UInt16, Argument::UInt16(v)) => HostValue::Int(v.into()),
        (TypeInfo::Int32, Argument::Int32(v)) => HostValue::Int(v.into()),
        (TypeInfo::UInt32, Argument::UInt32(v)) => HostValue::Int(v.into()),
        (TypeInfo::Int64, Argument::Int64(v)) => HostValue::Int(v.into()),
        (TypeInfo::UInt64, Argument::UInt64(v)) => HostValue::Int(v.into()),
        (TypeInfo::Short, Argument::Short(v)) => HostValue::Int(v.into()),
        (TypeInfo::UShort, Argument::UShort(v)) => HostValue::Int(v.into()),
        (TypeInfo::Int, Argument::Int(v)) => HostValue::Int(v.into()),
        (TypeInfo::UInt, Argument::UInt(v)) => HostValue::Int(v.into()),
        (TypeInfo::Long, Argument::Long(v)) => HostValue::Int(v.into()),
        (TypeInfo::ULong, Argument::ULong(v)) => HostValue::Int(v.into()),
        (TypeInfo::SSize, Argument::SSize(v)) => HostValue::Int(v as i128),
        (TypeInfo::Size, Argument::Size(v)) => HostValue::Int(v as i128),
        (TypeInfo::Float, Argument::Float(v)) => HostValue::Float(v.into()),
        (TypeInfo::Double, Argument::Double(v)) => HostValue::Float(v),
        (TypeInfo::Utf8 | TypeInfo::Filename, Argument::Pointer(Pointer::Null)) => HostValue::None,
        (TypeInfo::Utf8 | TypeInfo::Filename, Argument::Pointer(Pointer::Owned(s))) => {
            HostValue::Str(s.to_string_lossy().into_owned())
        }
        (TypeInfo::GList(element), Argument::Pointer(payload)) => {
            list_payload_to_value(runtime, payload, ListKind::Doubly, element)?
        }
        (TypeInfo::GSList(element), Argument::Pointer(payload)) => {
            list_payload_to_value(runtime, payload, ListKind::Singly, element)?
        }
        (TypeInfo::Interface(info), argument) => interface_to_value(runtime, argument, info)?,
        (TypeInfo::GType, Argument::GType(gtype)) => HostValue::Wrapped(Wrapped::Type(gtype)),
        (TypeInfo::Array(_), _) => {
            warn!(concern = "marshal", "array arguments must be unpacked with array_to_value");
            return Err(ConversionError::unsupported(tag, "to_value"));
        }
        (TypeInfo::TimeT | TypeInfo::GHash(..) | TypeInfo::Error, _) => {
            logging::log_unsupported("to_value", tag);
            return Err(ConversionError::unsupported(tag, "to_value"));
        }
        (_, argument) => return Err(ConversionError::inconsistent(tag, argument.kind())),
    };
    Ok(value)
}

fn list_payload_to_value(
    runtime: &dyn Runtime,
    payload: Pointer,
    kind: ListKind,
    element: &TypeInfo,
) -> Result<HostValue> {
    match payload {
        // An empty list is a null head pointer
        Pointer::Null => Ok(HostValue::List(Vec::new())),
        Pointer::List(list) if list.kind() == kind => list::list_to_value(runtime, list, element),
        other => Err(ConversionError::inconsistent(
            match kind {
                ListKind::Doubly => TypeTag::GList,
                ListKind::Singly => TypeTag::GSList,
            },
            other.kind(),
        )),
    }
}

fn interface_to_value(runtime: &dyn Runtime, argument: Argument, info: &InterfaceInfo) -> Result<HostValue> {
    match info.info_type() {
        InfoType::Enum | InfoType::Flags => match argument {
            Argument::Int(v) => Ok(HostValue::Int(v.into())),
            other => Err(ConversionError::inconsistent(TypeTag::Interface, other.kind())),
        },
        InfoType::Struct | InfoType::Boxed => match (info.repr(), argument) {
            (StructRepr::Value, Argument::Pointer(Pointer::Value(mut gvalue))) => {
                let value = runtime.value_to_host(&gvalue, false);
                gvalue.unset();
                value
            }
            (StructRepr::Closure, Argument::Pointer(Pointer::Closure(closure))) => {
                Ok(HostValue::Callable(closure.callable().clone()))
            }
            (StructRepr::Plain, argument) => {
                let class = resolve_class(runtime, info)
                    .ok_or_else(|| ConversionError::not_defined(info.namespace(), info.name()))?;
                match argument {
                    Argument::Pointer(Pointer::Null) => Ok(HostValue::None),
                    Argument::Pointer(Pointer::View(view)) => {
                        let buffer = view.narrow(info.struct_size()).ok_or_else(|| {
                            ConversionError::new(
                                ErrorKind::Size,
                                format!(
                                    "{} needs {} bytes, buffer holds {}",
                                    info,
                                    info.struct_size(),
                                    view.len()
                                ),
                            )
                        })?;
                        let mut instance = StructInstance::bare(class);
                        instance.attach(buffer);
                        Ok(HostValue::Wrapped(Wrapped::Struct(instance)))
                    }
                    other => Err(ConversionError::inconsistent(TypeTag::Interface, other.kind())),
                }
            }
            (_, Argument::Pointer(Pointer::Null)) => Ok(HostValue::None),
            (_, other) => Err(ConversionError::inconsistent(TypeTag::Interface, other.kind())),
        },
        InfoType::Object | InfoType::Interface => {
            let class = resolve_class(runtime, info)
                .ok_or_else(|| ConversionError::not_defined(info.namespace(), info.name()))?;
            match argument {
                Argument::Pointer(Pointer::Null) => Ok(HostValue::None),
                Argument::Pointer(Pointer::Borrowed(handle)) => Ok(runtime.wrap_object(handle, &class)),
                other => Err(ConversionError::inconsistent(TypeTag::Interface, other.kind())),
            }
        }
        InfoType::Union | InfoType::Callback => {
            logging::log_unsupported("to_value", TypeTag::Interface);
            Err(ConversionError::unsupported(TypeTag::Interface, "to_value"))
        }
    }
}

/// Conversion entry point bound to a runtime
pub struct Marshaller<'rt> {
    runtime: &'rt dyn Runtime,
    config: MarshalConfig,
}

impl<'rt> Marshaller<'rt> {
    pub fn new(runtime: &'rt dyn Runtime) -> Self {
        Self::with_config(runtime, MarshalConfig::default())
    }

    pub fn with_config(runtime: &'rt dyn Runtime, config: MarshalConfig) -> Self {
        Self { runtime, config }
    }

    #[inline]
    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    pub fn check(&self, value: &HostValue, ty: &TypeInfo) -> Result<()> {
        let _span = debug_span!("check", tag = %ty.tag()).entered();
        check_representable(self.runtime, value, ty)
    }

    /// Convert, validating first in strict mode
    pub fn to_argument(&self, value: &HostValue, ty: &TypeInfo) -> Result<Argument> {
        let _span = debug_span!("to_argument", tag = %ty.tag(), strict = self.config.strict).entered();
        if self.config.strict {
            check_representable(self.runtime, value, ty)?;
        }
        value_to_argument(self.runtime, value, ty)
    }

    pub fn to_value(&self, argument: Argument, ty: &TypeInfo) -> Result<HostValue> {
        let _span = debug_span!("to_value", tag = %ty.tag()).entered();
        argument_to_value(self.runtime, argument, ty)
    }

    /// Pack a host sequence; the element count is `PackedArray::len`
    pub fn to_array(&self, value: &HostValue, ty: &TypeInfo) -> Result<PackedArray> {
        let _span = debug_span!("to_array", ty = %ty).entered();
        if self.config.strict {
            check_representable(self.runtime, value, ty)?;
        }
        array::value_to_array(self.runtime, value, ty)
    }

    /// Unpack a raw array buffer
    ///
    /// # Safety
    ///
    /// Same contract as [`array::array_to_value`].
    pub unsafe fn array_to_value(&self, items: *const u8, length: usize, ty: &TypeInfo) -> Result<HostValue> {
        let _span = debug_span!("array_to_value", ty = %ty, length).entered();
        array::array_to_value(self.runtime, items, length, ty)
    }

    /// Convert a call-site argument vector
    ///
    /// Stops at the first failure, prefixed with its argument position.
    pub fn to_arguments(&self, values: &[HostValue], types: &[TypeInfo]) -> Result<Vec<Argument>> {
        let _span = debug_span!("to_arguments", count = values.len()).entered();
        if values.len() != types.len() {
            return Err(ConversionError::size_mismatch(types.len(), values.len()));
        }

        values
            .iter()
            .zip(types)
            .enumerate()
            .map(|(i, (value, ty))| self.to_argument(value, ty).map_err(|e| e.at_argument(i)))
            .collect()
    }
}
