//! Representability checks
//!
//! Validates a host value against a type descriptor before any conversion
//! happens. Never allocates foreign data and never mutates either side.

use super::bridge::Runtime;
use super::coerce;
use super::types::{InfoType, InterfaceInfo, StructRepr, TypeInfo, TypeTag};
use super::value::HostValue;
use crate::errors::{ConversionError, Result};
use crate::logging;

/// Check that `value` converts losslessly to `ty`
///
/// Fails with a position-annotated error on the first offending item.
pub fn check_representable(runtime: &dyn Runtime, value: &HostValue, ty: &TypeInfo) -> Result<()> {
    let result = check(runtime, value, ty);
    if let Err(error) = &result {
        logging::log_check_failure(ty.tag(), error);
    }
    result
}

fn check(runtime: &dyn Runtime, value: &HostValue, ty: &TypeInfo) -> Result<()> {
    match ty {
        // No check possible
        TypeInfo::Void => Ok(()),
        // Every host value has a truth value
        TypeInfo::Boolean => Ok(()),
        TypeInfo::Int8
        | TypeInfo::UInt8
        | TypeInfo::Int16
        | TypeInfo::UInt16
        | TypeInfo::Int32
        | TypeInfo::UInt32
        | TypeInfo::Int64
        | TypeInfo::UInt64
        | TypeInfo::Short
        | TypeInfo::UShort
        | TypeInfo::Int
        | TypeInfo::UInt
        | TypeInfo::Long
        | TypeInfo::ULong
        | TypeInfo::SSize
        | TypeInfo::Size => check_integer(value, ty.tag()),
        TypeInfo::Float => coerce::float_in_range(value, f64::from(f32::MAX)).map(drop),
        TypeInfo::Double => coerce::float_in_range(value, f64::MAX).map(drop),
        TypeInfo::Utf8 => match value {
            HostValue::Str(_) => Ok(()),
            other => Err(ConversionError::type_mismatch("string", &other.type_name())),
        },
        TypeInfo::Array(array) => {
            let items = match value {
                HostValue::Tuple(items) => items,
                other => return Err(ConversionError::type_mismatch("tuple", &other.type_name())),
            };

            if let Some(required) = array.fixed_size {
                if items.len() != required {
                    return Err(ConversionError::size_mismatch(required, items.len()));
                }
            }

            for (i, item) in items.iter().enumerate() {
                check(runtime, item, &array.element).map_err(|error| error.at_item(i))?;
            }
            Ok(())
        }
        TypeInfo::Interface(info) => check_interface(runtime, value, info),
        TypeInfo::GType => {
            if runtime.gtype_from_value(value).is_valid() {
                Ok(())
            } else {
                Err(ConversionError::type_mismatch("GType", &value.type_name()))
            }
        }
        TypeInfo::TimeT
        | TypeInfo::Filename
        | TypeInfo::GList(_)
        | TypeInfo::GSList(_)
        | TypeInfo::GHash(..)
        | TypeInfo::Error => {
            logging::log_unsupported("check", ty.tag());
            Err(ConversionError::unsupported(ty.tag(), "check"))
        }
    }
}

fn check_integer(value: &HostValue, tag: TypeTag) -> Result<()> {
    let (min, max) = match tag.integer_bounds() {
        Some(bounds) => bounds,
        None => return Err(ConversionError::unsupported(tag, "check")),
    };
    coerce::integer_in_range(value, min, max).map(drop)
}

fn check_interface(runtime: &dyn Runtime, value: &HostValue, info: &InterfaceInfo) -> Result<()> {
    match info.info_type() {
        InfoType::Enum | InfoType::Flags => {
            // Membership in the declared enumerants is not checked.
            coerce::integer_like(value)
                .map(drop)
                .map_err(|_| ConversionError::type_mismatch("int", &value.type_name()))
        }
        InfoType::Struct | InfoType::Boxed => match info.repr() {
            StructRepr::Value => Ok(()),
            StructRepr::Closure if value.is_callable() => Ok(()),
            StructRepr::Closure => Err(ConversionError::type_mismatch("callable", &value.type_name())),
            StructRepr::Plain => check_wrapped(runtime, value, info),
        },
        InfoType::Object | InfoType::Interface => check_wrapped(runtime, value, info),
        InfoType::Union | InfoType::Callback => {
            logging::log_unsupported("check", TypeTag::Interface);
            Err(ConversionError::unsupported(TypeTag::Interface, "check"))
        }
    }
}

/// The value must wrap exactly the expected interface type
fn check_wrapped(runtime: &dyn Runtime, value: &HostValue, info: &InterfaceInfo) -> Result<()> {
    match runtime.wrapped_info(value) {
        Some(wrapped) if wrapped.same_type(info) => Ok(()),
        _ => Err(ConversionError::type_mismatch(info.name(), &value.type_name())),
    }
}
