//! Numeric coercion primitives
//!
//! Every coercion returns its failure instead of leaving it in shared
//! state. Nominal variants (`integer`, `float`) accept only the host's own
//! numeric kind; the lenient variants mirror the host's implicit numeric
//! protocols and are used on the non-validating conversion path.

use super::value::HostValue;
use crate::errors::{ConversionError, ErrorKind, Result};

/// Nominally integral value. Booleans count: they are integers on the host.
pub fn integer(value: &HostValue) -> Result<i128> {
    match value {
        HostValue::Int(i) => Ok(*i),
        HostValue::Bool(b) => Ok(i128::from(*b)),
        other => Err(ConversionError::type_mismatch("int or long", &other.type_name())),
    }
}

/// Anything the host can turn into an integer; finite floats truncate
pub fn integer_like(value: &HostValue) -> Result<i128> {
    match value {
        HostValue::Float(f) if f.is_finite() => Ok(f.trunc() as i128),
        HostValue::Float(f) => Err(ConversionError::new(
            ErrorKind::Value,
            format!("Cannot convert float {} to integer", f),
        )),
        other => integer(other).map_err(|_| ConversionError::type_mismatch("int", &other.type_name())),
    }
}

/// Nominally floating value
pub fn float(value: &HostValue) -> Result<f64> {
    match value {
        HostValue::Float(f) => Ok(*f),
        other => Err(ConversionError::type_mismatch("float", &other.type_name())),
    }
}

/// Anything the host can turn into a float
pub fn float_like(value: &HostValue) -> Result<f64> {
    match value {
        HostValue::Float(f) => Ok(*f),
        HostValue::Int(i) => Ok(*i as f64),
        HostValue::Bool(b) => Ok(f64::from(u8::from(*b))),
        other => Err(ConversionError::type_mismatch("float", &other.type_name())),
    }
}

/// Check `value` against an inclusive integer range
pub fn integer_in_range(value: &HostValue, min: i128, max: i128) -> Result<i128> {
    let i = integer(value)?;
    if i < min || i > max {
        return Err(ConversionError::value_range(min, max));
    }
    Ok(i)
}

/// Check `value` is a finite float with magnitude at most `max`
pub fn float_in_range(value: &HostValue, max: f64) -> Result<f64> {
    let f = float(value)?;
    if !f.is_finite() || f < -max || f > max {
        return Err(ConversionError::value_range(
            format!("{:.6}", -max),
            format!("{:.6}", max),
        ));
    }
    Ok(f)
}
