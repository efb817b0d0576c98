//! Packed homogeneous arrays
//!
//! Elements are stored back to back at a fixed stride given by
//! `slot_size`, in native byte order, with an optional all-zero
//! terminator slot.

use super::argument::{Argument, Pointer};
use super::bridge::Runtime;
use super::marshal::{argument_to_value, value_to_argument};
use super::types::{slot_size, TypeInfo, TypeTag};
use super::value::HostValue;
use crate::errors::{ConversionError, ErrorKind, Result};
use crate::logging;
use smallvec::SmallVec;
use std::ffi::{CStr, CString};
use std::mem::size_of;
use std::os::raw::{c_char, c_int, c_long, c_short, c_uint, c_ulong, c_ushort};

type Slot = SmallVec<[u8; 8]>;

/// Contiguous buffer of packed elements
///
/// String elements are stored as pointers into `strings`, which the array
/// owns, so the buffer stays valid for as long as the array is alive.
#[derive(Debug, PartialEq)]
pub struct PackedArray {
    bytes: Vec<u8>,
    length: usize,
    element_size: usize,
    element_tag: TypeTag,
    zero_terminated: bool,
    strings: Vec<CString>,
}

impl PackedArray {
    /// Number of elements, terminator excluded
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn element_tag(&self) -> TypeTag {
        self.element_tag
    }

    #[inline]
    pub fn is_zero_terminated(&self) -> bool {
        self.zero_terminated
    }

    /// Raw buffer, terminator slot included
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Unpack into a host tuple
    ///
    /// `ty` must describe the same element type the array was packed with.
    pub fn to_value(&self, runtime: &dyn Runtime, ty: &TypeInfo) -> Result<HostValue> {
        let element = element_type(ty)?;
        if element.tag() != self.element_tag {
            return Err(ConversionError::inconsistent(
                element.tag(),
                self.element_tag.as_str(),
            ));
        }
        if ty.is_zero_terminated() != self.zero_terminated {
            return Err(ConversionError::new(
                ErrorKind::Type,
                "Array termination does not match its type",
            ));
        }

        // SAFETY: `bytes` holds `length` slots of `element_size` bytes plus the
        // terminator slot when zero-terminated, and every string pointer in it
        // points into `strings`, which lives as long as `self`.
        unsafe { array_to_value(runtime, self.as_ptr(), self.length, ty) }
    }
}

fn element_type(ty: &TypeInfo) -> Result<&TypeInfo> {
    match ty {
        TypeInfo::Array(array) => Ok(array.element.as_ref()),
        other => Err(ConversionError::new(
            ErrorKind::Type,
            format!("{} is not an array type", other),
        )),
    }
}

/// Slot size of an element type; arrays of containers or interfaces have
/// no fixed-size slot and cannot be packed
fn packed_size(element: &TypeInfo, direction: &str) -> Result<usize> {
    slot_size(element.tag()).ok_or_else(|| {
        logging::log_unsupported(direction, element.tag());
        ConversionError::unsupported(element.tag(), direction)
    })
}

/// Pack a host sequence into a contiguous buffer
///
/// Every element goes through `value_to_argument` and is copied into its
/// slot; a zero-terminated type gets one extra zeroed slot.
pub fn value_to_array(runtime: &dyn Runtime, value: &HostValue, ty: &TypeInfo) -> Result<PackedArray> {
    let element = element_type(ty)?;
    let items = match value {
        HostValue::Tuple(items) | HostValue::List(items) => items,
        other => return Err(ConversionError::type_mismatch("tuple", &other.type_name())),
    };

    let element_tag = element.tag();
    let element_size = packed_size(element, "to_array")?;
    let zero_terminated = ty.is_zero_terminated();

    let slots = items.len() + usize::from(zero_terminated);
    let total = slots
        .checked_mul(element_size)
        .ok_or_else(|| ConversionError::new(ErrorKind::Value, "Array is too large to pack"))?;
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(total)
        .map_err(|_| ConversionError::new(ErrorKind::Value, "Cannot allocate array buffer"))?;
    bytes.resize(total, 0);

    let mut strings = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let argument = value_to_argument(runtime, item, element).map_err(|e| e.at_item(i))?;
        let slot = encode_slot(argument, &mut strings).map_err(|e| e.at_item(i))?;
        debug_assert_eq!(slot.len(), element_size);

        let offset = i * element_size;
        bytes[offset..offset + element_size].copy_from_slice(&slot);
    }

    logging::log_array_packed(items.len(), element_size, zero_terminated);

    Ok(PackedArray {
        bytes,
        length: items.len(),
        element_size,
        element_tag,
        zero_terminated,
        strings,
    })
}

/// Unpack `length` elements from `items` into a host tuple
///
/// For a zero-terminated type the length is recomputed by scanning for the
/// terminator slot and the `length` argument is ignored. A null `items`
/// yields `None`.
///
/// # Safety
///
/// `items` must be null or point to readable memory holding the slots
/// described by `ty`: `length` slots, or for a zero-terminated type, slots up
/// to and including an all-zero terminator. String slots must hold null or
/// pointers to NUL-terminated strings.
pub unsafe fn array_to_value(
    runtime: &dyn Runtime,
    items: *const u8,
    length: usize,
    ty: &TypeInfo,
) -> Result<HostValue> {
    if items.is_null() {
        return Ok(HostValue::None);
    }

    let element = element_type(ty)?;
    let element_size = packed_size(element, "array_to_value")?;
    let length = if ty.is_zero_terminated() {
        zero_terminated_length(items, element_size)
    } else {
        length
    };

    let mut values = Vec::with_capacity(length);
    for i in 0..length {
        let slot = std::slice::from_raw_parts(items.add(i * element_size), element_size);
        let argument = decode_slot(element.tag(), slot).map_err(|e| e.at_item(i))?;
        // Partial results are dropped with `values` on failure
        let value = argument_to_value(runtime, argument, element).map_err(|e| e.at_item(i))?;
        values.push(value);
    }
    Ok(HostValue::Tuple(values))
}

/// Count slots before the first all-zero slot
unsafe fn zero_terminated_length(items: *const u8, element_size: usize) -> usize {
    let mut length = 0;
    loop {
        let slot = std::slice::from_raw_parts(items.add(length * element_size), element_size);
        if slot.iter().all(|&b| b == 0) {
            return length;
        }
        length += 1;
    }
}

fn encode_slot(argument: Argument, strings: &mut Vec<CString>) -> Result<Slot> {
    let slot = match argument {
        Argument::Boolean(b) => Slot::from_slice(&c_int::from(b).to_ne_bytes()),
        Argument::Int8(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UInt8(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Int16(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UInt16(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Int32(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UInt32(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Int64(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UInt64(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Short(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UShort(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Int(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::UInt(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Long(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::ULong(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::SSize(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Size(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Float(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Double(v) => Slot::from_slice(&v.to_ne_bytes()),
        Argument::Pointer(Pointer::Null) => Slot::from_elem(0, size_of::<usize>()),
        Argument::Pointer(Pointer::Owned(s)) => {
            // The heap buffer does not move when the CString does
            let addr = s.as_ptr() as usize;
            strings.push(s);
            Slot::from_slice(&addr.to_ne_bytes())
        }
        other => {
            return Err(ConversionError::new(
                ErrorKind::Type,
                format!("Cannot pack {} into an array slot", other.kind()),
            ))
        }
    };
    Ok(slot)
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        ConversionError::new(
            ErrorKind::Size,
            format!("Slot holds {} bytes, not {}", bytes.len(), N),
        )
    })
}

macro_rules! read {
    ($ty:ty, $bytes:expr) => {
        <$ty>::from_ne_bytes(fixed($bytes)?)
    };
}

/// Decode one slot into the argument its tag describes
///
/// # Safety
///
/// A `utf8` slot must hold null or a pointer to a NUL-terminated string.
unsafe fn decode_slot(tag: TypeTag, bytes: &[u8]) -> Result<Argument> {
    let argument = match tag {
        TypeTag::Boolean => Argument::Boolean(read!(c_int, bytes) != 0),
        TypeTag::Int8 => Argument::Int8(read!(i8, bytes)),
        TypeTag::UInt8 => Argument::UInt8(read!(u8, bytes)),
        TypeTag::Int16 => Argument::Int16(read!(i16, bytes)),
        TypeTag::UInt16 => Argument::UInt16(read!(u16, bytes)),
        TypeTag::Int32 => Argument::Int32(read!(i32, bytes)),
        TypeTag::UInt32 => Argument::UInt32(read!(u32, bytes)),
        TypeTag::Int64 => Argument::Int64(read!(i64, bytes)),
        TypeTag::UInt64 => Argument::UInt64(read!(u64, bytes)),
        TypeTag::Short => Argument::Short(read!(c_short, bytes)),
        TypeTag::UShort => Argument::UShort(read!(c_ushort, bytes)),
        TypeTag::Int => Argument::Int(read!(c_int, bytes)),
        TypeTag::UInt => Argument::UInt(read!(c_uint, bytes)),
        TypeTag::Long => Argument::Long(read!(c_long, bytes)),
        TypeTag::ULong => Argument::ULong(read!(c_ulong, bytes)),
        TypeTag::SSize => Argument::SSize(read!(isize, bytes)),
        TypeTag::Size => Argument::Size(read!(usize, bytes)),
        TypeTag::Float => Argument::Float(read!(f32, bytes)),
        TypeTag::Double => Argument::Double(read!(f64, bytes)),
        TypeTag::Utf8 => {
            let addr = read!(usize, bytes);
            if addr == 0 {
                Argument::null()
            } else {
                let s = CStr::from_ptr(addr as *const c_char);
                Argument::Pointer(Pointer::Owned(s.to_owned()))
            }
        }
        other => return Err(ConversionError::unsupported(other, "array_to_value")),
    };
    Ok(argument)
}
