//! Type descriptors for argument conversion
//!
//! Only the slice of the typelib vocabulary needed to move a single value
//! across the call boundary: scalar tags, strings, arrays, lists, and the
//! registered interface types (enums, structs, objects).

use num_traits::{Bounded, ToPrimitive};
use std::fmt;
use std::str::FromStr;
use std::os::raw::{c_int, c_long, c_short, c_uint, c_ulong, c_ushort};
use std::rc::Rc;

/// Foreign type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct GType(pub usize);

const FUNDAMENTAL_SHIFT: usize = 2;

impl GType {
    pub const INVALID: Self = Self(0);
    pub const NONE: Self = Self::fundamental(1);
    pub const INTERFACE: Self = Self::fundamental(2);
    pub const BOOLEAN: Self = Self::fundamental(5);
    pub const INT: Self = Self::fundamental(6);
    pub const INT64: Self = Self::fundamental(10);
    pub const ENUM: Self = Self::fundamental(12);
    pub const DOUBLE: Self = Self::fundamental(15);
    pub const STRING: Self = Self::fundamental(16);
    pub const BOXED: Self = Self::fundamental(18);
    pub const OBJECT: Self = Self::fundamental(20);
    /// Generic value container
    pub const VALUE: Self = Self::fundamental(64);
    /// Closure adapter
    pub const CLOSURE: Self = Self::fundamental(65);

    /// Reserved id of the n-th fundamental type
    #[inline]
    pub const fn fundamental(n: usize) -> Self {
        Self(n << FUNDAMENTAL_SHIFT)
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::INVALID => "invalid",
            Self::NONE => "void",
            Self::INTERFACE => "GInterface",
            Self::BOOLEAN => "gboolean",
            Self::INT => "gint",
            Self::INT64 => "gint64",
            Self::ENUM => "GEnum",
            Self::DOUBLE => "gdouble",
            Self::STRING => "gchararray",
            Self::BOXED => "GBoxed",
            Self::OBJECT => "GObject",
            Self::VALUE => "GValue",
            Self::CLOSURE => "GClosure",
            Self(id) => return write!(f, "GType({:#x})", id),
        };
        f.write_str(name)
    }
}

/// Discriminant of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Void,
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    SSize,
    Size,
    Float,
    Double,
    TimeT,
    GType,
    Utf8,
    Filename,
    Array,
    Interface,
    GList,
    GSList,
    GHash,
    Error,
}

impl TypeTag {
    /// Introspection name of the tag
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::SSize => "ssize",
            Self::Size => "size",
            Self::Float => "float",
            Self::Double => "double",
            Self::TimeT => "time_t",
            Self::GType => "GType",
            Self::Utf8 => "utf8",
            Self::Filename => "filename",
            Self::Array => "array",
            Self::Interface => "interface",
            Self::GList => "glist",
            Self::GSList => "gslist",
            Self::GHash => "ghash",
            Self::Error => "error",
        }
    }

    /// Check if tag is an integer of fixed or platform width
    #[inline]
    pub fn is_integral(self) -> bool {
        self.integer_bounds().is_some()
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Exact `[min, max]` of an integer tag, using the platform's widths
    pub fn integer_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            Self::Int8 => bounds_of::<i8>(),
            Self::UInt8 => bounds_of::<u8>(),
            Self::Int16 => bounds_of::<i16>(),
            Self::UInt16 => bounds_of::<u16>(),
            Self::Int32 => bounds_of::<i32>(),
            Self::UInt32 => bounds_of::<u32>(),
            Self::Int64 => bounds_of::<i64>(),
            Self::UInt64 => bounds_of::<u64>(),
            Self::Short => bounds_of::<c_short>(),
            Self::UShort => bounds_of::<c_ushort>(),
            Self::Int => bounds_of::<c_int>(),
            Self::UInt => bounds_of::<c_uint>(),
            Self::Long => bounds_of::<c_long>(),
            Self::ULong => bounds_of::<c_ulong>(),
            Self::SSize => bounds_of::<isize>(),
            Self::Size => bounds_of::<usize>(),
            _ => return None,
        };
        Some(bounds)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ALL_TAGS
            .iter()
            .copied()
            .find(|tag| tag.as_str() == name)
            .ok_or_else(|| format!("Unknown type tag: {}", name))
    }
}

const ALL_TAGS: [TypeTag; 30] = [
    TypeTag::Void,
    TypeTag::Boolean,
    TypeTag::Int8,
    TypeTag::UInt8,
    TypeTag::Int16,
    TypeTag::UInt16,
    TypeTag::Int32,
    TypeTag::UInt32,
    TypeTag::Int64,
    TypeTag::UInt64,
    TypeTag::Short,
    TypeTag::UShort,
    TypeTag::Int,
    TypeTag::UInt,
    TypeTag::Long,
    TypeTag::ULong,
    TypeTag::SSize,
    TypeTag::Size,
    TypeTag::Float,
    TypeTag::Double,
    TypeTag::TimeT,
    TypeTag::GType,
    TypeTag::Utf8,
    TypeTag::Filename,
    TypeTag::Array,
    TypeTag::Interface,
    TypeTag::GList,
    TypeTag::GSList,
    TypeTag::GHash,
    TypeTag::Error,
];

/// Bounds of a native integer type, widened to `i128`
pub fn bounds_of<T: Bounded + ToPrimitive>() -> (i128, i128) {
    (
        T::min_value().to_i128().unwrap_or(i128::MIN),
        T::max_value().to_i128().unwrap_or(i128::MAX),
    )
}

/// Storage size of a scalar tag inside a packed array, `None` for tags
/// without a fixed-size scalar slot
pub fn slot_size(tag: TypeTag) -> Option<usize> {
    use std::mem::size_of;

    let size = match tag {
        // gboolean is an int
        TypeTag::Boolean => size_of::<c_int>(),
        TypeTag::Int | TypeTag::UInt => size_of::<c_int>(),
        TypeTag::Int8 | TypeTag::UInt8 => size_of::<i8>(),
        TypeTag::Int16 | TypeTag::UInt16 => size_of::<i16>(),
        TypeTag::Int32 | TypeTag::UInt32 => size_of::<i32>(),
        TypeTag::Int64 | TypeTag::UInt64 => size_of::<i64>(),
        TypeTag::Short | TypeTag::UShort => size_of::<c_short>(),
        TypeTag::Long | TypeTag::ULong => size_of::<c_long>(),
        TypeTag::Size | TypeTag::SSize => size_of::<usize>(),
        TypeTag::Float => size_of::<f32>(),
        TypeTag::Double => size_of::<f64>(),
        TypeTag::Utf8 => size_of::<*const u8>(),
        _ => return None,
    };
    Some(size)
}

/// Storage size of a scalar tag inside a packed array
///
/// Panics on tags that have no fixed-size scalar slot. Conversions go
/// through `slot_size` and report those tags as unsupported instead.
pub fn type_size_of(tag: TypeTag) -> usize {
    match slot_size(tag) {
        Some(size) => size,
        None => panic!("type_size_of: {} is not a scalar type tag", tag),
    }
}

/// Kind of a registered interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoType {
    Enum,
    Flags,
    Struct,
    Boxed,
    Object,
    Interface,
    Union,
    Callback,
}

impl InfoType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Flags => "flags",
            Self::Struct => "struct",
            Self::Boxed => "boxed",
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Callback => "callback",
        }
    }
}

/// Underlying representation of a struct or boxed type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructRepr {
    /// Generic value container, passed through opaquely
    Value,
    /// Closure adapter around a host callable
    Closure,
    /// Plain memory block
    Plain,
}

impl StructRepr {
    /// Classify by registered type. Value and closure types are final, so
    /// identity is the same as the is-a relation.
    #[inline]
    pub fn of(gtype: GType) -> Self {
        match gtype {
            GType::VALUE => Self::Value,
            GType::CLOSURE => Self::Closure,
            _ => Self::Plain,
        }
    }
}

/// Registered interface type referenced by an `interface` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceInfo {
    info_type: InfoType,
    namespace: String,
    name: String,
    gtype: GType,
    size: usize,
}

impl InterfaceInfo {
    pub fn new(
        info_type: InfoType,
        namespace: impl Into<String>,
        name: impl Into<String>,
        gtype: GType,
    ) -> Self {
        Self {
            info_type,
            namespace: namespace.into(),
            name: name.into(),
            gtype,
            size: 0,
        }
    }

    pub fn enumeration(namespace: &str, name: &str, gtype: GType) -> Self {
        Self::new(InfoType::Enum, namespace, name, gtype)
    }

    /// Struct of `size` bytes
    pub fn structure(namespace: &str, name: &str, gtype: GType, size: usize) -> Self {
        Self {
            size,
            ..Self::new(InfoType::Struct, namespace, name, gtype)
        }
    }

    pub fn object(namespace: &str, name: &str, gtype: GType) -> Self {
        Self::new(InfoType::Object, namespace, name, gtype)
    }

    #[inline]
    pub fn info_type(&self) -> InfoType {
        self.info_type
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn gtype(&self) -> GType {
        self.gtype
    }

    /// Declared struct size in bytes (0 for non-struct types)
    #[inline]
    pub fn struct_size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn repr(&self) -> StructRepr {
        StructRepr::of(self.gtype)
    }

    /// Nominal identity: same namespace, same name, same kind
    pub fn same_type(&self, other: &InterfaceInfo) -> bool {
        self.info_type == other.info_type
            && self.namespace == other.namespace
            && self.name == other.name
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Parameters of an `array` tag
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInfo {
    pub element: Box<TypeInfo>,
    pub fixed_size: Option<usize>,
    pub zero_terminated: bool,
}

/// Type descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInfo {
    Void,
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    SSize,
    Size,
    Float,
    Double,
    TimeT,
    GType,
    Utf8,
    Filename,
    Array(ArrayInfo),
    Interface(Rc<InterfaceInfo>),
    GList(Box<TypeInfo>),
    GSList(Box<TypeInfo>),
    GHash(Box<TypeInfo>, Box<TypeInfo>),
    Error,
}

impl TypeInfo {
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Boolean => TypeTag::Boolean,
            Self::Int8 => TypeTag::Int8,
            Self::UInt8 => TypeTag::UInt8,
            Self::Int16 => TypeTag::Int16,
            Self::UInt16 => TypeTag::UInt16,
            Self::Int32 => TypeTag::Int32,
            Self::UInt32 => TypeTag::UInt32,
            Self::Int64 => TypeTag::Int64,
            Self::UInt64 => TypeTag::UInt64,
            Self::Short => TypeTag::Short,
            Self::UShort => TypeTag::UShort,
            Self::Int => TypeTag::Int,
            Self::UInt => TypeTag::UInt,
            Self::Long => TypeTag::Long,
            Self::ULong => TypeTag::ULong,
            Self::SSize => TypeTag::SSize,
            Self::Size => TypeTag::Size,
            Self::Float => TypeTag::Float,
            Self::Double => TypeTag::Double,
            Self::TimeT => TypeTag::TimeT,
            Self::GType => TypeTag::GType,
            Self::Utf8 => TypeTag::Utf8,
            Self::Filename => TypeTag::Filename,
            Self::Array(_) => TypeTag::Array,
            Self::Interface(_) => TypeTag::Interface,
            Self::GList(_) => TypeTag::GList,
            Self::GSList(_) => TypeTag::GSList,
            Self::GHash(..) => TypeTag::GHash,
            Self::Error => TypeTag::Error,
        }
    }

    /// Descriptor of a tag that takes no parameters
    pub fn scalar(tag: TypeTag) -> Option<Self> {
        let ty = match tag {
            TypeTag::Void => Self::Void,
            TypeTag::Boolean => Self::Boolean,
            TypeTag::Int8 => Self::Int8,
            TypeTag::UInt8 => Self::UInt8,
            TypeTag::Int16 => Self::Int16,
            TypeTag::UInt16 => Self::UInt16,
            TypeTag::Int32 => Self::Int32,
            TypeTag::UInt32 => Self::UInt32,
            TypeTag::Int64 => Self::Int64,
            TypeTag::UInt64 => Self::UInt64,
            TypeTag::Short => Self::Short,
            TypeTag::UShort => Self::UShort,
            TypeTag::Int => Self::Int,
            TypeTag::UInt => Self::UInt,
            TypeTag::Long => Self::Long,
            TypeTag::ULong => Self::ULong,
            TypeTag::SSize => Self::SSize,
            TypeTag::Size => Self::Size,
            TypeTag::Float => Self::Float,
            TypeTag::Double => Self::Double,
            TypeTag::TimeT => Self::TimeT,
            TypeTag::GType => Self::GType,
            TypeTag::Utf8 => Self::Utf8,
            TypeTag::Filename => Self::Filename,
            TypeTag::Error => Self::Error,
            TypeTag::Array | TypeTag::Interface | TypeTag::GList | TypeTag::GSList | TypeTag::GHash => {
                return None
            }
        };
        Some(ty)
    }

    /// Array of `element` with no fixed size and no terminator
    pub fn array(element: TypeInfo) -> Self {
        Self::Array(ArrayInfo {
            element: Box::new(element),
            fixed_size: None,
            zero_terminated: false,
        })
    }

    pub fn fixed_array(element: TypeInfo, size: usize) -> Self {
        Self::Array(ArrayInfo {
            element: Box::new(element),
            fixed_size: Some(size),
            zero_terminated: false,
        })
    }

    pub fn zero_terminated_array(element: TypeInfo) -> Self {
        Self::Array(ArrayInfo {
            element: Box::new(element),
            fixed_size: None,
            zero_terminated: true,
        })
    }

    pub fn interface(info: InterfaceInfo) -> Self {
        Self::Interface(Rc::new(info))
    }

    pub fn glist(element: TypeInfo) -> Self {
        Self::GList(Box::new(element))
    }

    pub fn gslist(element: TypeInfo) -> Self {
        Self::GSList(Box::new(element))
    }

    /// Element type of an array or list
    pub fn param_type(&self) -> Option<&TypeInfo> {
        match self {
            Self::Array(array) => Some(array.element.as_ref()),
            Self::GList(element) | Self::GSList(element) => Some(element.as_ref()),
            _ => None,
        }
    }

    pub fn array_fixed_size(&self) -> Option<usize> {
        match self {
            Self::Array(array) => array.fixed_size,
            _ => None,
        }
    }

    pub fn is_zero_terminated(&self) -> bool {
        matches!(self, Self::Array(array) if array.zero_terminated)
    }

    pub fn interface_info(&self) -> Option<&Rc<InterfaceInfo>> {
        match self {
            Self::Interface(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(array) => write!(f, "array<{}>", array.element),
            Self::Interface(info) => write!(f, "{}", info),
            Self::GList(element) => write!(f, "glist<{}>", element),
            Self::GSList(element) => write!(f, "gslist<{}>", element),
            Self::GHash(key, value) => write!(f, "ghash<{}, {}>", key, value),
            other => f.write_str(other.tag().as_str()),
        }
    }
}
