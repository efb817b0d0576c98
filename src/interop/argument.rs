//! Binary argument slots
//!
//! Design: one variant per scalar width, and an ownership-tagged pointer
//! payload so release logic follows from the variant rather than from the
//! conversion branch that produced it.

use super::array::PackedArray;
use super::list::ForeignList;
use super::types::GType;
use super::value::HostCallable;
use std::cell::RefCell;
use std::ffi::CString;
use std::fmt;
use std::num::NonZeroUsize;
use std::os::raw::{c_int, c_long, c_short, c_uint, c_ulong, c_ushort};
use std::rc::Rc;

/// Argument slot passed through a foreign call
#[derive(Debug, PartialEq)]
pub enum Argument {
    Void,
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Short(c_short),
    UShort(c_ushort),
    Int(c_int),
    UInt(c_uint),
    Long(c_long),
    ULong(c_ulong),
    SSize(isize),
    Size(usize),
    Float(f32),
    Double(f64),
    GType(GType),
    Pointer(Pointer),
}

impl Argument {
    /// Null pointer slot
    #[inline]
    pub const fn null() -> Self {
        Self::Pointer(Pointer::Null)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Pointer(Pointer::Null))
    }

    /// Short name of the active slot, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean(_) => "boolean",
            Self::Int8(_) => "int8",
            Self::UInt8(_) => "uint8",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Short(_) => "short",
            Self::UShort(_) => "ushort",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Long(_) => "long",
            Self::ULong(_) => "ulong",
            Self::SSize(_) => "ssize",
            Self::Size(_) => "size",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::GType(_) => "GType",
            Self::Pointer(pointer) => pointer.kind(),
        }
    }
}

impl Default for Argument {
    #[inline]
    fn default() -> Self {
        Self::Void
    }
}

/// Pointer payload of an argument slot
#[derive(Debug, PartialEq)]
pub enum Pointer {
    Null,
    /// Independently allocated string, released with the argument
    Owned(CString),
    /// Foreign object handle; the host wrapper stays the owner
    Borrowed(ForeignHandle),
    /// Zero-copy view into memory owned elsewhere
    View(BufferView),
    /// Generic value container, unset after use
    Value(Box<GValue>),
    /// Closure adapter around a host callable
    Closure(ClosureHandle),
    /// Packed homogeneous array
    Array(PackedArray),
    /// Foreign linked list backbone
    List(ForeignList),
}

impl Pointer {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null pointer",
            Self::Owned(_) => "owned string",
            Self::Borrowed(_) => "object handle",
            Self::View(_) => "buffer view",
            Self::Value(_) => "generic value",
            Self::Closure(_) => "closure",
            Self::Array(_) => "packed array",
            Self::List(_) => "list",
        }
    }

    /// Whether dropping this payload releases memory the argument allocated
    pub fn is_owned(&self) -> bool {
        matches!(
            self,
            Self::Owned(_) | Self::Value(_) | Self::Closure(_) | Self::Array(_) | Self::List(_)
        )
    }
}

/// Opaque, non-null address of a foreign object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignHandle(NonZeroUsize);

impl ForeignHandle {
    #[inline]
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    #[inline]
    pub fn addr(self) -> usize {
        self.0.get()
    }
}

/// Shared block of foreign memory
#[derive(Clone)]
pub struct ForeignMemory(Rc<RefCell<Vec<u8>>>);

impl ForeignMemory {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(bytes)))
    }

    pub fn zeroed(size: usize) -> Self {
        Self::new(vec![0; size])
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ForeignMemory) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ForeignMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignMemory")
            .field("addr", &Rc::as_ptr(&self.0))
            .field("len", &self.len())
            .finish()
    }
}

/// Read/write window of `size` bytes at the start of a foreign memory block
#[derive(Debug, Clone)]
pub struct BufferView {
    memory: ForeignMemory,
    size: usize,
}

impl BufferView {
    /// `None` when the block is smaller than the requested window
    pub fn new(memory: ForeignMemory, size: usize) -> Option<Self> {
        if size > memory.len() {
            return None;
        }
        Some(Self { memory, size })
    }

    /// View over the whole block
    pub fn whole(memory: ForeignMemory) -> Self {
        let size = memory.len();
        Self { memory, size }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn memory(&self) -> &ForeignMemory {
        &self.memory
    }

    /// Window of `size` bytes over the same memory
    pub fn narrow(&self, size: usize) -> Option<Self> {
        Self::new(self.memory.clone(), size)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.memory.0.borrow()[..self.size].to_vec()
    }

    /// Write `bytes` at `offset`; false if the write would leave the window
    pub fn write(&self, offset: usize, bytes: &[u8]) -> bool {
        let end = match offset.checked_add(bytes.len()) {
            Some(end) if end <= self.size => end,
            _ => return false,
        };
        self.memory.0.borrow_mut()[offset..end].copy_from_slice(bytes);
        true
    }
}

impl PartialEq for BufferView {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.memory.ptr_eq(&other.memory)
    }
}

/// Generic value container
#[derive(Debug, Default, PartialEq)]
pub struct GValue {
    gtype: GType,
    data: Option<Box<Argument>>,
}

impl GValue {
    /// Uninitialized container
    pub const fn new() -> Self {
        Self {
            gtype: GType::INVALID,
            data: None,
        }
    }

    /// Bind the container to a type; clears any previous contents
    pub fn init(&mut self, gtype: GType) {
        self.gtype = gtype;
        self.data = None;
    }

    #[inline]
    pub fn gtype(&self) -> GType {
        self.gtype
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.gtype.is_valid()
    }

    pub fn set(&mut self, data: Argument) {
        self.data = Some(Box::new(data));
    }

    pub fn get(&self) -> Option<&Argument> {
        self.data.as_deref()
    }

    /// Release the contents and drop the type binding
    pub fn unset(&mut self) {
        self.data = None;
        self.gtype = GType::INVALID;
    }
}

/// Foreign-callable adapter around a host callable
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureHandle {
    id: u64,
    callable: HostCallable,
}

impl ClosureHandle {
    pub fn new(id: u64, callable: HostCallable) -> Self {
        Self { id, callable }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn callable(&self) -> &HostCallable {
        &self.callable
    }
}
