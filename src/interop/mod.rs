//! Interoperability - host values across the typelib call boundary
//!
//! Design: closed type descriptors with exhaustive dispatch, explicit
//! ownership on every pointer payload
//!
//! Architecture:
//! - `types.rs` - type tags, descriptors, scalar slot sizes
//! - `argument.rs` - argument slots and their pointer payloads
//! - `value.rs` - host values
//! - `coerce.rs` - Result-returning numeric coercions
//! - `bridge.rs` - collaborator traits consumed from the host runtime
//! - `memory.rs` - in-process runtime implementing those traits
//! - `check.rs` - representability checks
//! - `marshal.rs` - host value ↔ argument conversions
//! - `array.rs` - packed array conversions
//! - `list.rs` - foreign linked lists

mod argument;
mod array;
mod bridge;
mod check;
mod coerce;
mod list;
mod marshal;
mod memory;
mod types;
mod value;

pub use argument::{Argument, BufferView, ClosureHandle, ForeignHandle, ForeignMemory, GValue, Pointer};
pub use array::{array_to_value, value_to_array, PackedArray};
pub use bridge::{
    resolve_class, ClosureFactory, GTypeResolver, HostModule, ModuleResolver, ObjectWrapper, Runtime,
    ValueBridge,
};
pub use check::check_representable;
pub use list::{list_to_value, ForeignList, ListKind};
pub use marshal::{argument_to_value, value_to_argument, Marshaller};
pub use memory::{MemoryModule, MemoryRuntime};
pub use types::{
    bounds_of, slot_size, type_size_of, ArrayInfo, GType, InfoType, InterfaceInfo, StructRepr, TypeInfo, TypeTag,
};
pub use value::{HostCallable, HostClass, HostValue, ObjectRef, StructInstance, Wrapped};

#[cfg(test)]
mod tests;
