//! Type-directed marshaling between host values and typelib argument slots
//!
//! `interop` holds the conversion core: representability checks, the two
//! conversion directions, packed arrays and foreign lists. The host runtime
//! is reached only through the traits in `interop::bridge`; `MemoryRuntime`
//! implements them in process.

pub mod config;
pub mod errors;
pub mod interop;
pub mod logging;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used items
pub use config::{Config, MarshalConfig};
pub use errors::{ConversionError, ErrorKind, Result};
pub use interop::{
    argument_to_value, check_representable, type_size_of, value_to_argument, Argument, HostValue,
    Marshaller, MemoryRuntime, Runtime, TypeInfo, TypeTag,
};
