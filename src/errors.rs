//! Conversion errors
//!
//! Three recoverable kinds (type, value, size) reported to whoever triggered
//! the conversion, plus `Unsupported` for tags this crate deliberately leaves
//! unimplemented.

use crate::interop::TypeTag;
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong host kind, or wrapped value of another declared type
    Type,
    /// Right kind, but not representable (out of range, overflow)
    Value,
    /// Container cardinality mismatch
    Size,
    /// Tag intentionally left unimplemented
    Unsupported(TypeTag),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Value => write!(f, "value"),
            Self::Size => write!(f, "size"),
            Self::Unsupported(tag) => write!(f, "unsupported {}", tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    kind: ErrorKind,
    message: String,
    expected: Option<String>,
    positions: SmallVec<[usize; 4]>,
}

impl ConversionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            expected: None,
            positions: SmallVec::new(),
        }
    }

    /// "Must be <expected>, not <found>"
    pub fn type_mismatch(expected: impl Into<String>, found: &str) -> Self {
        let expected = expected.into();
        let mut error = Self::new(
            ErrorKind::Type,
            format!("Must be {}, not {}", expected, found),
        );
        error.expected = Some(expected);
        error
    }

    /// "Must range from <min> to <max>"
    pub fn value_range(min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Value, format!("Must range from {} to {}", min, max))
    }

    /// "Must contain <required> items, not <actual>"
    pub fn size_mismatch(required: usize, actual: usize) -> Self {
        Self::new(
            ErrorKind::Size,
            format!("Must contain {} items, not {}", required, actual),
        )
    }

    pub fn not_defined(namespace: &str, name: &str) -> Self {
        let mut error = Self::new(
            ErrorKind::Type,
            format!("Type {}.{} not defined", namespace, name),
        );
        error.expected = Some(format!("{}.{}", namespace, name));
        error
    }

    pub fn unsupported(tag: TypeTag, direction: &str) -> Self {
        Self::new(
            ErrorKind::Unsupported(tag),
            format!("{}: type tag {} is unhandled", direction, tag),
        )
    }

    /// The argument payload does not match what the type descriptor says it holds
    pub fn inconsistent(tag: TypeTag, found: &str) -> Self {
        let mut error = Self::new(
            ErrorKind::Type,
            format!("Argument holds {}, not {}", found, tag),
        );
        error.expected = Some(tag.to_string());
        error
    }

    /// Prefix with the position of the failing tuple item
    pub fn at_item(self, index: usize) -> Self {
        self.at_position(index, "Item")
    }

    /// Prefix with the position of the failing call-site argument
    pub fn at_argument(self, index: usize) -> Self {
        self.at_position(index, "Argument")
    }

    fn at_position(mut self, index: usize, label: &str) -> Self {
        self.message = format!("{} {}: {}", label, index, self.message);
        self.positions.insert(0, index);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Expected type name, set on every type mismatch
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Item indices from the outermost container inwards
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind, ErrorKind::Unsupported(_))
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConversionError {}

pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let error = ConversionError::type_mismatch("int or long", "str");
        assert_eq!(error.kind(), ErrorKind::Type);
        assert_eq!(error.to_string(), "Must be int or long, not str");
        assert_eq!(error.expected(), Some("int or long"));
    }

    #[test]
    fn test_nested_positions() {
        let error = ConversionError::value_range(-128, 127).at_item(1).at_item(3);
        assert_eq!(error.message(), "Item 3: Item 1: Must range from -128 to 127");
        assert_eq!(error.positions(), &[3, 1]);
    }

    #[test]
    fn test_unsupported_is_not_recoverable() {
        let error = ConversionError::unsupported(TypeTag::GHash, "check");
        assert!(!error.is_recoverable());
        assert!(ConversionError::size_mismatch(2, 3).is_recoverable());
    }
}
