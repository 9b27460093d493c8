//! Error type shared by every fallible dictionary operation.
//!
//! The four kinds mirror the host language's exception classes that a
//! mapping can raise. Messages name the offending key, index or
//! operation; the kind prefix is part of the rendered text so callers
//! that only see `Display` still know what was raised.

use thiserror::Error;

/// Which host exception class an error corresponds to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Key,
    Type,
    Value,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    /// Missing key on get/delete/pop, or `popitem` on an empty dictionary.
    /// Carries the repr of the key (or the message for `popitem`).
    #[error("KeyError: {0}")]
    Key(String),

    /// Wrong operand or element type, unhashable key, read-only mutation.
    #[error("TypeError: {0}")]
    Type(String),

    /// Update-sequence element whose length is not exactly two.
    #[error("ValueError: {0}")]
    Value(String),

    /// Size or version changed underneath an iteration or bulk copy.
    #[error("RuntimeError: {0}")]
    Runtime(String),
}

impl DictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DictError::Key(_) => ErrorKind::Key,
            DictError::Type(_) => ErrorKind::Type,
            DictError::Value(_) => ErrorKind::Value,
            DictError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            DictError::Key(m) | DictError::Type(m) | DictError::Value(m) | DictError::Runtime(m) => m,
        }
    }

    pub(crate) fn changed_size() -> Self {
        DictError::Runtime("dictionary changed size during iteration".into())
    }

    pub(crate) fn comparison_recursion() -> Self {
        DictError::Runtime("maximum recursion depth exceeded in comparison".into())
    }

    pub(crate) fn mutated_during_update() -> Self {
        DictError::Runtime("dict mutated during update".into())
    }

    pub fn unhashable(type_name: &str) -> Self {
        DictError::Type(format!("unhashable type: '{type_name}'"))
    }

    pub(crate) fn empty_popitem() -> Self {
        DictError::Key("'popitem(): dictionary is empty'".into())
    }

    pub(crate) fn read_only(type_name: &str) -> Self {
        DictError::Type(format!(
            "'{type_name}' object does not support item assignment"
        ))
    }

    pub(crate) fn no_deletion(type_name: &str) -> Self {
        DictError::Type(format!(
            "'{type_name}' object does not support item deletion"
        ))
    }

    pub(crate) fn busy() -> Self {
        DictError::Runtime("dictionary is already mutably borrowed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        let e = DictError::Key("'a'".into());
        assert_eq!(e.to_string(), "KeyError: 'a'");
        assert_eq!(e.kind(), ErrorKind::Key);
        assert_eq!(e.message(), "'a'");
    }

    #[test]
    fn helper_messages() {
        assert_eq!(
            DictError::changed_size().to_string(),
            "RuntimeError: dictionary changed size during iteration"
        );
        assert_eq!(
            DictError::unhashable("dict").to_string(),
            "TypeError: unhashable type: 'dict'"
        );
        assert_eq!(DictError::empty_popitem().kind(), ErrorKind::Key);
    }
}
