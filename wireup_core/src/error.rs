//! Error types.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::identifier::Identifier;

/// [`Error`] is an error that can be raised by functions and methods from this library.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A value is not an instance of the expected type or interface.
    TypeMismatch {
        expected: Identifier,
        actual: Identifier,
    },
    /// A type was requested as shared, but it is neither resolved nor registered as shared.
    MissingResolvedDependency(Identifier),
    /// A constructor parameter has neither a declared type nor a default value.
    UnresolvableParameter { owner: Identifier, parameter: String },
    /// No constructor is registered for a type the container was asked to instantiate.
    UnknownType(Identifier),
    /// A type depends on itself, directly or transitively.
    ///
    /// The path starts at the first occurrence of the repeated type and ends with it.
    CircularDependency(Vec<Identifier>),
    Other(Arc<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    pub const fn type_mismatch(expected: Identifier, actual: Identifier) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    pub const fn missing_resolved_dependency(id: Identifier) -> Self {
        Self::MissingResolvedDependency(id)
    }

    pub fn unresolvable_parameter<S>(owner: Identifier, parameter: S) -> Self
    where
        S: Into<String>,
    {
        Self::UnresolvableParameter {
            owner,
            parameter: parameter.into(),
        }
    }

    pub const fn unknown_type(id: Identifier) -> Self {
        Self::UnknownType(id)
    }

    pub const fn circular_dependency(path: Vec<Identifier>) -> Self {
        Self::CircularDependency(path)
    }

    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Other(Arc::from(err.into()))
    }

    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    pub const fn is_missing_resolved_dependency(&self) -> bool {
        matches!(self, Self::MissingResolvedDependency(_))
    }

    pub const fn is_unresolvable_parameter(&self) -> bool {
        matches!(self, Self::UnresolvableParameter { .. })
    }

    pub const fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }

    pub const fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency(_))
    }

    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }

    /// Returns the identifier of the type this error is about, if any.
    ///
    /// For [`TypeMismatch`](Self::TypeMismatch) this is the expected type, and for
    /// [`CircularDependency`](Self::CircularDependency) the repeated one.
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::TypeMismatch { expected, .. } => Some(expected),
            Self::MissingResolvedDependency(id) | Self::UnknownType(id) => Some(id),
            Self::UnresolvableParameter { owner, .. } => Some(owner),
            Self::CircularDependency(path) => path.last(),
            Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected an instance of `{expected}`, found `{actual}`")
            }
            Self::MissingResolvedDependency(id) => {
                write!(f, "could not find resolved dependencies for `{id}`")
            }
            Self::UnresolvableParameter { owner, parameter } => {
                write!(
                    f,
                    "unresolvable dependency resolving parameter `{parameter}` of `{owner}`"
                )
            }
            Self::UnknownType(id) => write!(f, "type `{id}` has no registered constructor"),
            Self::CircularDependency(path) => {
                f.write_str("circular dependency detected: ")?;
                for (i, id) in path.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" -> ")?;
                    }
                    write!(f, "`{id}`")?;
                }
                Ok(())
            }
            Self::Other(error) => std::fmt::Display::fmt(error, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Other(error) => Some(error),
            _ => None,
        }
    }
}

/// [`Result`] is an alias to [`core::result::Result`] with [`Error`] as the
/// default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;
