//! Canonical type identifiers.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// The path separator stripped from the front of identifiers.
pub const SEPARATOR: &str = "::";

/// Separator of the legacy `\Namespace\Type` notation, also stripped from the front.
pub const LEGACY_SEPARATOR: char = '\\';

/// Strips every leading namespace separator from `name`.
///
/// Normalizing an already normalized name is a no-op.
///
/// ```
/// use wireup_core::identifier::normalize;
///
/// assert_eq!(normalize("::app::Mailer"), "app::Mailer");
/// assert_eq!(normalize("\\App\\Mailer"), "App\\Mailer");
/// assert_eq!(normalize(normalize("::app::Mailer")), "app::Mailer");
/// ```
pub fn normalize(name: &str) -> &str {
    let mut rest = name;
    loop {
        if let Some(stripped) = rest.strip_prefix(SEPARATOR) {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix(LEGACY_SEPARATOR) {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// [`Identifier`] names a concrete type or an interface inside a container.
///
/// The wrapped name is always normalized, so two differently written references to the same
/// type produce equal identifiers and can be used interchangeably as registry keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Creates a new identifier from a (possibly unnormalized) name.
    pub fn new<S>(name: S) -> Self
    where
        S: AsRef<str>,
    {
        Self(Arc::from(normalize(name.as_ref())))
    }

    /// Returns the identifier of the Rust type `T`.
    ///
    /// `T` may be unsized, so trait objects such as `dyn Mailer` have identifiers too.
    pub fn of<T>() -> Self
    where
        T: ?Sized,
    {
        Self::new(type_name::<T>())
    }

    /// Returns the normalized name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty.
    ///
    /// Registry entries targeting an empty identifier are treated as absent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<&Self> for Identifier {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&&*self.0).finish()
    }
}
