//! Registration targets: identifiers and factories.

use std::any::type_name;
use std::sync::Arc;

use wireup_core::{Identifier, Instance, Result};

use crate::resolver::Resolver;

type FactoryFn = dyn Fn(&Resolver<'_>) -> Result<Instance> + Send + Sync;

/// A callable producing an instance directly, bypassing constructor descriptors.
///
/// A factory receives the [`Resolver`] of the resolution in progress, so it can resolve other
/// types from the same container.
#[derive(Clone)]
pub struct Factory {
    inner: Arc<FactoryFn>,
    concrete_type: &'static str,
}

impl Factory {
    /// Creates a factory from a function returning an [`Instance`].
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            concrete_type: type_name::<F>(),
        }
    }

    /// Creates a factory from a function returning a plain value, which is wrapped in a fresh
    /// [`Instance`] on every call.
    pub fn from_fn<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move |resolver: &Resolver<'_>| f(resolver).map(Instance::new)),
            concrete_type: type_name::<F>(),
        }
    }

    /// Creates a factory that always returns the same `instance`.
    pub fn value(instance: Instance) -> Self {
        Self {
            inner: Arc::new(move |_: &Resolver<'_>| Ok(instance.clone())),
            concrete_type: type_name::<Instance>(),
        }
    }

    /// Invokes the factory.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying function returns.
    #[inline]
    pub fn call(&self, resolver: &Resolver<'_>) -> Result<Instance> {
        (self.inner)(resolver)
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("concrete_type", &self.concrete_type)
            .finish_non_exhaustive()
    }
}

/// What a binding, shared template or shared binding points to.
#[derive(Clone, Debug)]
pub enum Target {
    /// Build the named type.
    Identifier(Identifier),
    /// Invoke the factory and use its result as is.
    Factory(Factory),
}

impl Target {
    /// Returns `true` if the target should be treated as absent.
    ///
    /// Only an empty identifier is empty; factories never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Identifier(id) => id.is_empty(),
            Self::Factory(_) => false,
        }
    }
}

impl From<Identifier> for Target {
    fn from(id: Identifier) -> Self {
        Self::Identifier(id)
    }
}

impl From<&Identifier> for Target {
    fn from(id: &Identifier) -> Self {
        Self::Identifier(id.clone())
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Identifier(Identifier::new(name))
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Identifier(Identifier::new(name))
    }
}

impl From<Factory> for Target {
    fn from(factory: Factory) -> Self {
        Self::Factory(factory)
    }
}

/// What can be handed to [`Container::instance`](crate::Container::instance).
#[derive(Clone, Debug)]
pub enum Supplied {
    /// A ready instance, cached eagerly.
    Instance(Instance),
    /// A factory, resolved lazily on first `get`.
    Factory(Factory),
}

impl From<Instance> for Supplied {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<Factory> for Supplied {
    fn from(factory: Factory) -> Self {
        Self::Factory(factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from() {
        assert!(matches!(
            Target::from("::app::Mailer"),
            Target::Identifier(id) if id.as_str() == "app::Mailer"
        ));
        assert!(matches!(
            Target::from(Factory::value(Instance::new(1_u8))),
            Target::Factory(_)
        ));
    }

    #[test]
    fn test_target_is_empty() {
        assert!(Target::from("").is_empty());
        assert!(!Target::from("a").is_empty());
        assert!(!Target::from(Factory::value(Instance::new(()))).is_empty());
    }
}
