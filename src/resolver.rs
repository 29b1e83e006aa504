//! Resolution of instances and their dependencies.

use std::cell::RefCell;
use std::sync::Arc;

use wireup_core::{Error, Identifier, Instance, Result};

use crate::container::Container;
use crate::descriptor::{Arguments, Parameter, ParameterKind};
use crate::target::Target;

/// A base trait for types that can produce instances by identifier.
///
/// Both [`Container`] and [`Resolver`] implement this trait, so code taking a `&impl Resolve`
/// works from the composition root as well as from inside a factory.
pub trait Resolve {
    /// Builds a fresh instance of `concrete`, ignoring cached shared instances.
    ///
    /// `concrete` is either an identifier or an inline [`Factory`](crate::Factory), which is
    /// invoked directly without any substitution.
    ///
    /// # Errors
    ///
    /// Returns an error if `concrete` or one of its dependencies cannot be built.
    fn create<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Target>;

    /// Returns the shared instance of `concrete`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingResolvedDependency`] if `concrete` is neither resolved nor
    /// shared, or any error raised while building it.
    fn get<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Identifier>;

    /// Builds a fresh instance of the type `T`.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create). Additionally returns [`Error::TypeMismatch`] if the
    /// built instance cannot be viewed as `T`.
    fn create_typed<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.create(Identifier::of::<T>())?.downcast()
    }

    /// Returns the shared instance of the type `T`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get). Additionally returns [`Error::TypeMismatch`] if the
    /// instance cannot be viewed as `T`.
    fn get_typed<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get(Identifier::of::<T>())?.downcast()
    }
}

impl<R> Resolve for &R
where
    R: Resolve,
{
    #[inline]
    fn create<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Target>,
    {
        (**self).create(concrete)
    }

    #[inline]
    fn get<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Identifier>,
    {
        (**self).get(concrete)
    }
}

impl<R> Resolve for Arc<R>
where
    R: Resolve,
{
    #[inline]
    fn create<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Target>,
    {
        (**self).create(concrete)
    }

    #[inline]
    fn get<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Identifier>,
    {
        (**self).get(concrete)
    }
}

/// A single resolution in progress.
///
/// A resolver tracks the path of types currently being built, from the requested type down to
/// the dependency being resolved, and fails instead of recursing forever when a type appears on
/// its own path. Factories receive the resolver of the resolution that invoked them: resolving
/// through it keeps extending the same path.
pub struct Resolver<'a> {
    container: &'a Container,
    path: RefCell<Vec<Identifier>>,
}

/// Pops the resolution path when a `build` call returns.
struct PathGuard<'r> {
    path: &'r RefCell<Vec<Identifier>>,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.borrow_mut().pop();
    }
}

impl<'a> Resolver<'a> {
    pub(crate) const fn new(container: &'a Container) -> Self {
        Self {
            container,
            path: RefCell::new(Vec::new()),
        }
    }

    /// Returns the container this resolver resolves from.
    #[inline]
    pub const fn container(&self) -> &'a Container {
        self.container
    }

    /// Returns the types currently being built, outermost first.
    pub fn path(&self) -> Vec<Identifier> {
        self.path.borrow().clone()
    }

    /// Returns the number of types currently being built.
    pub fn depth(&self) -> usize {
        self.path.borrow().len()
    }

    /// Builds a fresh instance of `concrete`.
    ///
    /// # Errors
    ///
    /// See [`Resolve::create`].
    pub fn create(&self, concrete: impl Into<Target>) -> Result<Instance> {
        match concrete.into() {
            Target::Identifier(concrete) => self.build(&concrete),
            Target::Factory(factory) => {
                trace!(?factory, depth = self.depth(), "invoking inline factory");
                factory.call(self)
            }
        }
    }

    /// Returns the shared instance of `concrete`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// See [`Resolve::get`].
    pub fn get(&self, concrete: impl Into<Identifier>) -> Result<Instance> {
        let concrete = concrete.into();

        {
            let registry = self.container.registry.read();
            if let Some(instance) = registry.resolved_instance(&concrete) {
                debug!(%concrete, "resolved instance found");
                return Ok(instance);
            }

            if !registry.is_shared(&concrete) && !registry.is_bound_shared(&concrete) {
                warn!(%concrete, "missing resolved dependency");
                return Err(Error::missing_resolved_dependency(concrete));
            }
        }

        let instance = self.build(&concrete)?;

        let mut registry = self.container.registry.write();
        // Another thread may have resolved the same concrete while this one was building it.
        // The first stored instance wins so every caller observes the same identity.
        if let Some(existing) = registry.resolved_instance(&concrete) {
            debug!(%concrete, "discarding instance built concurrently");
            return Ok(existing);
        }

        debug!(%concrete, "caching resolved instance");
        registry.resolve(concrete, instance.clone());
        Ok(instance)
    }

    /// Builds `concrete` by substituting its registered target and resolving its constructor
    /// parameters recursively.
    pub(crate) fn build(&self, concrete: &Identifier) -> Result<Instance> {
        let _guard = self.enter(concrete)?;
        trace!(%concrete, depth = self.depth(), "build");

        let target = self.container.registry.read().substitute(concrete);
        match target {
            Some(Target::Factory(factory)) => {
                trace!(%concrete, ?factory, "invoking factory");
                factory.call(self)
            }
            Some(Target::Identifier(effective)) => {
                trace!(%concrete, %effective, "substituted");
                self.instantiate(&effective)
            }
            None => self.instantiate(concrete),
        }
    }

    fn enter(&self, concrete: &Identifier) -> Result<PathGuard<'_>> {
        let mut path = self.path.borrow_mut();
        if let Some(start) = path.iter().position(|id| id == concrete) {
            let mut cycle = path[start..].to_vec();
            cycle.push(concrete.clone());
            warn!(%concrete, "circular dependency detected");
            return Err(Error::circular_dependency(cycle));
        }

        path.push(concrete.clone());
        Ok(PathGuard { path: &self.path })
    }

    fn instantiate(&self, concrete: &Identifier) -> Result<Instance> {
        let descriptor = self
            .container
            .registry
            .read()
            .descriptor(concrete)
            .ok_or_else(|| Error::unknown_type(concrete.clone()))?;

        let mut values = Vec::with_capacity(descriptor.parameters().len());
        for parameter in descriptor.parameters() {
            let value = match parameter.kind() {
                ParameterKind::Typed(dependency) => self.build(dependency)?,
                ParameterKind::Untyped { .. } => resolve_untyped(concrete, parameter)?,
            };
            values.push(value);
        }

        descriptor.instantiate(&Arguments::new(concrete.clone(), values))
    }
}

/// Resolves a parameter without a declared type from its default value.
fn resolve_untyped(owner: &Identifier, parameter: &Parameter) -> Result<Instance> {
    match parameter.kind() {
        ParameterKind::Untyped {
            default: Some(default),
        } => Ok(default.clone()),
        _ => Err(Error::unresolvable_parameter(owner.clone(), parameter.name())),
    }
}

impl Resolve for Resolver<'_> {
    #[inline]
    fn create<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Target>,
    {
        Resolver::create(self, concrete)
    }

    #[inline]
    fn get<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Identifier>,
    {
        Resolver::get(self, concrete)
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("path", &self.path.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::descriptor::Descriptor;
    use crate::target::Factory;

    #[derive(Debug)]
    struct Chicken {
        _egg: Arc<Egg>,
    }

    #[derive(Debug)]
    struct Egg {
        _chicken: Arc<Chicken>,
    }

    struct Leaf;

    fn cyclic_container() -> Container {
        let container = Container::new();
        container.register_constructor(|egg: Arc<Egg>| Chicken { _egg: egg });
        container.register_constructor(|chicken: Arc<Chicken>| Egg { _chicken: chicken });
        container
    }

    #[test]
    fn test_circular_dependency() {
        let container = cyclic_container();
        let err = container.create_typed::<Chicken>().unwrap_err();
        let Error::CircularDependency(path) = err else {
            panic!("expected a circular dependency");
        };
        assert_eq!(
            path,
            vec![
                Identifier::of::<Chicken>(),
                Identifier::of::<Egg>(),
                Identifier::of::<Chicken>(),
            ]
        );
    }

    #[test]
    fn test_circular_dependency_through_factory() {
        let container = Container::new();
        container.bind(
            "app::Service",
            Factory::new(|resolver| resolver.create("app::Service")),
        );

        let err = container.create("app::Service").unwrap_err();
        assert!(err.is_circular_dependency());
        assert_eq!(err.identifier(), Some(&Identifier::new("app::Service")));
    }

    #[test]
    fn test_self_binding_is_not_a_cycle() {
        let container = Container::new();
        container.register_constructor(|| Leaf);
        container.bind(Identifier::of::<Leaf>(), Identifier::of::<Leaf>());
        assert!(container.create_typed::<Leaf>().is_ok());
    }

    #[test]
    fn test_path_is_unwound_after_error() {
        let container = cyclic_container();
        container.register_constructor(|| Leaf);

        let resolver = Resolver::new(&container);
        assert!(resolver.create(Identifier::of::<Chicken>()).is_err());
        assert_eq!(resolver.depth(), 0);
        assert!(resolver.create(Identifier::of::<Leaf>()).is_ok());
        assert!(resolver.path().is_empty());
    }

    #[test]
    fn test_factory_sees_path() {
        let container = Container::new();
        container.bind(
            "app::Probe",
            Factory::from_fn(|resolver| Ok(resolver.path())),
        );

        let path = container
            .create("app::Probe")
            .unwrap()
            .downcast::<Vec<Identifier>>()
            .unwrap();
        assert_eq!(*path, vec![Identifier::new("app::Probe")]);
    }

    #[test]
    fn test_unknown_type() {
        let container = Container::new();
        let err = container.create("app::Nowhere").unwrap_err();
        assert!(err.is_unknown_type());
        assert_eq!(err.identifier(), Some(&Identifier::new("app::Nowhere")));
    }

    #[test]
    fn test_unresolvable_parameter() {
        let container = Container::new();
        container.register(
            Descriptor::new(vec![Parameter::required("name")], |args| {
                args.value::<String>(0)
            })
            .with_identifier("app::Name"),
        );

        let err = container.create("app::Name").unwrap_err();
        let Error::UnresolvableParameter { owner, parameter } = err else {
            panic!("expected an unresolvable parameter");
        };
        assert_eq!(owner, Identifier::new("app::Name"));
        assert_eq!(parameter, "name");
    }

    #[test]
    fn test_unresolvable_parameter_aborts_whole_chain() {
        #[derive(Debug)]
        struct Outer;

        let container = Container::new();
        container.register(
            Descriptor::new(vec![Parameter::required("name")], |args| {
                args.value::<String>(0)
            })
            .with_identifier("app::Name"),
        );
        container.register(Descriptor::new(
            vec![Parameter::typed("name", "app::Name")],
            |_| Ok(Outer),
        ));

        assert!(
            container
                .create_typed::<Outer>()
                .unwrap_err()
                .is_unresolvable_parameter()
        );
    }
}
