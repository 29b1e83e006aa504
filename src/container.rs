use std::sync::Arc;

use parking_lot::RwLock;
use wireup_core::{Error, Identifier, Instance, Result};

use crate::constructor::Constructor;
use crate::descriptor::Descriptor;
use crate::registry::Registry;
use crate::resolver::{Resolve, Resolver};
use crate::target::{Factory, Supplied, Target};

/// A dependency injection container.
///
/// The container builds instances of registered types by resolving their constructor
/// dependencies recursively. Interfaces can be bound to concrete types or factories, and
/// concretes can be *shared* so that a single instance is built and then reused for the
/// lifetime of the container.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use wireup::{Container, Identifier};
/// use wireup::descriptor::Descriptor;
///
/// trait Transport: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// struct Smtp;
///
/// impl Transport for Smtp {
///     fn name(&self) -> &'static str {
///         "smtp"
///     }
/// }
///
/// struct Mailer {
///     transport: Arc<dyn Transport>,
/// }
///
/// # fn main() -> Result<(), wireup::Error> {
/// let container = Container::builder()
///     .with_descriptor(
///         Descriptor::from_constructor(|| Smtp)
///             .provides(|smtp: Arc<Smtp>| smtp as Arc<dyn Transport>),
///     )
///     .with_constructor(|transport: Arc<dyn Transport>| Mailer { transport })
///     .with_binding(Identifier::of::<dyn Transport>(), Identifier::of::<Smtp>())
///     .with_shared(Identifier::of::<Mailer>())
///     .build()?;
///
/// let mailer = container.get_typed::<Mailer>()?;
/// assert_eq!(mailer.transport.name(), "smtp");
/// assert!(Arc::ptr_eq(&mailer, &container.get_typed::<Mailer>()?));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Container {
    pub(crate) registry: RwLock<Registry>,
}

/// A builder for [`Container`].
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    registry: Registry,
    instances: Vec<(Identifier, Supplied)>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
        }
    }

    /// Returns a new builder for `Container`.
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Registers how to construct a type.
    ///
    /// A type can only be built by the container if it has a registered descriptor.
    /// Registering a descriptor for an already registered identifier replaces it.
    pub fn register(&self, descriptor: Descriptor) {
        debug!(concrete = %descriptor.id(), "register");
        self.registry.write().register(descriptor);
    }

    /// Registers a constructor function, see [`Descriptor::from_constructor`].
    pub fn register_constructor<K, Args>(&self, constructor: K)
    where
        K: Constructor<Args>,
    {
        self.register(Descriptor::from_constructor(constructor));
    }

    /// Builds a fresh instance of `concrete`.
    ///
    /// Every call performs a new build, even for shared concretes. `concrete` can also be an
    /// inline [`Factory`], which is invoked as is.
    ///
    /// # Errors
    ///
    /// Returns an error if `concrete` or one of its dependencies cannot be built.
    pub fn create(&self, concrete: impl Into<Target>) -> Result<Instance> {
        let concrete = concrete.into();
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("resolve", ?concrete, shared = false).entered();
        Resolver::new(self).create(concrete)
    }

    /// Returns the shared instance of `concrete`.
    ///
    /// A resolved concrete returns its cached instance. A shared or bound shared concrete is
    /// built, cached and marked as resolved on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingResolvedDependency`] if `concrete` is neither resolved, shared
    /// nor bound shared, or any error raised while building it.
    pub fn get(&self, concrete: impl Into<Identifier>) -> Result<Instance> {
        let concrete = concrete.into();
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("resolve", %concrete, shared = true).entered();
        Resolver::new(self).get(concrete)
    }

    /// Builds a fresh instance of the type `T`, see [`create`](Self::create).
    ///
    /// # Errors
    ///
    /// See [`Resolve::create_typed`].
    pub fn create_typed<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolve::create_typed(self)
    }

    /// Returns the shared instance of the type `T`, see [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// See [`Resolve::get_typed`].
    pub fn get_typed<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Resolve::get_typed(self)
    }

    /// Binds `interface` to a concrete identifier or a factory.
    ///
    /// Instances built through the binding are not shared. Rebinding replaces the previous
    /// binding.
    pub fn bind(&self, interface: impl Into<Identifier>, concrete: impl Into<Target>) {
        let interface = interface.into();
        let concrete = concrete.into();
        debug!(%interface, ?concrete, "bind");
        self.registry.write().bind(interface, concrete);
    }

    /// Marks `concrete` as shared.
    ///
    /// Without a factory, the concrete is built normally on first [`get`](Self::get). With a
    /// factory, the factory's result is cached instead.
    pub fn share(&self, concrete: impl Into<Identifier>, factory: Option<Factory>) {
        let concrete = concrete.into();
        let target = factory.map_or_else(|| Target::Identifier(concrete.clone()), Target::Factory);
        debug!(%concrete, ?target, "share");
        self.registry.write().share(concrete, target);
    }

    /// Binds `interface` to a concrete identifier or a factory, and shares the result.
    pub fn bind_shared(&self, interface: impl Into<Identifier>, concrete: impl Into<Target>) {
        let interface = interface.into();
        let concrete = concrete.into();
        debug!(%interface, ?concrete, "bind shared");
        self.registry.write().bind_shared(interface, concrete);
    }

    /// Registers a ready instance or a factory for `concrete`.
    ///
    /// An instance is cached immediately and `concrete` is marked as resolved. A factory is
    /// shared and only invoked on first [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the instance is neither of type `concrete` nor
    /// provides it as a view. The container is left unchanged.
    pub fn instance(
        &self,
        concrete: impl Into<Identifier>,
        supplied: impl Into<Supplied>,
    ) -> Result<()> {
        let concrete = concrete.into();
        match supplied.into() {
            Supplied::Instance(instance) if instance.provides(&concrete) => {
                debug!(%concrete, "instance");
                self.registry.write().resolve(concrete, instance);
                Ok(())
            }
            Supplied::Instance(instance) => {
                warn!(%concrete, actual = %instance.concrete(), "instance type mismatch");
                Err(Error::type_mismatch(concrete, instance.concrete().clone()))
            }
            Supplied::Factory(factory) => {
                debug!(%concrete, ?factory, "instance factory");
                self.registry.write().share(concrete, Target::Factory(factory));
                Ok(())
            }
        }
    }

    /// Returns `true` if `concrete` has a cached instance that [`get`](Self::get) returns.
    pub fn is_resolved(&self, concrete: impl Into<Identifier>) -> bool {
        self.registry.read().is_resolved(&concrete.into())
    }

    /// Returns `true` if `concrete` is shared.
    pub fn is_shared(&self, concrete: impl Into<Identifier>) -> bool {
        self.registry.read().is_shared(&concrete.into())
    }

    /// Returns `true` if `interface` is bound.
    pub fn is_bound(&self, interface: impl Into<Identifier>) -> bool {
        self.registry.read().is_bound(&interface.into())
    }

    /// Returns `true` if `interface` is bound as shared.
    pub fn is_bound_shared(&self, interface: impl Into<Identifier>) -> bool {
        self.registry.read().is_bound_shared(&interface.into())
    }

    /// Returns `true` if `concrete` has a registered descriptor.
    pub fn is_registered(&self, concrete: impl Into<Identifier>) -> bool {
        self.registry.read().is_registered(&concrete.into())
    }

    /// Marks every concrete as unresolved, so that shared concretes are built again on their
    /// next [`get`](Self::get).
    ///
    /// Registrations are kept. Concretes registered through [`instance`](Self::instance) with a
    /// ready instance are not shared, so [`get`](Self::get) fails for them afterwards.
    pub fn remove_all(&self) {
        debug!("remove all");
        self.registry.write().remove_all();
    }
}

impl Resolve for Container {
    #[inline]
    fn create<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Target>,
    {
        Self::create(self, concrete)
    }

    #[inline]
    fn get<C>(&self, concrete: C) -> Result<Instance>
    where
        C: Into<Identifier>,
    {
        Self::get(self, concrete)
    }
}

impl ContainerBuilder {
    /// Registers a constructor function.
    #[must_use]
    pub fn with_constructor<K, Args>(self, constructor: K) -> Self
    where
        K: Constructor<Args>,
    {
        self.with_descriptor(Descriptor::from_constructor(constructor))
    }

    /// Registers a constructor descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// Binds an interface, see [`Container::bind`].
    #[must_use]
    pub fn with_binding(
        mut self,
        interface: impl Into<Identifier>,
        concrete: impl Into<Target>,
    ) -> Self {
        self.registry.bind(interface.into(), concrete.into());
        self
    }

    /// Shares a concrete, see [`Container::share`].
    #[must_use]
    pub fn with_shared(mut self, concrete: impl Into<Identifier>) -> Self {
        let concrete = concrete.into();
        self.registry.share(concrete.clone(), Target::Identifier(concrete));
        self
    }

    /// Shares a concrete built by a factory, see [`Container::share`].
    #[must_use]
    pub fn with_shared_factory(
        mut self,
        concrete: impl Into<Identifier>,
        factory: Factory,
    ) -> Self {
        self.registry.share(concrete.into(), Target::Factory(factory));
        self
    }

    /// Binds an interface as shared, see [`Container::bind_shared`].
    #[must_use]
    pub fn with_shared_binding(
        mut self,
        interface: impl Into<Identifier>,
        concrete: impl Into<Target>,
    ) -> Self {
        self.registry.bind_shared(interface.into(), concrete.into());
        self
    }

    /// Registers an instance or a factory, see [`Container::instance`].
    ///
    /// The instance is type checked by [`build`](Self::build).
    #[must_use]
    pub fn with_instance(
        mut self,
        concrete: impl Into<Identifier>,
        supplied: impl Into<Supplied>,
    ) -> Self {
        self.instances.push((concrete.into(), supplied.into()));
        self
    }

    /// Finalizes the building process and returns the built container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if an instance registered with
    /// [`with_instance`](Self::with_instance) does not match its concrete.
    pub fn build(self) -> Result<Container> {
        let Self {
            registry,
            instances,
        } = self;

        let container = Container {
            registry: RwLock::new(registry),
        };

        for (concrete, supplied) in instances {
            container.instance(concrete, supplied)?;
        }

        Ok(container)
    }
}
