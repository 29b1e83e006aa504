//! Constructor descriptors.
//!
//! A [`Descriptor`] tells a container how to build a type: which parameters its constructor
//! takes, in which order, and how to instantiate it once every parameter is resolved.

use std::sync::Arc;

use wireup_core::{Error, Identifier, Instance, Result};

use crate::constructor::Constructor;

/// How a constructor parameter is resolved.
#[derive(Clone, Debug)]
pub enum ParameterKind {
    /// The parameter has a declared type, which is built recursively.
    Typed(Identifier),
    /// The parameter has no declared type. It can only be satisfied by its default value.
    Untyped { default: Option<Instance> },
}

/// A constructor parameter.
#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
}

impl Parameter {
    /// Creates a parameter whose declared type is named by `ty`.
    pub fn typed<S, I>(name: S, ty: I) -> Self
    where
        S: Into<String>,
        I: Into<Identifier>,
    {
        Self {
            name: name.into(),
            kind: ParameterKind::Typed(ty.into()),
        }
    }

    /// Creates a parameter whose declared type is `T`.
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: ?Sized,
    {
        Self::typed(name, Identifier::of::<T>())
    }

    /// Creates an untyped parameter without a default value.
    ///
    /// Building a type with such a parameter always fails.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Untyped { default: None },
        }
    }

    /// Creates an untyped parameter with a default value.
    pub fn optional<T>(name: impl Into<String>, default: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ParameterKind::Untyped {
                default: Some(Instance::new(default)),
            },
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }
}

/// Resolved constructor arguments, in parameter order.
#[derive(Debug)]
pub struct Arguments {
    owner: Identifier,
    values: Vec<Instance>,
}

impl Arguments {
    pub(crate) const fn new(owner: Identifier, values: Vec<Instance>) -> Self {
        Self { owner, values }
    }

    /// Returns the identifier of the type being constructed.
    #[inline]
    pub const fn owner(&self) -> &Identifier {
        &self.owner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.values.iter()
    }

    /// Returns the argument at `index` as an instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableParameter`] if there is no argument at `index`.
    pub fn get(&self, index: usize) -> Result<&Instance> {
        self.values
            .get(index)
            .ok_or_else(|| self.missing(format!("#{index}")))
    }

    /// Returns the argument at `index` as an `Arc<T>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableParameter`] if there is no argument at `index`, or
    /// [`Error::TypeMismatch`] if the argument cannot be viewed as `T`.
    pub fn take<T>(&self, index: usize) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get(index)?.downcast()
    }

    /// Returns a clone of the argument at `index`.
    ///
    /// This is mostly useful for default values of untyped parameters.
    ///
    /// # Errors
    ///
    /// See [`take`](Self::take).
    pub fn value<T>(&self, index: usize) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.take::<T>(index).map(|value| T::clone(&value))
    }

    pub(crate) fn missing(&self, parameter: impl Into<String>) -> Error {
        Error::unresolvable_parameter(self.owner.clone(), parameter)
    }
}

type InstantiateFn = dyn Fn(&Arguments) -> Result<Instance> + Send + Sync;

/// Describes how to construct a type from its dependencies.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wireup::Container;
/// use wireup::descriptor::{Descriptor, Parameter};
///
/// struct Retries(u32);
///
/// let container = Container::new();
/// container.register(Descriptor::new(
///     vec![Parameter::optional("retries", 3_u32)],
///     |args| Ok(Retries(args.value(0)?)),
/// ));
///
/// let retries = container.create_typed::<Retries>().unwrap();
/// assert_eq!(retries.0, 3);
/// ```
#[derive(Clone)]
pub struct Descriptor {
    id: Identifier,
    parameters: Vec<Parameter>,
    instantiate: Arc<InstantiateFn>,
}

impl Descriptor {
    /// Creates a descriptor for `C` from its parameter list and an instantiation function.
    ///
    /// The instantiation function receives one argument per parameter, in the same order.
    pub fn new<C, F>(parameters: Vec<Parameter>, instantiate: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<C> + Send + Sync + 'static,
    {
        Self {
            id: Identifier::of::<C>(),
            parameters,
            instantiate: Arc::new(move |arguments: &Arguments| {
                instantiate(arguments).map(Instance::new)
            }),
        }
    }

    /// Creates a descriptor from a [`Constructor`], such as a function taking `Arc<T>`
    /// dependencies.
    pub fn from_constructor<K, Args>(constructor: K) -> Self
    where
        K: Constructor<Args>,
    {
        Self::new(K::parameters(), move |arguments: &Arguments| {
            constructor.construct(arguments)
        })
    }

    /// Registers the described type under `id` instead of its Rust type name.
    #[must_use]
    pub fn with_identifier(mut self, id: impl Into<Identifier>) -> Self {
        self.id = id.into();
        self
    }

    /// Makes every built instance viewable as the interface `I`.
    ///
    /// `C` must be the type the descriptor constructs.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wireup::descriptor::Descriptor;
    ///
    /// trait Clock: Send + Sync {}
    ///
    /// struct SystemClock;
    ///
    /// impl Clock for SystemClock {}
    ///
    /// let descriptor = Descriptor::from_constructor(|| SystemClock)
    ///     .provides(|clock: Arc<SystemClock>| clock as Arc<dyn Clock>);
    /// # let _ = descriptor;
    /// ```
    #[must_use]
    pub fn provides<C, I, F>(mut self, cast: F) -> Self
    where
        C: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
    {
        let instantiate = self.instantiate;
        self.instantiate = Arc::new(move |arguments: &Arguments| {
            let instance = instantiate(arguments)?;
            let concrete = instance.downcast::<C>()?;
            Ok(instance.with_view(cast(concrete)))
        });
        self
    }

    #[inline]
    pub const fn id(&self) -> &Identifier {
        &self.id
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Instantiates the described type from resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the instantiation function.
    #[inline]
    pub fn instantiate(&self, arguments: &Arguments) -> Result<Instance> {
        (self.instantiate)(arguments)
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    fn arguments(values: Vec<Instance>) -> Arguments {
        Arguments::new(Identifier::new("test::Owner"), values)
    }

    #[test]
    fn test_parameters() {
        let typed = Parameter::of::<FixedClock>("clock");
        assert_eq!(typed.name(), "clock");
        let ParameterKind::Typed(id) = typed.kind() else {
            panic!("expected a typed parameter");
        };
        assert_eq!(id, &Identifier::of::<FixedClock>());

        let required = Parameter::required("retries");
        assert!(matches!(required.kind(), ParameterKind::Untyped { default: None }));

        let optional = Parameter::optional("retries", 42_u32);
        let ParameterKind::Untyped { default: Some(default) } = optional.kind() else {
            panic!("expected a default value");
        };
        assert_eq!(*default.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn test_arguments() {
        let args = arguments(vec![Instance::new(FixedClock(7)), Instance::new(42_u32)]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.take::<FixedClock>(0).unwrap().0, 7);
        assert_eq!(args.value::<u32>(1).unwrap(), 42);

        assert!(args.take::<u32>(0).unwrap_err().is_type_mismatch());
        let err = args.take::<u32>(2).unwrap_err();
        assert!(err.is_unresolvable_parameter());
        assert_eq!(err.identifier(), Some(&Identifier::new("test::Owner")));
    }

    #[test]
    fn test_instantiate() {
        let descriptor = Descriptor::new(vec![Parameter::optional("now", 5_u64)], |args| {
            Ok(FixedClock(args.value(0)?))
        });
        assert_eq!(descriptor.id(), &Identifier::of::<FixedClock>());
        assert_eq!(descriptor.parameters().len(), 1);

        let instance = descriptor
            .instantiate(&arguments(vec![Instance::new(5_u64)]))
            .unwrap();
        assert_eq!(*instance.downcast::<FixedClock>().unwrap(), FixedClock(5));
    }

    #[test]
    fn test_provides() {
        let descriptor = Descriptor::new(Vec::new(), |_| Ok(FixedClock(9)))
            .provides(|clock: Arc<FixedClock>| clock as Arc<dyn Clock>);

        let instance = descriptor.instantiate(&arguments(Vec::new())).unwrap();
        assert!(instance.provides(&Identifier::of::<dyn Clock>()));
        assert_eq!(instance.downcast::<dyn Clock>().unwrap().now(), 9);
        assert_eq!(*instance.downcast::<FixedClock>().unwrap(), FixedClock(9));
    }

    #[test]
    fn test_provides_wrong_concrete() {
        let descriptor = Descriptor::new(Vec::new(), |_| Ok(FixedClock(9)))
            .provides(|value: Arc<String>| value);

        let err = descriptor.instantiate(&arguments(Vec::new())).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_with_identifier() {
        let descriptor =
            Descriptor::new(Vec::new(), |_| Ok(FixedClock(0))).with_identifier("::clock");
        assert_eq!(descriptor.id().as_str(), "clock");
    }
}
