//! Constructor functions and types.

use std::sync::Arc;

use wireup_core::{Identifier, Instance, Result};

use crate::descriptor::{Arguments, Parameter};

/// A constructor parameter type whose declared type can be resolved by a container.
pub trait Dependency: Sized {
    /// Describes the parameter.
    fn parameter() -> Parameter;

    /// Extracts the parameter value from a resolved instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](wireup_core::Error::TypeMismatch) if the instance does not
    /// match the declared type.
    fn from_instance(instance: &Instance) -> Result<Self>;
}

impl<T> Dependency for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn parameter() -> Parameter {
        let id = Identifier::of::<T>();
        Parameter::typed(id.to_string(), id)
    }

    fn from_instance(instance: &Instance) -> Result<Self> {
        instance.downcast()
    }
}

/// [`Constructor`] is a trait to describe how to construct a type from its dependencies.
///
/// In most cases, you don't need to implement this trait manually, as [`Constructor`] is
/// automatically implemented on functions that take up to twelve [`Dependency`] parameters,
/// such as `Arc<T>` or `Arc<dyn Trait>`, and return the constructed value.
pub trait Constructor<Args>: Send + Sync + 'static {
    /// The constructed type.
    type Output: Send + Sync + 'static;

    /// Returns the parameter list of the constructor, in order.
    fn parameters() -> Vec<Parameter>;

    /// Calls the constructor with resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is missing or does not match its parameter.
    fn construct(&self, arguments: &Arguments) -> Result<Self::Output>;
}

impl<F, O> Constructor<((O,),)> for F
where
    F: Fn() -> O + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    type Output = O;

    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(&self, _arguments: &Arguments) -> Result<Self::Output> {
        Ok(self())
    }
}

macro_rules! impl_constructor_fn {
    ($($ty:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, O, $($ty,)*> Constructor<((O,), $($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> O + Send + Sync + 'static,
            O: Send + Sync + 'static,
            $( $ty: Dependency, )*
        {
            type Output = O;

            fn parameters() -> Vec<Parameter> {
                vec![$( $ty::parameter(), )*]
            }

            fn construct(&self, arguments: &Arguments) -> Result<Self::Output> {
                let mut values = arguments.iter();
                $(
                    let $ty = match values.next() {
                        Some(value) => $ty::from_instance(value)?,
                        None => return Err(arguments.missing(stringify!($ty))),
                    };
                )*
                Ok(self($($ty,)*))
            }
        }
    };
}

apply_tuples!(impl_constructor_fn);

#[allow(dead_code)]
#[cfg(test)]
mod tests {
    use super::*;

    struct Foo(pub String);

    struct Bar {
        foo: Arc<Foo>,
    }

    trait Greeter: Send + Sync {}

    struct Baz {
        foo: Arc<Foo>,
        bar: Arc<Bar>,
        greeter: Arc<dyn Greeter>,
    }

    impl Bar {
        fn new(foo: Arc<Foo>) -> Self {
            Self { foo }
        }
    }

    fn is_constructor<C, T>(_: C)
    where
        C: Constructor<T>,
    {
    }

    fn test_is_constructor() {
        is_constructor(|| Foo(String::new()));
        is_constructor(Bar::new);
        is_constructor(
            |foo: Arc<Foo>, bar: Arc<Bar>, greeter: Arc<dyn Greeter>| Baz { foo, bar, greeter },
        );
    }

    fn parameters_of<C, T>(_: &C) -> Vec<Parameter>
    where
        C: Constructor<T>,
    {
        C::parameters()
    }

    #[test]
    fn test_parameters_follow_declaration_order() {
        let constructor =
            |foo: Arc<Foo>, bar: Arc<Bar>, greeter: Arc<dyn Greeter>| Baz { foo, bar, greeter };
        let names: Vec<_> = parameters_of(&constructor)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                Identifier::of::<Foo>().to_string(),
                Identifier::of::<Bar>().to_string(),
                Identifier::of::<dyn Greeter>().to_string(),
            ]
        );
    }

    #[test]
    fn test_construct() {
        let arguments = Arguments::new(
            Identifier::of::<Bar>(),
            vec![Instance::new(Foo("foo".to_string()))],
        );
        let bar = Constructor::construct(&Bar::new, &arguments).unwrap();
        assert_eq!(bar.foo.0, "foo");
    }

    #[test]
    fn test_construct_missing_argument() {
        let arguments = Arguments::new(Identifier::of::<Bar>(), Vec::new());
        let Err(err) = Constructor::construct(&Bar::new, &arguments) else {
            panic!("expected a missing argument error");
        };
        assert!(err.is_unresolvable_parameter());
    }

    #[test]
    fn test_construct_mismatched_argument() {
        let arguments = Arguments::new(Identifier::of::<Bar>(), vec![Instance::new(1_u8)]);
        let Err(err) = Constructor::construct(&Bar::new, &arguments) else {
            panic!("expected a type mismatch");
        };
        assert!(err.is_type_mismatch());
    }
}
