//! Shared instances with erased type informations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::identifier::Identifier;

/// An erased `Arc<T>`, where `T` may be unsized.
type View = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Inner {
    concrete: Identifier,
    views: HashMap<TypeId, (Identifier, View)>,
}

/// [`Instance`] is a shared object of an arbitrary type, as produced by a container.
///
/// Cloning an instance is cheap and yields the *same* object: use [`Instance::ptr_eq`] to
/// compare identities. Besides its concrete type, an instance can be viewed as any number of
/// interfaces (usually trait objects) it was given with [`with_view`](Self::with_view).
///
/// ```
/// use std::sync::Arc;
/// use wireup_core::{Identifier, Instance};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let english = Arc::new(English);
/// let instance = Instance::from_arc(Arc::clone(&english)).with_view::<dyn Greeter>(english);
///
/// assert!(instance.provides(&Identifier::of::<dyn Greeter>()));
/// assert_eq!(instance.downcast::<dyn Greeter>().unwrap().greet(), "hello");
/// assert!(instance.downcast::<String>().unwrap_err().is_type_mismatch());
/// ```
#[derive(Clone)]
pub struct Instance(Arc<Inner>);

impl Instance {
    /// Creates a new `Instance` owning `value`.
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(value))
    }

    /// Creates a new `Instance` from an already shared value.
    ///
    /// The concrete type of the instance is `T`.
    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let concrete = Identifier::of::<T>();
        let mut views = HashMap::new();
        views.insert(TypeId::of::<T>(), (concrete.clone(), Arc::new(value) as View));
        Self(Arc::new(Inner { concrete, views }))
    }

    /// Adds an interface `I` this instance can be viewed as.
    ///
    /// Views should be added before the instance is shared, as adding a view to a cloned
    /// instance detaches it from its clones.
    #[must_use]
    pub fn with_view<I>(mut self, view: Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.0).views.insert(
            TypeId::of::<I>(),
            (Identifier::of::<I>(), Arc::new(view) as View),
        );
        self
    }

    /// Returns the identifier of the concrete type of this instance.
    #[inline]
    pub fn concrete(&self) -> &Identifier {
        &self.0.concrete
    }

    /// Returns `true` if this instance is of type `T` or can be viewed as `T`.
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.0.views.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if this instance is of, or can be viewed as, the type named by `id`.
    pub fn provides(&self, id: &Identifier) -> bool {
        self.0.views.values().any(|(name, _)| name == id)
    }

    /// Returns the identifiers of every type this instance can be viewed as, including its
    /// concrete type.
    pub fn views(&self) -> impl Iterator<Item = &Identifier> {
        self.0.views.values().map(|(name, _)| name)
    }

    /// Tries to retrieve this instance as an `Arc<T>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the instance is neither of type `T` nor was given a
    /// view of `T`.
    pub fn downcast<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.0
            .views
            .get(&TypeId::of::<T>())
            .and_then(|(_, view)| view.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or_else(|| Error::type_mismatch(Identifier::of::<T>(), self.0.concrete.clone()))
    }

    /// Returns `true` if both instances are the same object.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("concrete", &self.0.concrete)
            .finish_non_exhaustive()
    }
}
