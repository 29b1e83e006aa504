//! Dependency injection container.
//!
//! A [`Container`] builds instances of registered types, resolving their constructor
//! dependencies recursively. Types are registered with a [`Descriptor`](descriptor::Descriptor),
//! usually derived from a constructor function taking `Arc<T>` dependencies. Interfaces are bound
//! to concretes or [`Factory`] functions, and concretes can be shared so that the container builds
//! them once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use wireup::{Container, Identifier};
//!
//! struct Config {
//!     url: String,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! # fn main() -> wireup::Result<()> {
//! let container = Container::new();
//! container.register_constructor(|| Config {
//!     url: "postgres://localhost".to_string(),
//! });
//! container.register_constructor(|config: Arc<Config>| Database { config });
//! container.share(Identifier::of::<Config>(), None);
//!
//! let database = container.create_typed::<Database>()?;
//! assert_eq!(database.config.url, "postgres://localhost");
//!
//! // `create` always builds a new instance, `get` returns the shared one.
//! assert!(!Arc::ptr_eq(&database, &container.create_typed::<Database>()?));
//! assert!(Arc::ptr_eq(
//!     &container.get_typed::<Config>()?,
//!     &container.get_typed::<Config>()?
//! ));
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
pub(crate) mod macros;

pub mod constructor;
pub mod container;
pub mod descriptor;
mod registry;
pub mod resolver;
pub mod target;

pub use container::{Container, ContainerBuilder};
pub use resolver::{Resolve, Resolver};
pub use target::{Factory, Supplied, Target};

pub use wireup_core::{Error, Identifier, Instance, Result};
pub use wireup_core::{error, identifier, instance};
