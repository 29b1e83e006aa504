//! Registration tables of a container.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use wireup_core::{Identifier, Instance};

use crate::descriptor::Descriptor;
use crate::target::Target;

/// The state of a container: registrations, resolved shared instances, and the constructor
/// descriptors of buildable types.
///
/// This is pure storage. Resolution logic lives in [`Resolver`](crate::resolver::Resolver).
#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: HashMap<Identifier, Target>,
    shared: HashMap<Identifier, Target>,
    shared_bindings: HashMap<Identifier, Target>,
    resolved: HashSet<Identifier>,
    instances: HashMap<Identifier, Instance>,
    descriptors: HashMap<Identifier, Arc<Descriptor>>,
}

fn is_present(table: &HashMap<Identifier, Target>, id: &Identifier) -> bool {
    table.get(id).is_some_and(|target| !target.is_empty())
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, interface: Identifier, target: Target) {
        self.bindings.insert(interface, target);
    }

    pub(crate) fn share(&mut self, concrete: Identifier, target: Target) {
        self.shared.insert(concrete, target);
    }

    pub(crate) fn bind_shared(&mut self, interface: Identifier, target: Target) {
        self.shared_bindings.insert(interface, target);
    }

    pub(crate) fn register(&mut self, descriptor: Descriptor) {
        self.descriptors.insert(descriptor.id().clone(), Arc::new(descriptor));
    }

    /// Caches `instance` as the resolved instance of `concrete`.
    pub(crate) fn resolve(&mut self, concrete: Identifier, instance: Instance) {
        self.instances.insert(concrete.clone(), instance);
        self.resolved.insert(concrete);
    }

    pub(crate) fn is_bound(&self, interface: &Identifier) -> bool {
        is_present(&self.bindings, interface)
    }

    pub(crate) fn is_shared(&self, concrete: &Identifier) -> bool {
        is_present(&self.shared, concrete)
    }

    pub(crate) fn is_bound_shared(&self, interface: &Identifier) -> bool {
        is_present(&self.shared_bindings, interface)
    }

    pub(crate) fn is_resolved(&self, concrete: &Identifier) -> bool {
        self.resolved.contains(concrete)
    }

    pub(crate) fn is_registered(&self, concrete: &Identifier) -> bool {
        self.descriptors.contains_key(concrete)
    }

    /// Returns the cached instance of `concrete` if it is marked as resolved.
    pub(crate) fn resolved_instance(&self, concrete: &Identifier) -> Option<Instance> {
        if self.is_resolved(concrete) {
            self.instances.get(concrete).cloned()
        } else {
            None
        }
    }

    /// Returns the target `id` is substituted with when built.
    ///
    /// Plain bindings take precedence over shared bindings, which take precedence over shared
    /// templates. Only one substitution is applied.
    pub(crate) fn substitute(&self, id: &Identifier) -> Option<Target> {
        if self.is_bound(id) {
            self.bindings.get(id).cloned()
        } else if self.is_bound_shared(id) {
            self.shared_bindings.get(id).cloned()
        } else if self.is_shared(id) {
            self.shared.get(id).cloned()
        } else {
            None
        }
    }

    pub(crate) fn descriptor(&self, concrete: &Identifier) -> Option<Arc<Descriptor>> {
        self.descriptors.get(concrete).cloned()
    }

    /// Forgets which concretes are resolved.
    ///
    /// Cached instances stay in place until overwritten by the next resolution.
    pub(crate) fn remove_all(&mut self) {
        self.resolved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::target::Factory;

    fn id(name: &str) -> Identifier {
        Identifier::new(name)
    }

    #[test]
    fn test_predicates() {
        let mut registry = Registry::new();
        registry.bind(id("IMailer"), Target::from("Mailer"));
        registry.share(id("Logger"), Target::from("Logger"));
        registry.bind_shared(id("IClock"), Target::from("Clock"));

        assert!(registry.is_bound(&id("IMailer")));
        assert!(!registry.is_bound(&id("IClock")));
        assert!(registry.is_shared(&id("Logger")));
        assert!(!registry.is_shared(&id("Mailer")));
        assert!(registry.is_bound_shared(&id("IClock")));
        assert!(!registry.is_bound_shared(&id("IMailer")));
        assert!(!registry.is_resolved(&id("Logger")));
    }

    #[test]
    fn test_empty_identifier_is_absent() {
        let mut registry = Registry::new();
        registry.bind(id("IMailer"), Target::from(""));
        registry.share(id("Logger"), Target::from("::"));

        assert!(!registry.is_bound(&id("IMailer")));
        assert!(!registry.is_shared(&id("Logger")));
        assert!(registry.substitute(&id("IMailer")).is_none());
    }

    fn substituted(registry: &Registry, name: &str) -> Option<Identifier> {
        match registry.substitute(&id(name))? {
            Target::Identifier(target) => Some(target),
            Target::Factory(_) => None,
        }
    }

    #[test]
    fn test_substitute_order() {
        let mut registry = Registry::new();
        registry.share(id("X"), Target::from("Shared"));
        assert_eq!(substituted(&registry, "X"), Some(id("Shared")));

        registry.bind_shared(id("X"), Target::from("BoundShared"));
        assert_eq!(substituted(&registry, "X"), Some(id("BoundShared")));

        registry.bind(id("X"), Target::from("Bound"));
        assert_eq!(substituted(&registry, "X"), Some(id("Bound")));

        registry.bind(id("X"), Target::from(Factory::value(Instance::new(()))));
        assert!(matches!(registry.substitute(&id("X")), Some(Target::Factory(_))));

        assert!(registry.substitute(&id("Y")).is_none());
    }

    #[test]
    fn test_remove_all_keeps_instances() {
        let mut registry = Registry::new();
        let instance = Instance::new(1_u32);
        registry.resolve(id("Counter"), instance.clone());
        assert!(registry.is_resolved(&id("Counter")));
        assert!(Instance::ptr_eq(
            &registry.resolved_instance(&id("Counter")).unwrap(),
            &instance
        ));

        registry.remove_all();
        assert!(!registry.is_resolved(&id("Counter")));
        assert!(registry.resolved_instance(&id("Counter")).is_none());
        assert!(registry.instances.contains_key(&id("Counter")));

        let replacement = Instance::new(2_u32);
        registry.resolve(id("Counter"), replacement.clone());
        assert!(Instance::ptr_eq(
            &registry.resolved_instance(&id("Counter")).unwrap(),
            &replacement
        ));
    }
}
