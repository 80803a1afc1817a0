use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use async_trait::async_trait;
use crate::kernel::error::Result;

/// Lifecycle trait shared by the site subsystems (cache, themes, plugins, content)
#[async_trait]
pub trait KernelComponent: Any + Send + Sync + Debug {
    fn name(&self) -> &'static str;
    async fn initialize(&self) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
}

/// Registry of constructed components, keyed by concrete type and
/// remembering the order they were registered in.
#[derive(Default, Debug)]
pub struct DependencyRegistry {
    instances: HashMap<TypeId, Arc<dyn KernelComponent>>,
    order: Vec<TypeId>,
}

impl DependencyRegistry {
    /// Create a new empty dependency registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component instance under the TypeId of its concrete type V.
    /// Returns false (and keeps the existing instance) if V is already registered.
    pub fn register_instance<V>(&mut self, instance: Arc<V>) -> bool
    where
        V: KernelComponent + 'static,
    {
        let type_id = TypeId::of::<V>();
        if self.instances.contains_key(&type_id) {
            return false;
        }
        self.instances.insert(type_id, instance);
        self.order.push(type_id);
        true
    }

    /// Get a component instance by concrete type T.
    pub fn get_concrete<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.instances
            .get(&TypeId::of::<T>())
            .and_then(|component| {
                let any: Arc<dyn Any + Send + Sync> = component.clone();
                Arc::downcast::<T>(any).ok()
            })
    }

    /// Components in registration order.
    pub fn in_order(&self) -> Vec<Arc<dyn KernelComponent>> {
        self.order
            .iter()
            .filter_map(|id| self.instances.get(id).cloned())
            .collect()
    }

    /// Component names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.in_order().iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
