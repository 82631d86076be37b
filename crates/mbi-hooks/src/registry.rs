use mbi_schema::SchemaRegistry;
use mbi_types::{MetadataObject, ObjectType};
use tracing::debug;

use crate::hook::{HookTarget, ObjectBundleHook};

/// Ordered list of registered hooks with per-type filtering.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Box<dyn ObjectBundleHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Hooks run in registration order.
    pub fn register(&mut self, hook: Box<dyn ObjectBundleHook>) {
        debug!(hook = hook.name(), target = ?hook.target(), "registered hook");
        self.hooks.push(hook);
    }

    pub fn with_hook(mut self, hook: Box<dyn ObjectBundleHook>) -> Self {
        self.register(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    fn applies(schemas: &SchemaRegistry, hook: &dyn ObjectBundleHook, object_type: &ObjectType) -> bool {
        match hook.target() {
            HookTarget::Any => true,
            HookTarget::Type(target) => schemas.is_assignable(&target, object_type),
        }
    }

    /// Hooks for one object, matched against its concrete type.
    pub fn for_object(&self, schemas: &SchemaRegistry, object: &MetadataObject) -> Vec<&dyn ObjectBundleHook> {
        self.for_type(schemas, &object.object_type)
    }

    /// Hooks for type-level calls on `object_type`.
    pub fn for_type(&self, schemas: &SchemaRegistry, object_type: &ObjectType) -> Vec<&dyn ObjectBundleHook> {
        self.hooks
            .iter()
            .map(|hook| hook.as_ref())
            .filter(|hook| Self::applies(schemas, *hook, object_type))
            .collect()
    }

    /// Hooks for bundle-level calls: those applying to at least one of the
    /// bundle's types, each listed once.
    pub fn for_bundle<'a>(
        &self,
        schemas: &SchemaRegistry,
        types: impl IntoIterator<Item = &'a ObjectType>,
    ) -> Vec<&dyn ObjectBundleHook> {
        let types: Vec<&ObjectType> = types.into_iter().collect();
        self.hooks
            .iter()
            .map(|hook| hook.as_ref())
            .filter(|hook| types.iter().any(|t| Self::applies(schemas, *hook, t)))
            .collect()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.hooks.iter().map(|h| h.name()).collect();
        f.debug_struct("HookRegistry").field("hooks", &names).finish()
    }
}
