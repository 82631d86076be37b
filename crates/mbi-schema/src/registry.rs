use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use mbi_types::{ImportStrategy, ObjectType, Uid};
use tracing::warn;

use crate::error::{SchemaError, SchemaResult};
use crate::property::PropertyKind;
use crate::schema::Schema;

// ---------------------------------------------------------------------------
// SchemaRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects schemas at startup. Registration order is significant: it breaks
/// ties in the type processing order.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: Vec<Schema>,
}

impl SchemaRegistryBuilder {
    pub fn register(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Validate the collected schemas and compute the processing order.
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        let mut schemas = BTreeMap::new();
        let mut registration = Vec::with_capacity(self.schemas.len());

        for schema in self.schemas {
            let mut seen = HashSet::new();
            for property in &schema.properties {
                if !seen.insert(property.name.as_str()) {
                    return Err(SchemaError::DuplicateProperty {
                        object_type: schema.object_type.clone(),
                        property: property.name.clone(),
                    });
                }
            }
            if schemas.contains_key(&schema.object_type) {
                return Err(SchemaError::DuplicateType(schema.object_type));
            }
            registration.push(schema.object_type.clone());
            schemas.insert(schema.object_type.clone(), schema);
        }

        let abstract_types: HashSet<&ObjectType> =
            schemas.values().flat_map(|s| s.parents.iter()).collect();

        for schema in schemas.values() {
            for property in &schema.properties {
                let Some(target) = property.target() else {
                    continue;
                };
                let known = match property.kind {
                    PropertyKind::Embedded(_) => schemas.contains_key(target),
                    _ => schemas.contains_key(target) || abstract_types.contains(target),
                };
                if !known {
                    return Err(SchemaError::UnknownTarget {
                        object_type: schema.object_type.clone(),
                        property: property.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let mut registry = SchemaRegistry {
            schemas,
            registration,
            create_order: Vec::new(),
        };
        registry.create_order = registry.compute_create_order();
        Ok(registry)
    }
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

/// Read-only table of every registered type.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<ObjectType, Schema>,
    registration: Vec<ObjectType>,
    create_order: Vec<ObjectType>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn get(&self, object_type: &ObjectType) -> Option<&Schema> {
        self.schemas.get(object_type)
    }

    pub fn schema(&self, object_type: &ObjectType) -> SchemaResult<&Schema> {
        self.get(object_type)
            .ok_or_else(|| SchemaError::UnknownType(object_type.clone()))
    }

    pub fn contains(&self, object_type: &ObjectType) -> bool {
        self.schemas.contains_key(object_type)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn default_uid(&self, object_type: &ObjectType) -> Option<&Uid> {
        self.get(object_type).and_then(|s| s.default_uid.as_ref())
    }

    /// Every registered type, dependencies first.
    pub fn create_order(&self) -> &[ObjectType] {
        &self.create_order
    }

    /// Processing order for the types present in a bundle. Dependencies come
    /// first; for DELETE the order is reversed so dependents go first.
    /// Unregistered types are dropped.
    pub fn order_for<'a>(
        &self,
        types: impl IntoIterator<Item = &'a ObjectType>,
        strategy: ImportStrategy,
    ) -> Vec<ObjectType> {
        let present: BTreeSet<&ObjectType> = types.into_iter().collect();
        for object_type in &present {
            if !self.contains(object_type) {
                warn!(object_type = %object_type, "type has no registered schema, skipping");
            }
        }

        let mut order: Vec<ObjectType> = self
            .create_order
            .iter()
            .filter(|t| present.contains(t))
            .cloned()
            .collect();
        if strategy.is_delete() {
            order.reverse();
        }
        order
    }

    /// `object_type` itself plus every abstract type it inherits from.
    pub fn ancestors(&self, object_type: &ObjectType) -> Vec<ObjectType> {
        let mut seen = Vec::new();
        let mut stack = vec![object_type.clone()];
        while let Some(current) = stack.pop() {
            if seen.contains(&current) {
                continue;
            }
            if let Some(schema) = self.get(&current) {
                stack.extend(schema.parents.iter().rev().cloned());
            }
            seen.push(current);
        }
        seen
    }

    /// Returns `true` if an object of `object_type` can stand in for `target`.
    pub fn is_assignable(&self, target: &ObjectType, object_type: &ObjectType) -> bool {
        target == object_type || self.ancestors(object_type).contains(target)
    }

    /// Registered types that can stand in for `target`.
    pub fn concrete_types(&self, target: &ObjectType) -> Vec<ObjectType> {
        self.registration
            .iter()
            .filter(|t| self.is_assignable(target, t))
            .cloned()
            .collect()
    }

    /// Registered types `object_type` references, directly or through an
    /// embedded object.
    pub fn dependencies(&self, object_type: &ObjectType) -> BTreeSet<ObjectType> {
        let mut deps = BTreeSet::new();
        let mut visited = HashSet::new();
        self.collect_dependencies(object_type, &mut deps, &mut visited);
        deps.remove(object_type);
        deps
    }

    fn collect_dependencies(
        &self,
        object_type: &ObjectType,
        deps: &mut BTreeSet<ObjectType>,
        visited: &mut HashSet<ObjectType>,
    ) {
        if !visited.insert(object_type.clone()) {
            return;
        }
        let Some(schema) = self.get(object_type) else {
            return;
        };
        for property in &schema.properties {
            match &property.kind {
                PropertyKind::Simple(_) => {}
                PropertyKind::Reference(target) | PropertyKind::Collection(target) => {
                    deps.extend(self.concrete_types(target));
                }
                PropertyKind::Embedded(target) => {
                    self.collect_dependencies(target, deps, visited);
                }
            }
        }
    }

    /// Kahn's algorithm over reference dependencies. Ready types are taken
    /// in registration order; types caught in a cycle are appended in
    /// registration order.
    fn compute_create_order(&self) -> Vec<ObjectType> {
        let position: HashMap<&ObjectType, usize> = self
            .registration
            .iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();

        let mut in_degree = vec![0usize; self.registration.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.registration.len()];
        for (i, object_type) in self.registration.iter().enumerate() {
            for dep in self.dependencies(object_type) {
                if let Some(&d) = position.get(&dep) {
                    in_degree[i] += 1;
                    dependents[d].push(i);
                }
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.registration.len());
        let mut placed = vec![false; self.registration.len()];

        while let Some(current) = ready.pop_first() {
            order.push(self.registration[current].clone());
            placed[current] = true;
            for &dependent in &dependents[current] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < self.registration.len() {
            let cyclic: Vec<&ObjectType> = self
                .registration
                .iter()
                .enumerate()
                .filter(|(i, _)| !placed[*i])
                .map(|(_, t)| t)
                .collect();
            warn!(types = ?cyclic, "reference cycle between types, using registration order");
            order.extend(cyclic.into_iter().cloned());
        }
        order
    }
}
