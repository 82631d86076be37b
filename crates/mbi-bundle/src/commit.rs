use std::time::Instant;

use mbi_audit::{AuditRecord, AuditSink};
use mbi_diff::{diff_objects, merge_objects, merge_sharing};
use mbi_hooks::{HookRegistry, ObjectBundleHook};
use mbi_preheat::connect_references;
use mbi_report::{ObjectBundleCommitReport, ObjectReport, TypeReport};
use mbi_schema::{Schema, SchemaRegistry};
use mbi_store::ObjectStore;
use mbi_types::{BundleObject, BundleStatus, FlushMode, ImportStrategy, MetadataObject, ObjectType, Principal, Sharing};
use tracing::{debug, info, warn};

use crate::bundle::ObjectBundle;
use crate::error::BundleResult;

/// Writes a validated bundle through the store, type by type in dependency
/// order.
///
/// The engine opens no transaction. The first store, hook or audit failure
/// aborts the commit with `Err`; writes already made stay in the store's
/// session and it is up to the caller's transaction to roll them back.
pub struct CommitEngine<'a> {
    store: &'a dyn ObjectStore,
    schemas: &'a SchemaRegistry,
    hooks: &'a HookRegistry,
    audit: &'a dyn AuditSink,
}

impl<'a> CommitEngine<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        schemas: &'a SchemaRegistry,
        hooks: &'a HookRegistry,
        audit: &'a dyn AuditSink,
    ) -> Self {
        Self {
            store,
            schemas,
            hooks,
            audit,
        }
    }

    /// Commit every pending object of `bundle` and mark it COMMITTED.
    ///
    /// A validate-only bundle gets an empty report and keeps its status.
    pub fn commit(&self, bundle: &mut ObjectBundle) -> BundleResult<ObjectBundleCommitReport> {
        let mut report = ObjectBundleCommitReport::new();
        if bundle.config.is_validate_only() {
            info!(user = %bundle.principal.username, "validate-only bundle, nothing committed");
            return Ok(report);
        }

        let start = Instant::now();
        let strategy = bundle.config.import_strategy;
        let types = self.schemas.order_for(bundle.object_map.types(), strategy);
        let bundle_hooks = self.hooks.for_bundle(self.schemas, types.iter());

        {
            let ctx = bundle.hook_context();
            for hook in &bundle_hooks {
                hook.pre_commit(&ctx)?;
            }
        }

        for object_type in &types {
            let type_report = self.commit_type(bundle, object_type)?;
            if !type_report.is_empty() {
                report.add_type_report(type_report);
            }
        }

        if !strategy.is_delete() {
            let ctx = bundle.hook_context();
            for hook in &bundle_hooks {
                hook.post_commit(&ctx)?;
            }
        }

        self.store.clear_session()?;
        bundle.status = BundleStatus::Committed;

        let stats = report.stats();
        info!(
            user = %bundle.principal.username,
            strategy = %strategy,
            created = stats.created,
            updated = stats.updated,
            deleted = stats.deleted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "committed bundle"
        );
        Ok(report)
    }

    fn commit_type(&self, bundle: &mut ObjectBundle, object_type: &ObjectType) -> BundleResult<TypeReport> {
        let mut report = TypeReport::new(object_type.clone());
        if bundle.object_map.get(object_type).map_or(true, |objects| objects.is_empty()) {
            return Ok(report);
        }

        let start = Instant::now();
        let schema = self.schemas.schema(object_type)?;
        let hooks = self.hooks.for_type(self.schemas, object_type);

        {
            let pending: Vec<MetadataObject> = bundle
                .object_map
                .objects(object_type, false)
                .iter()
                .map(|entry| entry.object.clone())
                .collect();
            let ctx = bundle.hook_context();
            for hook in &hooks {
                hook.pre_type_import(object_type, &pending, &ctx)?;
            }
        }

        let mut committed = Vec::new();
        match bundle.config.import_strategy {
            ImportStrategy::Create => {
                committed.extend(with_slice(bundle, object_type, false, |b, entries| {
                    self.create_all(b, entries, &hooks, &mut report)
                })?);
            }
            ImportStrategy::Update => {
                committed.extend(with_slice(bundle, object_type, true, |b, entries| {
                    self.update_all(b, entries, schema, &hooks, &mut report)
                })?);
            }
            ImportStrategy::CreateAndUpdate => {
                committed.extend(with_slice(bundle, object_type, false, |b, entries| {
                    self.create_all(b, entries, &hooks, &mut report)
                })?);
                committed.extend(with_slice(bundle, object_type, true, |b, entries| {
                    self.update_all(b, entries, schema, &hooks, &mut report)
                })?);
            }
            ImportStrategy::Delete => {
                committed.extend(with_slice(bundle, object_type, true, |b, entries| {
                    self.delete_all(b, entries, &hooks, &mut report)
                })?);
            }
        }

        {
            let ctx = bundle.hook_context();
            for hook in &hooks {
                hook.post_type_import(object_type, &committed, &ctx)?;
            }
        }

        if bundle.config.flush_mode == FlushMode::Auto && !committed.is_empty() {
            self.store.flush()?;
        }

        info!(
            object_type = %object_type,
            created = report.stats.created,
            updated = report.stats.updated,
            deleted = report.stats.deleted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "committed type"
        );
        Ok(report)
    }

    fn create_all(
        &self,
        bundle: &mut ObjectBundle,
        entries: &mut [BundleObject],
        hooks: &[&dyn ObjectBundleHook],
        report: &mut TypeReport,
    ) -> BundleResult<Vec<MetadataObject>> {
        for entry in entries.iter_mut() {
            {
                let ctx = bundle.hook_context();
                for hook in hooks {
                    hook.pre_create(&mut entry.object, &ctx)?;
                }
            }

            connect_references(&bundle.preheat, self.schemas, &mut entry.object);
            stamp_ownership(&mut entry.object, &bundle.principal, bundle.override_user.as_ref());
            self.store.save(&entry.object)?;
            bundle.preheat.replace(entry.object.clone());

            if !bundle.config.skip_audit {
                self.audit
                    .record(AuditRecord::create(&entry.object, &bundle.principal.username)?)?;
            }
            report.add_object_report(ObjectReport::for_object(entry));
            report.stats.created += 1;
            debug!(object_type = %entry.object.object_type, uid = ?entry.object.uid, "created object");

            if bundle.config.flush_mode == FlushMode::Object {
                self.store.flush()?;
            }
        }

        let created: Vec<MetadataObject> = entries.iter().map(|entry| entry.object.clone()).collect();
        let ctx = bundle.hook_context();
        for object in &created {
            for hook in hooks {
                hook.post_create(object, &ctx)?;
            }
        }
        Ok(created)
    }

    fn update_all(
        &self,
        bundle: &mut ObjectBundle,
        entries: &mut [BundleObject],
        schema: &Schema,
        hooks: &[&dyn ObjectBundleHook],
        report: &mut TypeReport,
    ) -> BundleResult<Vec<MetadataObject>> {
        let merge_mode = bundle.config.merge_mode;
        let mut updated = Vec::with_capacity(entries.len());

        for entry in entries.iter_mut() {
            if bundle.preheat.is_default(&entry.object) {
                continue;
            }
            let Some(stored) = bundle.preheat.get_persisted(&entry.object).cloned() else {
                warn!(object_type = %entry.object.object_type, uid = ?entry.object.uid, "no stored object to update");
                continue;
            };

            {
                let ctx = bundle.hook_context();
                for hook in hooks {
                    hook.pre_update(&mut entry.object, &stored, &ctx)?;
                }
            }

            connect_references(&bundle.preheat, self.schemas, &mut entry.object);
            let patch = diff_objects(&stored, &entry.object);

            let mut merged = stored;
            merge_objects(&mut merged, &entry.object, schema, merge_mode);
            if !bundle.config.skip_sharing {
                merge_sharing(&mut merged, &entry.object, merge_mode);
            }
            stamp_ownership(&mut merged, &bundle.principal, bundle.override_user.as_ref());

            self.store.update(&merged)?;
            bundle.preheat.replace(merged.clone());

            if !bundle.config.skip_audit {
                self.audit
                    .record(AuditRecord::update(&merged, &bundle.principal.username, patch))?;
            }
            entry.object = merged;
            report.add_object_report(ObjectReport::for_object(entry));
            report.stats.updated += 1;
            debug!(object_type = %entry.object.object_type, uid = ?entry.object.uid, "updated object");

            if bundle.config.flush_mode == FlushMode::Object {
                self.store.flush()?;
            }
            updated.push(entry.object.clone());
        }

        let ctx = bundle.hook_context();
        for object in &updated {
            for hook in hooks {
                hook.post_update(object, &ctx)?;
            }
        }
        Ok(updated)
    }

    fn delete_all(
        &self,
        bundle: &mut ObjectBundle,
        entries: &mut [BundleObject],
        hooks: &[&dyn ObjectBundleHook],
        report: &mut TypeReport,
    ) -> BundleResult<Vec<MetadataObject>> {
        let mut deleted = Vec::with_capacity(entries.len());

        for entry in entries.iter() {
            if bundle.preheat.is_default(&entry.object) {
                continue;
            }
            let object = bundle
                .preheat
                .get_persisted(&entry.object)
                .cloned()
                .unwrap_or_else(|| entry.object.clone());

            {
                let ctx = bundle.hook_context();
                for hook in hooks {
                    hook.pre_delete(&object, &ctx)?;
                }
            }

            self.store.delete(&object)?;
            self.store.purge_deleted_marker(&object)?;
            bundle.preheat.remove(&object);

            if !bundle.config.skip_audit {
                self.audit
                    .record(AuditRecord::delete(&object, &bundle.principal.username))?;
            }
            report.add_object_report(ObjectReport::for_object(entry));
            report.stats.deleted += 1;
            debug!(object_type = %object.object_type, uid = ?object.uid, "deleted object");

            if bundle.config.flush_mode == FlushMode::Object {
                self.store.flush()?;
            }
            deleted.push(object);
        }
        Ok(deleted)
    }
}

/// Run `f` over one slice of a type, putting the slice back afterwards
/// whatever the outcome.
fn with_slice<F>(
    bundle: &mut ObjectBundle,
    object_type: &ObjectType,
    persisted: bool,
    f: F,
) -> BundleResult<Vec<MetadataObject>>
where
    F: FnOnce(&mut ObjectBundle, &mut [BundleObject]) -> BundleResult<Vec<MetadataObject>>,
{
    let mut entries = bundle.object_map.take(object_type, persisted);
    let outcome = f(bundle, entries.as_mut_slice());
    bundle.object_map.put(object_type, persisted, entries);
    outcome
}

/// The override user always becomes the owner; otherwise an object
/// without an owner is given the importing principal. Objects without
/// sharing get empty sharing.
fn stamp_ownership(object: &mut MetadataObject, principal: &Principal, override_user: Option<&Principal>) {
    match override_user {
        Some(user) => object.owner = Some(user.uid.clone()),
        None if object.owner.is_none() => object.owner = Some(principal.uid.clone()),
        None => {}
    }
    if object.sharing.is_none() {
        object.sharing = Some(Sharing::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal::new("UserAdmin01", "admin")
    }

    #[test]
    fn stamps_principal_when_owner_missing() {
        let mut object = MetadataObject::new("dataElement");
        stamp_ownership(&mut object, &principal(), None);
        assert_eq!(object.owner, Some(principal().uid));
        assert_eq!(object.sharing, Some(Sharing::default()));
    }

    #[test]
    fn keeps_existing_owner_without_override() {
        let mut object = MetadataObject::new("dataElement");
        object.owner = Some("UserOther01".into());
        stamp_ownership(&mut object, &principal(), None);
        assert_eq!(object.owner.unwrap().as_str(), "UserOther01");
    }

    #[test]
    fn override_user_always_wins() {
        let mut object = MetadataObject::new("dataElement");
        object.owner = Some("UserOther01".into());
        let override_user = Principal::new("UserSync001", "sync");
        stamp_ownership(&mut object, &principal(), Some(&override_user));
        assert_eq!(object.owner.unwrap().as_str(), "UserSync001");
    }
}
