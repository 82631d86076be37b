use mbi_preheat::Preheat;
use mbi_report::ErrorReport;
use mbi_types::{ImportStrategy, MergeMode, MetadataObject, ObjectType, Principal};

use crate::error::HookResult;

/// Which objects a hook applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HookTarget {
    /// Every type.
    #[default]
    Any,
    /// One type, or every type that inherits from it when it is abstract.
    Type(ObjectType),
}

/// Read-only view of the bundle handed to every hook call.
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    pub principal: &'a Principal,
    pub strategy: ImportStrategy,
    pub merge_mode: MergeMode,
    pub preheat: &'a Preheat,
}

/// Externally supplied lifecycle callbacks.
///
/// Every method has a no-op default, so a hook only implements the points
/// it cares about. Returning `Err` from a commit-time method aborts the
/// commit; `validate` never aborts and instead returns error reports that
/// reject the object.
pub trait ObjectBundleHook: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    fn target(&self) -> HookTarget {
        HookTarget::Any
    }

    /// Extra validation, run after schema validation.
    fn validate(&self, _object: &MetadataObject, _ctx: &HookContext<'_>) -> Vec<ErrorReport> {
        Vec::new()
    }

    /// Once before any type is committed.
    fn pre_commit(&self, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }

    /// Once after all creates and updates. Not called for DELETE.
    fn post_commit(&self, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }

    /// Before a type is committed, with its not-yet-persisted objects.
    fn pre_type_import(
        &self,
        _object_type: &ObjectType,
        _objects: &[MetadataObject],
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        Ok(())
    }

    /// After a type is committed, with the objects written for it.
    fn post_type_import(
        &self,
        _object_type: &ObjectType,
        _objects: &[MetadataObject],
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        Ok(())
    }

    /// Before an object is created; may modify it.
    fn pre_create(&self, _object: &mut MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }

    fn post_create(&self, _object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }

    /// Before an update is merged; sees the incoming object and the stored
    /// one, and may modify the incoming object.
    fn pre_update(
        &self,
        _object: &mut MetadataObject,
        _persisted: &MetadataObject,
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        Ok(())
    }

    /// After an update, with the merged object as stored.
    fn post_update(&self, _object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }

    fn pre_delete(&self, _object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        Ok(())
    }
}
