use std::time::Duration;

use mbi_hooks::{HookContext, HookRegistry};
use mbi_preheat::Preheat;
use mbi_report::{ErrorReport, ObjectReport, TypeReport};
use mbi_schema::{SchemaRegistry, SchemaValidator};
use mbi_types::{AtomicMode, BundleObject, ImportStrategy, MergeMode, ObjectType, Principal};
use serde::{Deserialize, Serialize};

use crate::access::AccessControl;
use crate::error::GateError;

// ---------------------------------------------------------------------------
// ValidationPass
// ---------------------------------------------------------------------------

/// Which side of a type's objects a chain is running over.
///
/// CREATE_AND_UPDATE bundles run the create pass over not-yet-persisted
/// objects and the update pass over persisted ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationPass {
    Create,
    Update,
    Delete,
}

impl ValidationPass {
    /// Whether the pass runs over the persisted slice of a type.
    pub fn persisted(&self) -> bool {
        !matches!(self, Self::Create)
    }
}

// ---------------------------------------------------------------------------
// CheckContext
// ---------------------------------------------------------------------------

/// Everything a check may consult while validating one type.
///
/// The preheat index is borrowed mutably: the uniqueness checks claim the
/// values of accepted objects so later objects of the same payload clash
/// with them.
pub struct CheckContext<'a> {
    pub principal: &'a Principal,
    /// Strategy of the bundle.
    pub strategy: ImportStrategy,
    /// Pass currently running. Set by the gate.
    pub pass: ValidationPass,
    pub merge_mode: MergeMode,
    pub atomic_mode: AtomicMode,
    pub preheat: &'a mut Preheat,
    pub schemas: &'a SchemaRegistry,
    pub schema_validator: &'a dyn SchemaValidator,
    pub access: &'a dyn AccessControl,
    pub hooks: &'a HookRegistry,
}

impl CheckContext<'_> {
    /// Read-only view handed to hook validation.
    pub fn hook_context(&self) -> HookContext<'_> {
        HookContext {
            principal: self.principal,
            strategy: self.strategy,
            merge_mode: self.merge_mode,
            preheat: &*self.preheat,
        }
    }
}

// ---------------------------------------------------------------------------
// CheckResult
// ---------------------------------------------------------------------------

/// Recorded outcome of one check over one type and pass.
#[derive(Clone, Debug)]
pub struct CheckResult {
    pub check_name: String,
    pub object_type: ObjectType,
    pub pass: ValidationPass,
    /// Objects that received at least one error from this check.
    pub rejected: usize,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// ValidationCheck trait
// ---------------------------------------------------------------------------

/// One validator in the chain.
///
/// A check receives the candidate objects of one type and removes the ones
/// it rejects, so later checks never see them. Rejections are returned as
/// a [`TypeReport`]. Under [`AtomicMode::None`] errors are still reported
/// but nothing is removed.
pub trait ValidationCheck: Send + Sync {
    fn name(&self) -> &str;

    fn check(
        &self,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
    ) -> Result<TypeReport, GateError>;
}

/// Run `inspect` over every candidate in order and drop the ones it returns
/// errors for, unless `atomic_mode` keeps rejected objects.
///
/// Each dropped object counts as ignored on the returned report.
pub fn reject_where<F>(
    object_type: &ObjectType,
    objects: &mut Vec<BundleObject>,
    atomic_mode: AtomicMode,
    mut inspect: F,
) -> TypeReport
where
    F: FnMut(&mut BundleObject) -> Vec<ErrorReport>,
{
    let mut report = TypeReport::new(object_type.clone());
    let candidates = std::mem::take(objects);
    objects.reserve(candidates.len());

    for mut entry in candidates {
        let errors = inspect(&mut entry);
        if errors.is_empty() {
            objects.push(entry);
            continue;
        }

        let mut object_report = ObjectReport::for_object(&entry);
        object_report.add_errors(errors);
        report.add_object_report(object_report);

        if atomic_mode.removes_rejected() {
            report.stats.ignored += 1;
        } else {
            objects.push(entry);
        }
    }
    report
}
