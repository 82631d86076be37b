use std::time::{Duration, Instant};

use mbi_report::{ObjectBundleValidationReport, TypeReport};
use mbi_types::{BundleObject, ImportStrategy, ObjectMap, ObjectType};
use tracing::{debug, info};

use crate::check::{CheckContext, CheckResult, ValidationCheck, ValidationPass};
use crate::checks::{
    DuplicateCheck, ExistenceCheck, HookCheck, MandatoryAttributeCheck, ReferenceCheck, SchemaCheck,
    SecurityCheck, UniqueAttributeCheck, UniquenessCheck,
};
use crate::error::GateError;

// ---------------------------------------------------------------------------
// GateOutcome
// ---------------------------------------------------------------------------

/// The result of running every type of a bundle through the gate.
#[derive(Clone, Debug)]
pub struct GateOutcome {
    pub report: ObjectBundleValidationReport,
    /// Per-check results in evaluation order.
    pub check_results: Vec<CheckResult>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// ValidationGate
// ---------------------------------------------------------------------------

/// Ordered validation chains, one per pass.
///
/// Each type's objects are split by whether they resolved to a stored
/// object. The bundle strategy decides which chain runs over which slice:
///
/// | strategy          | not-yet-persisted  | persisted         |
/// |-------------------|--------------------|-------------------|
/// | CREATE            | create chain       | existence (E5000) |
/// | UPDATE            | existence (E5001)  | update chain      |
/// | CREATE_AND_UPDATE | create chain       | update chain      |
/// | DELETE            | existence (E5001)  | delete chain      |
///
/// Default instances are dropped from both slices before any check runs.
pub struct ValidationGate {
    create_checks: Vec<Box<dyn ValidationCheck>>,
    update_checks: Vec<Box<dyn ValidationCheck>>,
    delete_checks: Vec<Box<dyn ValidationCheck>>,
    existence: ExistenceCheck,
}

impl ValidationGate {
    /// Create a gate with empty chains. Existence is always checked.
    pub fn new() -> Self {
        Self {
            create_checks: Vec::new(),
            update_checks: Vec::new(),
            delete_checks: Vec::new(),
            existence: ExistenceCheck,
        }
    }

    /// Create a gate with the standard chains. Create and update run:
    /// duplicate -> security -> schema -> hook -> uniqueness ->
    /// mandatory attribute -> unique attribute -> reference.
    /// Delete runs duplicate -> security.
    pub fn with_default_checks() -> Self {
        let mut gate = Self::new();
        for pass in [ValidationPass::Create, ValidationPass::Update] {
            gate.add_check(pass, Box::new(DuplicateCheck));
            gate.add_check(pass, Box::new(SecurityCheck));
            gate.add_check(pass, Box::new(SchemaCheck));
            gate.add_check(pass, Box::new(HookCheck));
            gate.add_check(pass, Box::new(UniquenessCheck));
            gate.add_check(pass, Box::new(MandatoryAttributeCheck));
            gate.add_check(pass, Box::new(UniqueAttributeCheck));
            gate.add_check(pass, Box::new(ReferenceCheck));
        }
        gate.add_check(ValidationPass::Delete, Box::new(DuplicateCheck));
        gate.add_check(ValidationPass::Delete, Box::new(SecurityCheck));
        gate
    }

    /// Append a check to the end of one pass's chain.
    pub fn add_check(&mut self, pass: ValidationPass, check: Box<dyn ValidationCheck>) {
        self.chain_mut(pass).push(check);
    }

    pub fn check_count(&self, pass: ValidationPass) -> usize {
        self.chain(pass).len()
    }

    fn chain(&self, pass: ValidationPass) -> &[Box<dyn ValidationCheck>] {
        match pass {
            ValidationPass::Create => &self.create_checks,
            ValidationPass::Update => &self.update_checks,
            ValidationPass::Delete => &self.delete_checks,
        }
    }

    fn chain_mut(&mut self, pass: ValidationPass) -> &mut Vec<Box<dyn ValidationCheck>> {
        match pass {
            ValidationPass::Create => &mut self.create_checks,
            ValidationPass::Update => &mut self.update_checks,
            ValidationPass::Delete => &mut self.delete_checks,
        }
    }

    /// Validate every type in `types` (already in dependency order) that the
    /// object map holds. Types that are absent get no report.
    pub fn validate(
        &self,
        object_map: &mut ObjectMap,
        types: &[ObjectType],
        ctx: &mut CheckContext<'_>,
    ) -> Result<GateOutcome, GateError> {
        let start = Instant::now();
        let mut report = ObjectBundleValidationReport::new();
        let mut check_results = Vec::new();

        for object_type in types {
            if !object_map.contains_type(object_type) {
                continue;
            }
            let type_report = self.validate_type(object_type, object_map, ctx, &mut check_results)?;
            if !type_report.is_empty() {
                report.add_type_report(type_report);
            }
        }

        let elapsed = start.elapsed();
        info!(
            user = %ctx.principal.username,
            strategy = ?ctx.strategy,
            types = types.len(),
            errors = report.error_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "validated bundle"
        );
        Ok(GateOutcome {
            report,
            check_results,
            elapsed,
        })
    }

    /// Validate one type, putting the surviving objects back into the map.
    pub fn validate_type(
        &self,
        object_type: &ObjectType,
        object_map: &mut ObjectMap,
        ctx: &mut CheckContext<'_>,
        results: &mut Vec<CheckResult>,
    ) -> Result<TypeReport, GateError> {
        let mut non_persisted = object_map.take(object_type, false);
        let mut persisted = object_map.take(object_type, true);
        non_persisted.retain(|entry| !ctx.preheat.is_default(&entry.object));
        persisted.retain(|entry| !ctx.preheat.is_default(&entry.object));

        let outcome = self.run_passes(object_type, &mut non_persisted, &mut persisted, ctx, results);
        object_map.put(object_type, false, non_persisted);
        object_map.put(object_type, true, persisted);
        outcome
    }

    fn run_passes(
        &self,
        object_type: &ObjectType,
        non_persisted: &mut Vec<BundleObject>,
        persisted: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
        results: &mut Vec<CheckResult>,
    ) -> Result<TypeReport, GateError> {
        let mut report = TypeReport::new(object_type.clone());
        match ctx.strategy {
            ImportStrategy::Create => {
                report.merge(self.run_chain(ValidationPass::Create, object_type, non_persisted, ctx, results)?);
                report.merge(self.run_existence(ValidationPass::Create, object_type, persisted, ctx, results)?);
            }
            ImportStrategy::Update => {
                report.merge(self.run_chain(ValidationPass::Update, object_type, persisted, ctx, results)?);
                report.merge(self.run_existence(ValidationPass::Update, object_type, non_persisted, ctx, results)?);
            }
            ImportStrategy::CreateAndUpdate => {
                report.merge(self.run_chain(ValidationPass::Create, object_type, non_persisted, ctx, results)?);
                report.merge(self.run_chain(ValidationPass::Update, object_type, persisted, ctx, results)?);
            }
            ImportStrategy::Delete => {
                report.merge(self.run_chain(ValidationPass::Delete, object_type, persisted, ctx, results)?);
                report.merge(self.run_existence(ValidationPass::Delete, object_type, non_persisted, ctx, results)?);
            }
        }
        Ok(report)
    }

    fn run_chain(
        &self,
        pass: ValidationPass,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
        results: &mut Vec<CheckResult>,
    ) -> Result<TypeReport, GateError> {
        let mut report = TypeReport::new(object_type.clone());
        for check in self.chain(pass) {
            if objects.is_empty() {
                break;
            }
            report.merge(self.run_check(check.as_ref(), pass, object_type, objects, ctx, results)?);
        }
        Ok(report)
    }

    fn run_existence(
        &self,
        pass: ValidationPass,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
        results: &mut Vec<CheckResult>,
    ) -> Result<TypeReport, GateError> {
        if objects.is_empty() {
            return Ok(TypeReport::new(object_type.clone()));
        }
        self.run_check(&self.existence, pass, object_type, objects, ctx, results)
    }

    fn run_check(
        &self,
        check: &dyn ValidationCheck,
        pass: ValidationPass,
        object_type: &ObjectType,
        objects: &mut Vec<BundleObject>,
        ctx: &mut CheckContext<'_>,
        results: &mut Vec<CheckResult>,
    ) -> Result<TypeReport, GateError> {
        ctx.pass = pass;
        let start = Instant::now();
        let report = check.check(object_type, objects, ctx)?;
        let elapsed = start.elapsed();
        let rejected = report.rejected_indices().len();

        debug!(
            check = check.name(),
            object_type = %object_type,
            pass = ?pass,
            rejected,
            remaining = objects.len(),
            "ran check"
        );
        results.push(CheckResult {
            check_name: check.name().to_string(),
            object_type: object_type.clone(),
            pass,
            rejected,
            elapsed,
        });
        Ok(report)
    }
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

impl std::fmt::Debug for ValidationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |checks: &[Box<dyn ValidationCheck>]| -> Vec<String> {
            checks.iter().map(|c| c.name().to_string()).collect()
        };
        f.debug_struct("ValidationGate")
            .field("create", &names(&self.create_checks))
            .field("update", &names(&self.update_checks))
            .field("delete", &names(&self.delete_checks))
            .finish()
    }
}
