use std::collections::BTreeMap;
use std::sync::Arc;

use mbi_audit::{AuditSink, TracingAuditSink};
use mbi_gate::{AccessControl, AuthorityAccessControl, CheckContext, ValidationGate, ValidationPass};
use mbi_hooks::HookRegistry;
use mbi_preheat::PreheatService;
use mbi_report::{ObjectBundleCommitReport, ObjectBundleValidationReport, Status};
use mbi_schema::{DefaultSchemaValidator, SchemaRegistry, SchemaValidator};
use mbi_store::ObjectStore;
use mbi_types::{BundleObject, BundleStatus, MetadataObject, ObjectMap, ObjectType};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::atomicity::AtomicityController;
use crate::bundle::ObjectBundle;
use crate::commit::CommitEngine;
use crate::error::BundleResult;
use crate::params::ObjectBundleParams;

/// Outcome of [`ObjectBundleService::import`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub status: Status,
    pub validation: ObjectBundleValidationReport,
    pub commit: ObjectBundleCommitReport,
}

impl ImportReport {
    pub fn has_errors(&self) -> bool {
        self.validation.has_errors() || self.commit.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.validation.error_count() + self.commit.error_count()
    }
}

/// Entry point of the importer: builds bundles, validates them and commits
/// them through its collaborators.
pub struct ObjectBundleService {
    store: Arc<dyn ObjectStore>,
    schemas: SchemaRegistry,
    hooks: HookRegistry,
    gate: ValidationGate,
    access: Box<dyn AccessControl>,
    schema_validator: Box<dyn SchemaValidator>,
    audit: Arc<dyn AuditSink>,
}

impl ObjectBundleService {
    /// A service with the standard validation chain, authority-based access
    /// control, the default schema validator and audit to `tracing`.
    pub fn new(store: Arc<dyn ObjectStore>, schemas: SchemaRegistry) -> Self {
        Self {
            store,
            schemas,
            hooks: HookRegistry::new(),
            gate: ValidationGate::with_default_checks(),
            access: Box::new(AuthorityAccessControl),
            schema_validator: Box::new(DefaultSchemaValidator),
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_gate(mut self, gate: ValidationGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_access_control(mut self, access: Box<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    pub fn with_schema_validator(mut self, validator: Box<dyn SchemaValidator>) -> Self {
        self.schema_validator = validator;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Build a bundle: preheat the payload against the store, assign UIDs,
    /// and split every type's objects into persisted and not-yet-persisted.
    ///
    /// Report indices are positions within the object's type, in
    /// submission order.
    pub fn create(&self, params: ObjectBundleParams) -> BundleResult<ObjectBundle> {
        let ObjectBundleParams {
            principal,
            override_user,
            config,
            objects,
        } = params;

        let mut by_type: BTreeMap<ObjectType, Vec<MetadataObject>> = BTreeMap::new();
        for object in objects {
            by_type.entry(object.object_type.clone()).or_default().push(object);
        }

        let preheat = PreheatService::new(self.store.as_ref(), &self.schemas)
            .preheat(config.preheat_identifier, &mut by_type)?;

        let mut object_map = ObjectMap::new();
        for objects in by_type.into_values() {
            for (index, object) in objects.into_iter().enumerate() {
                let persisted = preheat.get(&object).is_some_and(|entry| entry.persisted);
                object_map.insert(persisted, BundleObject::new(index, object));
            }
        }

        info!(
            user = %principal.username,
            strategy = %config.import_strategy,
            count = object_map.len(),
            "created bundle"
        );
        Ok(ObjectBundle::new(principal, override_user, config, object_map, preheat))
    }

    /// Run the validation gate over a CREATED bundle, then apply the atomic
    /// mode. Invalid objects never make this fail; they are reported.
    ///
    /// `skip_validation` is honoured for superusers only.
    pub fn validate(&self, bundle: &mut ObjectBundle) -> BundleResult<ObjectBundleValidationReport> {
        bundle.expect_status(BundleStatus::Created)?;
        let config = bundle.config.clone();

        if config.skip_validation {
            if bundle.principal.superuser {
                warn!(user = %bundle.principal.username, "skipping validation");
                bundle.status = BundleStatus::Validated;
                return Ok(ObjectBundleValidationReport::new());
            }
            warn!(
                user = %bundle.principal.username,
                "skip_validation is only honoured for superusers, validating"
            );
        }

        let types = self.schemas.order_for(bundle.object_map.types(), config.import_strategy);
        let mut ctx = CheckContext {
            principal: &bundle.principal,
            strategy: config.import_strategy,
            pass: ValidationPass::Create,
            merge_mode: config.merge_mode,
            atomic_mode: config.atomic_mode,
            preheat: &mut bundle.preheat,
            schemas: &self.schemas,
            schema_validator: self.schema_validator.as_ref(),
            access: self.access.as_ref(),
            hooks: &self.hooks,
        };
        let outcome = self.gate.validate(&mut bundle.object_map, &types, &mut ctx)?;

        AtomicityController::new(config.atomic_mode).apply(&outcome.report, &mut bundle.object_map);
        bundle.status = BundleStatus::Validated;
        Ok(outcome.report)
    }

    /// Commit a VALIDATED bundle.
    ///
    /// No transaction is opened here. A store, hook or audit failure aborts
    /// the commit immediately with `Err` and leaves the bundle VALIDATED;
    /// writes made before the failure are not undone. Callers that need
    /// all-or-nothing semantics during commit must wrap this call in their
    /// own transaction.
    pub fn commit(&self, bundle: &mut ObjectBundle) -> BundleResult<ObjectBundleCommitReport> {
        bundle.expect_status(BundleStatus::Validated)?;
        let engine = CommitEngine::new(self.store.as_ref(), &self.schemas, &self.hooks, self.audit.as_ref());
        engine.commit(bundle).inspect_err(|e| {
            error!(user = %bundle.principal.username, error = %e, "commit aborted");
        })
    }

    /// Create, validate and commit in one call.
    pub fn import(&self, params: ObjectBundleParams) -> BundleResult<ImportReport> {
        let mut bundle = self.create(params)?;
        let validation = self.validate(&mut bundle)?;
        let commit = self.commit(&mut bundle)?;

        let has_errors = validation.has_errors() || commit.has_errors();
        let status = Status::from_outcome(has_errors, commit.stats().committed());
        info!(status = ?status, errors = validation.error_count(), "import finished");
        Ok(ImportReport {
            status,
            validation,
            commit,
        })
    }
}

impl std::fmt::Debug for ObjectBundleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBundleService")
            .field("schemas", &self.schemas.len())
            .field("hooks", &self.hooks)
            .field("gate", &self.gate)
            .finish()
    }
}
