//! Shared fixtures for the import scenarios.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mbi_audit::InMemoryAuditSink;
use mbi_bundle::{ImportConfig, ObjectBundleParams, ObjectBundleService};
use mbi_hooks::{HookContext, HookRegistry, HookResult, HookTarget, ObjectBundleHook};
use mbi_report::ErrorReport;
use mbi_schema::{Property, Schema, SchemaRegistry, ValueType};
use mbi_store::InMemoryObjectStore;
use mbi_types::{AtomicMode, ImportStrategy, MetadataObject, ObjectRef, ObjectType, Principal};
use serde_json::json;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_COMBO: &str = "bjDvmb4bfuf";
pub const SEX_COMBO: &str = "CatComboSex";
pub const MANDATORY_ATTR: &str = "AttrMandat1";
pub const UNIQUE_ATTR: &str = "AttrUnique1";
pub const ADMIN_UID: &str = "UserAdmin01";

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// categoryCombo <- dataElement <- dataElementGroup, plus `attribute` and an
/// unrelated `optionSet`.
pub fn schemas() -> SchemaRegistry {
    SchemaRegistry::builder()
        .register(Schema::attribute())
        .register(Schema::new("categoryCombo").with_default(DEFAULT_COMBO))
        .register(
            Schema::new("dataElement")
                .with_property(Property::text("name").required())
                .with_property(Property::text("code").unique())
                .with_property(Property::text("shortName").length(None, Some(50)))
                .with_property(Property::simple("sortOrder", ValueType::Integer))
                .with_property(Property::simple("weight", ValueType::Integer))
                .with_property(Property::reference("categoryCombo", "categoryCombo"))
                .shareable(),
        )
        .register(
            Schema::new("dataElementGroup")
                .with_property(Property::text("name").required())
                .with_property(Property::collection("dataElements", "dataElement")),
        )
        .register(Schema::new("optionSet").with_property(Property::text("name").required()))
        .build()
        .expect("fixture schemas are valid")
}

pub fn admin() -> Principal {
    Principal::superuser(ADMIN_UID, "admin")
}

pub fn config(strategy: ImportStrategy, atomic_mode: AtomicMode) -> ImportConfig {
    ImportConfig {
        import_strategy: strategy,
        atomic_mode,
        ..ImportConfig::default()
    }
}

pub fn default_combo() -> MetadataObject {
    MetadataObject::new("categoryCombo").with_uid(DEFAULT_COMBO).with_name("default")
}

pub fn sex_combo() -> MetadataObject {
    MetadataObject::new("categoryCombo").with_uid(SEX_COMBO).with_name("Sex")
}

pub fn mandatory_attribute() -> MetadataObject {
    MetadataObject::new("attribute")
        .with_uid(MANDATORY_ATTR)
        .with_name("Classification")
        .with_property("mandatory", true)
        .with_property("objectTypes", json!(["dataElement"]))
}

pub fn unique_attribute() -> MetadataObject {
    MetadataObject::new("attribute")
        .with_uid(UNIQUE_ATTR)
        .with_name("External id")
        .with_property("unique", true)
        .with_property("objectTypes", json!(["dataElement"]))
}

pub fn data_element(uid: &str, name: &str) -> MetadataObject {
    MetadataObject::new("dataElement").with_uid(uid).with_name(name)
}

pub fn group(uid: &str, name: &str, members: &[&str]) -> MetadataObject {
    MetadataObject::new("dataElementGroup")
        .with_uid(uid)
        .with_name(name)
        .with_references("dataElements", members.iter().map(|m| ObjectRef::by_uid(*m)))
}

/// A service over an in-memory store and audit sink, both kept for
/// inspection.
pub struct Harness {
    pub store: Arc<InMemoryObjectStore>,
    pub audit: Arc<InMemoryAuditSink>,
    pub service: ObjectBundleService,
}

impl Harness {
    /// Store seeded with the default category combo plus `seed`.
    pub fn new(seed: Vec<MetadataObject>) -> Self {
        Self::with_hooks(seed, HookRegistry::new())
    }

    pub fn with_hooks(seed: Vec<MetadataObject>, hooks: HookRegistry) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryObjectStore::with_objects(
            std::iter::once(default_combo()).chain(seed),
        ));
        let audit = Arc::new(InMemoryAuditSink::new());
        let service = ObjectBundleService::new(store.clone(), schemas())
            .with_hooks(hooks)
            .with_audit_sink(audit.clone());
        Self { store, audit, service }
    }

    pub fn params(&self, config: ImportConfig, objects: Vec<MetadataObject>) -> ObjectBundleParams {
        ObjectBundleParams::new(admin(), config).with_objects(objects)
    }

    pub fn stored(&self, object_type: &str, uid: &str) -> Option<MetadataObject> {
        self.store.get(&ObjectType::new(object_type), &uid.into())
    }

    pub fn count(&self, object_type: &str) -> usize {
        self.store.count(&ObjectType::new(object_type))
    }
}

/// Records every lifecycle call it receives, in order.
pub struct RecordingHook {
    pub target: HookTarget,
    pub calls: Arc<Mutex<Vec<String>>>,
    /// When set, `pre_create` fails for this object name.
    pub fail_on: Option<String>,
}

impl RecordingHook {
    pub fn new(target: HookTarget) -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let hook = Self {
            target,
            calls: calls.clone(),
            fail_on: None,
        };
        (hook, calls)
    }

    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl ObjectBundleHook for RecordingHook {
    fn name(&self) -> &str {
        "recording"
    }

    fn target(&self) -> HookTarget {
        self.target.clone()
    }

    fn validate(&self, object: &MetadataObject, _ctx: &HookContext<'_>) -> Vec<ErrorReport> {
        self.push(format!("validate:{}", object.display_name().unwrap_or_default()));
        Vec::new()
    }

    fn pre_commit(&self, _ctx: &HookContext<'_>) -> HookResult<()> {
        self.push("pre_commit");
        Ok(())
    }

    fn post_commit(&self, _ctx: &HookContext<'_>) -> HookResult<()> {
        self.push("post_commit");
        Ok(())
    }

    fn pre_type_import(
        &self,
        object_type: &ObjectType,
        objects: &[MetadataObject],
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        self.push(format!("pre_type_import:{object_type}:{}", objects.len()));
        Ok(())
    }

    fn post_type_import(
        &self,
        object_type: &ObjectType,
        objects: &[MetadataObject],
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        self.push(format!("post_type_import:{object_type}:{}", objects.len()));
        Ok(())
    }

    fn pre_create(&self, object: &mut MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        let name = object.display_name().unwrap_or_default();
        if self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(mbi_hooks::HookError::rejected(self.name(), format!("refusing {name}")));
        }
        self.push(format!("pre_create:{name}"));
        object.set_value("shortName", json!(format!("{name} (hooked)")));
        Ok(())
    }

    fn post_create(&self, object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        self.push(format!("post_create:{}", object.display_name().unwrap_or_default()));
        Ok(())
    }

    fn pre_update(
        &self,
        object: &mut MetadataObject,
        persisted: &MetadataObject,
        _ctx: &HookContext<'_>,
    ) -> HookResult<()> {
        self.push(format!(
            "pre_update:{}<-{}",
            persisted.display_name().unwrap_or_default(),
            object.display_name().unwrap_or_default()
        ));
        Ok(())
    }

    fn post_update(&self, object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        self.push(format!("post_update:{}", object.display_name().unwrap_or_default()));
        Ok(())
    }

    fn pre_delete(&self, object: &MetadataObject, _ctx: &HookContext<'_>) -> HookResult<()> {
        self.push(format!("pre_delete:{}", object.display_name().unwrap_or_default()));
        Ok(())
    }
}
