use mbi_hooks::HookContext;
use mbi_preheat::Preheat;
use mbi_types::{BundleStatus, ImportStrategy, ObjectMap, Principal};

use crate::config::ImportConfig;
use crate::error::{BundleError, BundleResult};

/// A payload being imported: the partitioned objects, the reference index
/// built for them, and the settings they are imported under.
///
/// Created by `ObjectBundleService::create`, moved to VALIDATED by
/// `validate` and to COMMITTED by `commit`.
#[derive(Debug)]
pub struct ObjectBundle {
    pub(crate) principal: Principal,
    pub(crate) override_user: Option<Principal>,
    pub(crate) config: ImportConfig,
    pub(crate) status: BundleStatus,
    pub(crate) object_map: ObjectMap,
    pub(crate) preheat: Preheat,
}

impl ObjectBundle {
    pub(crate) fn new(
        principal: Principal,
        override_user: Option<Principal>,
        config: ImportConfig,
        object_map: ObjectMap,
        preheat: Preheat,
    ) -> Self {
        Self {
            principal,
            override_user,
            config,
            status: BundleStatus::Created,
            object_map,
            preheat,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn override_user(&self) -> Option<&Principal> {
        self.override_user.as_ref()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn strategy(&self) -> ImportStrategy {
        self.config.import_strategy
    }

    pub fn status(&self) -> BundleStatus {
        self.status
    }

    pub fn object_map(&self) -> &ObjectMap {
        &self.object_map
    }

    pub fn preheat(&self) -> &Preheat {
        &self.preheat
    }

    /// Read-only view handed to hooks.
    pub fn hook_context(&self) -> HookContext<'_> {
        HookContext {
            principal: &self.principal,
            strategy: self.config.import_strategy,
            merge_mode: self.config.merge_mode,
            preheat: &self.preheat,
        }
    }

    pub(crate) fn expect_status(&self, expected: BundleStatus) -> BundleResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(BundleError::InvalidStatus {
                expected,
                actual: self.status,
            })
        }
    }
}
