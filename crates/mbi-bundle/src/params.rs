use mbi_types::{MetadataObject, Principal};

use crate::config::ImportConfig;

/// Everything needed to create a bundle.
#[derive(Clone, Debug)]
pub struct ObjectBundleParams {
    /// The authenticated user the import runs as.
    pub principal: Principal,
    /// When set, stamped as owner of every created or updated object.
    pub override_user: Option<Principal>,
    pub config: ImportConfig,
    /// Payload, in submission order.
    pub objects: Vec<MetadataObject>,
}

impl ObjectBundleParams {
    pub fn new(principal: Principal, config: ImportConfig) -> Self {
        Self {
            principal,
            override_user: None,
            config,
            objects: Vec::new(),
        }
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = MetadataObject>) -> Self {
        self.objects.extend(objects);
        self
    }

    pub fn add_object(&mut self, object: MetadataObject) {
        self.objects.push(object);
    }

    pub fn with_override_user(mut self, user: Principal) -> Self {
        self.override_user = Some(user);
        self
    }
}
