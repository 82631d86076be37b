use mbi_types::{MetadataObject, ObjectType, Principal};

/// Access-control collaborator consulted by the security check.
///
/// Treated as a boolean oracle: create is decided per type, update and
/// delete per resolved stored object.
pub trait AccessControl: Send + Sync {
    fn can_create(&self, principal: &Principal, object_type: &ObjectType) -> bool;

    fn can_update(&self, principal: &Principal, object: &MetadataObject) -> bool;

    fn can_delete(&self, principal: &Principal, object: &MetadataObject) -> bool;
}

/// Grants everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AccessControl for AllowAll {
    fn can_create(&self, _principal: &Principal, _object_type: &ObjectType) -> bool {
        true
    }

    fn can_update(&self, _principal: &Principal, _object: &MetadataObject) -> bool {
        true
    }

    fn can_delete(&self, _principal: &Principal, _object: &MetadataObject) -> bool {
        true
    }
}

/// Authority-based access control.
///
/// A principal may create objects of type `t` when it holds `t:create`, and
/// update or delete an object when it holds `t:update` / `t:delete` or owns
/// the object. Superusers and holders of `ALL` may do anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorityAccessControl;

impl AuthorityAccessControl {
    pub fn authority(object_type: &ObjectType, action: &str) -> String {
        format!("{object_type}:{action}")
    }

    fn owns(principal: &Principal, object: &MetadataObject) -> bool {
        object.owner.as_ref() == Some(&principal.uid)
    }
}

impl AccessControl for AuthorityAccessControl {
    fn can_create(&self, principal: &Principal, object_type: &ObjectType) -> bool {
        principal.has_authority(&Self::authority(object_type, "create"))
    }

    fn can_update(&self, principal: &Principal, object: &MetadataObject) -> bool {
        Self::owns(principal, object)
            || principal.has_authority(&Self::authority(&object.object_type, "update"))
    }

    fn can_delete(&self, principal: &Principal, object: &MetadataObject) -> bool {
        Self::owns(principal, object)
            || principal.has_authority(&Self::authority(&object.object_type, "delete"))
    }
}
