use mbi_types::{MetadataObject, ObjectType, PreheatIdentifier};

use crate::error::StoreResult;

/// Persistence/session layer the importer writes through.
///
/// Implementations are expected to behave like a unit-of-work session:
/// writes are visible to later `resolve`/`list` calls of the same session
/// immediately, and become durable on [`ObjectStore::flush`].
pub trait ObjectStore: Send + Sync {
    /// Find one object of `object_type` by identifier.
    ///
    /// With [`PreheatIdentifier::Auto`] the value is matched against both
    /// UID and code. Returns `Ok(None)` if nothing matches.
    fn resolve(
        &self,
        object_type: &ObjectType,
        identifier: PreheatIdentifier,
        value: &str,
    ) -> StoreResult<Option<MetadataObject>>;

    /// Resolve many identifiers of one type. Unknown identifiers are
    /// skipped.
    ///
    /// Default implementation calls `resolve()` for each value. Backends may
    /// override for fewer round-trips.
    fn resolve_all(
        &self,
        object_type: &ObjectType,
        identifier: PreheatIdentifier,
        values: &[String],
    ) -> StoreResult<Vec<MetadataObject>> {
        let mut found = Vec::new();
        for value in values {
            if let Some(object) = self.resolve(object_type, identifier, value)? {
                found.push(object);
            }
        }
        Ok(found)
    }

    /// Every stored object of a type.
    fn list(&self, object_type: &ObjectType) -> StoreResult<Vec<MetadataObject>>;

    fn save(&self, object: &MetadataObject) -> StoreResult<()>;

    fn update(&self, object: &MetadataObject) -> StoreResult<()>;

    fn delete(&self, object: &MetadataObject) -> StoreResult<()>;

    /// Force pending writes to the backend.
    fn flush(&self) -> StoreResult<()>;

    /// Drop session-level caches. Called once at the end of every commit.
    fn clear_session(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Remove soft-delete bookkeeping kept for `object`.
    fn purge_deleted_marker(&self, _object: &MetadataObject) -> StoreResult<()> {
        Ok(())
    }
}
