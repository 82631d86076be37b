use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use mbi_types::{MetadataObject, ObjectType, PreheatIdentifier, Uid};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

type Table = BTreeMap<ObjectType, BTreeMap<Uid, MetadataObject>>;

/// In-memory store with unit-of-work semantics.
///
/// Writes land in the session view and are visible to `resolve`/`list`
/// immediately; [`ObjectStore::flush`] copies the session into the flushed
/// view, and [`ObjectStore::clear_session`] drops unflushed writes. Intended
/// for tests and embedding.
pub struct InMemoryObjectStore {
    session: RwLock<Table>,
    flushed: RwLock<Table>,
    deleted_markers: RwLock<BTreeSet<(ObjectType, Uid)>>,
    rejected: RwLock<BTreeSet<Uid>>,
    flushes: AtomicUsize,
    session_clears: AtomicUsize,
}

impl InMemoryObjectStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            session: RwLock::new(Table::new()),
            flushed: RwLock::new(Table::new()),
            deleted_markers: RwLock::new(BTreeSet::new()),
            rejected: RwLock::new(BTreeSet::new()),
            flushes: AtomicUsize::new(0),
            session_clears: AtomicUsize::new(0),
        }
    }

    /// Create a store already holding `objects` as durable state.
    pub fn with_objects(objects: impl IntoIterator<Item = MetadataObject>) -> Self {
        let store = Self::new();
        for object in objects {
            store.insert(object);
        }
        store
    }

    /// Seed a durable object, bypassing the session. Objects without a UID
    /// are ignored.
    pub fn insert(&self, object: MetadataObject) {
        let Some(uid) = object.uid.clone() else {
            return;
        };
        let ty = object.object_type.clone();
        self.flushed
            .write()
            .expect("lock poisoned")
            .entry(ty.clone())
            .or_default()
            .insert(uid.clone(), object.clone());
        self.session
            .write()
            .expect("lock poisoned")
            .entry(ty)
            .or_default()
            .insert(uid, object);
    }

    /// Session view of one object.
    pub fn get(&self, object_type: &ObjectType, uid: &Uid) -> Option<MetadataObject> {
        let session = self.session.read().expect("lock poisoned");
        session.get(object_type).and_then(|t| t.get(uid)).cloned()
    }

    /// Flushed view of one object.
    pub fn get_flushed(&self, object_type: &ObjectType, uid: &Uid) -> Option<MetadataObject> {
        let flushed = self.flushed.read().expect("lock poisoned");
        flushed.get(object_type).and_then(|t| t.get(uid)).cloned()
    }

    /// Number of objects in the session view.
    pub fn len(&self) -> usize {
        let session = self.session.read().expect("lock poisoned");
        session.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the session view is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of objects of one type in the session view.
    pub fn count(&self, object_type: &ObjectType) -> usize {
        let session = self.session.read().expect("lock poisoned");
        session.get(object_type).map_or(0, BTreeMap::len)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn session_clear_count(&self) -> usize {
        self.session_clears.load(Ordering::SeqCst)
    }

    /// Record soft-delete bookkeeping for an identifier.
    pub fn mark_deleted(&self, object_type: impl Into<ObjectType>, uid: impl Into<Uid>) {
        self.deleted_markers
            .write()
            .expect("lock poisoned")
            .insert((object_type.into(), uid.into()));
    }

    pub fn has_deleted_marker(&self, object_type: &ObjectType, uid: &Uid) -> bool {
        self.deleted_markers
            .read()
            .expect("lock poisoned")
            .contains(&(object_type.clone(), uid.clone()))
    }

    /// Make every later save or update of `uid` fail with
    /// [`StoreError::Rejected`].
    pub fn reject_writes_for(&self, uid: impl Into<Uid>) {
        self.rejected.write().expect("lock poisoned").insert(uid.into());
    }

    fn check_writable(&self, object: &MetadataObject) -> StoreResult<Uid> {
        let uid = object
            .uid
            .clone()
            .ok_or_else(|| StoreError::MissingUid(object.object_type.clone()))?;
        if self.rejected.read().expect("lock poisoned").contains(&uid) {
            return Err(StoreError::Rejected {
                uid,
                reason: "write refused by backend".into(),
            });
        }
        Ok(uid)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn resolve(
        &self,
        object_type: &ObjectType,
        identifier: PreheatIdentifier,
        value: &str,
    ) -> StoreResult<Option<MetadataObject>> {
        let session = self.session.read().expect("lock poisoned");
        let Some(table) = session.get(object_type) else {
            return Ok(None);
        };
        let by_uid = || table.get(&Uid::new(value));
        let by_code = || table.values().find(|o| o.code.as_deref() == Some(value));
        let found = match identifier {
            PreheatIdentifier::Uid => by_uid(),
            PreheatIdentifier::Code => by_code(),
            PreheatIdentifier::Auto => by_uid().or_else(by_code),
        };
        Ok(found.cloned())
    }

    fn list(&self, object_type: &ObjectType) -> StoreResult<Vec<MetadataObject>> {
        let session = self.session.read().expect("lock poisoned");
        Ok(session
            .get(object_type)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    fn save(&self, object: &MetadataObject) -> StoreResult<()> {
        let uid = self.check_writable(object)?;
        let mut session = self.session.write().expect("lock poisoned");
        let table = session.entry(object.object_type.clone()).or_default();
        if table.contains_key(&uid) {
            return Err(StoreError::AlreadyExists {
                object_type: object.object_type.clone(),
                uid,
            });
        }
        trace!(object_type = %object.object_type, uid = %uid, "save");
        table.insert(uid, object.clone());
        Ok(())
    }

    fn update(&self, object: &MetadataObject) -> StoreResult<()> {
        let uid = self.check_writable(object)?;
        let mut session = self.session.write().expect("lock poisoned");
        match session.get_mut(&object.object_type).and_then(|t| t.get_mut(&uid)) {
            Some(stored) => {
                trace!(object_type = %object.object_type, uid = %uid, "update");
                *stored = object.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                object_type: object.object_type.clone(),
                uid,
            }),
        }
    }

    fn delete(&self, object: &MetadataObject) -> StoreResult<()> {
        let uid = object
            .uid
            .clone()
            .ok_or_else(|| StoreError::MissingUid(object.object_type.clone()))?;
        let mut session = self.session.write().expect("lock poisoned");
        match session.get_mut(&object.object_type).and_then(|t| t.remove(&uid)) {
            Some(_) => {
                trace!(object_type = %object.object_type, uid = %uid, "delete");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                object_type: object.object_type.clone(),
                uid,
            }),
        }
    }

    fn flush(&self) -> StoreResult<()> {
        let snapshot = self.session.read().expect("lock poisoned").clone();
        *self.flushed.write().expect("lock poisoned") = snapshot;
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear_session(&self) -> StoreResult<()> {
        let snapshot = self.flushed.read().expect("lock poisoned").clone();
        *self.session.write().expect("lock poisoned") = snapshot;
        self.session_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn purge_deleted_marker(&self, object: &MetadataObject) -> StoreResult<()> {
        if let Some(uid) = &object.uid {
            self.deleted_markers
                .write()
                .expect("lock poisoned")
                .remove(&(object.object_type.clone(), uid.clone()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .field("flushes", &self.flush_count())
            .finish()
    }
}
