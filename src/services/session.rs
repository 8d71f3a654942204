//! Session store: the single source of truth for who is signed in.
//!
//! Durable storage is written before memory is touched, so a crash between
//! the two never leaves memory ahead of what a restart would rehydrate.
//! The one exception is `update_user`, which updates memory even when the
//! write fails; `persisted` stays false until the next successful write.

use crate::domain::constants::SESSION_KEY;
use crate::domain::models::{Identity, SessionSnapshot};
use crate::services::storage::{DurableStorage, StorageError};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("stored identity is unreadable: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Persistence(#[from] StorageError),
    #[error("no active session")]
    NotAuthenticated,
    #[error("identity update rejected: {0}")]
    InvalidIdentity(String),
}

type Listener = Box<dyn Fn(&SessionSnapshot)>;

pub struct SessionStore {
    storage: RefCell<Box<dyn DurableStorage>>,
    identity: RefCell<Option<Identity>>,
    loading: Cell<bool>,
    initialized: Cell<bool>,
    persisted: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn DurableStorage>) -> Self {
        Self {
            storage: RefCell::new(storage),
            identity: RefCell::new(None),
            loading: Cell::new(true),
            initialized: Cell::new(false),
            persisted: Cell::new(true),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Rehydrate from durable storage. Runs once per store; any failure
    /// degrades to an unauthenticated session.
    pub fn initialize(&self) {
        if self.initialized.replace(true) {
            tracing::debug!("session store already initialized");
            return;
        }
        self.loading.set(true);

        let restored = match self.read_stored() {
            Ok(found) => found,
            Err(SessionError::Parse(e)) => {
                tracing::error!(error = %e, "stored identity is corrupt; purging");
                if let Err(e) = self.storage.borrow_mut().remove_item(SESSION_KEY) {
                    tracing::error!(error = %e, "failed to purge corrupt identity");
                }
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored identity");
                None
            }
        };

        if let Some(id) = &restored {
            tracing::info!(email = %id.email_address, "session restored");
        }
        *self.identity.borrow_mut() = restored;
        self.loading.set(false);
        self.notify();
    }

    fn read_stored(&self) -> Result<Option<Identity>, SessionError> {
        let raw = self.storage.borrow().get_item(SESSION_KEY)?;
        match raw {
            None => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        }
    }

    pub fn login(&self, identity: Identity) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&identity)?;
        if let Err(e) = self.storage.borrow_mut().set_item(SESSION_KEY, &raw) {
            tracing::error!(error = %e, "failed to persist identity; login aborted");
            return Err(e.into());
        }
        tracing::info!(email = %identity.email_address, role = ?identity.role, "signed in");
        *self.identity.borrow_mut() = Some(identity);
        self.persisted.set(true);
        self.notify();
        Ok(())
    }

    /// Ends the session. Memory is cleared even if the purge fails, so a
    /// forced logout always takes effect for this process.
    pub fn logout(&self) -> Result<(), SessionError> {
        let purge = self.storage.borrow_mut().remove_item(SESSION_KEY);
        if let Err(e) = &purge {
            tracing::error!(error = %e, "failed to purge stored identity");
        }
        let was_signed_in = self.identity.borrow_mut().take().is_some();
        self.persisted.set(purge.is_ok());
        if was_signed_in {
            tracing::info!("signed out");
            self.notify();
        }
        purge.map_err(SessionError::from)
    }

    /// Shallow-merges `patch` into the current identity. Keys absent from
    /// the patch are untouched.
    pub fn update_user(&self, patch: Map<String, Value>) -> Result<Identity, SessionError> {
        let current = self
            .identity
            .borrow()
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        let mut merged = match serde_json::to_value(&current)? {
            Value::Object(m) => m,
            _ => return Err(SessionError::InvalidIdentity("identity is not an object".into())),
        };
        merged.extend(patch);
        merged.remove("password");
        let updated: Identity = serde_json::from_value(Value::Object(merged))
            .map_err(|e| SessionError::InvalidIdentity(e.to_string()))?;

        let raw = serde_json::to_string(&updated)?;
        match self.storage.borrow_mut().set_item(SESSION_KEY, &raw) {
            Ok(()) => self.persisted.set(true),
            Err(e) => {
                tracing::warn!(error = %e, "identity updated in memory only");
                self.persisted.set(false);
            }
        }
        *self.identity.borrow_mut() = Some(updated.clone());
        self.notify();
        Ok(updated)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let identity = self.identity();
        SessionSnapshot {
            is_authenticated: identity.is_some(),
            identity,
            loading: self.loading.get(),
            persisted: self.persisted.get(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self) {
        let snap = self.snapshot();
        for l in self.listeners.borrow().iter() {
            l(&snap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionError, SessionStore};
    use crate::domain::constants::SESSION_KEY;
    use crate::domain::models::{Identity, Role};
    use crate::services::storage::testing::MemoryStorage;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ana() -> Identity {
        serde_json::from_value(json!({
            "user_id": 11,
            "user_name": "ana",
            "email_address": "ana@example.com",
            "phone_number": "0901",
            "city": "Hanoi",
            "role": 2
        }))
        .unwrap()
    }

    fn reload(mem: &MemoryStorage) -> SessionStore {
        let s = SessionStore::new(Box::new(mem.clone()));
        s.initialize();
        s
    }

    #[test]
    fn login_then_reload_rehydrates_same_identity() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        s.login(ana()).unwrap();

        let again = reload(&mem);
        assert_eq!(again.identity(), Some(ana()));
        assert!(again.is_authenticated());
        assert!(!again.snapshot().loading);
    }

    #[test]
    fn logout_then_reload_is_unauthenticated_and_idempotent() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        s.login(ana()).unwrap();
        s.logout().unwrap();
        s.logout().unwrap();
        assert!(!s.is_authenticated());
        assert_eq!(mem.raw(SESSION_KEY), None);

        let again = reload(&mem);
        assert!(!again.is_authenticated());
        assert_eq!(again.identity(), None);
    }

    #[test]
    fn corrupt_entry_is_purged_on_initialize() {
        let mem = MemoryStorage::default();
        mem.set_raw(SESSION_KEY, "{not json");
        let s = reload(&mem);
        assert!(!s.is_authenticated());
        assert_eq!(mem.raw(SESSION_KEY), None);
    }

    #[test]
    fn entry_missing_required_fields_is_purged() {
        let mem = MemoryStorage::default();
        mem.set_raw(SESSION_KEY, r#"{"user_name":"ana"}"#);
        let s = reload(&mem);
        assert!(!s.is_authenticated());
        assert_eq!(mem.raw(SESSION_KEY), None);
    }

    #[test]
    fn unreadable_storage_degrades_to_signed_out() {
        let mem = MemoryStorage::default();
        mem.set_raw(SESSION_KEY, &serde_json::to_string(&ana()).unwrap());
        mem.failing_reads(true);
        let s = reload(&mem);
        assert!(!s.is_authenticated());
        assert!(!s.snapshot().loading);
    }

    #[test]
    fn initialize_runs_once() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        mem.set_raw(SESSION_KEY, &serde_json::to_string(&ana()).unwrap());
        s.initialize();
        assert!(!s.is_authenticated());
    }

    #[test]
    fn failed_login_write_leaves_memory_untouched() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        mem.failing_writes(true);
        let err = s.login(ana()).unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(!s.is_authenticated());
        assert_eq!(mem.raw(SESSION_KEY), None);
    }

    #[test]
    fn update_user_merges_and_survives_reload() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        s.login(ana()).unwrap();

        let patch = json!({"city": "X"}).as_object().cloned().unwrap();
        s.update_user(patch).unwrap();

        let again = reload(&mem);
        let id = again.identity().unwrap();
        assert_eq!(id.city.as_deref(), Some("X"));
        let mut expected = ana();
        expected.city = Some("X".into());
        assert_eq!(id, expected);
    }

    #[test]
    fn update_user_keeps_memory_when_write_fails() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        s.login(ana()).unwrap();
        mem.failing_writes(true);

        let patch = json!({"user_name": "ana2"}).as_object().cloned().unwrap();
        s.update_user(patch).unwrap();
        assert_eq!(s.identity().unwrap().user_name, "ana2");
        assert!(!s.snapshot().persisted);

        mem.failing_writes(false);
        let again = reload(&mem);
        assert_eq!(again.identity().unwrap().user_name, "ana");
    }

    #[test]
    fn update_user_requires_a_session() {
        let s = reload(&MemoryStorage::default());
        let patch = json!({"city": "X"}).as_object().cloned().unwrap();
        assert!(matches!(
            s.update_user(patch),
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[test]
    fn update_user_rejects_patch_breaking_identity() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        s.login(ana()).unwrap();
        let patch = json!({"email_address": 42}).as_object().cloned().unwrap();
        assert!(matches!(
            s.update_user(patch),
            Err(SessionError::InvalidIdentity(_))
        ));
        assert_eq!(s.identity(), Some(ana()));
    }

    #[test]
    fn role_survives_reload() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        let mut admin = ana();
        admin.role = Role::Admin;
        s.login(admin).unwrap();
        assert!(reload(&mem).identity().unwrap().is_admin());
    }

    #[test]
    fn subscribers_see_every_transition() {
        let mem = MemoryStorage::default();
        let s = SessionStore::new(Box::new(mem.clone()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        s.subscribe(move |snap| sink.borrow_mut().push(snap.is_authenticated));
        s.initialize();
        s.login(ana()).unwrap();
        s.logout().unwrap();
        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn unknown_status_survives_login_and_reload() {
        let mem = MemoryStorage::default();
        let s = reload(&mem);
        let id: Identity = serde_json::from_value(json!({
            "user_name": "ana",
            "email_address": "ana@example.com",
            "role": 2,
            "status": "suspended"
        }))
        .unwrap();
        s.login(id.clone()).unwrap();

        let raw = mem.raw(SESSION_KEY).unwrap();
        assert!(raw.contains("\"status\":\"suspended\""));
        assert_eq!(reload(&mem).identity(), Some(id));
    }
}
