//! Scripted fakes shared by the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tfa_core::{
    ChallengeOptions, FieldKind, FloodBackend, FloodWindow, FormState, LoginPlugin, PluginFactory,
    PluginId, SendPlugin, SetupPlugin, StoreError, TfaError, TfaPlugin, UserDataStore, UserId,
    UserLookup, UserRecord, ValidationPlugin,
};

/// Validator accepting one hard-coded code, with a send hook and counters.
pub struct FakeValidator {
    pub id: PluginId,
    pub ready: bool,
    pub code: &'static str,
    pub suppress_login_extensions: bool,
    pub errors: Vec<String>,
    pub rounds_begun: Arc<AtomicU32>,
    pub finalized: Arc<AtomicU32>,
}

impl FakeValidator {
    pub fn new(id: &str, code: &'static str) -> Self {
        Self {
            id: PluginId::from(id),
            ready: true,
            code,
            suppress_login_extensions: false,
            errors: Vec::new(),
            rounds_begun: Arc::new(AtomicU32::new(0)),
            finalized: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn code_field(&self) -> String {
        format!("{}_code", self.id)
    }
}

impl TfaPlugin for FakeValidator {
    fn id(&self) -> &PluginId {
        &self.id
    }

    fn ready(&self) -> bool {
        self.ready
    }

    fn context(&self) -> Value {
        json!({ "validator": self.id.as_str() })
    }

    fn as_validation(&self) -> Option<&dyn ValidationPlugin> {
        Some(self)
    }

    fn as_validation_mut(&mut self) -> Option<&mut dyn ValidationPlugin> {
        Some(self)
    }

    fn as_send_mut(&mut self) -> Option<&mut dyn SendPlugin> {
        Some(self)
    }
}

impl ValidationPlugin for FakeValidator {
    fn build_form(&mut self, form: &mut FormState) -> ChallengeOptions {
        form.push_field(self.code_field(), "Verification code", FieldKind::Text);
        ChallengeOptions {
            extend_with_login_plugins: !self.suppress_login_extensions,
        }
    }

    fn validate(&mut self, form: &FormState) -> bool {
        let ok = form.value(&self.code_field()) == Some(self.code);
        self.errors = if ok {
            Vec::new()
        } else {
            vec!["Invalid code".to_string()]
        };
        ok
    }

    fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }

    fn finalize(&mut self) {
        self.finalized.fetch_add(1, Ordering::SeqCst);
    }
}

impl SendPlugin for FakeValidator {
    fn begin(&mut self) {
        self.rounds_begun.fetch_add(1, Ordering::SeqCst);
    }
}

/// Validator that defers its flood gate to a shared backend.
pub struct FloodedValidator {
    pub inner: FakeValidator,
    pub backend: Arc<dyn FloodBackend>,
}

impl TfaPlugin for FloodedValidator {
    fn id(&self) -> &PluginId {
        &self.inner.id
    }

    fn ready(&self) -> bool {
        self.inner.ready
    }

    fn as_validation(&self) -> Option<&dyn ValidationPlugin> {
        Some(self)
    }

    fn as_validation_mut(&mut self) -> Option<&mut dyn ValidationPlugin> {
        Some(self)
    }
}

impl ValidationPlugin for FloodedValidator {
    fn build_form(&mut self, form: &mut FormState) -> ChallengeOptions {
        self.inner.build_form(form)
    }

    fn validate(&mut self, form: &FormState) -> bool {
        self.backend.register(self.inner.id.as_str(), &window());
        self.inner.validate(form)
    }

    fn errors(&self) -> Vec<String> {
        self.inner.errors()
    }

    fn flood_check(&self, window: &FloodWindow) -> Option<bool> {
        Some(self.backend.is_allowed(self.inner.id.as_str(), window))
    }
}

fn window() -> FloodWindow {
    FloodWindow {
        window: chrono::Duration::seconds(300),
        threshold: 3,
    }
}

/// Login plugin with scripted verdict and call counters.
pub struct CountingLogin {
    pub id: PluginId,
    pub allowed: bool,
    pub allowed_calls: Arc<AtomicU32>,
    pub observed: Arc<AtomicU32>,
    pub extended: Arc<AtomicU32>,
    pub finalized: Arc<AtomicU32>,
}

impl CountingLogin {
    pub fn new(id: &str, allowed: bool) -> Self {
        Self {
            id: PluginId::from(id),
            allowed,
            allowed_calls: Arc::new(AtomicU32::new(0)),
            observed: Arc::new(AtomicU32::new(0)),
            extended: Arc::new(AtomicU32::new(0)),
            finalized: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl TfaPlugin for CountingLogin {
    fn id(&self) -> &PluginId {
        &self.id
    }

    fn ready(&self) -> bool {
        true
    }

    fn as_login(&self) -> Option<&dyn LoginPlugin> {
        Some(self)
    }

    fn as_login_mut(&mut self) -> Option<&mut dyn LoginPlugin> {
        Some(self)
    }
}

impl LoginPlugin for CountingLogin {
    fn login_allowed(&self) -> bool {
        self.allowed_calls.fetch_add(1, Ordering::SeqCst);
        self.allowed
    }

    fn extend_form(&mut self, form: &mut FormState) {
        self.extended.fetch_add(1, Ordering::SeqCst);
        form.push_field(
            format!("{}_remember", self.id),
            "Trust this device",
            FieldKind::Checkbox,
        );
    }

    fn observe_submission(&mut self, _form: &FormState) {
        self.observed.fetch_add(1, Ordering::SeqCst);
    }

    fn finalize(&mut self) {
        self.finalized.fetch_add(1, Ordering::SeqCst);
    }
}

/// Setup plugin accepting one hard-coded confirmation code.
pub struct FakeSetup {
    pub id: PluginId,
    pub code: &'static str,
    pub begun: Arc<AtomicU32>,
    pub committed: Arc<AtomicU32>,
    pub errors: Vec<String>,
}

impl FakeSetup {
    pub fn new(id: &str, code: &'static str) -> Self {
        Self {
            id: PluginId::from(id),
            code,
            begun: Arc::new(AtomicU32::new(0)),
            committed: Arc::new(AtomicU32::new(0)),
            errors: Vec::new(),
        }
    }
}

impl TfaPlugin for FakeSetup {
    fn id(&self) -> &PluginId {
        &self.id
    }

    fn ready(&self) -> bool {
        false
    }

    fn as_setup(&self) -> Option<&dyn SetupPlugin> {
        Some(self)
    }

    fn as_setup_mut(&mut self) -> Option<&mut dyn SetupPlugin> {
        Some(self)
    }
}

impl SetupPlugin for FakeSetup {
    fn begin(&mut self) {
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn build_setup_form(&mut self, form: &mut FormState) {
        form.push_field("confirm_code", "Confirm a generated code", FieldKind::Text);
    }

    fn validate_setup(&mut self, form: &FormState) -> bool {
        let ok = form.value("confirm_code") == Some(self.code);
        self.errors = if ok {
            Vec::new()
        } else {
            vec!["Code mismatch".to_string()]
        };
        ok
    }

    fn commit_setup(&mut self, _form: &FormState) -> bool {
        self.committed.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }
}

/// In-memory user directory.
#[derive(Default)]
pub struct MapUsers {
    pub users: HashMap<UserId, UserRecord>,
}

impl MapUsers {
    pub fn with(records: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

impl UserLookup for MapUsers {
    fn user(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(id).cloned())
    }
}

pub fn user(id: &str, roles: &[&str]) -> UserRecord {
    UserRecord {
        id: UserId::from(id),
        active: true,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        last_login: None,
    }
}

/// In-memory `(user, namespace, key)` store.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<(UserId, String, String), Value>>,
}

impl UserDataStore for MemoryStore {
    fn get(&self, user: &UserId, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let data = self
            .data
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(data
            .get(&(user.clone(), namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn set(
        &self,
        user: &UserId,
        namespace: &str,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        data.insert((user.clone(), namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    fn remove(&self, user: &UserId, namespace: &str, key: &str) -> Result<(), StoreError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        data.remove(&(user.clone(), namespace.to_string(), key.to_string()));
        Ok(())
    }
}

/// Counting flood backend with a fixed threshold per identifier.
#[derive(Default)]
pub struct MemoryFlood {
    counts: Mutex<HashMap<String, u32>>,
}

impl FloodBackend for MemoryFlood {
    fn is_allowed(&self, id: &str, window: &FloodWindow) -> bool {
        let counts = self.counts.lock().expect("poisoned");
        counts.get(id).copied().unwrap_or(0) < window.threshold
    }

    fn register(&self, id: &str, _window: &FloodWindow) {
        let mut counts = self.counts.lock().expect("poisoned");
        *counts.entry(id.to_string()).or_insert(0) += 1;
    }
}

/// Factory over closures keyed by plugin id.
type Builder = Box<dyn Fn(&UserId) -> Box<dyn TfaPlugin> + Send + Sync>;

#[derive(Default)]
pub struct FakeFactory {
    builders: HashMap<PluginId, Builder>,
}

impl FakeFactory {
    pub fn register(
        mut self,
        id: &str,
        builder: impl Fn(&UserId) -> Box<dyn TfaPlugin> + Send + Sync + 'static,
    ) -> Self {
        self.builders.insert(PluginId::from(id), Box::new(builder));
        self
    }
}

impl PluginFactory for FakeFactory {
    fn create(
        &self,
        id: &PluginId,
        user: &UserId,
    ) -> Result<Option<Box<dyn TfaPlugin>>, TfaError> {
        Ok(self.builders.get(id).map(|b| b(user)))
    }
}
