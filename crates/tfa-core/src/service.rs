//! Host-facing entry points.

use std::sync::Arc;

use serde_json::Value;
use tfa_crypto::SecretKey;

use crate::{
    PluginFactory, PluginId, SkipPolicy, Tfa, TfaError, TfaPlugin, TfaSettings, TfaSetup,
    UserDataStore, UserId, UserLookup,
};

const ADMIN_ROLE: &str = "admin";
const SECRET_VALUE_KEY: &str = "secret";

/// Decides whether a user needs a second factor and builds the engines
/// that run the challenge and enrollment flows.
pub struct TfaService {
    settings: TfaSettings,
    users: Arc<dyn UserLookup>,
    store: Arc<dyn UserDataStore>,
    plugins: Arc<dyn PluginFactory>,
}

impl TfaService {
    /// Wire the service to its host collaborators.
    pub fn new(
        settings: TfaSettings,
        users: Arc<dyn UserLookup>,
        store: Arc<dyn UserDataStore>,
        plugins: Arc<dyn PluginFactory>,
    ) -> Self {
        Self {
            settings,
            users,
            store,
            plugins,
        }
    }

    /// The active configuration.
    pub fn settings(&self) -> &TfaSettings {
        &self.settings
    }

    /// Whether `user_id` must pass a second factor after primary
    /// authentication.
    ///
    /// Missing and inactive users are not challenged; only the engine
    /// builders treat a missing user as an error.
    pub fn is_tfa_required(&self, user_id: &UserId) -> Result<bool, TfaError> {
        if !self.settings.enabled {
            return Ok(false);
        }
        let Some(user) = self.users.user(user_id)? else {
            return Ok(false);
        };
        if !user.active {
            return Ok(false);
        }
        if self.settings.admin_bypass && user.has_role(ADMIN_ROLE) {
            return Ok(false);
        }
        if self.settings.required_roles.is_empty() {
            return Ok(true);
        }
        Ok(self
            .settings
            .required_roles
            .iter()
            .any(|role| user.has_role(role)))
    }

    /// Build a [`Tfa`] engine for one authentication attempt.
    ///
    /// The default validator is challenged first; every other allowed
    /// validator becomes a fallback candidate. When the default is not
    /// ready the first ready fallback is promoted in its place. Fails fast
    /// when no ready validator remains at all, so the host can fall back
    /// to "not required" instead of locking the user out.
    pub fn build_challenge_engine(&self, user_id: &UserId) -> Result<Tfa, TfaError> {
        self.settings.validate()?;
        self.users
            .user(user_id)?
            .ok_or_else(|| TfaError::UserNotFound(user_id.clone()))?;

        let mut active = self.create_required(&self.settings.default_validator, user_id)?;

        let mut fallbacks = Vec::new();
        for id in &self.settings.allowed_validators {
            if id == active.id() {
                continue;
            }
            if let Some(plugin) = self.plugins.create(id, user_id)? {
                fallbacks.push(plugin);
            }
        }

        if !active.ready() {
            let ready = fallbacks
                .iter()
                .position(|p| p.ready() && p.as_validation().is_some())
                .ok_or(TfaError::NoValidator)?;
            active = fallbacks.remove(ready);
        }

        let mut logins = Vec::new();
        for id in &self.settings.login_plugins {
            if let Some(plugin) = self.plugins.create(id, user_id)? {
                logins.push(plugin);
            }
        }

        Tfa::new(user_id.clone(), active, fallbacks, logins)
    }

    /// Build a [`TfaSetup`] engine for enrolling `user_id` with one
    /// plugin.
    pub fn setup_engine(
        &self,
        plugin_id: &PluginId,
        user_id: &UserId,
    ) -> Result<TfaSetup, TfaError> {
        self.users
            .user(user_id)?
            .ok_or_else(|| TfaError::UserNotFound(user_id.clone()))?;
        let plugin = self.create_required(plugin_id, user_id)?;
        TfaSetup::new(plugin, user_id.clone())
    }

    /// Skip accounting bound to the configured allowance.
    pub fn skip_policy(&self) -> SkipPolicy<'_> {
        SkipPolicy::new(self.store.as_ref(), self.settings.allowed_skips)
    }

    /// Fetch and decrypt a user's stored secret for one plugin.
    ///
    /// `Ok(None)` covers both "never enrolled" and "blob unreadable"; the
    /// latter is logged, and the caller should drive the user toward
    /// re-enrollment either way.
    pub fn stored_secret(
        &self,
        user_id: &UserId,
        plugin_id: &PluginId,
        key: &SecretKey,
    ) -> Result<Option<String>, TfaError> {
        let Some(value) = self
            .store
            .get(user_id, plugin_id.as_str(), SECRET_VALUE_KEY)?
        else {
            return Ok(None);
        };
        let secret = value
            .as_str()
            .and_then(|blob| tfa_crypto::decrypt(blob, key));
        if secret.is_none() {
            log::warn!("stored secret for user {user_id}, plugin {plugin_id} is unreadable");
        }
        Ok(secret)
    }

    /// Encrypt and persist a user's secret for one plugin.
    pub fn store_secret(
        &self,
        user_id: &UserId,
        plugin_id: &PluginId,
        key: &SecretKey,
        plaintext: &str,
    ) -> Result<(), TfaError> {
        let blob = tfa_crypto::encrypt(plaintext, key)?;
        self.store.set(
            user_id,
            plugin_id.as_str(),
            SECRET_VALUE_KEY,
            Value::String(blob),
        )?;
        Ok(())
    }

    /// Remove a user's stored secret for one plugin.
    pub fn remove_secret(&self, user_id: &UserId, plugin_id: &PluginId) -> Result<(), TfaError> {
        Ok(self
            .store
            .remove(user_id, plugin_id.as_str(), SECRET_VALUE_KEY)?)
    }

    fn create_required(
        &self,
        id: &PluginId,
        user: &UserId,
    ) -> Result<Box<dyn TfaPlugin>, TfaError> {
        self.plugins
            .create(id, user)?
            .ok_or_else(|| TfaError::UnknownValidator(id.clone()))
    }
}
