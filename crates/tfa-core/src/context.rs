//! Per-attempt mutable state.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PluginId, UserId};

/// State carried across the form round trips of one authentication
/// attempt.
///
/// Created once per attempt and discarded at its end; the serialized form
/// may be persisted between individual round trips, but never outlives the
/// attempt. The active validator id is never present in the fallback
/// queue; the constructor filters it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptContext {
    user_id: UserId,
    active_validator_id: PluginId,
    fallback_queue: VecDeque<PluginId>,
    login_plugin_ids: Vec<PluginId>,
    active_fallback_id: Option<PluginId>,
    auxiliary: Value,
}

impl AttemptContext {
    /// Build the context for a fresh attempt. Fallback identifiers equal
    /// to the active validator are dropped; the rest keep their order.
    pub fn new(
        user_id: UserId,
        active_validator_id: PluginId,
        fallback_ids: impl IntoIterator<Item = PluginId>,
        login_plugin_ids: Vec<PluginId>,
    ) -> Self {
        let fallback_queue = fallback_ids
            .into_iter()
            .filter(|id| *id != active_validator_id)
            .collect();
        Self {
            user_id,
            active_validator_id,
            fallback_queue,
            login_plugin_ids,
            active_fallback_id: None,
            auxiliary: Value::Null,
        }
    }

    /// The user under authentication. Immutable for the context lifetime.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Identifier of the currently selected validation plugin.
    pub fn active_validator_id(&self) -> &PluginId {
        &self.active_validator_id
    }

    /// Validator identifiers still eligible for fallback, front to back.
    pub fn fallback_queue(&self) -> impl Iterator<Item = &PluginId> {
        self.fallback_queue.iter()
    }

    /// Identifiers of the registered login-bypass plugins.
    pub fn login_plugin_ids(&self) -> &[PluginId] {
        &self.login_plugin_ids
    }

    /// Present only once a fallback switch has occurred; distinguishes
    /// "running the primary validator" from "running a fallback".
    pub fn active_fallback_id(&self) -> Option<&PluginId> {
        self.active_fallback_id.as_ref()
    }

    /// Consume the next fallback identifier and make it active. Returns
    /// the new active identifier, or `None` when the queue is exhausted.
    pub(crate) fn advance_fallback(&mut self) -> Option<&PluginId> {
        let next = self.fallback_queue.pop_front()?;
        self.active_validator_id = next.clone();
        self.active_fallback_id = Some(next);
        Some(&self.active_validator_id)
    }

    /// Attach the active plugin's opaque state for externalization.
    pub(crate) fn set_auxiliary(&mut self, auxiliary: Value) {
        self.auxiliary = auxiliary;
    }

    /// The merged-in per-plugin state blob.
    pub fn auxiliary(&self) -> &Value {
        &self.auxiliary
    }
}
