//! Plugin capability model.
//!
//! A plugin is one object implementing [`TfaPlugin`] plus any subset of the
//! capability traits, surfaced through the `as_*` accessors. The engine
//! resolves which capabilities a plugin declares once, at construction, and
//! branches on the resolved set; there is no call-time probing and no
//! downcasting.

use serde_json::Value;

use crate::{ChallengeOptions, FloodWindow, FormState, PluginId};

/// Base contract every plugin implements, regardless of capabilities.
pub trait TfaPlugin: Send {
    /// Stable identifier this plugin is registered and persisted under.
    fn id(&self) -> &PluginId;

    /// Whether the plugin can run for the bound user right now, e.g. a
    /// TOTP validator with a decryptable seed, or a recovery-code validator
    /// with unused codes left.
    fn ready(&self) -> bool;

    /// Opaque per-plugin state merged into the externalized attempt
    /// context so it survives request boundaries.
    fn context(&self) -> Value {
        Value::Null
    }

    /// Validation capability, if declared.
    fn as_validation(&self) -> Option<&dyn ValidationPlugin> {
        None
    }

    /// Mutable access to the validation capability, if declared.
    fn as_validation_mut(&mut self) -> Option<&mut dyn ValidationPlugin> {
        None
    }

    /// Login-bypass capability, if declared.
    fn as_login(&self) -> Option<&dyn LoginPlugin> {
        None
    }

    /// Mutable access to the login-bypass capability, if declared.
    fn as_login_mut(&mut self) -> Option<&mut dyn LoginPlugin> {
        None
    }

    /// Out-of-band send capability, if declared.
    fn as_send_mut(&mut self) -> Option<&mut dyn SendPlugin> {
        None
    }

    /// Setup (enrollment) capability, if declared.
    fn as_setup(&self) -> Option<&dyn SetupPlugin> {
        None
    }

    /// Mutable access to the setup capability, if declared.
    fn as_setup_mut(&mut self) -> Option<&mut dyn SetupPlugin> {
        None
    }
}

/// Issues a challenge and checks a submitted response. Exactly one
/// validation-capable plugin is active in the engine at any time.
pub trait ValidationPlugin {
    /// Build the challenge into `form`; the returned options control
    /// whether login plugins may extend the same form.
    fn build_form(&mut self, form: &mut FormState) -> ChallengeOptions;

    /// Check a submitted response. `true` completes the attempt, `false`
    /// means re-render; user-facing messages go through [`Self::errors`].
    fn validate(&mut self, form: &FormState) -> bool;

    /// User-facing messages accumulated by the last validation.
    fn errors(&self) -> Vec<String>;

    /// Plugin-owned flood gating. `None` means this plugin imposes no
    /// throttling of its own and the engine permits the attempt.
    fn flood_check(&self, window: &FloodWindow) -> Option<bool> {
        let _ = window;
        None
    }

    /// Hook run once after the attempt completes successfully.
    fn finalize(&mut self) {}
}

/// Consulted to bypass the challenge entirely, e.g. a trusted-device
/// check. Any number may be registered; the engine treats the set
/// disjunctively.
pub trait LoginPlugin {
    /// Whether this plugin allows the user straight through.
    fn login_allowed(&self) -> bool;

    /// Append affordances (trusted device, remember me) to a challenge
    /// form, unless the active validator opted out.
    fn extend_form(&mut self, form: &mut FormState) {
        let _ = form;
    }

    /// Observe every submission, independent of its outcome; used to
    /// persist bypass state.
    fn observe_submission(&mut self, form: &FormState) {
        let _ = form;
    }

    /// Hook run once after the attempt completes successfully.
    fn finalize(&mut self) {}
}

/// Pushes a code out-of-band when a challenge round starts. Only
/// meaningful when paired with [`ValidationPlugin`].
pub trait SendPlugin {
    /// Invoked once per challenge round start: at engine construction for
    /// the primary validator and again on each fallback switch.
    fn begin(&mut self);
}

/// Used only during enrollment, never during login challenges.
pub trait SetupPlugin {
    /// Optional hook run when the setup flow starts.
    fn begin(&mut self) {}

    /// Build the enrollment form.
    fn build_setup_form(&mut self, form: &mut FormState);

    /// Check an enrollment submission; `false` means re-render.
    fn validate_setup(&mut self, form: &FormState) -> bool;

    /// Persist the validated enrollment. Returns success.
    fn commit_setup(&mut self, form: &FormState) -> bool;

    /// User-facing messages accumulated by the last validation.
    fn errors(&self) -> Vec<String>;
}
