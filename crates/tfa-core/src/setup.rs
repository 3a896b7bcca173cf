//! Enrollment orchestration.

use crate::{FormState, TfaError, TfaPlugin, UserId};

/// Single-plugin orchestrator for the enrollment flow.
///
/// Enrollment is always single-method: no fallback queue, no login-bypass
/// interaction. Each step delegates directly to the one setup-capable
/// plugin.
pub struct TfaSetup {
    plugin: Box<dyn TfaPlugin>,
    user_id: UserId,
}

impl TfaSetup {
    /// Bind the setup flow to one setup-capable plugin.
    pub fn new(mut plugin: Box<dyn TfaPlugin>, user_id: UserId) -> Result<Self, TfaError> {
        if plugin.as_setup().is_none() {
            return Err(TfaError::NotSetupCapable(plugin.id().clone()));
        }
        if let Some(setup) = plugin.as_setup_mut() {
            setup.begin();
        }
        Ok(Self { plugin, user_id })
    }

    /// The user enrolling.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Build the enrollment form.
    pub fn present_form(&mut self, form: &mut FormState) {
        if let Some(setup) = self.plugin.as_setup_mut() {
            setup.build_setup_form(form);
        }
    }

    /// Check an enrollment submission; `false` means re-render with the
    /// messages from [`Self::errors`].
    pub fn submit_form(&mut self, form: &FormState) -> bool {
        match self.plugin.as_setup_mut() {
            Some(setup) => setup.validate_setup(form),
            None => false,
        }
    }

    /// Persist a validated enrollment. Returns success.
    pub fn commit(&mut self, form: &FormState) -> bool {
        let committed = match self.plugin.as_setup_mut() {
            Some(setup) => setup.commit_setup(form),
            None => false,
        };
        if committed {
            log::debug!(
                "user {} completed setup for {}",
                self.user_id,
                self.plugin.id()
            );
        }
        committed
    }

    /// User-facing messages from the last validation.
    pub fn errors(&self) -> Vec<String> {
        self.plugin
            .as_setup()
            .map(|setup| setup.errors())
            .unwrap_or_default()
    }
}
