//! The challenge engine.

use std::collections::VecDeque;

use crate::{
    AttemptContext, ChallengeOptions, FloodWindow, FormState, TfaError, TfaPlugin, UserId,
    FALLBACK_ACTION,
};

/// Orchestrates one active validation plugin, zero or more login-bypass
/// plugins and zero or more fallback validators across the multi-step
/// submission loop of a single authentication attempt.
///
/// The engine is driven synchronously by the host's request/response
/// cycle: `present_form` always precedes the `submit_form` it pairs with,
/// and a `false` completion flag means "re-render". Fallback switches
/// strictly consume the queue; a previously active validator is never
/// revisited.
pub struct Tfa {
    context: AttemptContext,
    active: Box<dyn TfaPlugin>,
    fallbacks: VecDeque<Box<dyn TfaPlugin>>,
    logins: Vec<Box<dyn TfaPlugin>>,
}

impl Tfa {
    /// Bind an engine to one attempt.
    ///
    /// `active` must declare the validation capability. Fallbacks sharing
    /// the active plugin's identifier are excluded, as are fallbacks that
    /// do not report ready or lack validation; the survivors keep their
    /// supplied order. The active plugin's send capability, if any, is
    /// begun immediately.
    pub fn new(
        user_id: UserId,
        mut active: Box<dyn TfaPlugin>,
        fallbacks: Vec<Box<dyn TfaPlugin>>,
        mut logins: Vec<Box<dyn TfaPlugin>>,
    ) -> Result<Self, TfaError> {
        if active.as_validation().is_none() {
            return Err(TfaError::NotAValidator(active.id().clone()));
        }

        let fallbacks: VecDeque<Box<dyn TfaPlugin>> = fallbacks
            .into_iter()
            .filter(|p| p.id() != active.id() && p.ready() && p.as_validation().is_some())
            .collect();
        logins.retain(|p| p.as_login().is_some());

        let context = AttemptContext::new(
            user_id,
            active.id().clone(),
            fallbacks.iter().map(|p| p.id().clone()),
            logins.iter().map(|p| p.id().clone()).collect(),
        );

        if let Some(send) = active.as_send_mut() {
            send.begin();
        }

        Ok(Self {
            context,
            active,
            fallbacks,
            logins,
        })
    }

    /// Whether any registered login plugin allows bypassing the challenge.
    /// Short-circuits on the first plugin that says yes.
    pub fn login_allowed(&self) -> bool {
        self.logins
            .iter()
            .filter_map(|p| p.as_login())
            .any(|login| login.login_allowed())
    }

    /// Whether the active validator can run for this user right now.
    pub fn ready(&self) -> bool {
        self.active.ready()
    }

    /// Whether at least one fallback validator remains.
    pub fn has_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }

    /// Build the active validator's challenge into `form`, then give every
    /// login plugin the chance to append to the same form unless the
    /// validator opted out.
    pub fn present_form(&mut self, form: &mut FormState) {
        let options = match self.active.as_validation_mut() {
            Some(validation) => validation.build_form(form),
            None => ChallengeOptions::default(),
        };
        if options.extend_with_login_plugins {
            for plugin in &mut self.logins {
                if let Some(login) = plugin.as_login_mut() {
                    login.extend_form(form);
                }
            }
        }
    }

    /// Ask the active validator's own flood gate whether this attempt may
    /// proceed. A validator without flood logic imposes no throttling.
    pub fn flood_check(&self, window: &FloodWindow) -> bool {
        let allowed = self
            .active
            .as_validation()
            .and_then(|validation| validation.flood_check(window))
            .unwrap_or(true);
        if !allowed {
            log::warn!(
                "flood limit hit for user {} on validator {}",
                self.context.user_id(),
                self.active.id()
            );
        }
        allowed
    }

    /// Process one submission. Returns the completion flag: `true` means
    /// the attempt is finished and the host should finalize the login,
    /// `false` means re-render, either because validation failed, the
    /// validator needs another step, or the user switched methods.
    ///
    /// Choosing the fallback action never completes in the same call; the
    /// next `present_form` reflects the newly active validator. Every
    /// login plugin observes the submission regardless of outcome.
    pub fn submit_form(&mut self, form: &FormState) -> bool {
        let complete = if self.has_fallback() && form.action() == Some(FALLBACK_ACTION) {
            self.switch_to_next_fallback();
            false
        } else {
            match self.active.as_validation_mut() {
                Some(validation) => validation.validate(form),
                None => false,
            }
        };

        for plugin in &mut self.logins {
            if let Some(login) = plugin.as_login_mut() {
                login.observe_submission(form);
            }
        }

        complete
    }

    fn switch_to_next_fallback(&mut self) {
        let Some(mut next) = self.fallbacks.pop_front() else {
            return;
        };
        std::mem::swap(&mut self.active, &mut next);
        // `next` now holds the exhausted validator and is dropped with it.
        self.context.advance_fallback();

        log::debug!(
            "user {} switched to fallback validator {}",
            self.context.user_id(),
            self.active.id()
        );

        if let Some(send) = self.active.as_send_mut() {
            send.begin();
        }
    }

    /// Run the active validator's finalize hook, then every login
    /// plugin's. Call exactly once, only after `submit_form` returned
    /// complete.
    pub fn finalize(&mut self) {
        if let Some(validation) = self.active.as_validation_mut() {
            validation.finalize();
        }
        for plugin in &mut self.logins {
            if let Some(login) = plugin.as_login_mut() {
                login.finalize();
            }
        }
    }

    /// User-facing messages from the active validator's last validation.
    pub fn errors(&self) -> Vec<String> {
        self.active
            .as_validation()
            .map(|validation| validation.errors())
            .unwrap_or_default()
    }

    /// The per-attempt state.
    pub fn context(&self) -> &AttemptContext {
        &self.context
    }

    /// A snapshot of the context with the active plugin's auxiliary state
    /// merged in, suitable for persisting between round trips of this
    /// attempt.
    pub fn externalized_context(&self) -> AttemptContext {
        let mut snapshot = self.context.clone();
        snapshot.set_auxiliary(self.active.context());
        snapshot
    }
}
