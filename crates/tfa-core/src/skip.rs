//! Skip accounting: logins completed without finished enrollment.
//!
//! Flood gating is a separate, validator-owned concern (see
//! [`crate::Tfa::flood_check`]); the policy here governs only the
//! "haven't finished enrolling yet" bypass.

use crate::{StoreError, UserDataStore, UserId};

pub(crate) const TFA_NAMESPACE: &str = "tfa";
const SKIP_COUNT_KEY: &str = "skip_count";

/// How many skips remain out of an allowance.
///
/// `allowed == 0` means skipping is disabled outright, represented as
/// `None` — distinct from an exhausted allowance, which is `Some(0)`.
pub fn remaining_skips(allowed: u32, counter: u32) -> Option<u32> {
    if allowed == 0 {
        return None;
    }
    Some(allowed.saturating_sub(counter))
}

/// Whether an unenrolled user may complete this login without a second
/// factor. On `true` the caller must also record the skip.
pub fn can_bypass_setup(remaining: Option<u32>) -> bool {
    remaining.is_some_and(|n| n > 0)
}

/// The counter after one granted skip.
pub fn record_skip(counter: u32) -> u32 {
    counter.saturating_add(1)
}

/// Store-backed skip accounting for one configured allowance.
///
/// The counter is read-modify-write against per-user storage and not
/// transactionally guarded; concurrent attempts by the same user can lose
/// an update. Accepted limitation, not exactly-once accounting.
pub struct SkipPolicy<'a> {
    store: &'a dyn UserDataStore,
    allowed: u32,
}

impl<'a> SkipPolicy<'a> {
    /// Bind the policy to a store and the configured allowance.
    pub fn new(store: &'a dyn UserDataStore, allowed: u32) -> Self {
        Self { store, allowed }
    }

    /// The user's persisted skip counter.
    pub fn counter(&self, user: &UserId) -> Result<u32, StoreError> {
        let value = self.store.get(user, TFA_NAMESPACE, SKIP_COUNT_KEY)?;
        Ok(value.and_then(|v| v.as_u64()).unwrap_or(0) as u32)
    }

    /// Remaining skips for this user, `None` when skipping is disabled.
    pub fn remaining(&self, user: &UserId) -> Result<Option<u32>, StoreError> {
        Ok(remaining_skips(self.allowed, self.counter(user)?))
    }

    /// Whether this user may bypass setup right now.
    pub fn can_bypass(&self, user: &UserId) -> Result<bool, StoreError> {
        Ok(can_bypass_setup(self.remaining(user)?))
    }

    /// Persist one granted skip. Returns the new counter value.
    pub fn record(&self, user: &UserId) -> Result<u32, StoreError> {
        let next = record_skip(self.counter(user)?);
        self.store
            .set(user, TFA_NAMESPACE, SKIP_COUNT_KEY, next.into())?;
        log::debug!("user {user} skipped second-factor setup ({next} total)");
        Ok(next)
    }
}
