use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Position of a user inside a multi-message conversation flow.
///
/// A user has at most one active step; entering a new top-level flow
/// replaces whatever was there. State lives only in process memory, so a
/// restart silently drops all in-flight conversations, which doubles as the
/// only timeout this bot has.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Idle,
    RegistrationName,
    RegistrationPhone,
    RegistrationEmail,
    RegistrationLanguage,
    SellerName,
    SellerPhone,
    SellerBrand,
    SellerProducts,
    Searching,
    OrderAddress,
    ChangingLanguage,
    RatingProduct {
        product_id: i64,
    },
    ConfirmClearCart {
        cart_owner_id: i64,
    },
}

impl Step {
    pub fn is_idle(&self) -> bool {
        matches!(self, Step::Idle)
    }
}

#[derive(Debug, Default, Clone)]
struct UserState {
    step: Step,
    scratch: HashMap<String, String>,
}

/// Per-user conversation state and scratch data for in-progress forms.
///
/// Every operation takes the lock exactly once, so a get-then-set can not
/// interleave with another update for the same user as long as the
/// dispatcher serializes updates per user (it does, see the per-user lanes
/// in `dispatcher.rs`).
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<HashMap<i64, UserState>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step for a user; `Idle` if the user has no entry.
    pub fn get(&self, user_id: i64) -> Step {
        self.lock()
            .get(&user_id)
            .map(|s| s.step.clone())
            .unwrap_or_default()
    }

    /// Enters a top-level flow: replaces the step and starts from an empty
    /// scratch, so nothing leaks from an abandoned flow.
    pub fn begin(&self, user_id: i64, step: Step) {
        let mut map = self.lock();
        map.insert(
            user_id,
            UserState {
                step,
                scratch: HashMap::new(),
            },
        );
    }

    /// Advances within the current flow: replaces the step and merges the
    /// scratch patch into what was already collected.
    pub fn set(&self, user_id: i64, step: Step, patch: &[(&str, String)]) {
        let mut map = self.lock();
        let entry = map.entry(user_id).or_default();
        entry.step = step;
        for (key, value) in patch {
            entry.scratch.insert((*key).to_string(), value.clone());
        }
    }

    /// Returns the user to `Idle` and drops all scratch data.
    pub fn clear(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    pub fn scratch(&self, user_id: i64, key: &str) -> Option<String> {
        self.lock()
            .get(&user_id)
            .and_then(|s| s.scratch.get(key).cloned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, UserState>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            // A panic while holding this lock can only come from the map
            // operations themselves; the map stays usable.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let store = StateStore::new();
        assert_eq!(store.get(1), Step::Idle);
    }

    #[test]
    fn test_set_and_get() {
        let store = StateStore::new();
        store.begin(1, Step::RegistrationName);
        assert_eq!(store.get(1), Step::RegistrationName);
        // other users unaffected
        assert_eq!(store.get(2), Step::Idle);
    }

    #[test]
    fn test_scratch_merges_within_flow() {
        let store = StateStore::new();
        store.begin(1, Step::RegistrationName);
        store.set(1, Step::RegistrationPhone, &[("name", "Alice".to_string())]);
        store.set(1, Step::RegistrationEmail, &[("phone", "+123".to_string())]);

        assert_eq!(store.scratch(1, "name").as_deref(), Some("Alice"));
        assert_eq!(store.scratch(1, "phone").as_deref(), Some("+123"));
    }

    #[test]
    fn test_begin_resets_scratch() {
        let store = StateStore::new();
        store.begin(1, Step::RegistrationName);
        store.set(1, Step::RegistrationPhone, &[("name", "Alice".to_string())]);

        store.begin(1, Step::SellerName);
        assert_eq!(store.get(1), Step::SellerName);
        assert_eq!(store.scratch(1, "name"), None);
    }

    #[test]
    fn test_clear_drops_everything() {
        let store = StateStore::new();
        store.begin(1, Step::Searching);
        store.set(1, Step::Searching, &[("q", "shoes".to_string())]);
        store.clear(1);

        assert_eq!(store.get(1), Step::Idle);
        assert_eq!(store.scratch(1, "q"), None);
    }

    #[test]
    fn test_parameterized_steps() {
        let store = StateStore::new();
        store.begin(7, Step::RatingProduct { product_id: 42 });
        assert_eq!(store.get(7), Step::RatingProduct { product_id: 42 });
        store.begin(7, Step::ConfirmClearCart { cart_owner_id: 9 });
        assert_eq!(store.get(7), Step::ConfirmClearCart { cart_owner_id: 9 });
    }
}
