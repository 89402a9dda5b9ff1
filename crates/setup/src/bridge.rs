//! Mirrors workflow progress into client storage.
//!
//! Storage problems never stop the workflow: a failed read seeds step 1
//! and a failed write is logged and dropped.

use std::sync::Arc;

use jobfair_core::setup_step::SetupStep;
use jobfair_core::storage::{ClientStorage, TOKEN_KEY};

/// Storage key holding the current step number.
pub const CURRENT_STEP_KEY: &str = "setup_form_current_step";

#[derive(Clone)]
pub struct StepPersistence {
    storage: Arc<dyn ClientStorage>,
}

impl StepPersistence {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    /// The stored step, or [`SetupStep::Participation`] when nothing
    /// usable is stored.
    pub fn load(&self) -> SetupStep {
        let raw = match self.storage.get(CURRENT_STEP_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SetupStep::Participation,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored setup step");
                return SetupStep::Participation;
            }
        };

        match raw
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| SetupStep::from_number(n).ok())
        {
            Some(step) => step,
            None => {
                tracing::warn!(value = %raw, "Ignoring unrecognised stored setup step");
                SetupStep::Participation
            }
        }
    }

    pub fn save(&self, step: SetupStep) {
        let value = step.to_number().to_string();
        if let Err(e) = self.storage.set(CURRENT_STEP_KEY, &value) {
            tracing::warn!(error = %e, step = %step, "Could not store setup step");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(CURRENT_STEP_KEY) {
            tracing::warn!(error = %e, "Could not clear stored setup step");
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored token");
                None
            }
        }
    }

    /// Unlike the step, a token that cannot be stored is reported.
    pub fn store_token(&self, token: &str) -> Result<(), jobfair_core::error::CoreError> {
        self.storage.set(TOKEN_KEY, token)
    }
}

impl std::fmt::Debug for StepPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepPersistence").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfair_core::error::CoreError;
    use jobfair_core::storage::MemoryStorage;

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl ClientStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
            Err(CoreError::Storage("unavailable".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
            Err(CoreError::Storage("unavailable".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), CoreError> {
            Err(CoreError::Storage("unavailable".into()))
        }
    }

    #[test]
    fn empty_storage_starts_on_first_step() {
        let bridge = StepPersistence::new(Arc::new(MemoryStorage::new()));
        assert_eq!(bridge.load(), SetupStep::Participation);
    }

    #[test]
    fn saved_step_is_restored() {
        let storage = Arc::new(MemoryStorage::new());
        StepPersistence::new(storage.clone()).save(SetupStep::BrandingSpeakers);
        assert_eq!(
            storage.get(CURRENT_STEP_KEY).unwrap().as_deref(),
            Some("3")
        );
        assert_eq!(
            StepPersistence::new(storage).load(),
            SetupStep::BrandingSpeakers
        );
    }

    #[test]
    fn garbage_falls_back_to_first_step() {
        let storage = Arc::new(MemoryStorage::new());
        for raw in ["9", "0", "abc", ""] {
            storage.set(CURRENT_STEP_KEY, raw).unwrap();
            assert_eq!(
                StepPersistence::new(storage.clone()).load(),
                SetupStep::Participation
            );
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let bridge = StepPersistence::new(Arc::new(BrokenStorage));
        assert_eq!(bridge.load(), SetupStep::Participation);
        bridge.save(SetupStep::JobProfiles);
        bridge.clear();
        assert!(bridge.token().is_none());
        assert!(bridge.store_token("t").is_err());
    }

    #[test]
    fn clear_removes_only_the_step() {
        let storage = Arc::new(MemoryStorage::new());
        let bridge = StepPersistence::new(storage.clone());
        bridge.store_token("tok").unwrap();
        bridge.save(SetupStep::JobProfiles);
        bridge.clear();
        assert_eq!(bridge.load(), SetupStep::Participation);
        assert_eq!(bridge.token().as_deref(), Some("tok"));
    }
}
