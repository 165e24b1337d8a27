//! Handler registry: a static dispatch table from target status to the one
//! handler responsible for driving records into it.

use std::collections::HashMap;
use std::sync::Arc;

use octoflow_core::IntegrationStatus;
use tracing::debug;

use crate::handler::StatusChangeHandler;

/// Registry mapping each target status to its handler.
///
/// Built once at startup by inverting the trigger sets of a handler list.
/// When two handlers claim the same status the later registration wins;
/// duplicate claims are logged, not rejected.
pub struct HandlerRegistry {
    handlers: HashMap<IntegrationStatus, Arc<dyn StatusChangeHandler>>,
}

impl HandlerRegistry {
    /// Build the registry from a list of handler instances.
    pub fn new(handlers: Vec<Arc<dyn StatusChangeHandler>>) -> Self {
        let mut map: HashMap<IntegrationStatus, Arc<dyn StatusChangeHandler>> = HashMap::new();
        for handler in handlers {
            for status in handler.trigger_statuses() {
                if let Some(previous) = map.insert(*status, handler.clone()) {
                    debug!(
                        status = %status,
                        replaced = previous.name(),
                        by = handler.name(),
                        "Replaced handler registration"
                    );
                }
            }
        }
        Self { handlers: map }
    }

    /// An empty registry; every check becomes a no-op.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Look up the handler for a target status.
    pub fn get(&self, status: IntegrationStatus) -> Option<Arc<dyn StatusChangeHandler>> {
        self.handlers.get(&status).cloned()
    }

    /// Number of statuses with a registered handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered at all.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("statuses", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, StatusUpdate};
    use async_trait::async_trait;
    use octoflow_core::Integration;

    struct NamedHandler {
        name: &'static str,
        triggers: Vec<IntegrationStatus>,
    }

    #[async_trait]
    impl StatusChangeHandler for NamedHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn trigger_statuses(&self) -> &[IntegrationStatus] {
            &self.triggers
        }

        async fn execute(
            &self,
            _integration: &Integration,
        ) -> Result<Option<StatusUpdate>, HandlerError> {
            Ok(None)
        }
    }

    #[test]
    fn test_registry_inverts_trigger_sets() {
        let registry = HandlerRegistry::new(vec![
            Arc::new(NamedHandler {
                name: "activate",
                triggers: vec![IntegrationStatus::Activated],
            }),
            Arc::new(NamedHandler {
                name: "teardown",
                triggers: vec![IntegrationStatus::Deactivated, IntegrationStatus::Deleted],
            }),
        ]);

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get(IntegrationStatus::Activated).unwrap().name(),
            "activate"
        );
        assert_eq!(
            registry.get(IntegrationStatus::Deleted).unwrap().name(),
            "teardown"
        );
        assert!(registry.get(IntegrationStatus::Draft).is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = HandlerRegistry::new(vec![
            Arc::new(NamedHandler {
                name: "first",
                triggers: vec![IntegrationStatus::Activated],
            }),
            Arc::new(NamedHandler {
                name: "second",
                triggers: vec![IntegrationStatus::Activated],
            }),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(IntegrationStatus::Activated).unwrap().name(),
            "second"
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get(IntegrationStatus::Activated).is_none());
    }
}
