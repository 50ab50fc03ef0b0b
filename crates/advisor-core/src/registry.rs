//! Operation Registry: static (namespace, name) → operation table
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AdvisorError;
use crate::operation::Operation;

/// Built once at start-up, then shared read-only behind an `Arc`.
#[derive(Default, Clone)]
pub struct OperationRegistry {
    entries: HashMap<(String, String), Arc<dyn Operation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `op` under `namespace`. A second operation with the same
    /// name in the same namespace is rejected.
    pub fn register(
        &mut self,
        namespace: &str,
        op: Arc<dyn Operation>,
    ) -> Result<(), AdvisorError> {
        let key = (namespace.to_string(), op.name().to_string());
        if self.entries.contains_key(&key) {
            return Err(AdvisorError::Config(format!(
                "operation {}.{} registered twice",
                key.0, key.1
            )));
        }
        self.entries.insert(key, op);
        Ok(())
    }

    /// Case-sensitive exact lookup.
    pub fn get(&self, namespace: &str, name: &str) -> Option<Arc<dyn Operation>> {
        self.entries
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Operation names in `namespace`, sorted.
    pub fn list(&self, namespace: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.entries.keys().map(|(ns, _)| ns.clone()).collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::operation::OperationError;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Operation for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn invoke(&self, _ctx: &ExecutionContext) -> Result<String, OperationError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = OperationRegistry::new();
        registry.register("AzureAdvisor", Arc::new(Named("MemoryQuery"))).unwrap();
        let err = registry
            .register("AzureAdvisor", Arc::new(Named("MemoryQuery")))
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Config(_)));

        // Same name in a different namespace is fine
        registry.register("memory", Arc::new(Named("MemoryQuery"))).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut registry = OperationRegistry::new();
        registry.register("AzureAdvisor", Arc::new(Named("MemoryQuery"))).unwrap();

        assert!(registry.get("AzureAdvisor", "MemoryQuery").is_some());
        assert!(registry.get("AzureAdvisor", "memoryquery").is_none());
        assert!(registry.get("azureadvisor", "MemoryQuery").is_none());
    }

    #[test]
    fn test_list_by_namespace() {
        let mut registry = OperationRegistry::new();
        registry.register("memory", Arc::new(Named("save"))).unwrap();
        registry.register("memory", Arc::new(Named("recall"))).unwrap();
        registry.register("AzureAdvisor", Arc::new(Named("MemoryQuery"))).unwrap();

        assert_eq!(registry.list("memory"), vec!["recall", "save"]);
        assert_eq!(registry.namespaces(), vec!["AzureAdvisor", "memory"]);
    }
}
