//! Data Model: ExecutionResult, Recommendation, MemoryRecord
use serde::{Deserialize, Serialize};

/// Outcome of a dispatched operation. Either `output` is meaningful
/// (`success`) or `error` is set, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    success: bool,
    output: String,
    error: Option<String>,
}

impl ExecutionResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// A single Advisor recommendation, reduced to the fields that get
/// flattened into the semantic index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub affected_resource: String,
    pub resource_type: String,
    pub problem: String,
    pub solution: String,
    pub impact: String,
    pub category: String,
    pub last_updated: String,
    pub message: String,
}

impl Recommendation {
    /// One line, fixed field order, `, ` separated.
    pub fn to_line(&self) -> String {
        format!(
            "Affected Resource: {}, Resource Type: {}, Problem: {}, Solution: {}, Impact: {}, Category: {}, Last Updated: {}, Recommendation Message: {}",
            self.affected_resource,
            self.resource_type,
            self.problem,
            self.solution,
            self.impact,
            self.category,
            self.last_updated,
            self.message,
        )
    }
}

/// A chunk of flattened text stored in a memory collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub collection: String,
    pub id: String,
    pub text: String,
}

impl MemoryRecord {
    /// Record id for chunk `index` of `total` in `collection`.
    pub fn chunk_id(collection: &str, index: usize, total: usize) -> String {
        if total <= 1 {
            collection.to_string()
        } else {
            format!("{}_{}", collection, index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_never_partial() {
        let ok = ExecutionResult::succeeded("done");
        assert!(ok.is_success());
        assert_eq!(ok.output(), "done");
        assert!(ok.error().is_none());

        let failed = ExecutionResult::failed("boom");
        assert!(!failed.is_success());
        assert_eq!(failed.output(), "");
        assert_eq!(failed.error(), Some("boom"));
    }

    #[test]
    fn test_recommendation_line_field_order() {
        let rec = Recommendation {
            affected_resource: "vm-1".into(),
            resource_type: "Microsoft.Compute/virtualMachines".into(),
            problem: "Underutilized".into(),
            solution: "Resize".into(),
            impact: "High".into(),
            category: "Cost".into(),
            last_updated: "2023-06-01T00:00:00Z".into(),
            message: "Save money".into(),
        };

        assert_eq!(
            rec.to_line(),
            "Affected Resource: vm-1, Resource Type: Microsoft.Compute/virtualMachines, Problem: Underutilized, Solution: Resize, Impact: High, Category: Cost, Last Updated: 2023-06-01T00:00:00Z, Recommendation Message: Save money"
        );
    }

    #[test]
    fn test_chunk_ids() {
        assert_eq!(MemoryRecord::chunk_id("sub-1", 0, 1), "sub-1");
        assert_eq!(MemoryRecord::chunk_id("sub-1", 0, 3), "sub-1_0");
        assert_eq!(MemoryRecord::chunk_id("sub-1", 2, 3), "sub-1_2");
    }
}
