//! Operation definition files
use std::path::Path;

use advisor_llm::CompletionSettings;
use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// One `*.yaml` file of the prompts directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Run relevance retrieval before rendering and expose the results as
    /// `memories`.
    #[serde(default)]
    pub recall: bool,
    pub template: String,
    #[serde(default)]
    pub completion: CompletionSettings,
}

impl OperationDefinition {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            RegistryError::Parse { message, .. } => RegistryError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        let def: OperationDefinition =
            serde_yaml::from_str(yaml).map_err(|e| RegistryError::Parse {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        if def.name.trim().is_empty() {
            return Err(RegistryError::Invalid("operation name is empty".to_string()));
        }
        if def.name.contains(|c: char| c.is_whitespace() || c == '/' || c == '.') {
            return Err(RegistryError::Invalid(format!(
                "operation name '{}' may not contain whitespace, '/' or '.'",
                def.name
            )));
        }
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_definition() {
        let def = OperationDefinition::from_yaml("name: Echo\ntemplate: \"{{input}}\"\n").unwrap();
        assert_eq!(def.name, "Echo");
        assert!(!def.recall);
        assert_eq!(def.completion, CompletionSettings::default());
    }

    #[test]
    fn test_full_definition() {
        let yaml = r#"
name: MemoryQuery
description: Answers a question using recalled recommendations.
recall: true
template: |
  {{#each memories}}{{this}}
  {{/each}}
  Question: {{input}}
completion:
  max_tokens: 512
  temperature: 0.2
"#;
        let def = OperationDefinition::from_yaml(yaml).unwrap();
        assert!(def.recall);
        assert_eq!(def.completion.max_tokens, 512);
        assert_eq!(def.completion.top_p, 1.0);
        assert!(def.template.contains("Question: {{input}}"));
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert!(matches!(
            OperationDefinition::from_yaml("template: x\n"),
            Err(RegistryError::Parse { .. })
        ));
        assert!(matches!(
            OperationDefinition::from_yaml("name: Echo\ntemplate: x\nprompt: y\n"),
            Err(RegistryError::Parse { .. })
        ));
        assert!(matches!(
            OperationDefinition::from_yaml("name: Memory Query\ntemplate: x\n"),
            Err(RegistryError::Invalid(_))
        ));
    }
}
