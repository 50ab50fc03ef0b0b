//! Execution Context: named string variables handed to an operation
use indexmap::IndexMap;

use crate::INPUT_PARAM;

/// Variables for a single dispatch. Built fresh per request and only
/// read by the operation once dispatched.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub trace_id: String,
    input: String,
    variables: IndexMap<String, String>,
}

impl ExecutionContext {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            input: input.into(),
            variables: IndexMap::new(),
        }
    }

    /// Builder-style variable insertion; later values replace earlier ones
    /// but keep their original position.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// The free-text input of the request.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Looks up a named variable. `input` falls back to the free-text input
    /// when it was not set explicitly.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.variables.get(name) {
            Some(value) => Some(value.as_str()),
            None if name == INPUT_PARAM => Some(self.input.as_str()),
            None => None,
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All variables plus `input` as a JSON object, for template rendering.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(INPUT_PARAM.to_string(), self.input.clone().into());
        for (name, value) in &self.variables {
            map.insert(name.clone(), value.clone().into());
        }
        serde_json::Value::Object(map)
    }
}
