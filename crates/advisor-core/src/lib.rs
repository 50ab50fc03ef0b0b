//! Advisor Core: Operation registry, dispatcher and data model
//!
//! Shared contract between the HTTP transport, the cache builder and the
//! operations loaded at start-up.
//!
//! # Dispatch Flow
//!
//! ```text
//! (namespace, name) → OperationRegistry → Operation::invoke(ctx) → ExecutionResult
//!                          ↓ miss                 ↓ Failed / Collaborator
//!                       NotFound          success:false / AdvisorError
//! ```

pub mod context;
pub mod data_model;
pub mod dispatcher;
pub mod error;
pub mod operation;
pub mod registry;

pub use context::ExecutionContext;
pub use data_model::{ExecutionResult, MemoryRecord, Recommendation};
pub use dispatcher::Dispatcher;
pub use error::AdvisorError;
pub use operation::{Operation, OperationError};
pub use registry::OperationRegistry;

/// Context variable holding the memory collection to search.
pub const COLLECTION_PARAM: &str = "collection";
/// Context variable holding the minimum relevance score.
pub const RELEVANCE_PARAM: &str = "relevance";
/// Context variable holding the maximum number of recalled memories.
pub const LIMIT_PARAM: &str = "limit";
/// Context variable holding the record id for `save`.
pub const KEY_PARAM: &str = "key";
/// Name of the distinguished input variable.
pub const INPUT_PARAM: &str = "input";

/// Plugin engine version
pub const ADVISOR_VERSION: &str = "1.0.0";
