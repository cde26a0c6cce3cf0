// catalog_admin/src/workflow/mod.rs

//! A small ordered-step workflow engine.
//!
//! Each multi-step backend interaction (e.g. upload an image, resolve its URL,
//! then write the record) is declared as a `Workflow<TData, Err>`: a list of
//! named steps, each with async handlers that share one `ContextData<TData>`.
//! Steps run strictly one after the other; a step starts only once the previous
//! step's handlers have resolved.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{StepControl, WorkflowOutcome};
pub use definition::{Handler, Workflow};
pub use step::{SkipCondition, StepDef};
