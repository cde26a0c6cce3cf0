// catalog_admin/src/workflow/control.rs

//! Flow signals returned by step handlers, and the outcome of a whole run.

/// Returned by a handler to continue or to halt the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  /// Halt now. Remaining handlers and steps are not executed.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
  /// Every non-skipped step ran.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
