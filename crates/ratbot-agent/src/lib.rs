//! Ratbot agent — classification, routing, handlers and the tool-call loop.
//!
//! # Architecture
//!
//! - [`graph::Pipeline`] — drives a message through the stage machine
//! - [`classifier`] — top-level and support classification
//! - [`router`] — pure stage transitions
//! - [`handlers`] — terminal handlers producing the final action
//! - [`tool_call::ToolCallExecutor`] — bounded model ↔ tool loop

pub mod classifier;
pub mod graph;
pub mod handlers;
pub mod model;
pub mod prompts;
pub mod router;
pub mod tool_call;

#[cfg(test)]
mod testing;

pub use graph::{Pipeline, PipelineSettings};
pub use model::ModelClient;
pub use router::Stage;
pub use tool_call::{LoopExit, ToolCallExecutor, ToolCallReport};
