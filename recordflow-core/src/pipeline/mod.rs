//! Pipeline execution model
//!
//! A pipeline is an ordered list of stages. Each stage declares an input and
//! an output type; [`Pipeline::then`] only accepts a stage whose input type is
//! the previous stage's output type, so the chain is checked at compile time.
//! The runner executes stages strictly in order and stops at the first
//! failure.

mod runner;
mod stage;

pub use runner::{NoopObserver, Pipeline, PipelineError, RunObserver};
pub use stage::{BoxError, Stage, StageFailure};
