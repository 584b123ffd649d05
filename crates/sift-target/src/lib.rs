//! # sift-target
//!
//! Build target generation for the Sift bundler front-end.
//!
//! This crate turns target profiles (modern/legacy) plus an entry set into
//! ordered pipeline descriptors for the bundling engine, and provides a
//! runner that executes the enabled profiles with the selective import
//! resolution engine wired into their text-transform stage.

pub mod error;
pub mod pipeline;
pub mod profile;
pub mod runner;

pub use error::{Result, TargetError};
pub use pipeline::{OutputOptions, PipelineDescriptor, Stage, TargetGenerator};
pub use profile::{ModuleFormat, TargetProfile};
pub use runner::{
    BuildRunner, IdentityMinify, IdentityTranspile, MinifyStage, ProfileOutcome, TranspileStage,
};
