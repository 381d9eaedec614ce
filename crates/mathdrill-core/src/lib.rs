//! mathdrill-core: task generation, answer evaluation, and session scoring.
//!
//! This crate defines the data model, the generation and scoring logic, and
//! the [`traits::ResultStore`] seam that the rest of mathdrill builds on.

pub mod clock;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod results;
pub mod session;
pub mod settings;
pub mod statistics;
pub mod traits;
pub mod validator;
