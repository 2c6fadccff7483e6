//! Shared test utilities for the recipe-resolver workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`fixtures`]: the fixture recipes and profiles under `test-fixtures/`
//! - [`recipe`]: [`TestRecipe`] builder for on-disk recipe scenarios

pub mod fixtures;
pub mod recipe;

pub use recipe::TestRecipe;
