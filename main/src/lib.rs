//! # RustML Profile
//!
//! Mergeable statistical profiles of model outputs.
//!
//! This crate provides:
//! - Confusion-matrix aggregation for classification outputs
//! - Error statistics for regression outputs
//! - Model-type inference from the shape of a batch
//! - Pure, commutative merge of profiles built on different shards
//! - A compact wire message with byte-exact encode/decode
//!
//! ## Example
//!
//! ```rust,ignore
//! use rustml_profile::ModelProfile;
//!
//! let mut profile = ModelProfile::new();
//! profile.add_output_field("predictions");
//! profile.compute_metrics(&["cat", "dog"], &["cat", "cat"], Some(&[0.9, 0.4][..]))?;
//!
//! let bytes = profile.to_message().to_bytes()?;
//! let other = ModelProfile::from_bytes(&bytes)?;
//! let merged = profile.merge(&other)?;
//! ```

pub mod api;
mod core;
mod saf;

pub use saf::*;
