//! Core upload logic for Parley.
//!
//! This crate contains the image upload pipeline with no web framework
//! dependencies. The HTTP surface lives in `parley-api`.
//!
//! # Modules
//!
//! - `upload` - Intake rules, lazy store configuration, asset upload client

pub mod upload;
