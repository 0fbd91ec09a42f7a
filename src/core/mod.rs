//! Core types for the matrix engine
//!
//! This module provides the fundamental types used throughout the crate:
//! - `RequestType` - Kind of an observed request (with the `*` wildcard)
//! - `Scope` - Global or per-page rule context
//! - `EffectiveState` - Resolved disposition, specificity and layer
//! - `MatrixError` - Error types

pub mod error;
pub mod request_type;
pub mod scope;
pub mod state;

pub use error::{MatrixError, MatrixResult};
pub use request_type::RequestType;
pub use scope::Scope;
pub use state::{Disposition, EffectiveState, Layer, Specificity};
