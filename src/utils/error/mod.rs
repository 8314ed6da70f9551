//! Error handling for the engine
//!
//! Every failure the engine reports is an [`RbacError`]. Hosts branch on
//! [`RbacError::kind`] (or its stable string/numeric identifiers) rather than
//! on the free-text detail.

mod conversions;
mod helpers;
mod kind;
mod types;

pub use kind::ErrorKind;
pub use types::{RbacError, Result};
