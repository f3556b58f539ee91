//! Matches export input schema
//!
//! This module defines the shape of a dating-app matches export (a JSON array
//! of interaction records) and the adapter that reads and validates it.

mod interaction;
mod adapter;

pub use interaction::*;
pub use adapter::*;
