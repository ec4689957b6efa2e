//! Core types for WishListED.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod priority;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use priority::ItemPriority;
pub use role::{Capability, UserRole};
