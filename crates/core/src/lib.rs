//! WishListED Core - Shared domain types and rules.
//!
//! This crate is used by:
//! - `server` - The HTTP API (auth, profiles, wishlists, pledges, admin queue)
//! - `cli` - Migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The `postgres` feature adds `sqlx` encodings for the
//! enums and IDs so the server can bind them directly.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, roles, item priorities
//! - [`pledge`] - Pledge status state machine and input validation
//! - [`quantity`] - Remaining-quantity arithmetic and the over-commit policy
//! - [`share_token`] - Unguessable public wishlist tokens
//! - [`validation`] - Field and password checks
//! - [`browse`] - Browse-page filtering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod browse;
pub mod pledge;
pub mod quantity;
pub mod share_token;
pub mod types;
pub mod validation;

pub use browse::{BrowseFilter, Listing};
pub use pledge::{
    NewPledge, PaymentMethod, PledgeAction, PledgeInputError, PledgeStatus, TransitionError,
};
pub use quantity::QuantityError;
pub use share_token::{InvalidShareToken, ShareToken};
pub use types::*;
pub use validation::ValidationError;
