//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and the `/api/auth/user` profile
//! - `pledges` - Pledge lifecycle, donor totals and banking reveal
//! - `verification` - Admin approve/reject queue for teachers
//!
//! Plain CRUD on profiles, wishlists and items goes straight from the route
//! handlers to the repositories.

pub mod auth;
pub mod pledges;
pub mod verification;

pub use auth::{AuthError, AuthService, UserProfile};
pub use pledges::{PledgeError, PledgeService};
pub use verification::{VerificationError, VerificationService};
