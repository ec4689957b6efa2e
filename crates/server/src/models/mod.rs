//! Domain models backed by database rows.
//!
//! Row types derive `sqlx::FromRow` and `Serialize` (camelCase) so handlers
//! can return them directly. Types that hold data only some callers may see
//! (teacher banking details) have separate public projections.

pub mod donor;
pub mod pledge;
pub mod session;
pub mod teacher;
pub mod user;
pub mod wishlist;

pub use donor::Donor;
pub use pledge::{BankingInfo, Pledge, PledgeListing};
pub use session::{CurrentUser, keys as session_keys};
pub use teacher::{PublicTeacher, Teacher, TeacherReview};
pub use user::User;
pub use wishlist::{RecentWishlist, Wishlist, WishlistItem, WishlistSummary};
