//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited)
//! POST   /api/auth/register                 - Create account (teacher or donor)
//! POST   /api/auth/login                    - Sign in
//! POST   /api/auth/logout                   - Sign out
//! GET    /api/auth/user                     - Current user, role and profile ids
//!
//! # Profiles
//! GET    /api/teacher/profile               - Own teacher profile
//! PUT    /api/teacher/profile               - Create or update teacher profile
//! GET    /api/donor/profile                 - Own donor profile
//! PUT    /api/donor/profile                 - Create or update donor profile
//!
//! # Wishlists
//! GET    /api/wishlists                     - Public browse (?q=&location=&grade=&verified=)
//! GET    /api/wishlists/recent              - Landing page feed (cached)
//! GET    /api/wishlists/mine                - Teacher's own wishlists with items
//! POST   /api/wishlists                     - Create wishlist
//! PUT    /api/wishlists/{id}                - Update wishlist
//! DELETE /api/wishlists/{id}                - Delete wishlist
//! POST   /api/wishlists/{id}/items          - Add item
//! PUT    /api/wishlists/{id}/items/reorder  - Reorder items
//! PUT    /api/items/{id}                    - Update item
//! DELETE /api/items/{id}                    - Delete item
//! GET    /wishlist/{share_token}            - Public share view
//!
//! # Pledges
//! POST   /api/pledges                       - Pledge against an item
//! GET    /api/pledges                       - Own (donor) or incoming (teacher) pledges
//! GET    /api/pledges/{id}/banking          - Teacher banking details for an open pledge
//! POST   /api/pledges/{id}/confirm          - Transfer made
//! POST   /api/pledges/{id}/complete         - Mark as donated
//! POST   /api/pledges/{id}/cancel           - Withdraw
//!
//! # Admin
//! GET    /api/admin/teachers                - Verification queue
//! POST   /api/admin/teachers/{id}/approve   - Approve teacher
//! POST   /api/admin/teachers/{id}/reject    - Reject teacher
//!
//! # Realtime
//! GET    /ws                                - WebSocket event stream
//! ```

pub mod admin;
pub mod auth;
pub mod items;
pub mod pledges;
pub mod profiles;
pub mod realtime;
pub mod share;
pub mod wishlists;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/teacher/profile",
            get(profiles::get_teacher_profile).put(profiles::put_teacher_profile),
        )
        .route(
            "/api/donor/profile",
            get(profiles::get_donor_profile).put(profiles::put_donor_profile),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlists::browse).post(wishlists::create))
        .route("/recent", get(wishlists::recent))
        .route("/mine", get(wishlists::mine))
        .route("/{id}", put(wishlists::update).delete(wishlists::delete))
        .route("/{id}/items", post(items::create))
        .route("/{id}/items/reorder", put(items::reorder))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new().route("/{id}", put(items::update).delete(items::delete))
}

/// Create the pledge routes router.
pub fn pledge_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pledges::list).post(pledges::create))
        .route("/{id}/banking", get(pledges::banking))
        .route("/{id}/confirm", post(pledges::confirm))
        .route("/{id}/complete", post(pledges::complete))
        .route("/{id}/cancel", post(pledges::cancel))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/teachers", get(admin::queue))
        .route("/teachers/{id}/approve", post(admin::approve))
        .route("/teachers/{id}/reject", post(admin::reject))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .merge(profile_routes())
        .nest("/api/wishlists", wishlist_routes())
        .nest("/api/items", item_routes())
        .nest("/api/pledges", pledge_routes())
        .nest("/api/admin", admin_routes())
        .route("/wishlist/{share_token}", get(share::show))
        .route("/ws", get(realtime::ws_handler))
}
