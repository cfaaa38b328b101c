//! Bearer token refresh.

pub mod claims;
pub mod refresher;

pub use claims::token_expired;
pub use refresher::{RefreshOutcome, TokenRefresher};
