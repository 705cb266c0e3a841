//! Session handling for the CLP client: token expiry inspection, the
//! persisted session record, and the role/route guard evaluated before
//! every protected operation.

pub mod guard;
pub mod store;
pub mod token;

pub use guard::{RouteDecision, SessionGuard, SessionState};
pub use store::{AuthSession, SessionStore, StoreError};
