//! Login session persistence and login-state detection.

mod detect;
mod store;

pub use detect::{detect_login_state, detect_username, is_login_url, LoginState};
pub use store::{SessionMeta, SessionStore};
