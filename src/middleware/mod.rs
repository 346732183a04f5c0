pub mod auth;
pub mod guard;

pub use auth::{
    clear_session_cookie, resolve_session, session_auth_middleware, session_cookie, AuthUser,
    SESSION_COOKIE,
};
pub use guard::{guard_decision, route_guard_middleware, GuardAction};
