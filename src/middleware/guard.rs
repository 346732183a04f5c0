use axum::{
    extract::Request,
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::access::Role;
use crate::middleware::auth::resolve_session;

/// Outcome of the edge guard for a browser navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Proceed,
    Redirect(&'static str),
}

/// Route guard decision for page navigations. `/dashboard/*` requires a
/// superadmin session and `/author/*` an author session, otherwise the
/// browser is sent to `/login`; an already-authenticated user landing on
/// `/login` is sent to their role's home page instead.
pub fn guard_decision(path: &str, session_role: Option<Role>) -> GuardAction {
    if path == "/login" || path.starts_with("/login/") {
        return match session_role {
            Some(role) => GuardAction::Redirect(role.home_path()),
            None => GuardAction::Proceed,
        };
    }

    let required = if path == "/dashboard" || path.starts_with("/dashboard/") {
        Some(Role::Superadmin)
    } else if path == "/author" || path.starts_with("/author/") {
        Some(Role::Author)
    } else {
        None
    };

    match required {
        None => GuardAction::Proceed,
        Some(required) => match session_role {
            Some(role) if role == required => GuardAction::Proceed,
            _ => GuardAction::Redirect("/login"),
        },
    }
}

/// Edge middleware wrapping the pure decision. Only browser navigations
/// (GET requests that accept HTML) are intercepted; JSON API requests fall
/// through to the handlers, which answer with 401/404 instead of redirects.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::GET && accepts_html(request.headers()) {
        let session_role = resolve_session(request.headers()).map(|user| user.role);
        if let GuardAction::Redirect(to) = guard_decision(request.uri().path(), session_role) {
            return Redirect::to(to).into_response();
        }
    }
    next.run(request).await
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get("accept")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("text/html"))
        .unwrap_or(false)
}
