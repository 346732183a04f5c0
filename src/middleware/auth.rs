use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::access::Role;
use crate::auth::{self, Claims};
use crate::config;
use crate::error::ApiError;

/// Session cookie name. The cookie carries the signed session token; a
/// Bearer `Authorization` header is accepted as an equivalent carrier for
/// non-browser clients.
pub const SESSION_COOKIE: &str = "session";

/// Authenticated caller context extracted from a verified session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// A token whose role id is not in the fixed enumeration is invalid.
    fn from_claims(claims: Claims) -> Option<Self> {
        let role = claims.role()?;
        Some(Self {
            user_id: claims.sub,
            username: claims.username,
            email: claims.email,
            role,
        })
    }
}

/// Session middleware: verifies the token and injects `AuthUser` into the
/// request. A missing, expired, or tampered token is one and the same 401.
pub async fn session_auth_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = resolve_session(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Resolve the caller from request headers, or None when no valid session
/// token is present by either carrier.
pub fn resolve_session(headers: &HeaderMap) -> Option<AuthUser> {
    let token = token_from_headers(headers)?;
    let claims = auth::verify_token(&token)?;
    AuthUser::from_claims(claims)
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE) {
        return Some(token);
    }
    bearer_token(headers)
}

/// Extract a named value from the Cookie header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    for pair in cookies.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        if key == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Extract a Bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Build the Set-Cookie value for a fresh session.
/// http-only, SameSite=Lax, 7-day max-age, Secure in production.
pub fn session_cookie(token: &str) -> String {
    let max_age = config::config().security.session_ttl_days * 24 * 60 * 60;
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token, max_age
    );
    if config::config().security.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session on logout.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_session_cookie_among_others() {
        let headers = headers_with("cookie", "theme=dark; session=tok123; lang=en");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("tok123"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let headers = headers_with("cookie", "theme=dark; session=");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
        assert_eq!(cookie_value(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn bearer_header_is_a_fallback_carrier() {
        let headers = headers_with("authorization", "Bearer tok456");
        assert_eq!(token_from_headers(&headers).as_deref(), Some("tok456"));

        let headers = headers_with("authorization", "Basic dXNlcjpwdw==");
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok789");
        assert!(cookie.starts_with("session=tok789; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains(&format!("Max-Age={}", 7 * 24 * 60 * 60)));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
