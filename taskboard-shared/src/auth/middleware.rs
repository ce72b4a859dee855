/// Bearer-token authentication support
///
/// The router wraps protected routes in a middleware layer that calls
/// [`authenticate`] with the request headers and the configured secret.
/// On success an [`AuthContext`] is inserted into the request extensions
/// for handlers to extract.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use chrono::Duration;
/// use taskboard_shared::auth::jwt::{create_token, Claims};
/// use taskboard_shared::auth::middleware::authenticate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(7, "alice".to_string(), Duration::hours(1));
/// let token = create_token(&claims, secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {token}"))?,
/// );
///
/// let ctx = authenticate(&headers, secret).unwrap();
/// assert_eq!(ctx.user_id, 7);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use super::jwt::{validate_token, JwtError};

/// Authenticated identity attached to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor after the JWT
/// middleware has run.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username embedded in the token
    pub username: String,
}

/// Error type for authentication failures at the boundary
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a Bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Authenticates a request from its headers
///
/// Extracts the `Authorization: Bearer <token>` header, validates the
/// token, and returns the identity it carries. Invalid and absent
/// credentials are rejected before any task operation runs.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext {
        user_id: claims.sub,
        username: claims.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let claims = Claims::new(3, "carol".to_string(), Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let ctx = authenticate(&headers_with(&format!("Bearer {token}")), SECRET).unwrap();
        assert_eq!(ctx.user_id, 3);
        assert_eq!(ctx.username, "carol");
    }

    #[test]
    fn test_authenticate_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            authenticate(&headers, SECRET),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_authenticate_not_bearer() {
        assert!(matches!(
            authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_authenticate_wrong_secret() {
        let claims = Claims::new(3, "carol".to_string(), Duration::hours(1));
        let token = create_token(&claims, "another-secret").unwrap();

        assert!(matches!(
            authenticate(&headers_with(&format!("Bearer {token}")), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let claims = Claims::new(3, "carol".to_string(), Duration::hours(-1));
        let token = create_token(&claims, SECRET).unwrap();

        match authenticate(&headers_with(&format!("Bearer {token}")), SECRET) {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("Expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
