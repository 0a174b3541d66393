//! Request identity extractors.
//!
//! Authentication itself lives in an upstream session provider (an external
//! collaborator); by the time a request reaches the gateway its identity has
//! been resolved into trusted `X-User-Id` and `X-User-Role` headers. The
//! extractors here only read those headers and enforce role requirements.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::GatewayError;

/// Role assigned by the session provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular customer.
    Customer,
    /// Restaurant staff with admin rights.
    Admin,
}

/// Authenticated request identity.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// User id resolved by the session provider.
    pub user_id: Uuid,
    /// Resolved role.
    pub role: Role,
}

impl AuthUser {
    /// Returns `true` for admin identities.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

fn identity_from_parts(parts: &Parts) -> Option<AuthUser> {
    let user_id = parts
        .headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uuid>().ok())?;
    let role = match parts.headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
        Some("admin") => Role::Admin,
        _ => Role::Customer,
    };
    Some(AuthUser { user_id, role })
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts).ok_or_else(|| {
            GatewayError::Unauthorized("missing or invalid identity headers".to_string())
        })
    }
}

/// Identity that must carry the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(GatewayError::Forbidden(
                "admin role required".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

/// Identity when present; anonymous requests pass through as `None`.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<AuthUser>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from_parts(parts)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request should build");
        };
        request.into_parts().0
    }

    #[test]
    fn valid_headers_resolve_identity() {
        let id = Uuid::new_v4();
        let parts = parts_with(&[("x-user-id", &id.to_string()), ("x-user-role", "admin")]);
        let Some(user) = identity_from_parts(&parts) else {
            panic!("identity should resolve");
        };
        assert_eq!(user.user_id, id);
        assert!(user.is_admin());
    }

    #[test]
    fn unknown_role_defaults_to_customer() {
        let id = Uuid::new_v4();
        let parts = parts_with(&[("x-user-id", &id.to_string()), ("x-user-role", "chef")]);
        let Some(user) = identity_from_parts(&parts) else {
            panic!("identity should resolve");
        };
        assert!(!user.is_admin());
    }

    #[test]
    fn missing_or_malformed_id_is_anonymous() {
        assert!(identity_from_parts(&parts_with(&[])).is_none());
        assert!(identity_from_parts(&parts_with(&[("x-user-id", "not-a-uuid")])).is_none());
    }
}
