use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenKind};
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and validates the access JWT, yielding the user id.
pub struct AuthUser(pub Uuid);

/// Like `AuthUser`, but yields `None` when no Authorization header is sent.
/// Used by read endpoints that only annotate per-user state.
pub struct MaybeAuthUser(pub Option<Uuid>);

fn user_from_parts(parts: &Parts, keys: &JwtKeys) -> Result<Uuid, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let claims = keys.verify(token).map_err(|_| ApiError::Unauthenticated)?;
    if claims.kind != TokenKind::Access {
        return Err(ApiError::Unauthenticated);
    }
    Ok(claims.sub)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        user_from_parts(parts, &keys).map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .is_none()
        {
            return Ok(MaybeAuthUser(None));
        }
        let keys = JwtKeys::from_ref(state);
        user_from_parts(parts, &keys).map(|id| MaybeAuthUser(Some(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let err = user_from_parts(&parts_with_header(None), &keys()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn non_bearer_scheme_is_unauthenticated() {
        let err =
            user_from_parts(&parts_with_header(Some("Basic dXNlcg==")), &keys()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn valid_access_token_yields_user_id() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).unwrap();
        let parts = parts_with_header(Some(&format!("Bearer {token}")));
        assert_eq!(user_from_parts(&parts, &keys).unwrap(), user_id);
    }

    #[test]
    fn refresh_token_is_rejected_on_access_endpoints() {
        let keys = keys();
        let token = keys.sign_refresh(Uuid::new_v4()).unwrap();
        let parts = parts_with_header(Some(&format!("Bearer {token}")));
        let err = user_from_parts(&parts, &keys).unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }
}
