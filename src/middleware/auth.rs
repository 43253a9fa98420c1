use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tonic::service::Interceptor;
use tonic::{Request, Status};
use uuid::Uuid;

/// JWT claims. `sub` is the owner id every ledger call is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated user info injected by the interceptor into request extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Validates the bearer token of every call on the services it wraps.
///
/// Health and reflection are registered without it and stay public.
#[derive(Clone)]
pub struct AuthInterceptor {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthInterceptor {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    fn authenticate<T>(&self, request: &Request<T>) -> Result<AuthenticatedUser, Status> {
        let token = request
            .metadata()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| Status::unauthenticated("Authentication required"))?;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                Status::unauthenticated("Invalid or expired token")
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Status::unauthenticated("Token subject is not a user id"))?;
        Ok(AuthenticatedUser { user_id })
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let user = self.authenticate(&request)?;
        request.extensions_mut().insert(user);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use tonic::Code;

    fn issue_token(jwt_secret: &str, user_id: Uuid, ttl: chrono::Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_bytes()),
        )
    }

    const SECRET: &str = "test-secret";

    fn request_with(token: Option<&str>) -> Request<()> {
        let mut request = Request::new(());
        if let Some(token) = token {
            request
                .metadata_mut()
                .insert("authorization", format!("Bearer {}", token).parse().unwrap());
        }
        request
    }

    #[test]
    fn test_valid_token_injects_user() {
        let user_id = Uuid::new_v4();
        let token = issue_token(SECRET, user_id, chrono::Duration::hours(1)).unwrap();
        let mut interceptor = AuthInterceptor::new(SECRET);

        let request = interceptor.call(request_with(Some(&token))).unwrap();
        assert_eq!(
            request.extensions().get::<AuthenticatedUser>(),
            Some(&AuthenticatedUser { user_id })
        );
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let mut interceptor = AuthInterceptor::new(SECRET);
        let err = interceptor.call(request_with(None)).unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("other-secret", Uuid::new_v4(), chrono::Duration::hours(1)).unwrap();
        let mut interceptor = AuthInterceptor::new(SECRET);
        let err = interceptor.call(request_with(Some(&token))).unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), chrono::Duration::hours(-2)).unwrap();
        let mut interceptor = AuthInterceptor::new(SECRET);
        assert!(interceptor.call(request_with(Some(&token))).is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "admin".into(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let mut interceptor = AuthInterceptor::new(SECRET);
        assert!(interceptor.call(request_with(Some(&token))).is_err());
    }
}
