/// Access gate: authentication extractors and role checks
use crate::{
    account::{Role, TokenClaims, ValidatedSession},
    context::AppContext,
    db::account::Account,
    error::{PortalError, PortalResult},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

/// Authenticated caller, extracted per request from the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account: Account,
    pub session_id: String,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.account.role
    }

    /// Permit the caller only if their role is exactly `required`
    pub fn require(&self, required: Role) -> PortalResult<()> {
        check_access(self.role(), required)
    }
}

impl From<ValidatedSession> for AuthContext {
    fn from(session: ValidatedSession) -> Self {
        Self {
            account: session.account,
            session_id: session.session_id,
        }
    }
}

/// Role decision for one operation. No hierarchy: an admin is not a clerk.
pub fn check_access(caller: Role, required: Role) -> PortalResult<()> {
    if caller == required {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| PortalError::Authentication("Missing authorization header".to_string()))?;

        let session = state
            .account_manager
            .validate_access_token(bearer.token())
            .await?;

        Ok(session.into())
    }
}

/// Declare an extractor that admits only callers holding one role
macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthContext);

        #[async_trait]
        impl FromRequestParts<AppContext> for $name {
            type Rejection = PortalError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppContext,
            ) -> Result<Self, Self::Rejection> {
                let auth = AuthContext::from_request_parts(parts, state).await?;

                if let Err(e) = auth.require($role) {
                    tracing::debug!(
                        account_id = %auth.account.id,
                        role = %auth.role(),
                        required = %$role,
                        "access denied"
                    );
                    return Err(e);
                }

                Ok($name(auth))
            }
        }
    };
}

role_extractor!(
    /// Caller must be an admin
    AdminAuth,
    Role::Admin
);
role_extractor!(
    /// Caller must be a clerk
    ClerkAuth,
    Role::Clerk
);
role_extractor!(
    /// Caller must be a student
    StudentAuth,
    Role::Student
);

/// Verify a bearer token's signature and expiry
pub fn verify_jwt_token(
    token: &str,
    jwt_secret: &str,
) -> PortalResult<jsonwebtoken::TokenData<TokenClaims>> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (1 minute)
    validation.leeway = 60;

    decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                PortalError::Authentication("Token has expired".to_string())
            }
            _ => PortalError::Authentication("Invalid token".to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-for-testing-only-0123";

    fn token(exp_offset: i64, secret: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "acct-1".to_string(),
            sid: "sess-1".to_string(),
            role: Role::Clerk,
            iat: now,
            exp: now + exp_offset,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_exact_role_match_only() {
        assert!(check_access(Role::Admin, Role::Admin).is_ok());
        assert!(check_access(Role::Student, Role::Student).is_ok());
        assert!(matches!(
            check_access(Role::Admin, Role::Clerk),
            Err(PortalError::Forbidden)
        ));
        assert!(matches!(
            check_access(Role::Clerk, Role::Admin),
            Err(PortalError::Forbidden)
        ));
        assert!(matches!(
            check_access(Role::Student, Role::Admin),
            Err(PortalError::Forbidden)
        ));
    }

    #[test]
    fn test_verify_jwt_token() {
        let data = verify_jwt_token(&token(3600, SECRET), SECRET).unwrap();
        assert_eq!(data.claims.sub, "acct-1");
        assert_eq!(data.claims.sid, "sess-1");
        assert_eq!(data.claims.role, Role::Clerk);
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_expired() {
        let other = "another-secret-key-for-testing-only-99";
        assert!(matches!(
            verify_jwt_token(&token(3600, other), SECRET),
            Err(PortalError::Authentication(_))
        ));

        match verify_jwt_token(&token(-3600, SECRET), SECRET) {
            Err(PortalError::Authentication(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected expiry error, got {:?}", other.map(|d| d.claims)),
        }
    }
}
