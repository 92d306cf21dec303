/// Account manager implementation using runtime queries
///
/// This is the credential issuer: it validates identity payloads, persists
/// accounts, opens sessions and mints the bearer tokens that carry them.
use crate::{
    account::{
        non_blank, IdentityUpdate, IssuedCredentials, NewAccount, Role, ValidatedSession,
    },
    auth::verify_jwt_token,
    config::{BootstrapAdmin, ServerConfig},
    db::{
        account::{Account, Session, ACCOUNT_COLUMNS},
        map_unique_violation,
    },
    error::{PortalError, PortalResult},
    validation::{validate_email, validate_mobile, validate_password_strength},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account identifier
    pub sub: String,
    /// Session identifier
    pub sid: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Create an account and open a session for it in one step
    pub async fn issue_credentials(&self, new_account: NewAccount) -> PortalResult<IssuedCredentials> {
        let account = self.create_account(new_account).await?;
        let (session, token) = self.create_session(&account).await?;

        tracing::info!(account_id = %account.id, role = %account.role, "issued credentials");

        Ok(IssuedCredentials {
            account,
            session_id: session.id,
            token,
        })
    }

    /// Create a new account
    pub async fn create_account(&self, new_account: NewAccount) -> PortalResult<Account> {
        let new_account = new_account.normalized();

        if new_account.email.is_empty() {
            return Err(PortalError::Validation("Email is required".to_string()));
        }
        validate_email(&new_account.email)?;

        if new_account.password.is_empty() {
            return Err(PortalError::Validation("Password is required".to_string()));
        }

        if let Some(ref mobile) = new_account.mobile_number {
            validate_mobile(mobile)?;
        }

        // Check uniqueness up front; the UNIQUE constraints catch a racing insert
        if self.email_exists(&new_account.email, None).await? {
            return Err(PortalError::Duplicate("Email already registered".to_string()));
        }

        if let Some(ref mobile) = new_account.mobile_number {
            if self.mobile_exists(mobile, None).await? {
                return Err(PortalError::Duplicate(
                    "Mobile number already registered".to_string(),
                ));
            }
        }

        let password_hash = hash_password(&new_account.password)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO account (id, email, password_hash, role, first_name, middle_name, surname,
                                  mobile_number, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&id)
        .bind(&new_account.email)
        .bind(&password_hash)
        .bind(new_account.role.as_str())
        .bind(&new_account.first_name)
        .bind(&new_account.middle_name)
        .bind(&new_account.surname)
        .bind(&new_account.mobile_number)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        Ok(Account {
            id,
            email: new_account.email,
            password_hash,
            role: new_account.role,
            first_name: new_account.first_name,
            middle_name: new_account.middle_name,
            surname: new_account.surname,
            mobile_number: new_account.mobile_number,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Authenticate account and create session
    pub async fn login(&self, email: &str, password: &str) -> PortalResult<IssuedCredentials> {
        let invalid = || PortalError::Authentication("Invalid email or password".to_string());

        let account = match self.get_account_by_email(email).await {
            Ok(account) => account,
            Err(PortalError::NotFound(_)) => return Err(invalid()),
            Err(e) => return Err(e),
        };

        if !account.is_active {
            return Err(invalid());
        }

        if !verify_password(password, &account.password_hash)? {
            return Err(invalid());
        }

        let (session, token) = self.create_session(&account).await?;

        Ok(IssuedCredentials {
            account,
            session_id: session.id,
            token,
        })
    }

    /// Create a session for an account and mint its bearer token
    pub async fn create_session(&self, account: &Account) -> PortalResult<(Session, String)> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.authentication.token_ttl_hours);

        sqlx::query(
            "INSERT INTO session (id, account_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session_id)
        .bind(&account.id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        let claims = TokenClaims {
            sub: account.id.clone(),
            sid: session_id.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )?;

        Ok((
            Session {
                id: session_id,
                account_id: account.id.clone(),
                created_at: now,
                expires_at,
            },
            token,
        ))
    }

    /// Validate access token and return session info
    pub async fn validate_access_token(&self, token: &str) -> PortalResult<ValidatedSession> {
        let token_data = verify_jwt_token(token, &self.config.authentication.jwt_secret)?;
        let claims = token_data.claims;

        let session = sqlx::query_as::<_, Session>(
            "SELECT id, account_id, created_at, expires_at FROM session WHERE id = ?1",
        )
        .bind(&claims.sid)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| PortalError::Authentication("Invalid or expired session".to_string()))?;

        if session.account_id != claims.sub {
            return Err(PortalError::Authentication("Invalid or expired session".to_string()));
        }

        if Utc::now() > session.expires_at {
            return Err(PortalError::Authentication("Session expired".to_string()));
        }

        let account = self.get_account(&session.account_id).await.map_err(|e| match e {
            PortalError::NotFound(_) => {
                PortalError::Authentication("Invalid or expired session".to_string())
            }
            other => other,
        })?;

        if !account.is_active {
            return Err(PortalError::Authentication("Account is deactivated".to_string()));
        }

        Ok(ValidatedSession {
            account,
            session_id: session.id,
        })
    }

    /// Delete a session (logout)
    pub async fn delete_session(&self, session_id: &str) -> PortalResult<()> {
        sqlx::query("DELETE FROM session WHERE id = ?1")
            .bind(session_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Delete every session belonging to an account
    pub async fn revoke_sessions(&self, account_id: &str) -> PortalResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove sessions past their expiry
    pub async fn cleanup_expired_sessions(&self) -> PortalResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at < ?1")
            .bind(Utc::now())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Get account by id
    pub async fn get_account(&self, id: &str) -> PortalResult<Account> {
        let row = sqlx::query(&format!("SELECT {} FROM account WHERE id = ?1", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| PortalError::NotFound("Account not found".to_string()))?;

        Account::from_row(&row)
    }

    /// Get account by email (case-insensitive)
    pub async fn get_account_by_email(&self, email: &str) -> PortalResult<Account> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account WHERE email = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| PortalError::NotFound("Account not found".to_string()))?;

        Account::from_row(&row)
    }

    /// List accounts, optionally restricted to one role, oldest first
    pub async fn list_accounts(
        &self,
        role: Option<Role>,
        include_inactive: bool,
    ) -> PortalResult<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM account
             WHERE (?1 IS NULL OR role = ?1) AND (?2 OR is_active = 1)
             ORDER BY created_at, email",
            ACCOUNT_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Account::from_row).collect()
    }

    /// Count active accounts with a role
    pub async fn count_active(&self, role: Role) -> PortalResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE role = ?1 AND is_active = 1")
                .bind(role.as_str())
                .fetch_one(&self.db)
                .await?;

        Ok(count)
    }

    /// Update name, email and mobile number. Uniqueness is re-checked against other accounts.
    pub async fn update_identity(&self, id: &str, update: IdentityUpdate) -> PortalResult<Account> {
        let mut account = self.get_account(id).await?;

        if let Some(email) = non_blank(update.email) {
            let email = email.to_lowercase();
            validate_email(&email)?;
            if email != account.email && self.email_exists(&email, Some(id)).await? {
                return Err(PortalError::Duplicate("Email already registered".to_string()));
            }
            account.email = email;
        }

        if let Some(mobile) = non_blank(update.mobile_number) {
            validate_mobile(&mobile)?;
            if self.mobile_exists(&mobile, Some(id)).await? {
                return Err(PortalError::Duplicate(
                    "Mobile number already registered".to_string(),
                ));
            }
            account.mobile_number = Some(mobile);
        }

        if let Some(first_name) = update.first_name {
            account.first_name = required_name(&first_name, "First name")?;
        }
        if let Some(middle_name) = update.middle_name {
            account.middle_name = non_blank(Some(middle_name));
        }
        if let Some(surname) = update.surname {
            account.surname = required_name(&surname, "Surname")?;
        }

        account.updated_at = Utc::now();

        sqlx::query(
            "UPDATE account
             SET email = ?1, first_name = ?2, middle_name = ?3, surname = ?4,
                 mobile_number = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.middle_name)
        .bind(&account.surname)
        .bind(&account.mobile_number)
        .bind(account.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        Ok(account)
    }

    /// Change password after verifying the current one
    pub async fn change_password(
        &self,
        id: &str,
        current_password: &str,
        new_password: &str,
    ) -> PortalResult<()> {
        let account = self.get_account(id).await?;

        if !verify_password(current_password, &account.password_hash)? {
            return Err(PortalError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password_strength(new_password)?;
        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE account SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Activate or soft-deactivate an account. Deactivation revokes all sessions.
    pub async fn set_active(&self, id: &str, active: bool) -> PortalResult<Account> {
        let result = sqlx::query("UPDATE account SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::NotFound("Account not found".to_string()));
        }

        if !active {
            let revoked = self.revoke_sessions(id).await?;
            tracing::info!(account_id = %id, revoked, "account deactivated");
        }

        self.get_account(id).await
    }

    /// Create the configured admin when no active admin exists. Returns whether one was
    /// created or reactivated.
    pub async fn ensure_bootstrap_admin(&self, admin: &BootstrapAdmin) -> PortalResult<bool> {
        if self.count_active(Role::Admin).await? > 0 {
            return Ok(false);
        }

        match self.get_account_by_email(&admin.email).await {
            Ok(existing) if existing.role == Role::Admin => {
                self.set_active(&existing.id, true).await?;
                tracing::info!(account_id = %existing.id, "reactivated bootstrap admin");
                return Ok(true);
            }
            Ok(existing) => {
                tracing::warn!(
                    account_id = %existing.id,
                    role = %existing.role.as_str(),
                    "bootstrap admin email belongs to a non-admin account, skipping"
                );
                return Ok(false);
            }
            Err(PortalError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let account = self
            .create_account(NewAccount {
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: Role::Admin,
                first_name: "Administrator".to_string(),
                middle_name: None,
                surname: String::new(),
                mobile_number: None,
            })
            .await?;

        tracing::info!(account_id = %account.id, email = %account.email, "created bootstrap admin");
        Ok(true)
    }

    /// Check if email exists, optionally ignoring one account
    async fn email_exists(&self, email: &str, except_id: Option<&str>) -> PortalResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE email = ?1 AND id IS NOT ?2")
                .bind(email)
                .bind(except_id)
                .fetch_one(&self.db)
                .await?;

        Ok(count > 0)
    }

    /// Check if mobile number exists, optionally ignoring one account
    async fn mobile_exists(&self, mobile: &str, except_id: Option<&str>) -> PortalResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM account WHERE mobile_number = ?1 AND id IS NOT ?2",
        )
        .bind(mobile)
        .bind(except_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.get::<i64, _>("n") > 0)
    }
}

fn required_name(value: &str, field: &str) -> PortalResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> PortalResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> PortalResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| PortalError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::db::memory_pool;

    async fn setup_test_db() -> AccountManager {
        let db = memory_pool().await.unwrap();
        AccountManager::new(db, test_config())
    }

    fn student(email: &str, mobile: Option<&str>) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "password123".to_string(),
            role: Role::Student,
            first_name: "Asha".to_string(),
            middle_name: None,
            surname: "Rao".to_string(),
            mobile_number: mobile.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_issue_credentials_token_resolves_to_account() {
        let manager = setup_test_db().await;

        let issued = manager
            .issue_credentials(student("Asha@College.edu", Some("9876543210")))
            .await
            .unwrap();

        assert_eq!(issued.account.email, "asha@college.edu");
        assert!(issued.account.is_active);
        assert_ne!(issued.account.password_hash, "password123");

        let session = manager.validate_access_token(&issued.token).await.unwrap();
        assert_eq!(session.account.id, issued.account.id);
        assert_eq!(session.session_id, issued.session_id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let manager = setup_test_db().await;

        manager.create_account(student("a@x.com", None)).await.unwrap();

        let result = manager.create_account(student("A@X.com", None)).await;
        match result {
            Err(PortalError::Duplicate(msg)) => assert!(msg.contains("Email")),
            other => panic!("Expected Duplicate error, got {:?}", other),
        }

        let all = manager.list_accounts(None, true).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_mobile_rejected() {
        let manager = setup_test_db().await;

        manager
            .create_account(student("a@x.com", Some("9876543210")))
            .await
            .unwrap();

        let result = manager
            .create_account(student("b@x.com", Some("9876543210")))
            .await;
        match result {
            Err(PortalError::Duplicate(msg)) => assert!(msg.contains("Mobile")),
            other => panic!("Expected Duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_mobile_numbers_do_not_collide() {
        let manager = setup_test_db().await;

        manager.create_account(student("a@x.com", None)).await.unwrap();
        manager.create_account(student("b@x.com", Some(""))).await.unwrap();

        assert_eq!(manager.list_accounts(None, false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_account_validation() {
        let manager = setup_test_db().await;

        assert!(matches!(
            manager.create_account(student("not-an-email", None)).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            manager.create_account(student("a@x.com", Some("12345"))).await,
            Err(PortalError::Validation(_))
        ));

        let mut no_password = student("a@x.com", None);
        no_password.password = String::new();
        assert!(matches!(
            manager.create_account(no_password).await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login() {
        let manager = setup_test_db().await;
        let account = manager.create_account(student("a@x.com", None)).await.unwrap();

        let issued = manager.login("A@x.com", "password123").await.unwrap();
        assert_eq!(issued.account.id, account.id);

        assert!(matches!(
            manager.login("a@x.com", "wrong-password").await,
            Err(PortalError::Authentication(_))
        ));
        assert!(matches!(
            manager.login("nobody@x.com", "password123").await,
            Err(PortalError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_account_is_locked_out() {
        let manager = setup_test_db().await;
        let issued = manager
            .issue_credentials(student("a@x.com", None))
            .await
            .unwrap();

        let account = manager.set_active(&issued.account.id, false).await.unwrap();
        assert!(!account.is_active);

        assert!(manager.validate_access_token(&issued.token).await.is_err());
        assert!(matches!(
            manager.login("a@x.com", "password123").await,
            Err(PortalError::Authentication(_))
        ));

        // Still listed when inactive accounts are requested
        assert_eq!(manager.list_accounts(Some(Role::Student), true).await.unwrap().len(), 1);
        assert!(manager.list_accounts(Some(Role::Student), false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let manager = setup_test_db().await;
        let issued = manager
            .issue_credentials(student("a@x.com", None))
            .await
            .unwrap();

        manager.delete_session(&issued.session_id).await.unwrap();

        assert!(matches!(
            manager.validate_access_token(&issued.token).await,
            Err(PortalError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let manager = setup_test_db().await;
        let issued = manager
            .issue_credentials(student("a@x.com", None))
            .await
            .unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert!(manager.validate_access_token(&tampered).await.is_err());
        assert!(manager.validate_access_token("garbage").await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let manager = setup_test_db().await;
        let account = manager.create_account(student("a@x.com", None)).await.unwrap();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO session (id, account_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind("expired-session")
        .bind(&account.id)
        .bind(now - Duration::hours(48))
        .bind(now - Duration::hours(24))
        .execute(&manager.db)
        .await
        .unwrap();

        manager.create_session(&account).await.unwrap();

        let removed = manager.cleanup_expired_sessions().await.unwrap();
        assert_eq!(removed, 1);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session")
            .fetch_one(&manager.db)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_update_identity() {
        let manager = setup_test_db().await;
        let account = manager
            .create_account(student("a@x.com", Some("9876543210")))
            .await
            .unwrap();
        manager
            .create_account(student("b@x.com", Some("9123456789")))
            .await
            .unwrap();

        let updated = manager
            .update_identity(
                &account.id,
                IdentityUpdate {
                    first_name: Some("Asha K".to_string()),
                    email: Some("Asha.Rao@x.com".to_string()),
                    // Re-submitting its own number is not a conflict
                    mobile_number: Some("9876543210".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Asha K");
        assert_eq!(updated.email, "asha.rao@x.com");

        let conflict = manager
            .update_identity(
                &account.id,
                IdentityUpdate {
                    email: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(conflict, Err(PortalError::Duplicate(_))));

        let conflict = manager
            .update_identity(
                &account.id,
                IdentityUpdate {
                    mobile_number: Some("9123456789".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(conflict, Err(PortalError::Duplicate(_))));

        let stored = manager.get_account(&account.id).await.unwrap();
        assert_eq!(stored.email, "asha.rao@x.com");
        assert_eq!(stored.mobile_number.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_change_password() {
        let manager = setup_test_db().await;
        let account = manager.create_account(student("a@x.com", None)).await.unwrap();

        assert!(manager
            .change_password(&account.id, "wrong", "newpassword")
            .await
            .is_err());
        assert!(manager
            .change_password(&account.id, "password123", "short")
            .await
            .is_err());

        manager
            .change_password(&account.id, "password123", "newpassword")
            .await
            .unwrap();

        assert!(manager.login("a@x.com", "password123").await.is_err());
        assert!(manager.login("a@x.com", "newpassword").await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_created_once() {
        let manager = setup_test_db().await;
        let admin = BootstrapAdmin {
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        };

        assert!(manager.ensure_bootstrap_admin(&admin).await.unwrap());
        assert!(!manager.ensure_bootstrap_admin(&admin).await.unwrap());

        let issued = manager.login("admin@example.com", "admin123").await.unwrap();
        assert_eq!(issued.account.role, Role::Admin);
        assert_eq!(issued.account.role.dashboard_path(), "/admin/dashboard");
    }

    #[tokio::test]
    async fn test_update_identity_rejects_blank_names() {
        let manager = setup_test_db().await;
        let account = manager.create_account(student("a@x.com", None)).await.unwrap();

        for update in [
            IdentityUpdate {
                first_name: Some("  ".to_string()),
                ..Default::default()
            },
            IdentityUpdate {
                surname: Some(String::new()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                manager.update_identity(&account.id, update).await,
                Err(PortalError::Validation(_))
            ));
        }

        let stored = manager.get_account(&account.id).await.unwrap();
        assert_eq!(stored.first_name, account.first_name);
        assert_eq!(stored.surname, account.surname);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_reactivated_after_self_deactivation() {
        let manager = setup_test_db().await;
        let admin = BootstrapAdmin {
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        };

        assert!(manager.ensure_bootstrap_admin(&admin).await.unwrap());
        let account = manager.get_account_by_email("admin@example.com").await.unwrap();
        manager.set_active(&account.id, false).await.unwrap();

        assert!(manager.ensure_bootstrap_admin(&admin).await.unwrap());
        assert!(manager.get_account(&account.id).await.unwrap().is_active);
        assert_eq!(manager.count_active(Role::Admin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_skips_email_owned_by_student() {
        let manager = setup_test_db().await;
        manager
            .create_account(student("admin@example.com", None))
            .await
            .unwrap();
        let admin = BootstrapAdmin {
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        };

        assert!(!manager.ensure_bootstrap_admin(&admin).await.unwrap());
        assert_eq!(manager.count_active(Role::Admin).await.unwrap(), 0);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }
}
