/// Account management system
///
/// Handles account creation (the credential issuer), authentication, sessions,
/// identity updates and soft deactivation.

mod manager;

pub use manager::{AccountManager, TokenClaims};

use crate::{
    db::account::Account,
    error::{PortalError, PortalResult},
    profile::ProfileInput,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
    #[serde(alias = "clerical")]
    Clerk,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::Clerk => "clerk",
        }
    }

    /// Where a freshly logged-in caller of this role lands
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Student => "/student/dashboard",
            Role::Admin => "/admin/dashboard",
            Role::Clerk => "/clerk/dashboard",
        }
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> PortalResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "clerk" | "clerical" => Ok(Role::Clerk),
            _ => Err(PortalError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity payload accepted by the credential issuer
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub mobile_number: Option<String>,
}

impl NewAccount {
    /// Trim every field, lowercase the email, and turn blank optionals into `None`
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            password: self.password,
            role: self.role,
            first_name: self.first_name.trim().to_string(),
            middle_name: non_blank(self.middle_name),
            surname: self.surname.trim().to_string(),
            mobile_number: non_blank(self.mobile_number),
        }
    }
}

/// Partial identity update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUpdate {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub surname: Option<String>,
    #[serde(alias = "emailId")]
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Student signup request (also used by admins creating a student record)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(alias = "emailId")]
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1))]
    pub surname: String,
    pub mobile_number: Option<String>,
    #[validate(nested)]
    pub profile: Option<ProfileInput>,
}

impl SignupRequest {
    /// Identity part of the request as a student account payload
    pub fn new_account(&self) -> NewAccount {
        NewAccount {
            email: self.email.clone(),
            password: self.password.clone(),
            role: Role::Student,
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            surname: self.surname.clone(),
            mobile_number: self.mobile_number.clone(),
        }
    }
}

/// Signup response
#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub account: Account,
    pub profile: Option<crate::profile::StudentProfile>,
    pub token: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "emailId", alias = "username")]
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub account: Account,
    pub token: String,
    pub redirect: String,
}

/// Password change request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Result of the credential issuer: the stored account and a bearer token for it
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub account: Account,
    pub session_id: String,
    pub token: String,
}

/// Session validated from a bearer token
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub account: Account,
    pub session_id: String,
}
