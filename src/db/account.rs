/// Account database models and row mapping
use crate::{
    account::Role,
    error::{PortalError, PortalResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

/// Account record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub mobile_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Display name built from the name parts that are present
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.surname.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Build an account from a row selected with [`ACCOUNT_COLUMNS`]
    pub fn from_row(row: &SqliteRow) -> PortalResult<Self> {
        let role: String = row.try_get("role")?;

        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role
                .parse()
                .map_err(|_| PortalError::Internal(format!("Unknown role in database: {}", role)))?,
            first_name: row.try_get("first_name")?,
            middle_name: row.try_get("middle_name")?,
            surname: row.try_get("surname")?,
            mobile_number: row.try_get("mobile_number")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Column list matching [`Account::from_row`]
pub const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, first_name, middle_name, surname, \
     mobile_number, is_active, created_at, updated_at";

/// Session record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(middle: Option<&str>) -> Account {
        let now = Utc::now();
        Account {
            id: "id-1".to_string(),
            email: "asha@college.edu".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Student,
            first_name: "Asha".to_string(),
            middle_name: middle.map(str::to_string),
            surname: "Rao".to_string(),
            mobile_number: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(account(None).full_name(), "Asha Rao");
        assert_eq!(account(Some("K")).full_name(), "Asha K Rao");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(account(None)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "asha@college.edu");
        assert_eq!(json["role"], "student");
        assert_eq!(json["isActive"], true);
    }
}
