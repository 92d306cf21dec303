/// Privacy and terms consent per account
use crate::error::PortalResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub account_id: String,
    pub privacy_accepted: bool,
    pub terms_accepted: bool,
    /// Set when both privacy and terms are accepted
    pub consent_date: Option<DateTime<Utc>>,
}

/// Consent update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUpdate {
    pub privacy_accepted: bool,
    pub terms_accepted: bool,
}

pub struct ConsentManager {
    db: SqlitePool,
}

impl ConsentManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Fetch consent, creating a default (nothing accepted) row on first access
    pub async fn get_or_create(&self, account_id: &str) -> PortalResult<Consent> {
        sqlx::query("INSERT OR IGNORE INTO consent (account_id) VALUES (?1)")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        let consent = sqlx::query_as::<_, Consent>(
            "SELECT account_id, privacy_accepted, terms_accepted, consent_date
             FROM consent WHERE account_id = ?1",
        )
        .bind(account_id)
        .fetch_one(&self.db)
        .await?;

        Ok(consent)
    }

    pub async fn update(&self, account_id: &str, update: ConsentUpdate) -> PortalResult<Consent> {
        let consent_date = (update.privacy_accepted && update.terms_accepted).then(Utc::now);

        sqlx::query(
            "INSERT INTO consent (account_id, privacy_accepted, terms_accepted, consent_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(account_id) DO UPDATE SET
                 privacy_accepted = excluded.privacy_accepted,
                 terms_accepted = excluded.terms_accepted,
                 consent_date = excluded.consent_date",
        )
        .bind(account_id)
        .bind(update.privacy_accepted)
        .bind(update.terms_accepted)
        .bind(consent_date)
        .execute(&self.db)
        .await?;

        Ok(Consent {
            account_id: account_id.to_string(),
            privacy_accepted: update.privacy_accepted,
            terms_accepted: update.terms_accepted,
            consent_date,
        })
    }
}
