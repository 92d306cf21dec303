/// Bulk account provisioning from CSV
///
/// Rows are processed one at a time in file order: parse, apply column
/// defaults, issue credentials, then send the account-created notice. Every
/// row ends up either in `created` or in `failed` with the stage it stopped at.
use crate::{
    account::{non_blank, AccountManager, NewAccount, Role},
    config::ImportConfig,
    error::{PortalError, PortalResult},
    mailer::Notifier,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Values used for columns a row leaves empty
#[derive(Debug, Clone)]
pub struct ImportDefaults {
    pub password: String,
    pub role: Role,
}

impl From<&ImportConfig> for ImportDefaults {
    fn from(config: &ImportConfig) -> Self {
        Self {
            password: config.default_password.clone(),
            role: config.default_role,
        }
    }
}

/// One CSV row after header normalization
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ImportRow {
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    surname: Option<String>,
    mobile_number: Option<String>,
}

/// Where a row stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStage {
    Parse,
    Provision,
    Notify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based line in the uploaded file (the header is line 1)
    pub line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub stage: ImportStage,
    pub reason: String,
}

/// Outcome of one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Emails of rows that were both provisioned and notified, in file order
    pub created: Vec<String>,
    pub failed: Vec<RowFailure>,
}

/// Bulk importer service
pub struct BulkImporter {
    accounts: Arc<AccountManager>,
    notifier: Arc<dyn Notifier>,
    defaults: ImportDefaults,
}

impl BulkImporter {
    pub fn new(
        accounts: Arc<AccountManager>,
        notifier: Arc<dyn Notifier>,
        defaults: ImportDefaults,
    ) -> Self {
        Self {
            accounts,
            notifier,
            defaults,
        }
    }

    /// Import every row of an uploaded CSV file
    pub async fn import(&self, data: &[u8]) -> PortalResult<ImportReport> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| PortalError::Validation(format!("Unreadable CSV header: {}", e)))?;
        let headers: StringRecord = headers.iter().map(canonical_header).collect();

        if !headers.iter().any(|h| h == "email") {
            return Err(PortalError::Validation(
                "CSV must have an email column".to_string(),
            ));
        }

        let mut report = ImportReport::default();

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    tracing::warn!(line, "unreadable CSV row: {}", e);
                    report.failed.push(RowFailure {
                        line,
                        email: None,
                        stage: ImportStage::Parse,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            self.import_row(line, &record, &headers, &mut report).await;
        }

        tracing::info!(
            created = report.created.len(),
            failed = report.failed.len(),
            "bulk import finished"
        );

        Ok(report)
    }

    async fn import_row(
        &self,
        line: u64,
        record: &StringRecord,
        headers: &StringRecord,
        report: &mut ImportReport,
    ) {
        if record.iter().all(str::is_empty) {
            return;
        }

        let new_account = match record
            .deserialize::<ImportRow>(Some(headers))
            .map_err(|e| e.to_string())
            .and_then(|row| self.to_new_account(row))
        {
            Ok(new_account) => new_account,
            Err(reason) => {
                tracing::warn!(line, reason = %reason, "skipping malformed import row");
                report.failed.push(RowFailure {
                    line,
                    email: record_email(record, headers),
                    stage: ImportStage::Parse,
                    reason,
                });
                return;
            }
        };

        let password = new_account.password.clone();
        let email = new_account.email.clone();

        let issued = match self.accounts.issue_credentials(new_account).await {
            Ok(issued) => issued,
            Err(e) => {
                tracing::warn!(line, email = %email, "import row not provisioned: {}", e);
                report.failed.push(RowFailure {
                    line,
                    email: Some(email),
                    stage: ImportStage::Provision,
                    reason: e.public_message(),
                });
                return;
            }
        };

        if let Err(e) = self
            .notifier
            .send_account_created(&issued.account.email, &password)
            .await
        {
            tracing::error!(line, email = %email, "account created but notification failed: {}", e);
            report.failed.push(RowFailure {
                line,
                email: Some(email),
                stage: ImportStage::Notify,
                reason: "Account created but the notification email could not be sent"
                    .to_string(),
            });
            return;
        }

        tracing::debug!(line, email = %email, "imported account");
        report.created.push(email);
    }

    /// Apply column defaults to a parsed row
    fn to_new_account(&self, row: ImportRow) -> Result<NewAccount, String> {
        let email = non_blank(row.email).ok_or_else(|| "Email is required".to_string())?;

        let role = match non_blank(row.role) {
            Some(role) => role.parse::<Role>().map_err(|e| e.public_message())?,
            None => self.defaults.role,
        };

        Ok(NewAccount {
            email,
            password: non_blank(row.password).unwrap_or_else(|| self.defaults.password.clone()),
            role,
            first_name: row.first_name.unwrap_or_default(),
            middle_name: row.middle_name,
            surname: row.surname.unwrap_or_default(),
            mobile_number: row.mobile_number,
        })
    }
}

/// Map a header cell onto the field name `ImportRow` expects
fn canonical_header(header: &str) -> String {
    let key: String = header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase();

    match key.as_str() {
        "email" | "emailid" | "emailaddress" => "email",
        "password" => "password",
        "role" => "role",
        "firstname" => "firstName",
        "middlename" => "middleName",
        "surname" | "lastname" => "surname",
        "mobilenumber" | "mobile" | "phone" | "phonenumber" => "mobileNumber",
        _ => header,
    }
    .to_string()
}

/// Best-effort email for a row that failed to parse
fn record_email(record: &StringRecord, headers: &StringRecord) -> Option<String> {
    let index = headers.iter().position(|h| h == "email")?;
    record
        .get(index)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
