/// Profile persistence
use super::{Achievement, Education, ProfileInput, ResumeMeta, Skills, StudentProfile};
use crate::error::PortalResult;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, types::Json, Row, SqlitePool};
use validator::Validate;

const PROFILE_COLUMNS: &str = "account_id, education, skills, achievements, resume_file_name, \
     resume_file_path, resume_file_size, resume_uploaded_at, created_at, updated_at";

/// Student profile store
pub struct ProfileStore {
    db: SqlitePool,
}

impl ProfileStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Fetch the profile of an account, if one has been saved
    pub async fn get(&self, account_id: &str) -> PortalResult<Option<StudentProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM student_profile WHERE account_id = ?1",
            PROFILE_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Validate and merge `input` into the stored profile, creating it if needed
    pub async fn upsert(&self, account_id: &str, input: ProfileInput) -> PortalResult<StudentProfile> {
        input.validate()?;

        let mut profile = self
            .get(account_id)
            .await?
            .unwrap_or_else(|| StudentProfile::empty(account_id));
        profile.apply(input);

        self.save(&mut profile).await?;
        Ok(profile)
    }

    /// Record a newly uploaded resume
    pub async fn set_resume(&self, account_id: &str, resume: ResumeMeta) -> PortalResult<StudentProfile> {
        let mut profile = self
            .get(account_id)
            .await?
            .unwrap_or_else(|| StudentProfile::empty(account_id));
        profile.resume = Some(resume);

        self.save(&mut profile).await?;
        Ok(profile)
    }

    /// Write the whole profile, refreshing `updated_at`
    async fn save(&self, profile: &mut StudentProfile) -> PortalResult<()> {
        profile.updated_at = Utc::now();
        let resume = profile.resume.as_ref();

        sqlx::query(
            "INSERT INTO student_profile (account_id, education, skills, achievements,
                                          resume_file_name, resume_file_path, resume_file_size,
                                          resume_uploaded_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(account_id) DO UPDATE SET
                 education = excluded.education,
                 skills = excluded.skills,
                 achievements = excluded.achievements,
                 resume_file_name = excluded.resume_file_name,
                 resume_file_path = excluded.resume_file_path,
                 resume_file_size = excluded.resume_file_size,
                 resume_uploaded_at = excluded.resume_uploaded_at,
                 updated_at = excluded.updated_at",
        )
        .bind(&profile.account_id)
        .bind(profile.education.as_ref().map(Json))
        .bind(Json(&profile.skills))
        .bind(Json(&profile.achievements))
        .bind(resume.map(|r| r.file_name.as_str()))
        .bind(resume.map(|r| r.file_path.as_str()))
        .bind(resume.map(|r| r.file_size))
        .bind(resume.map(|r| r.uploaded_at))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.db)
        .await?;

        tracing::debug!(account_id = %profile.account_id, "saved student profile");
        Ok(())
    }
}

fn profile_from_row(row: &SqliteRow) -> PortalResult<StudentProfile> {
    let education: Option<Json<Education>> = row.try_get("education")?;
    let skills: Json<Skills> = row.try_get("skills")?;
    let achievements: Json<Vec<Achievement>> = row.try_get("achievements")?;

    let resume_file_name: Option<String> = row.try_get("resume_file_name")?;
    let resume = match resume_file_name {
        Some(file_name) => Some(ResumeMeta {
            file_name,
            file_path: row.try_get::<Option<String>, _>("resume_file_path")?.unwrap_or_default(),
            file_size: row.try_get::<Option<i64>, _>("resume_file_size")?.unwrap_or_default(),
            uploaded_at: row
                .try_get::<Option<DateTime<Utc>>, _>("resume_uploaded_at")?
                .unwrap_or_else(Utc::now),
        }),
        None => None,
    };

    Ok(StudentProfile {
        account_id: row.try_get("account_id")?,
        education: education.map(|Json(e)| e),
        skills: skills.0,
        achievements: achievements.0,
        resume,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
