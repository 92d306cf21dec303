/// Student profile records
///
/// The extended record attached to a student account: education history,
/// skills, achievements and resume metadata. Nested sections are validated
/// with `validator` derives before anything is written.
mod store;

pub use store::ProfileStore;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile fields accepted on signup and profile update.
///
/// Sections left out keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[validate(nested)]
    pub education: Option<Education>,
    #[validate(nested)]
    pub skills: Option<Skills>,
    #[validate(nested)]
    pub achievements: Option<Vec<Achievement>>,
}

impl ProfileInput {
    pub fn is_empty(&self) -> bool {
        self.education.is_none() && self.skills.is_none() && self.achievements.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[validate(nested)]
    pub class10: Class10,
    #[validate(nested)]
    pub class12: Class12,
    #[validate(nested)]
    pub current_education: CurrentEducation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Class10 {
    #[validate(length(min = 1))]
    pub board: String,
    #[validate(length(min = 1))]
    pub school: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f64,
    pub year_of_passing: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Class12 {
    #[validate(length(min = 1))]
    pub board: String,
    #[validate(length(min = 1))]
    pub school: String,
    pub stream: Stream,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f64,
    pub year_of_passing: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stream {
    Science,
    Commerce,
    Arts,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEducation {
    pub degree: Degree,
    #[validate(length(min = 1))]
    pub specialization: String,
    #[validate(length(min = 1))]
    pub college: String,
    #[validate(length(min = 1))]
    pub university: String,
    #[validate(range(min = 1, max = 10))]
    pub current_semester: u8,
    #[validate(range(min = 0.0, max = 10.0))]
    pub cgpa: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: Option<f64>,
    pub expected_graduation: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degree {
    #[serde(rename = "B.Tech")]
    BTech,
    #[serde(rename = "B.E")]
    BE,
    #[serde(rename = "BCA")]
    Bca,
    #[serde(rename = "B.Sc")]
    BSc,
    #[serde(rename = "B.Com")]
    BCom,
    #[serde(rename = "BA")]
    Ba,
    #[serde(rename = "M.Tech")]
    MTech,
    #[serde(rename = "M.E")]
    ME,
    #[serde(rename = "MCA")]
    Mca,
    #[serde(rename = "M.Sc")]
    MSc,
    #[serde(rename = "MBA")]
    Mba,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Skills {
    #[validate(nested)]
    pub technical_skills: Vec<TechnicalSkill>,
    #[validate(nested)]
    pub programming_languages: Vec<LanguageSkill>,
    pub soft_skills: Vec<String>,
    #[validate(nested)]
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSkill {
    #[validate(length(min = 1))]
    pub skill_name: String,
    pub proficiency_level: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSkill {
    #[validate(length(min = 1))]
    pub language: String,
    pub proficiency_level: Proficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[validate(length(min = 1))]
    pub certification_name: String,
    #[validate(length(min = 1))]
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementCategory {
    Academic,
    Sports,
    Cultural,
    Technical,
    Leadership,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub category: AchievementCategory,
    pub date_achieved: NaiveDate,
    pub organization: Option<String>,
    #[validate(url)]
    pub certificate_url: Option<String>,
}

/// Uploaded resume metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMeta {
    pub file_name: String,
    #[serde(skip_serializing, default)]
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Stored student profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub account_id: String,
    pub education: Option<Education>,
    pub skills: Skills,
    pub achievements: Vec<Achievement>,
    pub resume: Option<ResumeMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentProfile {
    /// Empty profile for an account that has not filled anything in yet
    pub fn empty(account_id: &str) -> Self {
        let now = Utc::now();
        Self {
            account_id: account_id.to_string(),
            education: None,
            skills: Skills::default(),
            achievements: Vec::new(),
            resume: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overlay the sections present in `input`
    pub fn apply(&mut self, input: ProfileInput) {
        if let Some(education) = input.education {
            self.education = Some(education);
        }
        if let Some(skills) = input.skills {
            self.skills = skills;
        }
        if let Some(achievements) = input.achievements {
            self.achievements = achievements;
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    /// A complete, valid profile payload
    pub fn profile_json() -> serde_json::Value {
        json!({
            "education": {
                "class10": {
                    "board": "CBSE",
                    "school": "City Public School",
                    "percentage": 91.2,
                    "yearOfPassing": 2018
                },
                "class12": {
                    "board": "CBSE",
                    "school": "City Public School",
                    "stream": "Science",
                    "percentage": 88.0,
                    "yearOfPassing": 2020
                },
                "currentEducation": {
                    "degree": "B.Tech",
                    "specialization": "Computer Science",
                    "college": "Institute of Technology",
                    "university": "State University",
                    "currentSemester": 6,
                    "cgpa": 8.4,
                    "expectedGraduation": "2025-06-30"
                }
            },
            "skills": {
                "technicalSkills": [{ "skillName": "SQL", "proficiencyLevel": "Advanced" }],
                "programmingLanguages": [{ "language": "Rust", "proficiencyLevel": "Intermediate" }],
                "softSkills": ["Communication"],
                "certifications": [{
                    "certificationName": "Cloud Practitioner",
                    "issuingOrganization": "AWS",
                    "issueDate": "2023-02-01"
                }]
            },
            "achievements": [{
                "title": "Hackathon winner",
                "description": "First place at the inter-college hackathon",
                "category": "Technical",
                "dateAchieved": "2023-09-15",
                "certificateUrl": "https://example.org/cert/42"
            }]
        })
    }

    pub fn profile_input() -> ProfileInput {
        serde_json::from_value(profile_json()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_valid_profile_passes() {
        let input = profile_input();
        assert!(input.validate().is_ok());

        let education = input.education.unwrap();
        assert_eq!(education.current_education.degree, Degree::BTech);
        assert_eq!(education.class12.stream, Stream::Science);
    }

    #[test]
    fn test_percentage_out_of_range_rejected() {
        let mut input = profile_input();
        if let Some(ref mut education) = input.education {
            education.class10.percentage = 101.0;
        }

        let err = input.validate().unwrap_err();
        let message = crate::validation::describe(&err);
        assert!(message.contains("class10.percentage"), "{}", message);
    }

    #[test]
    fn test_semester_and_cgpa_bounds() {
        let mut input = profile_input();
        if let Some(ref mut education) = input.education {
            education.current_education.current_semester = 11;
            education.current_education.cgpa = Some(10.5);
        }

        let message = crate::validation::describe(&input.validate().unwrap_err());
        assert!(message.contains("current_semester"), "{}", message);
        assert!(message.contains("cgpa"), "{}", message);
    }

    #[test]
    fn test_unknown_degree_rejected_by_serde() {
        let mut json = profile_json();
        json["education"]["currentEducation"]["degree"] = "PhD".into();
        assert!(serde_json::from_value::<ProfileInput>(json).is_err());
    }

    #[test]
    fn test_degree_wire_names() {
        assert_eq!(serde_json::to_string(&Degree::MTech).unwrap(), "\"M.Tech\"");
        assert_eq!(serde_json::to_string(&Degree::Mca).unwrap(), "\"MCA\"");
    }

    #[test]
    fn test_apply_keeps_missing_sections() {
        let mut profile = StudentProfile::empty("acct");
        profile.apply(profile_input());
        assert!(profile.education.is_some());

        profile.apply(ProfileInput {
            achievements: Some(Vec::new()),
            ..Default::default()
        });
        assert!(profile.education.is_some());
        assert_eq!(profile.skills.soft_skills, vec!["Communication".to_string()]);
        assert!(profile.achievements.is_empty());
    }
}
