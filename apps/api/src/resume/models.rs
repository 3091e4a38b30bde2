use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three education levels every new form starts with.
pub const DEFAULT_EDUCATION_LEVELS: [&str; 3] = ["Primary", "Secondary", "Tertiary"];
/// Label given to education rows the user adds beyond the defaults.
pub const ADDITIONAL_EDUCATION_LEVEL: &str = "Additional Education";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub level: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub year: String,
}

impl EducationEntry {
    pub fn additional() -> Self {
        Self {
            level: ADDITIONAL_EDUCATION_LEVEL.to_string(),
            ..Self::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.details.trim().is_empty() && self.year.trim().is_empty()
    }
}

/// Everything the resume form collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeForm {
    pub name: String,
    pub suffix: Option<String>,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub photo_id: Option<Uuid>,
}

impl ResumeForm {
    /// An empty form with the default education rows.
    pub fn blank() -> Self {
        Self {
            education: DEFAULT_EDUCATION_LEVELS
                .iter()
                .map(|level| EducationEntry {
                    level: level.to_string(),
                    ..EducationEntry::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Appends an empty "Additional Education" row.
    pub fn add_education(&mut self) {
        self.education.push(EducationEntry::additional());
    }

    /// Trims every text field and drops education rows with neither details
    /// nor a year. This is the shape the preview is built from.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            suffix: self
                .suffix
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            summary: self.summary.trim().to_string(),
            experience: self.experience.trim().to_string(),
            skills: self.skills.clone(),
            education: self
                .education
                .iter()
                .filter(|e| !e.is_blank())
                .map(|e| EducationEntry {
                    level: e.level.trim().to_string(),
                    details: e.details.trim().to_string(),
                    year: e.year.trim().to_string(),
                })
                .collect(),
            photo_id: self.photo_id,
        }
    }

    /// Display name including the optional suffix, e.g. "Jane Doe, Jr.".
    pub fn display_name(&self) -> String {
        match self.suffix.as_deref().map(str::trim) {
            Some(suffix) if !suffix.is_empty() => format!("{}, {}", self.name.trim(), suffix),
            _ => self.name.trim().to_string(),
        }
    }
}
