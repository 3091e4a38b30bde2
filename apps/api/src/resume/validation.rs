//! Field validation rules for the resume form.
//!
//! Each text field is checked in a fixed order: required, minimum length,
//! maximum length, pattern. The first failing check produces that field's
//! message. Lengths are counted in characters after trimming.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resume::models::ResumeForm;

pub const SUMMARY_MAX_CHARS: usize = 500;
pub const MIN_SKILLS: usize = 3;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s.-]+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Summary,
    Experience,
    Skills,
}

impl Field {
    /// Text fields in form order. Skills are validated separately.
    pub const TEXT_FIELDS: [Field; 5] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Summary,
        Field::Experience,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Summary => "Summary",
            Field::Experience => "Experience",
            Field::Skills => "Skills",
        }
    }

    pub fn value(self, form: &ResumeForm) -> &str {
        match self {
            Field::Name => &form.name,
            Field::Email => &form.email,
            Field::Phone => &form.phone,
            Field::Summary => &form.summary,
            Field::Experience => &form.experience,
            Field::Skills => "",
        }
    }
}

pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static Lazy<Regex>>,
    pub message: &'static str,
}

pub fn rule_for(field: Field) -> FieldRule {
    match field {
        Field::Name => FieldRule {
            required: true,
            min_length: Some(2),
            max_length: None,
            pattern: Some(&NAME_RE),
            message: "Please enter a valid full name (letters, spaces, periods, and hyphens only)",
        },
        Field::Email => FieldRule {
            required: true,
            min_length: None,
            max_length: None,
            pattern: Some(&EMAIL_RE),
            message: "Please enter a valid email address",
        },
        Field::Phone => FieldRule {
            required: true,
            min_length: None,
            max_length: None,
            pattern: Some(&PHONE_RE),
            message: "Please enter a valid phone number (at least 10 digits)",
        },
        Field::Summary => FieldRule {
            required: true,
            min_length: Some(50),
            max_length: Some(SUMMARY_MAX_CHARS),
            pattern: None,
            message: "Professional summary must be between 50-500 characters",
        },
        Field::Experience => FieldRule {
            required: true,
            min_length: Some(20),
            max_length: None,
            pattern: None,
            message: "Please provide detailed work experience (minimum 20 characters)",
        },
        Field::Skills => FieldRule {
            required: true,
            min_length: None,
            max_length: None,
            pattern: None,
            message: "Please add at least 3 skills",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Checks one text field. Returns the message of the first failing check.
pub fn validate_field(field: Field, raw: &str) -> Option<String> {
    let rule = rule_for(field);
    let value = raw.trim();
    let len = value.chars().count();

    if rule.required && value.is_empty() {
        return Some(format!("{} is required", field.label()));
    }
    if let Some(min) = rule.min_length {
        if len < min {
            return Some(format!("{} must be at least {min} characters", field.label()));
        }
    }
    if let Some(max) = rule.max_length {
        if len > max {
            return Some(format!("{} must not exceed {max} characters", field.label()));
        }
    }
    if let Some(pattern) = rule.pattern {
        if !value.is_empty() && !pattern.is_match(value) {
            return Some(rule.message.to_string());
        }
    }
    None
}

pub fn validate_skills(skills: &[String]) -> Option<String> {
    let rule = rule_for(Field::Skills);
    if rule.required && skills.len() < MIN_SKILLS {
        Some(rule.message.to_string())
    } else {
        None
    }
}

/// Validates the whole form, collecting every failing field in form order.
pub fn validate_form(form: &ResumeForm) -> ValidationReport {
    let mut errors: Vec<FieldError> = Field::TEXT_FIELDS
        .iter()
        .filter_map(|&field| {
            validate_field(field, field.value(form)).map(|message| FieldError { field, message })
        })
        .collect();

    if let Some(message) = validate_skills(&form.skills) {
        errors.push(FieldError {
            field: Field::Skills,
            message,
        });
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_form() -> ResumeForm {
        ResumeForm {
            name: "Jane Q. Doe-Smith".to_string(),
            suffix: None,
            email: "jane@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            summary: "Backend engineer with eight years of experience building reliable services."
                .to_string(),
            experience: "Acme Corp, Senior Engineer, 2019-2024".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string(), "Kubernetes".to_string()],
            education: vec![],
            photo_id: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let report = validate_form(&valid_form());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_required_message_uses_label() {
        assert_eq!(
            validate_field(Field::Email, "   ").as_deref(),
            Some("Email is required")
        );
    }

    #[test]
    fn test_name_min_length_before_pattern() {
        assert_eq!(
            validate_field(Field::Name, "1").as_deref(),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_name_pattern() {
        assert!(validate_field(Field::Name, "Jane Doe").is_none());
        assert!(validate_field(Field::Name, "J. R. R. Tolkien").is_none());
        assert_eq!(
            validate_field(Field::Name, "Jane_Doe").as_deref(),
            Some("Please enter a valid full name (letters, spaces, periods, and hyphens only)")
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(validate_field(Field::Email, "a@b.co").is_none());
        assert!(validate_field(Field::Email, "a@b").is_some());
        assert!(validate_field(Field::Email, "a b@c.d").is_some());
    }

    #[test]
    fn test_phone_pattern() {
        assert!(validate_field(Field::Phone, "5551234567").is_none());
        assert!(validate_field(Field::Phone, "+44 (20) 7946-0958").is_none());
        assert!(validate_field(Field::Phone, "555-1234").is_some());
        assert!(validate_field(Field::Phone, "555 123 456x").is_some());
    }

    #[test]
    fn test_summary_bounds() {
        assert_eq!(
            validate_field(Field::Summary, "too short").as_deref(),
            Some("Summary must be at least 50 characters")
        );
        let long = "a".repeat(501);
        assert_eq!(
            validate_field(Field::Summary, &long).as_deref(),
            Some("Summary must not exceed 500 characters")
        );
        assert!(validate_field(Field::Summary, &"a".repeat(500)).is_none());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let summary = "é".repeat(50);
        assert!(validate_field(Field::Summary, &summary).is_none());
    }

    #[test]
    fn test_experience_min_length() {
        assert!(validate_field(Field::Experience, "Short stint").is_some());
        assert!(validate_field(Field::Experience, "Twenty characters ok").is_none());
    }

    #[test]
    fn test_skills_minimum() {
        assert_eq!(
            validate_skills(&["Rust".to_string()]).as_deref(),
            Some("Please add at least 3 skills")
        );
    }

    #[test]
    fn test_errors_collected_in_form_order() {
        let form = ResumeForm {
            name: "Jane Doe".to_string(),
            ..ResumeForm::default()
        };
        let report = validate_form(&form);
        assert!(!report.valid);
        let fields: Vec<Field> = report.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Email,
                Field::Phone,
                Field::Summary,
                Field::Experience,
                Field::Skills
            ]
        );
    }
}
