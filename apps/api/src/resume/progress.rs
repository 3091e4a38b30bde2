use serde::{Deserialize, Serialize};

use crate::resume::models::ResumeForm;
use crate::resume::validation::{Field, MIN_SKILLS, SUMMARY_MAX_CHARS};

/// Traffic-light band shared by the progress bar and the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub band: Band,
    pub can_download: bool,
}

/// Counts the five required text fields plus "at least 3 skills".
pub fn compute_progress(form: &ResumeForm) -> Progress {
    let total = Field::TEXT_FIELDS.len() + 1;
    let mut completed = Field::TEXT_FIELDS
        .iter()
        .filter(|f| !f.value(form).trim().is_empty())
        .count();
    if form.skills.len() >= MIN_SKILLS {
        completed += 1;
    }

    let percentage = (completed as f64 / total as f64 * 100.0).round() as u8;
    let band = if percentage < 30 {
        Band::Low
    } else if percentage < 70 {
        Band::Medium
    } else {
        Band::High
    };

    Progress {
        completed,
        total,
        percentage,
        band,
        can_download: percentage == 100,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCount {
    pub count: usize,
    pub max: usize,
    /// How close the text is to the limit: `High` means nearly full.
    pub usage: Band,
    /// The summary clipped to `max` characters.
    pub text: String,
    pub truncated: bool,
}

pub fn summary_counter(summary: &str) -> CharacterCount {
    let max = SUMMARY_MAX_CHARS;
    let raw_count = summary.chars().count();
    let truncated = raw_count > max;
    let text: String = if truncated {
        summary.chars().take(max).collect()
    } else {
        summary.to_string()
    };
    let count = raw_count.min(max);

    // Bands are decided on the raw count, before clipping.
    let usage = if raw_count * 10 > max * 9 {
        Band::High
    } else if raw_count * 10 > max * 7 {
        Band::Medium
    } else {
        Band::Low
    };

    CharacterCount {
        count,
        max,
        usage,
        text,
        truncated,
    }
}
