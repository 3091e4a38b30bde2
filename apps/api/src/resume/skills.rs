//! Skills tag input.
//!
//! Mirrors the behavior of the form's tag widget so that the client can stay a
//! thin renderer: typing a comma splits the input into tags, Enter/Tab/blur
//! commits what was typed, Backspace on an empty input removes the last tag.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    skills: Vec<String>,
}

impl SkillSet {
    pub fn new(skills: Vec<String>) -> Self {
        let mut set = Self::default();
        for skill in skills {
            set.add(&skill);
        }
        set
    }

    pub fn as_slice(&self) -> &[String] {
        &self.skills
    }

    pub fn into_vec(self) -> Vec<String> {
        self.skills
    }

    /// Adds a trimmed, non-empty skill unless it is already present (exact match).
    pub fn add(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.skills.len()).then(|| self.skills.remove(index))
    }

    /// Value of the hidden form field: tags joined by ", ".
    pub fn hidden_value(&self) -> String {
        self.skills.join(", ")
    }

    /// Handles typed input. If it contains a comma, every non-empty piece is
    /// added and the returned input is empty; otherwise the input is returned
    /// unchanged.
    pub fn on_input(&mut self, input: &str) -> String {
        if !input.contains(',') {
            return input.to_string();
        }
        for piece in input.split(',') {
            self.add(piece);
        }
        String::new()
    }

    /// Enter, Tab, or blur: commit whatever was typed.
    pub fn on_commit(&mut self, input: &str) -> String {
        if input.trim().is_empty() {
            return input.to_string();
        }
        self.add(input);
        String::new()
    }

    /// Backspace: only removes the last tag when the input is already empty.
    pub fn on_backspace(&mut self, input: &str) -> Option<String> {
        if input.is_empty() {
            self.skills.pop()
        } else {
            None
        }
    }
}

/// A single tag-input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillEvent {
    Input,
    Commit,
    Backspace,
    Remove { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SkillSet {
        SkillSet::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_add_trims_and_dedupes() {
        let mut s = SkillSet::default();
        assert!(s.add("  Rust "));
        assert!(!s.add("Rust"));
        assert!(!s.add("   "));
        assert!(s.add("rust"));
        assert_eq!(s.as_slice(), &["Rust".to_string(), "rust".to_string()]);
    }

    #[test]
    fn test_comma_input_splits_and_clears() {
        let mut s = set(&["Go"]);
        let rest = s.on_input("Rust, SQL,,Go, ");
        assert_eq!(rest, "");
        assert_eq!(s.hidden_value(), "Go, Rust, SQL");
    }

    #[test]
    fn test_input_without_comma_is_kept() {
        let mut s = SkillSet::default();
        assert_eq!(s.on_input("Kuber"), "Kuber");
        assert!(s.as_slice().is_empty());
    }

    #[test]
    fn test_commit_adds_typed_skill() {
        let mut s = SkillSet::default();
        assert_eq!(s.on_commit(" C++ "), "");
        assert_eq!(s.as_slice(), &["C++".to_string()]);
        assert_eq!(s.on_commit("  "), "  ");
    }

    #[test]
    fn test_backspace_on_empty_input_removes_last() {
        let mut s = set(&["A", "B"]);
        assert_eq!(s.on_backspace("x"), None);
        assert_eq!(s.on_backspace("").as_deref(), Some("B"));
        assert_eq!(s.as_slice(), &["A".to_string()]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut s = set(&["A"]);
        assert_eq!(s.remove(3), None);
        assert_eq!(s.remove(0).as_deref(), Some("A"));
    }

    #[test]
    fn test_event_json_shape() {
        let ev: SkillEvent = serde_json::from_str(r#"{"kind":"remove","index":2}"#).unwrap();
        assert_eq!(ev, SkillEvent::Remove { index: 2 });
    }
}
