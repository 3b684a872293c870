//! Student roster model.
//!
//! # Responsibility
//! - Define the persisted `Student` record and its identity-less candidate.
//! - Validate and normalize candidate input before it reaches storage.
//! - Provide the roster ordering shared by all backends.
//!
//! # Invariants
//! - `name` and `roll_number` are non-blank after trimming.
//! - `roll_number` uniqueness is not enforced anywhere.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned by the store when a student is created.
pub type StudentId = Uuid;

/// Student record as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Roster number; duplicates are legal.
    pub roll_number: String,
}

/// Student candidate before the store assigns an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    BlankName,
    BlankRollNumber,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "student name must not be blank"),
            Self::BlankRollNumber => write!(f, "roll number must not be blank"),
        }
    }
}

impl Error for StudentValidationError {}

impl NewStudent {
    pub fn new(name: impl Into<String>, roll_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_number: roll_number.into(),
        }
    }

    /// Returns a trimmed copy, rejecting blank fields.
    pub fn normalized(&self) -> Result<Self, StudentValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudentValidationError::BlankName);
        }
        let roll_number = self.roll_number.trim();
        if roll_number.is_empty() {
            return Err(StudentValidationError::BlankRollNumber);
        }
        Ok(Self::new(name, roll_number))
    }
}

impl Student {
    /// Attaches a store-assigned identity to a candidate.
    pub fn from_candidate(id: StudentId, candidate: &NewStudent) -> Self {
        Self {
            id,
            name: candidate.name.clone(),
            roll_number: candidate.roll_number.clone(),
        }
    }

    /// Case-insensitive substring match on name or roll number.
    ///
    /// A blank term matches every student.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.roll_number.to_lowercase().contains(&needle)
    }
}

/// Compares display names with case folding, falling back to the raw text.
///
/// This is the single "locale-aware" policy every backend sorts with.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Roster order: name, then roll number, then id.
pub fn roster_order(left: &Student, right: &Student) -> Ordering {
    compare_names(&left.name, &right.name)
        .then_with(|| left.roll_number.cmp(&right.roll_number))
        .then_with(|| left.id.cmp(&right.id))
}

pub fn sort_roster(students: &mut [Student]) {
    students.sort_by(roster_order);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, roll: &str) -> Student {
        Student::from_candidate(Uuid::new_v4(), &NewStudent::new(name, roll))
    }

    #[test]
    fn normalized_trims_fields() {
        let candidate = NewStudent::new("  Alice ", " R001\n");
        let normalized = candidate.normalized().unwrap();
        assert_eq!(normalized.name, "Alice");
        assert_eq!(normalized.roll_number, "R001");
    }

    #[test]
    fn normalized_rejects_blank_fields() {
        assert_eq!(
            NewStudent::new("   ", "R001").normalized().unwrap_err(),
            StudentValidationError::BlankName
        );
        assert_eq!(
            NewStudent::new("Alice", "").normalized().unwrap_err(),
            StudentValidationError::BlankRollNumber
        );
    }

    #[test]
    fn compare_names_folds_case_before_raw_order() {
        assert_eq!(compare_names("alice", "Bob"), Ordering::Less);
        assert_eq!(compare_names("Alice", "alice"), Ordering::Less);
        assert_eq!(compare_names("Émile", "Émile"), Ordering::Equal);
    }

    #[test]
    fn sort_roster_breaks_name_ties_by_roll_number() {
        let mut roster = vec![
            student("bob", "R9"),
            student("Alice", "R2"),
            student("Alice", "R1"),
        ];
        sort_roster(&mut roster);
        let rolls: Vec<_> = roster.iter().map(|s| s.roll_number.as_str()).collect();
        assert_eq!(rolls, vec!["R1", "R2", "R9"]);
    }

    #[test]
    fn matches_search_checks_name_and_roll_number() {
        let alice = student("Alice Smith", "R001");
        assert!(alice.matches_search("smith"));
        assert!(alice.matches_search("r00"));
        assert!(alice.matches_search("  "));
        assert!(!alice.matches_search("bob"));
    }
}
