//! Roster and attendance domain model.
//!
//! # Responsibility
//! - Define the records shared by every storage backend.
//! - Own date coercion and the day-boundary rules used by absentee queries.
//! - Fix one ordering policy for rosters and absentee listings.
//!
//! # Invariants
//! - Every persisted record is identified by an adapter-assigned UUID.
//! - Attendance references its student by id only; it never owns a student.

pub mod attendance;
pub mod day;
pub mod student;
