use attendance_core::{AttendanceStatus, StoreBackend};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "attendance")]
#[command(about = "Record student attendance and list who was absent", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML config file (defaults to ./attendance.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: sqlite, memory or json
    #[arg(long, global = true)]
    pub backend: Option<StoreBackend>,

    /// Directory for the database or JSON files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the roster
    Students {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Record attendance for one student
    Mark {
        student_id: String,

        /// present or absent
        status: AttendanceStatus,

        /// Date or timestamp; defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// List absent students for a day (defaults to today)
    Absentees { date: Option<String> },
}

impl Commands {
    /// Stable command label used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Students { command } => match command {
                StudentCommands::List { .. } => "students_list",
                StudentCommands::Add { .. } => "students_add",
                StudentCommands::Delete { .. } => "students_delete",
            },
            Self::Mark { .. } => "mark",
            Self::Absentees { .. } => "absentees",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// List students sorted by name
    #[command(alias = "ls")]
    List {
        /// Name or roll number fragment
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a student
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        roll: String,
    },

    /// Delete a student and their attendance
    #[command(alias = "rm")]
    Delete { id: String },
}
