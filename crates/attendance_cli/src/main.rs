//! `attendance` command-line entry point.
//!
//! Builds the facade from configuration plus flag overrides, runs one
//! command and flushes the store before exiting.

use anyhow::{Context, Result};
use attendance_api::AttendanceApi;
use attendance_core::config::CONFIG_FILE_NAME;
use attendance_core::{
    default_log_level, init_logging, AttendanceConfig, AttendanceStore, AttendanceWithStudent,
    DateInput, MarkAttendanceRequest, NewStudent, Student,
};
use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod args;
use args::{Cli, Commands, StudentCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config_file = cli
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));
    let mut config = AttendanceConfig::load(Some(&config_file))
        .with_context(|| format!("loading config from {}", config_file.display()))?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }

    if let Some(log_dir) = config.log_dir.as_deref() {
        let level = config
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, absolutize(&cwd, log_dir)).context("starting logging")?;
    }

    let command = cli.command.name();
    let started_at = Instant::now();
    info!(
        "event=cli_command module=cli status=start command={command} backend={}",
        config.backend
    );

    let result = AttendanceApi::from_config(&config)
        .map_err(anyhow::Error::from)
        .and_then(|api| {
            dispatch(&api, cli.command)?;
            api.shutdown()?;
            Ok(())
        });

    match &result {
        Ok(()) => info!(
            "event=cli_command module=cli status=ok command={command} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=cli_command module=cli status=error command={command} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn dispatch<S: AttendanceStore>(api: &AttendanceApi<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Students { command } => match command {
            StudentCommands::List { search } => {
                let students = match search {
                    Some(term) => api.search_students(&term)?,
                    None => api.get_students()?,
                };
                print_students(&students);
            }
            StudentCommands::Add { name, roll } => {
                let student = api.add_student(&NewStudent::new(name, roll))?;
                println!(
                    "Student added: {} ({}) id={}",
                    student.name, student.roll_number, student.id
                );
            }
            StudentCommands::Delete { id } => {
                if api.delete_student(&id)? {
                    println!("Student deleted: {id}");
                } else {
                    println!("No student with id {id}");
                }
            }
        },
        Commands::Mark {
            student_id,
            status,
            date,
        } => {
            let date = match date {
                Some(text) => DateInput::from(text),
                None => DateInput::from(Local::now()),
            };
            let record =
                api.mark_attendance(&MarkAttendanceRequest::new(student_id, date, status))?;
            println!(
                "Marked {} on {} for {}",
                record.status,
                record.date.to_rfc3339(),
                record.student_id
            );
        }
        Commands::Absentees { date } => {
            let day = match date {
                Some(text) => DateInput::from(text),
                None => DateInput::from(Local::now().date_naive()),
            };
            print_absentees(&api.get_absentees_by_date(day)?);
        }
    }
    Ok(())
}

fn absolutize(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

fn print_students(students: &[Student]) {
    if students.is_empty() {
        println!("No students.");
        return;
    }
    for student in students {
        println!(
            "{:<24} {:<10} {}",
            student.name, student.roll_number, student.id
        );
    }
}

fn print_absentees(rows: &[AttendanceWithStudent]) {
    if rows.is_empty() {
        println!("No absentees.");
        return;
    }
    for row in rows {
        println!(
            "{:<24} {:<10} {}",
            row.student_name,
            row.roll_number,
            row.date.to_rfc3339()
        );
    }
}
