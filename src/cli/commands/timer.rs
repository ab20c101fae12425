use crate::cli::context::{cached_exam, http_api, open_storage};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::timer::{ExamStatus, TimerReading};
use crate::errors::AppResult;
use crate::models::exam::Exam;
use crate::ui::messages::{header, warning};
use crate::utils::colors::{GREEN, GREY, RED, RESET, YELLOW};
use chrono::Local;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Timer { exam, follow } = cmd {
        let exam = load_exam(cfg, exam)?;

        header(exam.title());
        println!(
            "{} {} - {} min, {}",
            exam.exam_date.format("%Y-%m-%d"),
            exam.start_time.format("%H:%M"),
            exam.duration,
            exam.venue
        );

        if !*follow {
            println!("{}", render(&exam.timer(Local::now().naive_local())));
            return Ok(());
        }

        let mut out = io::stdout();
        loop {
            let reading = exam.timer(Local::now().naive_local());
            write!(out, "\r{}\x1b[K", render(&reading))?;
            out.flush()?;

            if reading.status == ExamStatus::Ended {
                writeln!(out)?;
                warning("Time expired. Collect the papers.");
                break;
            }
            thread::sleep(Duration::from_secs(1));
        }
    }

    Ok(())
}

/// Exam from the server, or from the list cached by `exams` when the server
/// cannot be reached.
fn load_exam(cfg: &Config, exam_id: &str) -> AppResult<Exam> {
    let storage = open_storage(cfg)?;

    if !cfg.force_offline {
        let api = http_api(cfg, &storage)?;
        match api.exam(exam_id) {
            Ok(exam) => return Ok(exam),
            Err(e) if e.is_remote_failure() => {
                warning(format!("Server unreachable ({}); using cached exam", e));
            }
            Err(e) => return Err(e),
        }
    }

    cached_exam(&storage, exam_id)
}

fn render(reading: &TimerReading) -> String {
    let color = match reading.status {
        ExamStatus::NotStarted => GREY,
        ExamStatus::InProgress if reading.is_urgent() => RED,
        ExamStatus::InProgress => GREEN,
        ExamStatus::Ended => YELLOW,
    };
    format!(
        "⏱  {}{}: {}{}  ({})",
        color,
        reading.label(),
        reading.display(),
        RESET,
        reading.message()
    )
}
