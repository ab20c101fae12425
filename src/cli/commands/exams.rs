use crate::api::session::ExamCache;
use crate::cli::context::{cached_exam, http_api, open_storage};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::timer::ExamStatus;
use crate::errors::{AppError, AppResult};
use crate::models::exam::Exam;
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{GREY, RED, RESET, YELLOW};
use crate::utils::table::{Column, Table};
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Exams { id } = cmd {
        let mut storage = open_storage(cfg)?;
        let api = http_api(cfg, &storage)?;

        if let Some(id) = id {
            let exam = if cfg.force_offline {
                cached_exam(&storage, id)?
            } else {
                match api.exam(id) {
                    Ok(exam) => exam,
                    Err(e) if e.is_remote_failure() => {
                        warning(format!("Server unreachable ({}); showing cached exam", e));
                        cached_exam(&storage, id)?
                    }
                    Err(e) => return Err(e),
                }
            };
            print_exam(&exam);
            return Ok(());
        }

        if cfg.force_offline {
            return Err(AppError::Other(
                "Listing exams needs the server; use `exams --id N` for a cached exam".into(),
            ));
        }

        let exams = api.my_exams()?;
        ExamCache::store(&mut storage, &exams)?;

        if exams.is_empty() {
            info("No exams assigned to you.");
            return Ok(());
        }

        header("Assigned exams");
        print_table(&exams);
    }

    Ok(())
}

fn print_table(exams: &[Exam]) {
    let now = Local::now().naive_local();
    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("COURSE", 10),
        Column::new("VENUE", 8),
        Column::new("DATE", 10),
        Column::new("START", 5),
        Column::new("MIN", 3),
        Column::new("STATUS", 11),
    ]);

    for e in exams {
        table.add_row(vec![
            e.id.to_string(),
            e.title(),
            e.venue.clone(),
            e.exam_date.format("%Y-%m-%d").to_string(),
            e.start_time.format("%H:%M").to_string(),
            e.duration.to_string(),
            e.timer(now).status.as_str().to_string(),
        ]);
    }

    table.fit();
    print!("{}", table.render());
}

fn print_exam(exam: &Exam) {
    let reading = exam.timer(Local::now().naive_local());

    header(exam.title());
    println!("Venue    : {}", exam.venue);
    println!("Date     : {}", exam.exam_date.format("%Y-%m-%d"));
    println!("Start    : {}", exam.start_time.format("%H:%M"));
    println!("Duration : {} min", exam.duration);

    let color = if reading.is_urgent() {
        RED
    } else if reading.status == ExamStatus::Ended {
        GREY
    } else {
        YELLOW
    };
    println!(
        "Status   : {}{} ({} {}){}",
        color,
        reading.message(),
        reading.label(),
        reading.display(),
        RESET
    );
}
