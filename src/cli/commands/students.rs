use crate::api::http::HttpApi;
use crate::cli::context::{Buffer, cache_roster, cached_roster, http_api, open_buffer, require_server};
use crate::db::log::ttlog_soft;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::AttendanceView;
use crate::models::student::{NewStudent, Student};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{GREEN, RESET, YELLOW, color_for_status, colorize_optional};
use crate::utils::table::{Column, Table};
use std::collections::HashMap;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Students {
        exam,
        all,
        search,
        register,
        name,
        program,
    } = cmd
    {
        let mut buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;

        if let Some(code) = register {
            require_server(cfg, "Registering a student")?;
            let student = NewStudent::new(
                code,
                name.as_deref().unwrap_or_default(),
                program.as_deref().unwrap_or_default(),
            );
            if student.student_id.is_empty() || student.full_name.is_empty() {
                return Err(AppError::Other(
                    "Student id and name must not be blank".into(),
                ));
            }

            let registration = api.register_student(&student)?;
            ttlog_soft(
                buffer.storage().conn(),
                "register",
                &registration.student.student_id,
                &registration.student.full_name,
            );
            success(
                registration
                    .message
                    .unwrap_or_else(|| "Student registered".to_string()),
            );
            print_student(&registration.student);
        } else if let Some(code) = search {
            let student = api.search_student(code)?;
            print_student(&student);
        } else if *all {
            let students = api.all_students()?;
            header(format!("Registered students ({})", students.len()));
            print_directory(&students);
        } else if let Some(exam_id) = exam {
            roster(cfg, &mut buffer, &api, exam_id)?;
        } else {
            return Err(AppError::Other(
                "Give an exam id, --all, --search <studentId> or --register <studentId>".into(),
            ));
        }
    }

    Ok(())
}

/// Roster with each student's attendance: the server's mark, overridden by
/// a mark still waiting in the buffer.
fn roster(cfg: &Config, buffer: &mut Buffer, api: &HttpApi, exam_id: &str) -> AppResult<()> {
    let (students, marks) = if cfg.force_offline {
        (cached_roster(buffer.storage(), exam_id)?, Vec::new())
    } else {
        match api.students_for_exam(exam_id) {
            Ok(students) => {
                cache_roster(buffer.storage_mut(), exam_id, &students);
                (students, api.attendance_for_exam(exam_id).unwrap_or_default())
            }
            Err(e) if e.is_remote_failure() => {
                warning(format!("Server unreachable ({}); showing cached roster", e));
                (cached_roster(buffer.storage(), exam_id)?, Vec::new())
            }
            Err(e) => return Err(e),
        }
    };

    if students.is_empty() {
        info(format!("No students registered for exam {}.", exam_id));
        return Ok(());
    }

    let server: HashMap<i64, &AttendanceView> = marks
        .iter()
        .filter_map(|m| m.student.as_ref().map(|s| (s.id, m)))
        .collect();

    let pending = buffer.get_offline_data()?;
    let local: HashMap<&str, &str> = pending
        .attendance_for(exam_id)
        .iter()
        .map(|e| (e.student_id.as_str(), e.status.as_str()))
        .collect();

    header(format!("Exam {} roster ({} students)", exam_id, students.len()));

    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("STUDENT ID", 10),
        Column::new("NAME", 20),
        Column::new("PROGRAM", 8),
        Column::new("ATTENDANCE", 10),
    ]);

    let mut marked = 0;
    for s in &students {
        let key = s.id.to_string();
        let cell = match (local.get(key.as_str()), server.get(&s.id)) {
            (Some(&status), _) => {
                marked += 1;
                format!(
                    "{}{}{} {}(pending){}",
                    color_for_status(Some(status)),
                    status,
                    RESET,
                    YELLOW,
                    RESET
                )
            }
            (None, Some(view)) => {
                marked += 1;
                let status = view.status.as_str();
                format!("{}{}{}", color_for_status(Some(status)), status, RESET)
            }
            (None, None) => colorize_optional("-", color_for_status(None)),
        };

        table.add_row(vec![
            key,
            s.student_id.clone(),
            s.full_name.clone(),
            s.program_or_dash().to_string(),
            cell,
        ]);
    }

    table.fit();
    print!("{}", table.render());
    println!(
        "\n{}{}/{}{} marked",
        GREEN,
        marked,
        students.len(),
        RESET
    );
    Ok(())
}

fn print_directory(students: &[Student]) {
    let mut table = Table::new(vec![
        Column::new("STUDENT ID", 10),
        Column::new("NAME", 20),
        Column::new("PROGRAM", 8),
        Column::new("EMAIL", 10),
        Column::new("VERIFIED", 8),
    ]);

    for s in students {
        table.add_row(vec![
            s.student_id.clone(),
            s.full_name.clone(),
            s.program_or_dash().to_string(),
            s.email.clone().unwrap_or_else(|| "-".into()),
            verified(s).to_string(),
        ]);
    }

    table.fit();
    print!("{}", table.render());
}

fn verified(s: &Student) -> &'static str {
    match s.verified {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn print_student(s: &Student) {
    header(&s.full_name);
    println!("Student ID : {}", s.student_id);
    println!("Server ID  : {}", s.id);
    println!("Program    : {}", s.program_or_dash());
    println!("Email      : {}", s.email.as_deref().unwrap_or("-"));
    println!("Verified   : {}", verified(s));
}
