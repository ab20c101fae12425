use crate::cli::context::{http_api, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceSummary;
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{CYAN, GREEN, GREY, RED, RESET, YELLOW};
use crate::utils::formatting::{bold, percentage};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { exam } = cmd {
        let buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;

        if cfg.force_offline {
            warning("Offline: server report unavailable.");
        } else {
            match api.attendance_summary(exam) {
                Ok(summary) => {
                    let incidents = api.incident_count(exam).unwrap_or(0);
                    print_summary(&summary, incidents);
                }
                Err(e) if e.is_remote_failure() => {
                    warning(format!("Server unreachable ({}); server report unavailable.", e))
                }
                Err(e) => return Err(e),
            }
        }

        let pending = buffer.get_offline_data()?;
        let attendance = pending.attendance_for(exam).len();
        let incidents = pending.incidents_for(exam).count();

        println!();
        if attendance + incidents == 0 {
            info(format!("Nothing waiting to sync for exam {}.", exam));
        } else {
            println!(
                "{}• Waiting to sync:{} {}{} attendance, {} incidents{}",
                CYAN, RESET, YELLOW, attendance, incidents, RESET
            );
        }
    }

    Ok(())
}

fn print_summary(s: &AttendanceSummary, incidents: u64) {
    let title = if s.course_code.is_empty() {
        format!("Exam {}", s.exam_id)
    } else {
        format!("{} - {}", s.course_code, s.course_name)
    };
    header(bold(&format!("Attendance report: {}", title)));

    println!("{}• Registered:{} {}", CYAN, RESET, s.total_students);
    println!("{}• Present:{}    {}{}{}", CYAN, RESET, GREEN, s.present_count, RESET);
    println!("{}• Late:{}       {}{}{}", CYAN, RESET, YELLOW, s.late_count, RESET);
    println!("{}• Absent:{}     {}{}{}", CYAN, RESET, RED, s.absent_count, RESET);
    println!("{}• Not marked:{} {}{}{}", CYAN, RESET, GREY, s.not_marked(), RESET);
    println!(
        "{}• Attendance:{} {}",
        CYAN,
        RESET,
        bold(&percentage(s.computed_percentage()))
    );
    println!("{}• Incidents:{}  {}", CYAN, RESET, incidents);
}
