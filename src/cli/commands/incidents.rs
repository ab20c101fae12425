use crate::cli::context::{http_api, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::errors::AppResult;
use crate::models::incident::{IncidentRecord, IncidentView};
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{GREY, RESET, YELLOW, color_for_severity};
use crate::utils::formatting::{student_or_general, wrap_indented};
use crate::utils::time::format_millis;

const WRAP_WIDTH: usize = 76;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Incidents { exam } = cmd {
        let buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;

        let pending = buffer.get_offline_data()?;
        let local: Vec<&IncidentRecord> = pending.incidents_for(exam).collect();

        if cfg.force_offline {
            warning("Offline: showing only incidents waiting to be synced.");
        } else {
            match api.incidents_for_exam(exam) {
                Ok(reported) => print_reported(exam, &reported, api.incident_count(exam).ok()),
                Err(e) if e.is_remote_failure() => warning(format!(
                    "Server unreachable ({}); showing only incidents waiting to be synced.",
                    e
                )),
                Err(e) => return Err(e),
            }
        }

        if local.is_empty() {
            if cfg.force_offline {
                info("No incidents waiting to be synced.");
            }
        } else {
            println!();
            header(format!("Waiting to sync ({})", local.len()));
            for r in local {
                println!(
                    "{}{:<6}{} {} - {} - {}{}{}",
                    color_for_severity(r.severity.as_str()),
                    r.severity.as_str(),
                    RESET,
                    r.category.as_str(),
                    student_or_general(r.student_id.as_deref()),
                    GREY,
                    format_millis(r.captured_at_millis),
                    RESET
                );
                println!("{}", wrap_indented(&r.description, WRAP_WIDTH, "    "));
            }
        }
    }

    Ok(())
}

fn print_reported(exam: &str, reported: &[IncidentView], count: Option<u64>) {
    let total = count.unwrap_or(reported.len() as u64);
    header(format!("Incidents for exam {} ({})", exam, total));

    if reported.is_empty() {
        info("No incidents reported.");
        return;
    }

    for i in reported {
        let student = i.student.as_ref().map(|s| format!("{} ({})", s.full_name, s.student_id));
        println!(
            "{}{:<6}{} {} - {} - {}{}{}",
            color_for_severity(i.severity.as_str()),
            i.severity.as_str(),
            RESET,
            i.category.as_str(),
            student.unwrap_or_else(|| student_or_general(None)),
            GREY,
            i.reported_at.as_deref().unwrap_or("-"),
            RESET
        );
        if let Some(by) = &i.reported_by {
            println!("    {}reported by {}{}", YELLOW, by, RESET);
        }
        println!("{}", wrap_indented(&i.description, WRAP_WIDTH, "    "));
    }
}
