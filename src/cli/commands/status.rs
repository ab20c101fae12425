use crate::api::session::Session;
use crate::cli::context::{Probe, http_api, open_buffer};
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::core::connectivity::{Connectivity, Reachability};
use crate::errors::AppResult;
use crate::ui::messages::{header, success};
use crate::utils::colors::{CYAN, GREEN, GREY, RED, RESET, YELLOW, color_for_status};
use crate::utils::formatting::student_or_general;
use crate::utils::time::{age_since, format_millis};
use chrono::Utc;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let buffer = open_buffer(cfg)?;
    let api = http_api(cfg, buffer.storage())?;

    let state = Connectivity::from_online(Probe::new(cfg, &api).is_online());
    let state_color = if state.is_online() { GREEN } else { RED };

    header("invigilator status");
    println!(
        "{}• Server:{} {} {}({}){}",
        CYAN,
        RESET,
        api.base_url(),
        state_color,
        state,
        RESET
    );

    match Session::user(buffer.storage())? {
        Some(user) => println!("{}• Logged in:{} {}", CYAN, RESET, user.display_name()),
        None => println!("{}• Logged in:{} {}no{}", CYAN, RESET, GREY, RESET),
    }
    println!(
        "{}• Offline mode:{} {}, sync {}",
        CYAN,
        RESET,
        if cfg.offline_enabled { "enabled" } else { "disabled" },
        cfg.reconcile_mode
    );

    let data = buffer.get_offline_data()?;
    println!();

    if data.is_empty() {
        success("No records waiting to be synced.");
        return Ok(());
    }

    println!(
        "{}{} record(s) waiting to be synced{}",
        YELLOW,
        data.total_count(),
        RESET
    );

    let now = Utc::now();
    for (exam_id, entries) in &data.attendance {
        println!("\n{}Exam {}{}", CYAN, exam_id, RESET);
        for e in entries {
            println!(
                "   student {:<8} {}{:<7}{} {:<6} {} {}({}){}",
                e.student_id,
                color_for_status(Some(e.status.as_str())),
                e.status.as_str(),
                RESET,
                e.method.as_str(),
                format_millis(e.captured_at_millis),
                GREY,
                age_since(e.captured_at_millis, now),
                RESET
            );
        }
    }

    if !data.incidents.is_empty() {
        println!("\n{}Incidents{}", CYAN, RESET);
        for i in &data.incidents {
            println!(
                "   exam {} {} {} ({}) {}({}){}",
                i.exam_id,
                i.category.as_str(),
                i.severity.as_str(),
                student_or_general(i.student_id.as_deref()),
                GREY,
                age_since(i.captured_at_millis, now),
                RESET
            );
        }
    }

    Ok(())
}
