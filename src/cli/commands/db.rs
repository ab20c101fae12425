use crate::cli::context::open_storage;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::buffer::{LocalWriteBuffer, WriteBuffer};
use crate::db::storage::SqliteStorage;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET, YELLOW};
use crate::utils::formatting::percentage;
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db { check, info } = cmd {
        let storage = open_storage(cfg)?;

        if *check {
            integrity(&storage)?;
        }

        if *info {
            print_info(storage, &cfg.database)?;
        }
    }

    Ok(())
}

fn integrity(storage: &SqliteStorage) -> AppResult<()> {
    println!("{}▶ Running integrity check…{}", CYAN, RESET);

    let result: String = storage
        .conn()
        .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

    if result == "ok" {
        println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
    } else {
        println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, result);
    }
    Ok(())
}

fn print_info(storage: SqliteStorage, db_path: &str) -> AppResult<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    let keys: i64 = storage
        .conn()
        .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))?;
    let used = storage.used_bytes()?;
    let quota = storage.quota_bytes();
    let share = if quota == 0 {
        100.0
    } else {
        used as f64 / quota as f64 * 100.0
    };

    println!("{}• Local storage keys:{} {}", CYAN, RESET, keys);
    println!(
        "{}• Local storage used:{} {} / {} bytes ({})",
        CYAN,
        RESET,
        used,
        quota,
        percentage(share)
    );

    let log_rows: i64 = storage
        .conn()
        .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
    println!("{}• Log entries:{} {}", CYAN, RESET, log_rows);

    let data = LocalWriteBuffer::new(storage).get_offline_data()?;
    let color = if data.is_empty() { GREEN } else { YELLOW };
    println!(
        "{}• Waiting to sync:{} {}{} attendance, {} incidents{}",
        CYAN,
        RESET,
        color,
        data.attendance_count(),
        data.incidents.len(),
        RESET
    );

    println!();
    Ok(())
}
