use crate::api::session::Session;
use crate::cli::context::{Probe, http_api, open_buffer};
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::core::connectivity::Reachability;
use crate::core::reconcile::{ReconcileOutcome, ReconciliationDriver};
use crate::db::log::ttlog_soft;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREY, RESET};
use rusqlite::Connection;

/// Replay the buffer now, if the server can be reached.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut buffer = open_buffer(cfg)?;
    let api = http_api(cfg, buffer.storage())?;

    if !buffer.has_unsynced_data()? {
        info("Nothing to sync.");
        return Ok(());
    }

    if !Probe::new(cfg, &api).is_online() {
        let pending = buffer.get_offline_data()?.total_count();
        warning(format!(
            "Server unreachable: {} record(s) stay saved offline.",
            pending
        ));
        return Ok(());
    }

    if Session::token(buffer.storage())?.is_none() {
        return Err(AppError::NotLoggedIn);
    }

    let driver = ReconciliationDriver::new(cfg.reconcile_mode);
    let outcome = driver.reconcile(&mut buffer, &api)?;
    report(buffer.storage().conn(), &outcome);

    Ok(())
}

/// Print a pass outcome and record it in the audit log.
pub fn report(conn: &Connection, outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::NothingToSync => info("Nothing to sync."),
        ReconcileOutcome::AlreadyRunning => info("A sync is already running."),
        ReconcileOutcome::Completed(r) => {
            let summary = format!(
                "replayed {}/{} (attendance {}, incidents {}), removed {}",
                r.succeeded(),
                r.attempted(),
                r.attendance_replayed,
                r.incidents_replayed,
                r.removed
            );

            if r.is_complete() {
                success(format!("Offline data synced: {}", summary));
                ttlog_soft(conn, "sync", "", &summary);
                return;
            }

            warning(format!(
                "Sync incomplete: {} record(s) rejected, kept for the next sync ({})",
                r.failures.len(),
                summary
            ));
            for f in &r.failures {
                println!(
                    "   - exam {} {}: {}{}{}",
                    f.exam_id, f.what, GREY, f.reason, RESET
                );
                ttlog_soft(
                    conn,
                    "sync_failed",
                    &format!("exam {} {}", f.exam_id, f.what),
                    &f.reason,
                );
            }
            ttlog_soft(conn, "sync", "", &summary);
        }
    }
}
