use crate::cli::context::{Probe, audit_failure, http_api, offline_notice, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::submission::{SubmissionFacade, SubmitOutcome};
use crate::db::log::ttlog_soft;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceStatus, MarkMethod};
use crate::ui::messages::{offline, success};
use crate::utils::colors::{RESET, color_for_status};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Mark {
        exam,
        student,
        status,
        method,
    } = cmd
    {
        let status = AttendanceStatus::from_code(status)
            .ok_or_else(|| AppError::InvalidStatus(status.clone()))?;
        let method =
            MarkMethod::from_code(method).ok_or_else(|| AppError::InvalidMethod(method.clone()))?;

        let mut buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;
        let probe = Probe::new(cfg, &api);

        let result = SubmissionFacade::new(&mut buffer, &api, &probe)
            .offline_enabled(cfg.offline_enabled)
            .submit(exam, student, status, method);

        let conn = buffer.storage().conn();
        let target = format!("exam {} student {}", exam, student);

        match result {
            Ok(SubmitOutcome::Confirmed { status, .. }) => {
                success(format!(
                    "Student {} marked {}{}{} for exam {}",
                    student,
                    color_for_status(Some(status.as_str())),
                    status.as_str(),
                    RESET,
                    exam
                ));
                ttlog_soft(conn, "mark", &target, status.as_str());
            }
            Ok(SubmitOutcome::SavedOffline(reason)) => {
                offline(offline_notice(
                    &format!("Student {} {}", student, status.as_str()),
                    &reason,
                ));
                ttlog_soft(
                    conn,
                    "mark_offline",
                    &target,
                    &format!("{} ({})", status.as_str(), method.as_str()),
                );
            }
            Err(e) => {
                audit_failure(conn, &target, &e);
                return Err(e);
            }
        }
    }

    Ok(())
}
