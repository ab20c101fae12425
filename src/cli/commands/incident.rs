use crate::cli::context::{Probe, audit_failure, http_api, offline_notice, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::submission::{IncidentOutcome, SubmissionFacade};
use crate::db::log::ttlog_soft;
use crate::errors::{AppError, AppResult};
use crate::models::incident::{Incident, IncidentCategory, IncidentSeverity};
use crate::ui::messages::{offline, success};
use crate::utils::formatting::student_or_general;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Incident {
        exam,
        category,
        severity,
        description,
        student,
    } = cmd
    {
        let incident = Incident {
            student_id: student.clone().filter(|s| !s.trim().is_empty()),
            category: IncidentCategory::from_code(category)
                .ok_or_else(|| AppError::InvalidCategory(category.clone()))?,
            severity: IncidentSeverity::from_code(severity)
                .ok_or_else(|| AppError::InvalidSeverity(severity.clone()))?,
            description: description.trim().to_string(),
        };

        if incident.description.is_empty() {
            return Err(AppError::Other("Incident description is empty".into()));
        }

        let mut buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;
        let probe = Probe::new(cfg, &api);

        let result = SubmissionFacade::new(&mut buffer, &api, &probe)
            .offline_enabled(cfg.offline_enabled)
            .report_incident(exam, &incident);

        let conn = buffer.storage().conn();
        let target = format!(
            "exam {} {}",
            exam,
            student_or_general(incident.student_id.as_deref())
        );
        let what = format!(
            "{} {}",
            incident.severity.as_str(),
            incident.category.as_str()
        );

        match result {
            Ok(IncidentOutcome::Reported(view)) => {
                match view.id {
                    Some(id) => success(format!("Incident #{} reported ({})", id, what)),
                    None => success(format!("Incident reported ({})", what)),
                }
                ttlog_soft(conn, "incident", &target, &what);
            }
            Ok(IncidentOutcome::SavedOffline(reason)) => {
                offline(offline_notice(&format!("Incident {}", what), &reason));
                ttlog_soft(conn, "incident_offline", &target, &what);
            }
            Err(e) => {
                audit_failure(conn, &target, &e);
                return Err(e);
            }
        }
    }

    Ok(())
}
