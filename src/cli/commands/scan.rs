use crate::cli::context::{Probe, audit_failure, cache_roster, cached_roster, http_api, offline_notice, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::scan::{ScanOutcome, ScanSession};
use crate::core::submission::{SubmissionFacade, SubmitOutcome};
use crate::db::log::ttlog_soft;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{header, info, offline, success, warning};
use crate::utils::path::expand_tilde;
use crate::utils::time::now_millis;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Scan {
        exam,
        input,
        cooldown_ms,
    } = cmd
    {
        let mut buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;
        let probe = Probe::new(cfg, &api);

        let roster = if cfg.force_offline {
            cached_roster(buffer.storage(), exam)?
        } else {
            match api.students_for_exam(exam) {
                Ok(students) => {
                    cache_roster(buffer.storage_mut(), exam, &students);
                    students
                }
                Err(e) if e.is_remote_failure() => {
                    warning(format!("Server unreachable ({}); using cached roster", e));
                    cached_roster(buffer.storage(), exam)?
                }
                Err(e) => return Err(e),
            }
        };

        let reader: Box<dyn BufRead> = match input {
            Some(path) => Box::new(BufReader::new(File::open(expand_tilde(path))?)),
            None => Box::new(BufReader::new(io::stdin())),
        };

        let audit = DbPool::new(&cfg.database)?;
        let mut session = ScanSession::new(
            exam,
            roster,
            cooldown_ms.unwrap_or(cfg.scan_cooldown_ms),
        );

        header(format!(
            "Scanning for exam {} ({} students), one barcode per line",
            session.exam_id(),
            session.roster_len()
        ));

        let mut facade = SubmissionFacade::new(&mut buffer, &api, &probe)
            .offline_enabled(cfg.offline_enabled);

        for line in reader.lines() {
            let code = line?;
            let target = format!("exam {} barcode {}", exam, code.trim());

            let outcome = match session.handle_code(&code, now_millis(), &mut facade) {
                Ok(o) => o,
                Err(e) => {
                    audit_failure(&audit.conn, &target, &e);
                    return Err(e);
                }
            };

            match outcome {
                ScanOutcome::Marked { student, outcome } => {
                    let who = format!("{} ({})", student.full_name, student.student_id);
                    match outcome {
                        SubmitOutcome::Confirmed { status, .. } => {
                            success(format!("{} marked {}", who, status.as_str()));
                            ttlog_soft(&audit.conn, "mark", &target, "PRESENT (SCAN)");
                        }
                        SubmitOutcome::SavedOffline(reason) => {
                            offline(offline_notice(&who, &reason));
                            ttlog_soft(&audit.conn, "mark_offline", &target, "PRESENT (SCAN)");
                        }
                    }
                }
                ScanOutcome::UnknownStudent(code) => {
                    warning(format!("Student not found for barcode {}", code));
                }
                ScanOutcome::AlreadyScanned(student) => {
                    info(format!("{} already scanned", student.full_name));
                }
                ScanOutcome::CoolingDown => {
                    warning(format!("Scan ignored, wait a moment: {}", code.trim()));
                }
                ScanOutcome::Ignored => {}
            }
        }

        let remaining = session.remaining();
        println!();
        info(format!(
            "{}/{} scanned, {} remaining",
            session.scanned_count(),
            session.roster_len(),
            remaining.len()
        ));
        for s in remaining {
            println!("   - {} ({})", s.full_name, s.student_id);
        }
    }

    Ok(())
}
