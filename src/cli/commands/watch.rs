use crate::cli::commands::sync;
use crate::cli::context::{Probe, http_api, open_buffer};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::buffer::WriteBuffer;
use crate::core::connectivity::{ConnectivityMonitor, Transition};
use crate::core::reconcile::ReconciliationDriver;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, offline, success};
use std::thread;
use std::time::Duration;

/// Poll reachability and replay the buffer on every offline → online edge.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch {
        interval,
        max_polls,
    } = cmd
    {
        let interval = Duration::from_secs(interval.unwrap_or(cfg.probe_interval_secs));

        let mut buffer = open_buffer(cfg)?;
        let api = http_api(cfg, buffer.storage())?;
        let probe = Probe::new(cfg, &api);
        let driver = ReconciliationDriver::new(cfg.reconcile_mode);

        let mut monitor = ConnectivityMonitor::from_probe(&probe);
        info(format!(
            "Watching {} every {}s, currently {}. Ctrl+C to stop.",
            api.base_url(),
            interval.as_secs(),
            monitor.state()
        ));

        if monitor.state().is_online() && buffer.has_unsynced_data()? {
            info("Records are waiting: run `invigilator sync` to send them now.");
        }

        let mut polls: u64 = 0;
        loop {
            if let Some(max) = max_polls
                && polls >= *max
            {
                break;
            }
            thread::sleep(interval);
            polls += 1;

            let Some(transition) = monitor.poll(&probe) else {
                continue;
            };

            match transition {
                Transition::WentOffline => {
                    offline("You are offline. Changes will be saved locally.");
                    ttlog_soft(buffer.storage().conn(), "offline", api.base_url(), "Connection lost");
                }
                Transition::CameOnline => {
                    success("Connection restored.");
                    ttlog_soft(buffer.storage().conn(), "online", api.base_url(), "Connection restored");

                    match driver.on_transition(transition, &mut buffer, &api) {
                        Ok(Some(outcome)) => sync::report(buffer.storage().conn(), &outcome),
                        Ok(None) => {}
                        Err(e) => error(format!("Sync failed: {}", e)),
                    }
                }
            }
        }

        info(format!("Stopped after {} probe(s), {}.", polls, monitor.state()));
    }

    Ok(())
}
