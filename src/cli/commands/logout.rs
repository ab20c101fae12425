use crate::api::session::Session;
use crate::cli::context::{http_api, open_storage};
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

/// Tell the server, then forget the token whatever it answered.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let mut storage = open_storage(cfg)?;

    let Some(user) = Session::user(&storage)? else {
        if Session::token(&storage)?.is_none() {
            info("Not logged in.");
            return Ok(());
        }
        Session::clear(&mut storage)?;
        success("Session cleared.");
        return Ok(());
    };

    if !cfg.force_offline {
        let api = http_api(cfg, &storage)?;
        if let Err(e) = api.logout() {
            warning(format!("Server logout failed ({}); local session dropped anyway", e));
        }
    }

    Session::clear(&mut storage)?;
    success(format!("Logged out {}", user.display_name()));
    ttlog_soft(storage.conn(), "logout", &user.username, "Session token removed");

    Ok(())
}
