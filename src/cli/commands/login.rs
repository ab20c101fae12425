use crate::api::http::HttpApi;
use crate::api::session::Session;
use crate::cli::context::open_storage;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Login { username, password } = cmd {
        let mut storage = open_storage(cfg)?;
        let api = HttpApi::new(&cfg.api_base_url, cfg.request_timeout_ms, None)?;

        let login = api.login(username, password)?;
        let user = Session::store(&mut storage, &login)?;

        match &user.role {
            Some(role) => success(format!("Logged in as {} ({})", user.display_name(), role)),
            None => success(format!("Logged in as {}", user.display_name())),
        }

        ttlog_soft(storage.conn(), "login", &user.username, api.base_url());
    }

    Ok(())
}
