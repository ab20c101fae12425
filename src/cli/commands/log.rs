use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log {
        print: true,
        operation,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;
        run_pending_migrations(&pool.conn)?;
        LogLogic::print_log(&mut pool, operation.as_deref())?;
    }

    Ok(())
}
