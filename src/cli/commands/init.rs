use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::ttlog_soft;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped with `--test`)
///  - the SQLite database holding the offline buffer and the audit log
///  - all pending DB migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing invigilator…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database    : {}", cfg.database);
    println!("🌐 API         : {}", cli.api.as_deref().unwrap_or(&cfg.api_base_url));

    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    success(format!("Database initialized at {}", cfg.database));

    ttlog_soft(
        &pool.conn,
        "init",
        &cfg.database,
        "Database and offline storage initialized",
    );

    println!("🎉 invigilator is ready. Log in with `invigilator login <username> <password>`.");
    Ok(())
}
