use crate::api::http::HttpApi;
use crate::cli::context::{http_api, open_storage, require_server};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::path::{default_barcode_file, expand_tilde};
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Barcode {
        student,
        file,
        generate_all,
    } = cmd
    {
        let storage = open_storage(cfg)?;
        let api = http_api(cfg, &storage)?;

        if *generate_all {
            require_server(cfg, "Generating barcodes")?;
            let batch = api.generate_all_barcodes()?;
            let summary = match batch.total {
                Some(total) => format!("{}/{} barcodes generated", batch.generated, total),
                None => format!("{} barcodes generated", batch.generated),
            };
            ttlog_soft(storage.conn(), "barcodes", "all", &summary);
            success(summary);
            if let Some(total) = batch.total
                && batch.generated < total
            {
                info("Some barcodes failed; the server log has the details.");
            }
        } else if let Some(student) = student {
            download(&api, student, file.as_deref())?;
        } else {
            return Err(AppError::Other(
                "Give a student id or --generate-all".into(),
            ));
        }
    }

    Ok(())
}

fn download(api: &HttpApi, student: &str, file: Option<&str>) -> AppResult<()> {
    let bytes = api.download_barcode(student)?;

    let path = match file {
        Some(f) => expand_tilde(f),
        None => default_barcode_file(student),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &bytes)?;

    success(format!(
        "Barcode for {} saved to {} ({} bytes)",
        student,
        path.display(),
        bytes.len()
    ));
    Ok(())
}
