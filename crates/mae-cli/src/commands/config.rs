use std::process::ExitCode;

use anyhow::Result;

use super::{App, output};

/// Shows the stored configuration, or saves a new backend URL.
pub fn run(app: &App, url: Option<&str>) -> Result<ExitCode> {
    let service = app.config_service();

    match url {
        Some(url) => {
            let config = service.save_backend_url(url)?;
            output::success(&format!("Backend enregistré: {}", config.api_base()));
        }
        None => match service.load_file()? {
            Some(config) => {
                println!("backend_url          = {}", config.backend_url);
                println!("api_prefix           = {}", config.api_prefix);
                println!("request_timeout_secs = {}", config.request_timeout_secs);
            }
            None => output::info("Aucune configuration enregistrée"),
        },
    }
    Ok(ExitCode::SUCCESS)
}
