use crate::cli::args::{CliArgs, Command};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(raw) = args.database_url.as_deref() {
        reqwest::Url::parse(raw.trim())
            .map_err(|e| format!("invalid --database-url '{raw}': {e}"))?;
    }
    if let Some(raw) = args.proxy.as_deref() {
        if !raw.trim().is_empty() {
            reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --proxy '{raw}': {e}"))?;
        }
    }
    match args.command.as_ref() {
        Some(Command::List {
            format: Some(raw), ..
        }) => {
            crate::view::OutputFormat::parse(raw)
                .ok_or_else(|| format!("invalid --format '{raw}', expected table or json"))?;
        }
        Some(Command::Delete { id }) => {
            crate::store::validate_key(id).map_err(|e| e.to_string())?;
        }
        _ => {}
    }
    Ok(())
}
