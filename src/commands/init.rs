use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` file using `api_url` along with default settings
/// - Creates the SQLite store that holds challenges and favorites
///
/// # Arguments
/// - `spend_home` - The directory that will be the root of data directory, e.g. `$HOME/spendwise`
/// - `api_url` - The URL of the backend's expenses resource. Defaults to
///   `http://localhost:8080/api/expenses`.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operations fail.
pub async fn init(spend_home: &Path, api_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(spend_home, api_url).await?;
    Ok(format!(
        "Successfully created the spendwise directory at {} using {}",
        config.root().display(),
        config.api_url()
    )
    .into())
}
