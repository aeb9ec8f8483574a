use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::api::DEFAULT_API_URL;

/// Runtime settings: built-in defaults, then an optional file, then
/// `QUIZ_ADMIN_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the admin UI listens on.
    pub listen: String,
    /// Base URL of the quiz admin API.
    pub api_url: String,
    /// Mark the session cookie `Secure`. Needed whenever the UI is served over HTTPS.
    pub secure_cookies: bool,
    /// Minutes an admin's page state is kept without any request.
    pub session_idle_minutes: u64,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("listen", "0.0.0.0:8080")?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("secure_cookies", false)?
            .set_default("session_idle_minutes", 30)?;
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file));
        }
        let settings: Settings = builder
            .add_source(config::Environment::with_prefix("QUIZ_ADMIN").try_parsing(true))
            .build()?
            .try_deserialize()
            .context("Invalid configuration")?;
        let url = reqwest::Url::parse(&settings.api_url)
            .with_context(|| format!("api_url {} is not a valid URL", settings.api_url))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "api_url {} must be an http(s) URL",
            settings.api_url
        );
        Ok(settings)
    }
}
