//! Command-line arguments and their translation into client inputs.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use client::{
    ClientConfig, HeaderMutator, JsonBody, Method, API_KEY_ENV, API_VERSION_ENV, BASE_URL_ENV,
};
use protocol::{ApiVersion, BetaFeature};

/// Send one request to the Anthropic API, directly or through Vertex AI.
#[derive(Parser, Debug)]
#[command(name = "anthropic-probe", version)]
pub struct Args {
    /// API key, or the OAuth access token when targeting Vertex AI
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the direct API (ignored for Vertex AI)
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// Protocol version; a `vertex-` version routes through the gateway
    #[arg(long, env = API_VERSION_ENV)]
    pub api_version: Option<String>,

    /// Google Cloud project hosting the Vertex AI endpoint
    #[arg(long, env = "VERTEX_PROJECT", requires = "vertex_location")]
    pub vertex_project: Option<String>,

    /// Vertex AI region, e.g. us-east5
    #[arg(long, env = "VERTEX_LOCATION", requires = "vertex_project")]
    pub vertex_location: Option<String>,

    /// HTTP method
    #[arg(long, default_value = "POST")]
    pub method: Method,

    /// Endpoint path appended to the base URL
    #[arg(long, default_value = "/messages")]
    pub path: String,

    /// JSON request body file; `-` reads standard input
    #[arg(long, value_name = "FILE")]
    pub body: Option<PathBuf>,

    /// Beta feature to enable (repeatable)
    #[arg(long = "beta", value_name = "FEATURE")]
    pub betas: Vec<String>,

    /// Print the built request instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Builds the client configuration the flags describe.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match (&self.vertex_project, &self.vertex_location) {
            (Some(project), Some(location)) => {
                let token = self.api_key.clone();
                ClientConfig::vertex(project, location, move || token.clone())
            }
            _ => {
                let config = ClientConfig::new(self.api_key.clone());
                match &self.base_url {
                    Some(base_url) => config.with_base_url(base_url.clone()),
                    None => config,
                }
            }
        };

        if let Some(version) = &self.api_version {
            let version = ApiVersion::new(version.clone()).context("--api-version is empty")?;
            config = config.with_api_version(version);
        }

        Ok(config)
    }

    /// Reads and parses the request body, if one was given.
    pub fn request_body(&self) -> anyhow::Result<Option<JsonBody>> {
        let Some(path) = &self.body else {
            return Ok(None);
        };

        let text = if path.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read request body from stdin")?;
            text
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read request body from {}", path.display()))?
        };

        let value = serde_json::from_str(&text).context("request body is not valid JSON")?;
        Ok(Some(JsonBody::from_value(value)?))
    }

    /// Returns the header mutators for the requested beta features.
    ///
    /// All features share one comma-separated `anthropic-beta` header.
    pub fn header_mutators(&self) -> anyhow::Result<Vec<HeaderMutator>> {
        match BetaFeature::new(self.betas.join(",")) {
            Some(feature) => Ok(vec![HeaderMutator::beta(&feature)?]),
            None => Ok(Vec::new()),
        }
    }
}
