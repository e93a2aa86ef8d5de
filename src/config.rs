//! Connection settings.
//!
//! Sources, highest precedence first: command-line flags, `OS_*` /
//! `SERVICE_*` environment variables (both handled by clap), then an
//! optional YAML or JSON settings file. Settings are only validated when a
//! command actually needs the remote client.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::client::http::{AuthOptions, PasswordAuth};
use crate::errors::{ShellError, ShellResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_name: Option<String>,
    pub tenant_id: Option<String>,
    pub auth_url: Option<String>,
    pub region_name: Option<String>,
    pub token: Option<String>,
    pub endpoint: Option<String>,
}

impl Settings {
    /// Read a settings file; `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            serde_yaml::from_str(&raw).context("failed to parse YAML settings file")
        } else {
            serde_json::from_str(&raw).context("failed to parse JSON settings file")
        }
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            tenant_name: self.tenant_name.or(fallback.tenant_name),
            tenant_id: self.tenant_id.or(fallback.tenant_id),
            auth_url: self.auth_url.or(fallback.auth_url),
            region_name: self.region_name.or(fallback.region_name),
            token: self.token.or(fallback.token),
            endpoint: self.endpoint.or(fallback.endpoint),
        }
    }

    /// Token mode when a token or endpoint is given, password mode otherwise.
    pub fn into_auth(self) -> ShellResult<AuthOptions> {
        if self.token.is_some() || self.endpoint.is_some() {
            let (Some(token), Some(endpoint)) = (self.token, self.endpoint) else {
                return Err(ShellError::Config(
                    "--os-token and --os-endpoint must be given together \
                     (or SERVICE_TOKEN and SERVICE_ENDPOINT)"
                        .into(),
                ));
            };
            return Ok(AuthOptions::Token {
                token,
                endpoint: parse_url("--os-endpoint", &endpoint)?,
            });
        }

        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("--os-username or OS_USERNAME");
        }
        if self.password.is_none() {
            missing.push("--os-password or OS_PASSWORD");
        }
        if self.auth_url.is_none() {
            missing.push("--os-auth-url or OS_AUTH_URL");
        }
        let (Some(username), Some(password), Some(auth_url)) =
            (self.username, self.password, self.auth_url)
        else {
            return Err(ShellError::Config(format!(
                "you must provide {}",
                missing.join(", ")
            )));
        };

        Ok(AuthOptions::Password(PasswordAuth {
            username,
            password,
            tenant_name: self.tenant_name,
            tenant_id: self.tenant_id,
            auth_url: parse_url("--os-auth-url", &auth_url)?,
            region_name: self.region_name,
        }))
    }
}

fn parse_url(flag: &str, raw: &str) -> ShellResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ShellError::Config(format!("invalid URL for {flag} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ShellError::Config(format!(
            "unsupported scheme '{other}' for {flag}; expected http or https"
        ))),
    }
}
