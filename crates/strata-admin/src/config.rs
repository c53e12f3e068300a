//! Connection settings: command-line values win over the environment file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use strata_client::ConnectionConfig;
use thiserror::Error;
use url::Url;

/// Port used when neither the flags nor the environment file name one.
pub(crate) const DEFAULT_PORT: u16 = 1247;

/// Environment file location under `$HOME`.
const ENVIRONMENT_FILE: &str = ".strata/environment.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read environment file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse environment file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no {field} configured; pass --{flag} or set it in the environment file")]
    Missing {
        field: &'static str,
        flag: &'static str,
    },
    #[error("invalid server address")]
    Endpoint(#[from] url::ParseError),
}

/// Client environment file contents. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentFile {
    strata_host: Option<String>,
    strata_port: Option<u16>,
    strata_user_name: Option<String>,
    strata_zone_name: Option<String>,
}

/// Values given on the command line or through `STRATA_*` variables.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) user: Option<String>,
    pub(crate) zone: Option<String>,
    pub(crate) environment_file: Option<PathBuf>,
    pub(crate) timeout: Duration,
}

fn load(path: &Path) -> Result<EnvironmentFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_environment_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    let path = PathBuf::from(home).join(ENVIRONMENT_FILE);
    path.is_file().then_some(path)
}

/// Base URL for `host`, which may already carry a scheme.
pub(crate) fn endpoint(host: &str, port: u16) -> Result<Url, ConfigError> {
    if host.contains("://") {
        let mut url = Url::parse(host)?;
        if url.port().is_none() {
            // Only fails for URLs that cannot carry a port at all.
            url.set_port(Some(port))
                .map_err(|()| url::ParseError::InvalidPort)?;
        }
        Ok(url)
    } else {
        Ok(Url::parse(&format!("http://{host}:{port}"))?)
    }
}

/// Merge the overrides with the environment file into a connection target.
pub(crate) fn resolve(overrides: &Overrides) -> Result<ConnectionConfig, ConfigError> {
    let file_path = overrides
        .environment_file
        .clone()
        .or_else(default_environment_file);
    let file = match &file_path {
        Some(path) => load(path)?,
        None => EnvironmentFile::default(),
    };
    tracing::debug!(environment_file = ?file_path, "resolving connection settings");

    let host = overrides
        .host
        .clone()
        .or(file.strata_host)
        .ok_or(ConfigError::Missing {
            field: "host",
            flag: "host",
        })?;
    let user = overrides
        .user
        .clone()
        .or(file.strata_user_name)
        .ok_or(ConfigError::Missing {
            field: "user name",
            flag: "user",
        })?;
    let zone = overrides
        .zone
        .clone()
        .or(file.strata_zone_name)
        .ok_or(ConfigError::Missing {
            field: "zone",
            flag: "zone",
        })?;
    let port = overrides.port.or(file.strata_port).unwrap_or(DEFAULT_PORT);

    Ok(ConnectionConfig {
        base_url: endpoint(&host, port)?,
        user,
        zone,
        timeout: overrides.timeout,
    })
}
