// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{
    fs, io,
    net::{IpAddr, Ipv6Addr, SocketAddr},
    path::{Path, PathBuf},
};

use dnsbl_server::{Name, ParseError};
use serde::Deserialize;
use thiserror::Error;

const HOST_VAR: &str = "DNSBL_HOST";
const PORT_VAR: &str = "DNSBL_PORT";
const DOMAIN_VAR: &str = "DNSBL_DOMAIN";
const DIRECTORY_VAR: &str = "DNSBL_DIRECTORY";

/// Configuration of the blocklist.
///
/// Every field has a default, so a configuration file only needs the values that
/// change:
///
/// ```toml
/// host = "0.0.0.0"
/// port = 53
/// domain = "dnsbl.example.com"
/// directory = "/var/lib/dnsbl"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to listen on.
    pub host: IpAddr,
    /// UDP port to listen on.
    pub port: u16,
    /// Domain of the blocklist zone, queries are `<reversed address>.<domain>`.
    pub domain: String,
    /// Directory with one entry per listed address.
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::V6(Ipv6Addr::LOCALHOST),
            port: 5353,
            domain: "dnsbl.gnixl.com".to_string(),
            directory: PathBuf::from("var").join("dnsbl"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read the configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },
    #[error("could not parse the domain name {domain:?}: {source}")]
    Domain {
        domain: String,
        #[source]
        source: ParseError,
    },
    #[error("the blocklist domain can not be empty")]
    EmptyDomain,
}

impl Config {
    /// Read the configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Override the values set in the environment variables `DNSBL_HOST`, `DNSBL_PORT`,
    /// `DNSBL_DOMAIN` and `DNSBL_DIRECTORY`.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(std::env::vars())
    }

    /// Same as [Config::with_env] with the variables taken from `vars`.
    pub fn with_vars<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (var, value) in vars {
            match var.as_str() {
                HOST_VAR => self.host = parse_var(HOST_VAR, value)?,
                PORT_VAR => self.port = parse_var(PORT_VAR, value)?,
                DOMAIN_VAR => self.domain = value,
                DIRECTORY_VAR => self.directory = value.into(),
                _ => {}
            }
        }
        Ok(self)
    }

    /// The socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The blocklist domain as a [Name], it needs at least one label.
    pub fn suffix(&self) -> Result<Name<'_>, ConfigError> {
        let suffix = Name::try_from(self.domain.as_str()).map_err(|source| ConfigError::Domain {
            domain: self.domain.clone(),
            source,
        })?;
        if suffix.label_count() == 0 {
            return Err(ConfigError::EmptyDomain);
        }
        Ok(suffix)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Env { var, value })
}
