// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations)]

use std::fmt::Display;
use std::net::IpAddr;
use std::path::PathBuf;

use argh::FromArgs;
use dnsbl::{config::Config, store::Directory, Dnsbl};
use dnsbl_server::Server;
use owo_colors::OwoColorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, FromArgs)]
/// Answer DNS blocklist queries for the IPv4 addresses listed in a directory
struct DnsblArgs {
    /// configuration file in TOML
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,
    /// ip to listen to
    #[argh(option, short = 'i')]
    ip: Option<IpAddr>,
    /// UDP port to listen to
    #[argh(option, short = 'p')]
    port: Option<u16>,
    /// domain of the blocklist zone
    #[argh(option, short = 'd')]
    domain: Option<String>,
    /// directory with one entry per listed address
    #[argh(option, short = 's')]
    store: Option<PathBuf>,
    /// log every datagram
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() {
    let args: DnsblArgs = argh::from_env();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => fail("could not load the configuration", e),
    };
    let suffix = match config.suffix() {
        Ok(suffix) => suffix,
        Err(e) => fail("invalid blocklist domain", e),
    };

    let store = Directory::new(&config.directory);
    if !store.root().is_dir() {
        warn!(directory = %store.root().display(), "blocklist directory not found, nothing is listed");
    }

    let server = match Server::default().bind(config.listen_addr()) {
        Ok(server) => server,
        Err(e) => fail("could not bind to the specified interface or port", e),
    };
    info!(
        addr = %config.listen_addr(),
        domain = %config.domain,
        directory = %config.directory.display(),
        "listening"
    );

    if let Err(e) = server.serve(Dnsbl::new(suffix, store)) {
        fail("the server stopped", e)
    }
    info!("shutting down");
}

/// Defaults, then the configuration file, then the environment, then the command line.
fn load_config(args: &DnsblArgs) -> Result<Config, dnsbl::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env()?;

    if let Some(ip) = args.ip {
        config.host = ip;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(domain) = &args.domain {
        config.domain = domain.clone();
    }
    if let Some(store) = &args.store {
        config.directory = store.clone();
    }
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(msg: &str, e: impl Display) -> ! {
    eprintln!("{}: {}.\n\n{}", "ERROR".red(), msg, e);
    std::process::exit(1)
}
