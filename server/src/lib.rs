// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DNSBL server
//!
//! A UDP [Server] that hands every datagram it receives to a [ServerService] and
//! sends back whatever reply the service produces.
//!
//! ```no_run
//! use dnsbl_server::{Server, ServerService};
//! use std::net::SocketAddr;
//!
//! struct Echo;
//!
//! impl ServerService for Echo {
//!     fn run(&self, _client: SocketAddr, datagram: &[u8]) -> Option<Vec<u8>> {
//!         Some(datagram.to_vec())
//!     }
//! }
//!
//! Server::default()
//!         .bind("127.0.0.1:5353".parse().unwrap())
//!         .unwrap()
//!         .serve(Echo)
//!         .unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    rustdoc::broken_intra_doc_links
)]

use std::{
    io, marker,
    net::{SocketAddr, UdpSocket},
};

use tracing::{debug, trace};

pub use dnsbl_parser::body::name::*;
pub use dnsbl_parser::body::*;
pub use dnsbl_parser::header::*;
pub use dnsbl_parser::*;

/// Datagrams bigger than this are truncated when received.
pub const MAX_DATAGRAM_SIZE: usize = 512;

/// A DNS service, it receives the raw datagram of a query and returns the reply to
/// be sent to the client, if any.
///
/// The datagram is handed over unparsed so that even malformed queries can be
/// answered.
///
/// ```rust
/// use dnsbl_server::ServerService;
/// use std::net::SocketAddr;
///
/// struct Silent;
///
/// impl ServerService for Silent {
///     fn run(&self, _client: SocketAddr, _datagram: &[u8]) -> Option<Vec<u8>> { None }
/// }
/// ```
pub trait ServerService {
    /// Take the datagram sent by `client` and return the reply for it.
    fn run(&self, client: SocketAddr, datagram: &[u8]) -> Option<Vec<u8>>;
}

#[doc(hidden)]
#[derive(Clone, Copy, Debug)]
pub struct Builder;
#[doc(hidden)]
#[derive(Clone, Copy, Debug)]
pub struct Runner;

/// A single threaded DNS server: every datagram is answered before the next one is received.
#[derive(Debug)]
pub struct Server<S> {
    requests: Option<usize>,
    socket: Option<UdpSocket>,
    typestate: marker::PhantomData<S>,
}

impl Default for Server<Builder> {
    fn default() -> Self {
        Server {
            requests: None,
            socket: None,
            typestate: marker::PhantomData,
        }
    }
}

impl Server<Builder> {
    /// Stop serving after `n` datagrams have been received. By default the server
    /// runs until the socket fails.
    pub fn requests(mut self, n: usize) -> Self {
        self.requests = Some(n);
        self
    }

    /// Bind to a [SocketAddr] to listen for queries.
    pub fn bind(self, addr: SocketAddr) -> Result<Server<Runner>, io::Error> {
        Ok(Server {
            requests: self.requests,
            socket: Some(UdpSocket::bind(addr)?),
            typestate: marker::PhantomData::<Runner>,
        })
    }
}

impl Server<Runner> {
    /// The address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.socket().local_addr()
    }

    /// Run the [ServerService] until the request limit is reached.
    ///
    /// # Errors
    ///
    /// Errors when receiving from or sending to the socket stop the server and are
    /// returned.
    pub fn serve<T>(self, srv: T) -> Result<(), io::Error>
    where
        T: ServerService,
    {
        let socket = self.socket();
        let mut buff = [0; MAX_DATAGRAM_SIZE];
        let mut served = 0usize;
        while self.requests.map_or(true, |n| served < n) {
            let (n, src) = socket.recv_from(&mut buff)?;
            served += 1;
            trace!(client = %src, size = n, "datagram received");
            match srv.run(src, &buff[..n]) {
                Some(res) => {
                    socket.send_to(&res[..], src)?;
                }
                None => debug!(client = %src, "no reply for datagram"),
            }
        }
        debug!(served, "request limit reached");
        Ok(())
    }

    fn socket(&self) -> &UdpSocket {
        self.socket
            .as_ref()
            .expect("Runners can only be created with a active socket")
    }
}
