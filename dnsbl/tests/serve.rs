// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs;
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use dnsbl::{store::Directory, Dnsbl};
use dnsbl_server::{Name, Server};

fn query(id: u16, flags: u16, labels: &[&str]) -> Vec<u8> {
    let mut out = vec![];
    for n in [id, flags, 1, 0, 0, 0] {
        out.extend(n.to_be_bytes());
    }
    for label in labels {
        out.push(label.len() as u8);
        out.extend(label.as_bytes());
    }
    out.extend([0, 0, 1, 0, 1]);
    out
}

#[test]
fn serve_directory_blocklist() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("127.0.0.2"), b"spam source").unwrap();

    let listed = query(0x0a0b, 0x0100, &["2", "0", "0", "127", "bl", "example", "org"]);
    let unlisted = query(0x0c0d, 0x0120, &["3", "0", "0", "127", "bl", "example", "org"]);
    let malformed = query(0x0e0f, 0x8100, &["2", "0", "0", "127", "bl", "example", "org"]);

    // One datagram without an id is dropped, the others are answered
    let server = Server::default()
        .requests(4)
        .bind("127.0.0.1:0".parse().unwrap())
        .unwrap();
    let addr = server.local_addr().unwrap();
    let store = Directory::new(dir.path());

    thread::scope(|s| {
        let handle = s.spawn(|| {
            let service = Dnsbl::new(Name::try_from("bl.example.org").unwrap(), store);
            server.serve(service)
        });

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut buff = [0u8; 512];

        client.send_to(&listed, addr).unwrap();
        let (n, _) = client.recv_from(&mut buff).unwrap();
        let mut expected = vec![0x0a, 0x0b, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        expected.extend(&listed[12..listed.len() - 4]);
        expected.extend([0, 1, 0, 1, 0xC0, 0x0C]);
        assert_eq!(&buff[..n], &expected[..]);

        client.send_to(&[0x42], addr).unwrap();

        client.send_to(&unlisted, addr).unwrap();
        let (n, _) = client.recv_from(&mut buff).unwrap();
        assert_eq!(&buff[..n], &[0x0c, 0x0d, 0x81, 0x83]);

        client.send_to(&malformed, addr).unwrap();
        let (n, _) = client.recv_from(&mut buff).unwrap();
        assert_eq!(&buff[..n], &[0x0e, 0x0f, 0x81, 0x83]);

        handle.join().unwrap().unwrap();
    });
}
