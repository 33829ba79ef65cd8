//! Minimal REST client used to notify a voice-channel node of a pending
//! transmission: one hand-rolled `PUT /permit-tg` over a raw TCP socket,
//! since the engine has no other use for an HTTP stack worth a crate.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Serialize;

use crate::error::{P25Error, Result};
use crate::handler::PermitNotifier;
use crate::tsbk::Channel;

#[derive(Serialize)]
struct PermitTgBody {
    state: u8,
    #[serde(rename = "dstId")]
    dst_id: u32,
}

/// `state` value meaning "permit this destination to transmit", matching
/// the voice-channel node's REST contract.
pub const PERMIT_STATE: u8 = 5;

/// Issue `PUT /permit-tg {"state":5,"dstId":<dst_id>}` to `addr`, waiting
/// up to `timeout` for a response whose status line starts with `HTTP/` and
/// a `2xx` code.
pub fn permit_tg<A: ToSocketAddrs>(addr: A, dst_id: u32, timeout: Duration) -> Result<()> {
    let body = serde_json::to_vec(&PermitTgBody { state: PERMIT_STATE, dst_id })
        .map_err(|_| P25Error::RestPermitFail)?;

    let target = addr.to_socket_addrs().map_err(|_| P25Error::RestPermitFail)?.next().ok_or(P25Error::RestPermitFail)?;

    let mut stream = TcpStream::connect_timeout(&target, timeout).map_err(|_| P25Error::RestPermitFail)?;
    stream.set_read_timeout(Some(timeout)).map_err(|_| P25Error::RestPermitFail)?;
    stream.set_write_timeout(Some(timeout)).map_err(|_| P25Error::RestPermitFail)?;

    let request = format!(
        "PUT /permit-tg HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        target, body.len()
    );

    stream.write_all(request.as_bytes()).map_err(|_| P25Error::RestPermitFail)?;
    stream.write_all(&body).map_err(|_| P25Error::RestPermitFail)?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).map_err(|_| P25Error::RestPermitFail)?;

    let status_line = response
        .split(|&b| b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim().to_owned())
        .unwrap_or_default();

    let status_ok = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .map(|code| (200..300).contains(&code))
        .unwrap_or(false);

    if status_ok {
        Ok(())
    } else {
        log::warn!("permit-tg to {} failed: {:?}", target, status_line);
        Err(P25Error::RestPermitFail)
    }
}

/// [`PermitNotifier`] implementation backed by a real `PUT /permit-tg`
/// call. Channel-number-to-address resolution is supplied by the caller
/// (`resolve`), since that mapping is owned by the external config/CLI
/// collaborator, not the core.
pub struct RestPermitNotifier<F> {
    pub resolve: F,
    pub timeout: Duration,
}

impl<F: Fn(Channel) -> Option<SocketAddr>> PermitNotifier for RestPermitNotifier<F> {
    fn permit_tg(&self, channel: Channel, dst_id: u32) -> bool {
        match (self.resolve)(channel) {
            Some(addr) => permit_tg(addr, dst_id, self.timeout).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::BufRead;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_permit_tg_round_trip_against_loopback_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(sock.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            assert!(request_line.starts_with("PUT /permit-tg"));

            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").unwrap();
        });

        permit_tg(addr, 4001, Duration::from_secs(2)).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_permit_tg_error_status_is_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(sock.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            sock.write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n").unwrap();
        });

        assert!(permit_tg(addr, 4001, Duration::from_secs(2)).is_err());
        handle.join().unwrap();
    }

    #[test]
    fn test_rest_permit_notifier_resolves_and_calls() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(sock.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").unwrap();
        });

        let notifier = RestPermitNotifier { resolve: move |_ch: Channel| Some(addr), timeout: Duration::from_secs(2) };
        assert!(notifier.permit_tg(Channel { id: 1, no: 100 }, 4001));
        handle.join().unwrap();
    }

    #[test]
    fn test_rest_permit_notifier_fails_when_unresolvable() {
        let notifier = RestPermitNotifier { resolve: |_ch: Channel| None, timeout: Duration::from_secs(1) };
        assert!(!notifier.permit_tg(Channel { id: 1, no: 100 }, 4001));
    }
}
