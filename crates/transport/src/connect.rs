use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::SessionError;
use crate::options::SessionOptions;

/// Opens the control connection to `host`.
///
/// Every resolved address is tried in order and the first that accepts wins.
/// The I/O timeout from `options` is applied to the returned stream.
pub(crate) fn connect_control(
    host: &str,
    options: &SessionOptions,
) -> Result<TcpStream, SessionError> {
    let addresses = resolve(host, options.port())?;
    let mut last_error: Option<(SocketAddr, io::Error)> = None;

    for candidate in addresses {
        match open_stream(candidate, options.connect_timeout()) {
            Ok(stream) => {
                apply_io_timeout(&stream, options.io_timeout()).map_err(|source| {
                    SessionError::Connect {
                        addr: candidate,
                        source,
                    }
                })?;
                return Ok(stream);
            }
            Err(error) => last_error = Some((candidate, error)),
        }
    }

    match last_error {
        Some((addr, source)) => Err(SessionError::Connect { addr, source }),
        None => Err(SessionError::NoAddresses {
            host: host.to_owned(),
        }),
    }
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, SessionError> {
    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    (trimmed, port)
        .to_socket_addrs()
        .map(Iterator::collect)
        .map_err(|source| SessionError::Resolve {
            host: host.to_owned(),
            source,
        })
}

/// Opens a TCP stream with keepalive enabled, so a host that vanishes while
/// a long-running command executes is eventually noticed.
pub(crate) fn open_stream(target: SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(target), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_keepalive(true)?;

    let address = SockAddr::from(target);
    if let Some(duration) = timeout {
        socket.connect_timeout(&address, duration)?;
    } else {
        socket.connect(&address)?;
    }

    Ok(socket.into())
}

pub(crate) fn apply_io_timeout(stream: &TcpStream, timeout: Option<Duration>) -> io::Result<()> {
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)
}
