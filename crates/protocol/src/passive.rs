use std::net::{Ipv4Addr, SocketAddrV4};

/// Decodes the `h1,h2,h3,h4,p1,p2` tuple carried by a `227` reply.
///
/// The tuple is usually enclosed in parentheses
/// (`Entering Passive Mode (10,0,0,5,195,80).`) but some servers omit them,
/// so the first run of six comma-separated numbers is accepted either way.
#[must_use]
pub fn parse_passive_address(text: &str) -> Option<SocketAddrV4> {
    let bytes = text.as_bytes();
    let start = memchr::memchr(b'(', bytes)
        .map(|index| index + 1)
        .or_else(|| bytes.iter().position(u8::is_ascii_digit))?;
    let tail = &text[start..];
    let end = tail
        .find(|ch: char| !(ch.is_ascii_digit() || ch == ',' || ch == ' '))
        .unwrap_or(tail.len());

    let mut numbers = [0u8; 6];
    let mut count = 0;
    for field in tail[..end].split(',') {
        if count == numbers.len() {
            return None;
        }
        numbers[count] = field.trim().parse().ok()?;
        count += 1;
    }
    if count != numbers.len() {
        return None;
    }

    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = (u16::from(numbers[4]) << 8) | u16::from(numbers[5]);
    Some(SocketAddrV4::new(ip, port))
}
