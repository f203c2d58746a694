//! Best-effort local network address discovery.
//!
//! Absence of a LAN address is an expected outcome (no network, no route),
//! never an error; callers get an `Option` and degrade to telling the
//! operator how to look the address up themselves.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Discover the IPv4 address other machines on the LAN would reach us at.
///
/// Connecting a UDP socket performs a routing lookup without sending a
/// single packet, so this works offline-friendly and firewall-friendly.
pub fn lan_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// Render the connection info shown after Start and by the info command.
pub fn connection_summary(port: u16) -> String {
    render_summary(lan_ipv4(), port)
}

/// Pure rendering half of `connection_summary`, split out for tests.
pub fn render_summary(lan: Option<Ipv4Addr>, port: u16) -> String {
    let mut lines = vec![
        "The content shelf is reachable at:".to_string(),
        format!("  this machine:  http://127.0.0.1:{port}/"),
    ];
    match lan {
        Some(ip) => lines.push(format!("  local network: http://{ip}:{port}/")),
        None => lines.push(format!(
            "  local network: no address discovered; check this machine's IP \
             in your network settings and use http://<that address>:{port}/"
        )),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_always_shows_loopback() {
        let summary = render_summary(None, 8080);
        assert!(summary.contains("http://127.0.0.1:8080/"));
    }

    #[test]
    fn test_summary_shows_lan_when_discovered() {
        let summary = render_summary(Some(Ipv4Addr::new(192, 168, 1, 20)), 8080);
        assert!(summary.contains("http://192.168.1.20:8080/"));
        assert!(!summary.contains("no address discovered"));
    }

    #[test]
    fn test_summary_degrades_without_lan() {
        let summary = render_summary(None, 9000);
        assert!(summary.contains("no address discovered"));
        assert!(summary.contains(":9000/"));
    }

    #[test]
    fn test_lan_discovery_never_panics() {
        let _ = lan_ipv4();
    }
}
