use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

/// Address the request came from, honouring `Forwarded` / `X-Forwarded-For`.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info().realip_remote_addr().map(strip_port)
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn strips_ports() {
        assert_eq!(strip_port("10.1.2.3:5555"), "10.1.2.3");
        assert_eq!(strip_port("[::1]:8080"), "::1");
        assert_eq!(strip_port("10.1.2.3"), "10.1.2.3");
        assert_eq!(strip_port("unknown"), "unknown");
    }

    #[test]
    fn prefers_forwarded_header() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("127.0.0.1"));
    }
}
