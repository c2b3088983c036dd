use actix_web::HttpRequest;

/// 访客标识: X-Forwarded-For 的第一个地址，否则取连接对端 IP
///
/// 非加密身份，可被伪造，仅用于低风险活动
pub fn visitor_id(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1"))
            .to_http_request();
        assert_eq!(visitor_id(&req), "203.0.113.7");
    }

    #[test]
    fn test_peer_address_without_port() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.20:51234".parse().unwrap())
            .to_http_request();
        assert_eq!(visitor_id(&req), "192.168.1.20");
    }

    #[test]
    fn test_empty_header_falls_back() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", ""))
            .to_http_request();
        assert_eq!(visitor_id(&req), "unknown");
    }
}
