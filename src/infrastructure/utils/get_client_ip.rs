use actix_web::HttpRequest;

/// Extract the caller's network address, used both as the rate-limit key
/// and as the `uploader_ip` stored with a photo record. The service runs
/// behind a reverse proxy in deployment, so a forwarded header wins over
/// the peer address.
pub fn get_client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            let first = s.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
