//! Security headers middleware
//!
//! Stamps security headers onto every response. The API serves credentials
//! in a cookie and feeds unauthenticated kiosk/display pages, so framing
//! and MIME sniffing are both locked down; HSTS is added only when the
//! deployment actually speaks HTTPS (production mode).
//!
//! Wired into the router with `axum::middleware::from_fn_with_state`, the
//! state being the production flag.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// Applies the security header set; `hsts` carries the production flag
pub async fn security_headers(
    State(hsts): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if hsts {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
