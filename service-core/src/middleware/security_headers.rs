use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Prefix of the JSON API; everything else may be an HTML page or static asset.
const API_PREFIX: &str = "/api/";

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_api_route = req.uri().path().starts_with(API_PREFIX);

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    if is_api_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
    } else {
        // Pages and bundled assets load scripts, styles and images from our own origin.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 img-src 'self' data:; \
                 style-src 'self' 'unsafe-inline'; \
                 frame-ancestors 'none'",
            ),
        );
    }

    response
}
