use actix_web::{
    body::MessageBody,
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use log::debug;

use crate::config::FrontendConfig;

pub fn frontend_config() -> FrontendConfig {
    FrontendConfig {
        checkout_url: "http://frontend/checkout/".to_string(),
        cancel_url: "http://frontend/cart".to_string(),
        error_url: "http://frontend/error".to_string(),
    }
}

/// Runs a single request against an app assembled by `configure` and returns the status, headers and body.
pub async fn send_request(
    req: TestRequest,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, HeaderMap, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let headers = res.headers().clone();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, headers, body)
}

pub fn location_of(headers: &HeaderMap) -> String {
    headers.get("Location").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
}
