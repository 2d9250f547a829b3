//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the engine's three seams so that endpoint tests can swap mocks in; actix cannot
//! route to a generic handler by itself, so [`api_scope`] pins the turbofish at registration time.
use actix_web::{get, http::header, web, HttpRequest, HttpResponse, Responder, Scope};
use log::*;
use paypal_tools::WebhookNotification;
use serde_json::Value;
use vs_payment_engine::{
    db_types::NewOrder,
    traits::{ObjectCache, PaymentGateway, ReconciliationStore},
    ReconciliationApi,
    WebhookAck,
};

use crate::{
    config::FrontendConfig,
    data_objects::{CancelParams, CreatePaymentRequest, CreatePaymentResult, NewOrderRequest, ReturnParams},
    errors::ServerError,
};

type Api<B, G, C> = web::Data<ReconciliationApi<B, G, C>>;

/// Everything under `/api`, with the concrete backend types fixed by the caller.
pub fn api_scope<B, G, C>() -> Scope
where
    B: ReconciliationStore + 'static,
    G: PaymentGateway + 'static,
    C: ObjectCache + 'static,
{
    web::scope("/api")
        .service(web::resource("/orders").route(web::post().to(create_order::<B, G, C>)))
        .service(web::resource("/payments/create-payment").route(web::post().to(create_payment::<B, G, C>)))
        .service(web::resource("/payments/return").route(web::get().to(payment_return::<B, G, C>)))
        .service(web::resource("/payments/cancel").route(web::get().to(payment_cancel::<B, G, C>)))
        .service(web::resource("/payments/webhook").route(web::post().to(webhook::<B, G, C>)))
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// The upstream auth layer injects the authenticated user into `X-User-Id`. No header, no service.
fn user_id_from_headers(req: &HttpRequest) -> Result<String, ServerError> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ServerError::InvalidRequestBody("Missing X-User-Id header".to_string()))
}

fn redirect(to: String) -> HttpResponse {
    HttpResponse::Found().insert_header((header::LOCATION, to)).finish()
}

pub async fn create_order<B, G, C>(
    req: HttpRequest,
    body: web::Json<NewOrderRequest>,
    api: Api<B, G, C>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    let user_id = user_id_from_headers(&req)?;
    debug!("💻️ New order request from user {user_id}");
    let order = api.create_order(NewOrder::new(user_id, body.into_inner().items)).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn create_payment<B, G, C>(
    req: HttpRequest,
    body: web::Json<CreatePaymentRequest>,
    api: Api<B, G, C>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    let user_id = user_id_from_headers(&req)?;
    let request = body.into_inner();
    let currency = request.currency.unwrap_or_else(|| "USD".to_string());
    debug!("💻️ Payment intent request from user {user_id} for order #{}", request.order_id);
    let intent = api.create_payment_intent(request.order_id, &user_id, &currency).await?;
    Ok(HttpResponse::Ok().json(CreatePaymentResult::from(intent)))
}

/// The gateway's return redirect. The capture happens here; the shopper ends up back on the storefront no
/// matter what, so failures redirect to the error page rather than surfacing a status code.
pub async fn payment_return<B, G, C>(
    query: web::Query<ReturnParams>,
    api: Api<B, G, C>,
    frontend: web::Data<FrontendConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    let params = query.into_inner();
    let (Some(token), Some(_payer_id)) = (params.token, params.payer_id) else {
        return Err(ServerError::InvalidRequestBody("token and PayerID are required".to_string()));
    };
    match api.handle_return(&token).await {
        Ok(invoice_id) => Ok(redirect(format!("{}{invoice_id}", frontend.checkout_url))),
        Err(e) => {
            error!("💻️ Could not complete the capture of intent {token}. {e}");
            Ok(redirect(frontend.error_url.clone()))
        },
    }
}

pub async fn payment_cancel<B, G, C>(
    query: web::Query<CancelParams>,
    api: Api<B, G, C>,
    frontend: web::Data<FrontendConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    let Some(token) = query.into_inner().token else {
        return Err(ServerError::InvalidRequestBody("token is required".to_string()));
    };
    match api.handle_cancel(&token).await {
        Ok(_) => Ok(redirect(frontend.cancel_url.clone())),
        Err(e) => {
            error!("💻️ Could not record the cancellation of intent {token}. {e}");
            Ok(redirect(frontend.error_url.clone()))
        },
    }
}

/// Webhook deliveries are always answered with 200 so the gateway does not retry forever; the body says what
/// we actually did with the event. A delivery without a transmission signature is dropped before any network
/// call is made.
pub async fn webhook<B, G, C>(req: HttpRequest, body: web::Json<Value>, api: Api<B, G, C>) -> HttpResponse
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    let transmission_sig = header("paypal-transmission-sig");
    if transmission_sig.is_empty() {
        debug!("🪝️ Webhook delivery without a transmission signature. Dropping it.");
        return HttpResponse::Ok().json(WebhookAck::not_received("no-signature"));
    }
    let notification = WebhookNotification {
        auth_algo: header("paypal-auth-algo"),
        cert_url: header("paypal-cert-url"),
        transmission_id: header("paypal-transmission-id"),
        transmission_sig,
        transmission_time: header("paypal-transmission-time"),
        event: body.into_inner(),
    };
    let ack = match api.handle_webhook(notification).await {
        Ok(ack) => ack,
        Err(e) => {
            error!("🪝️ Webhook reconciliation failed. {e}");
            WebhookAck::rejected("internal-error")
        },
    };
    HttpResponse::Ok().json(ack)
}
