use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::Instrument;
use uuid::Uuid;

pub const TRACE_HEADER: &str = "x-trace-id";

/// Tags every request with a trace id and runs it inside an `http_request` span.
///
/// The id comes from the `X-Trace-Id` request header when present and is
/// echoed back on the response.
pub struct TraceRequests;

impl<S, B> Transform<S, ServiceRequest> for TraceRequests
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceRequestsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceRequestsService {
            service: Rc::new(service),
        }))
    }
}

pub struct TraceRequestsService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TraceRequestsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = req
            .headers()
            .get(TRACE_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let span = tracing::info_span!(
            "http_request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path()
        );
        let service = Rc::clone(&self.service);

        Box::pin(
            async move {
                tracing::debug!("Request received");

                let mut res = service.call(req).await?;

                tracing::info!(status = res.status().as_u16(), "Request completed");
                if let Ok(value) = HeaderValue::from_str(&trace_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static(TRACE_HEADER), value);
                }
                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// The id [`TraceRequests`] assigned to the current request.
///
/// Usable as a handler argument; outside the middleware it extracts a fresh id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for TraceId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .cloned()
            .unwrap_or_else(|| TraceId(Uuid::new_v4().to_string()));
        ready(Ok(trace_id))
    }
}
