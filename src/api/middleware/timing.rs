//! HTTP timing middleware
//!
//! Logs method, endpoint category, status and latency for every request.
//! Server errors are logged at warn level.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

/// HTTP timing middleware factory
#[derive(Clone, Default)]
pub struct TimingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let start = Instant::now();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let endpoint = classify_endpoint(&path);

        Box::pin(async move {
            let result = srv.call(req).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(response) if response.status().is_server_error() => warn!(
                    "{} {} [{}] -> {} in {:?}",
                    method,
                    path,
                    endpoint,
                    response.status().as_u16(),
                    elapsed
                ),
                Ok(response) => debug!(
                    "{} {} [{}] -> {} in {:?}",
                    method,
                    path,
                    endpoint,
                    response.status().as_u16(),
                    elapsed
                ),
                Err(e) => warn!(
                    "{} {} [{}] failed in {:?}: {}",
                    method, path, endpoint, elapsed, e
                ),
            }

            result
        })
    }
}

/// Classify request path into endpoint category
///
/// Report paths are open-ended so everything unrecognized counts as a report.
fn classify_endpoint(path: &str) -> &'static str {
    if path == "/" {
        "index"
    } else if path.starts_with("/health") {
        "health"
    } else if path.starts_with("/search") {
        "search"
    } else if path.starts_with("/download/") {
        "download"
    } else if path == "/favicon.ico" {
        "favicon"
    } else {
        "report"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[::core::prelude::v1::test]
    fn test_classify_endpoint() {
        assert_eq!(classify_endpoint("/"), "index");
        assert_eq!(classify_endpoint("/health"), "health");
        assert_eq!(classify_endpoint("/search"), "search");
        assert_eq!(classify_endpoint("/download/a.csv"), "download");
        assert_eq!(classify_endpoint("/favicon.ico"), "favicon");
        assert_eq!(classify_endpoint("/phys/20263"), "report");
    }

    #[actix_rt::test]
    async fn test_middleware_passes_response_through() {
        let app = test::init_service(
            App::new()
                .wrap(TimingMiddleware)
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert_eq!(body, "ok");
    }
}
