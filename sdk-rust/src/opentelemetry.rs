use crate::{ServiceError, ServiceResult};
use opentelemetry::trace::Status;
use reqwest::Method;
use std::{future::Future, time::Instant};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct RequestSpan {
    span: Span,
    start_time: Instant,
}

impl RequestSpan {
    pub fn new(provider: &str, operation: &str, method: &Method, path: &str) -> Self {
        let span = info_span!("bbp_sdk.request");
        span.set_attribute("bbp_sdk.provider", provider.to_string());
        span.set_attribute("bbp_sdk.operation", operation.to_string());
        span.set_attribute("http.request.method", method.to_string());
        span.set_attribute("url.path", path.to_string());

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_error(&mut self, error: &ServiceError) {
        if let Some(status) = error.status() {
            self.span.set_attribute(
                "http.response.status_code",
                i64::from(status.as_u16()),
            );
        }
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        self.span.set_attribute(
            "bbp_sdk.duration",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

/// Run one remote call inside a request span, recording the failure on the
/// span when the call errors.
pub async fn trace_request<T, Fut>(
    provider: &str,
    operation: &str,
    method: &Method,
    path: &str,
    future: Fut,
) -> ServiceResult<T>
where
    Fut: Future<Output = ServiceResult<T>>,
{
    let mut span = RequestSpan::new(provider, operation, method, path);
    let result = future.instrument(span.span()).await;

    if let Err(error) = &result {
        tracing::debug!(operation, %error, "request failed");
        span.on_error(error);
    }

    span.on_end();
    result
}
