//! Remote boundary: the plot and insights endpoints of the market service.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | `POST /api/plot` | [`PlotRequest`] | [`ChartData`] |
//! | `GET /api/insights/{ticker}` | [`InsightsRequest`] | [`InsightsSummary`] |
//!
//! Both endpoints answer `{ "error": "..." }` on failure, with any HTTP status.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::InsightsWire;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{ChartData, ClientConfig, FetchError, InsightsRequest, InsightsSummary, PlotRequest};

/// Owned future returned by [`MarketApi`] calls; it borrows nothing from the caller.
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'static>>;

/// Market service contract. Each call performs exactly one network exchange.
pub trait MarketApi: Send + Sync {
    fn plot(&self, request: PlotRequest) -> ApiFuture<ChartData>;

    fn insights(&self, request: InsightsRequest) -> ApiFuture<InsightsSummary>;
}

/// [`MarketApi`] over HTTP+JSON.
#[derive(Clone)]
pub struct HttpMarketApi {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl HttpMarketApi {
    pub fn new(config: ClientConfig) -> Self {
        let http = Arc::new(ReqwestHttpClient::new(&config));
        Self { config, http }
    }

    /// Use a caller-provided transport (tests, custom TLS or proxies).
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl MarketApi for HttpMarketApi {
    fn plot(&self, request: PlotRequest) -> ApiFuture<ChartData> {
        let http = Arc::clone(&self.http);
        let url = self.config.url("/api/plot");
        let timeout_ms = self.config.timeout_ms;

        Box::pin(async move {
            let body = request.to_body().map_err(|error| {
                warn!(ticker = %request.ticker, %error, "failed to encode plot payload");
                FetchError::transport()
            })?;
            let http_request = HttpRequest::post(url)
                .with_json_body(body)
                .with_timeout_ms(timeout_ms);

            let response = send(http.as_ref(), http_request).await?;
            decode::<ChartData>(&response, Some("plot"))
        })
    }

    fn insights(&self, request: InsightsRequest) -> ApiFuture<InsightsSummary> {
        let http = Arc::clone(&self.http);
        let url = self.config.url(&request.path_and_query());
        let timeout_ms = self.config.timeout_ms;

        Box::pin(async move {
            let http_request = HttpRequest::get(url)
                .with_header("accept", "application/json")
                .with_timeout_ms(timeout_ms);

            let response = send(http.as_ref(), http_request).await?;
            let wire = decode::<InsightsWire>(&response, None)?;
            wire.into_summary().map_err(|reason| {
                warn!(ticker = %request.ticker, %reason, "insights payload rejected");
                FetchError::invalid_response()
            })
        })
    }
}

async fn send(http: &dyn HttpClient, request: HttpRequest) -> Result<HttpResponse, FetchError> {
    let method = request.method.as_str();
    let url = request.url.clone();
    debug!(method, %url, "sending request");

    http.execute(request).await.map_err(|error| {
        warn!(method, %url, error = %error, "market service unreachable");
        FetchError::transport()
    })
}

/// Map a response onto the payload or one of the [`FetchError`] kinds.
///
/// `member` names the top-level field holding the payload; `None` means the
/// whole body is the payload.
fn decode<T: DeserializeOwned>(
    response: &HttpResponse,
    member: Option<&str>,
) -> Result<T, FetchError> {
    let value: Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(error) if response.is_success() => {
            warn!(status = response.status, %error, "response body is not JSON");
            return Err(FetchError::invalid_response());
        }
        Err(_) => {
            warn!(status = response.status, "non-JSON error response");
            return Err(FetchError::transport());
        }
    };

    if let Some(message) = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
    {
        return Err(FetchError::service(message));
    }

    if !response.is_success() {
        warn!(status = response.status, "error status without error message");
        return Err(FetchError::transport());
    }

    let payload = match member {
        Some(name) => value.get(name).cloned().unwrap_or(Value::Null),
        None => value,
    };

    serde_json::from_value(payload).map_err(|error| {
        warn!(%error, "response payload does not match contract");
        FetchError::invalid_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchErrorKind;

    #[test]
    fn decode_extracts_named_member() {
        let response = HttpResponse::ok_json(r#"{"plot":{"data":[{"type":"bar"}],"layout":{}}}"#);
        let chart: ChartData = decode(&response, Some("plot")).expect("decodes");
        assert_eq!(chart.trace_count(), 1);
    }

    #[test]
    fn error_member_wins_regardless_of_status() {
        for status in [200, 400, 404, 500] {
            let response = HttpResponse::new(status, r#"{"error":"No data found for ZZZZ"}"#);
            let error = decode::<ChartData>(&response, Some("plot")).expect_err("must fail");
            assert_eq!(error.kind(), FetchErrorKind::Service);
            assert_eq!(error.message(), "No data found for ZZZZ");
        }
    }

    #[test]
    fn empty_error_member_is_not_a_service_error() {
        let response = HttpResponse::ok_json(r#"{"error":"","plot":{"data":[],"layout":{}}}"#);
        let chart: ChartData = decode(&response, Some("plot")).expect("decodes");
        assert_eq!(chart.trace_count(), 0);

        let response = HttpResponse::new(500, r#"{"error":""}"#);
        let error = decode::<ChartData>(&response, Some("plot")).expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::Transport);
    }

    #[test]
    fn missing_member_is_invalid_response() {
        let response = HttpResponse::ok_json(r#"{"figure":{}}"#);
        let error = decode::<ChartData>(&response, Some("plot")).expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::InvalidResponse);
    }

    #[test]
    fn html_gateway_error_is_transport() {
        let response = HttpResponse::new(502, "<html>Bad Gateway</html>");
        let error = decode::<ChartData>(&response, Some("plot")).expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::Transport);
        assert_eq!(error.message(), "service unreachable");
    }
}
