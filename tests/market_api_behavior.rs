//! Behavior tests for the HTTP market API: what goes on the wire and how each
//! kind of response is classified.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use stockscope_core::{
    payload, ClientConfig, FetchErrorKind, FormSnapshot, HttpClient, HttpError, HttpMarketApi,
    HttpMethod, HttpRequest, HttpResponse, MarketApi, PlotType, TrendDirection,
};
use time::macros::date;
use time::Date;

const TODAY: Date = date!(2024 - 06 - 15);

/// Records every request and answers with a canned response.
struct RecordingHttpClient {
    response: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn answering(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(HttpResponse::new(status, body)),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(HttpError::new(message)),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

fn api_with(http: &Arc<RecordingHttpClient>) -> HttpMarketApi {
    let config = ClientConfig::new("http://market.test/")
        .with_timeout_ms(2_500);
    HttpMarketApi::with_http_client(config, Arc::clone(http) as Arc<dyn HttpClient>)
}

fn nvda() -> FormSnapshot {
    FormSnapshot {
        ticker: String::from("nvda"),
        ..FormSnapshot::default()
    }
}

fn chart_body() -> String {
    json!({
        "plot": {
            "data": [{"type": "scatter", "y": [1.0, 2.0]}],
            "layout": {"title": {"text": "NVDA Close"}}
        }
    })
    .to_string()
}

fn insights_body() -> String {
    json!({
        "ticker": "NVDA",
        "volatility": {"annualized_volatility_percent": 41.7, "description": "High volatility"},
        "trend": {"direction": "Downward", "description": "Falling"},
        "anomalies": {
            "high_volume_dates": ["2024-06-03", "2024-05-21"],
            "description": "2 high-volume days"
        }
    })
    .to_string()
}

// =============================================================================
// Plot endpoint
// =============================================================================

#[tokio::test]
async fn when_plot_is_requested_a_json_post_is_sent_to_the_plot_endpoint() {
    // Given: An API over a recording transport
    let http = RecordingHttpClient::answering(200, chart_body());
    let api = api_with(&http);
    let mut form = nvda();
    form.plot_type = PlotType::MovingAverage;
    form.window = 30;
    let request = payload::build(&form, TODAY).expect("valid");

    // When: The chart is fetched
    let chart = api.plot(request).await.expect("chart");

    // Then: One POST carried the JSON payload with the configured timeout
    let sent = http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].url, "http://market.test/api/plot");
    assert_eq!(sent[0].timeout_ms, 2_500);
    assert_eq!(
        sent[0].headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    let body: Value = serde_json::from_str(sent[0].body.as_deref().expect("body")).expect("json");
    assert_eq!(
        body,
        json!({"ticker": "NVDA", "plot_type": "moving_average", "period": "1mo", "ma_window": 30})
    );

    // And: The chart payload is decoded
    assert_eq!(chart.trace_count(), 1);
    assert_eq!(chart.title(), Some("NVDA Close"));
}

#[tokio::test]
async fn when_service_reports_an_error_its_message_is_surfaced_verbatim() {
    let http = RecordingHttpClient::answering(400, r#"{"error":"No data found for ticker ZZZZ"}"#);
    let api = api_with(&http);
    let request = payload::build(&nvda(), TODAY).expect("valid");

    let error = api.plot(request).await.expect_err("service error");

    assert_eq!(error.kind(), FetchErrorKind::Service);
    assert_eq!(error.message(), "No data found for ticker ZZZZ");
}

#[tokio::test]
async fn when_error_member_arrives_with_success_status_it_is_still_an_error() {
    let http = RecordingHttpClient::answering(200, r#"{"error":"Invalid plot type"}"#);
    let api = api_with(&http);
    let request = payload::build(&nvda(), TODAY).expect("valid");

    let error = api.plot(request).await.expect_err("service error");

    assert_eq!(error.kind(), FetchErrorKind::Service);
    assert_eq!(error.to_string(), "Invalid plot type");
}

#[tokio::test]
async fn when_transport_fails_a_generic_message_is_surfaced() {
    // Given: A transport that cannot connect
    let http = RecordingHttpClient::failing("connection refused (os error 111)");
    let api = api_with(&http);
    let request = payload::build(&nvda(), TODAY).expect("valid");

    // When: The chart is fetched
    let error = api.plot(request).await.expect_err("transport error");

    // Then: The low-level cause is not shown to the user
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert_eq!(error.message(), "service unreachable");
}

#[tokio::test]
async fn when_server_fails_without_an_error_member_it_counts_as_transport() {
    let http = RecordingHttpClient::answering(502, "<html>Bad Gateway</html>");
    let api = api_with(&http);
    let request = payload::build(&nvda(), TODAY).expect("valid");

    let error = api.plot(request).await.expect_err("transport error");

    assert_eq!(error.kind(), FetchErrorKind::Transport);
}

#[tokio::test]
async fn when_success_body_is_not_a_chart_it_is_an_invalid_response() {
    for body in ["not json", r#"{"figure":{}}"#, r#"{"plot":"png-bytes"}"#] {
        let http = RecordingHttpClient::answering(200, body);
        let api = api_with(&http);
        let request = payload::build(&nvda(), TODAY).expect("valid");

        let error = api.plot(request).await.expect_err("invalid response");

        assert_eq!(error.kind(), FetchErrorKind::InvalidResponse, "body: {body}");
        assert_eq!(error.message(), "malformed response from service");
    }
}

// =============================================================================
// Insights endpoint
// =============================================================================

#[tokio::test]
async fn when_insights_are_requested_a_get_with_query_is_sent() {
    // Given: Date-range mode on an index ticker
    let http = RecordingHttpClient::answering(200, insights_body());
    let api = api_with(&http);
    let mut form = FormSnapshot {
        ticker: String::from("^gspc"),
        ..FormSnapshot::default()
    };
    form.filter_mode = stockscope_core::FilterMode::ByDateRange;
    form.start_date = String::from("2024-05-01");
    form.end_date = String::from("2024-06-14");
    let request = payload::build_insights(&form, TODAY).expect("valid");

    // When: Insights are fetched
    let summary = api.insights(request).await.expect("insights");

    // Then: A GET with an encoded path and the range query was sent
    let sent = http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(
        sent[0].url,
        "http://market.test/api/insights/%5EGSPC?start=2024-05-01&end=2024-06-14"
    );
    assert!(sent[0].body.is_none());

    // And: The summary is decoded with anomaly dates in order
    assert_eq!(summary.ticker, "NVDA");
    assert_eq!(summary.volatility.value, 41.7);
    assert_eq!(summary.trend.direction, TrendDirection::Down);
    assert_eq!(
        summary.anomalies.dates,
        vec![date!(2024 - 05 - 21), date!(2024 - 06 - 03)]
    );
}

#[tokio::test]
async fn when_insights_carry_an_unknown_trend_they_are_an_invalid_response() {
    let body = insights_body().replace("Downward", "Diagonal");
    let http = RecordingHttpClient::answering(200, body);
    let api = api_with(&http);
    let request = payload::build_insights(&nvda(), TODAY).expect("valid");

    let error = api.insights(request).await.expect_err("invalid response");

    assert_eq!(error.kind(), FetchErrorKind::InvalidResponse);
}

#[tokio::test]
async fn when_insights_service_errors_the_message_is_kept() {
    let http = RecordingHttpClient::answering(404, r#"{"error":"No data found for NVDA"}"#);
    let api = api_with(&http);
    let request = payload::build_insights(&nvda(), TODAY).expect("valid");

    let error = api.insights(request).await.expect_err("service error");

    assert_eq!(error.kind(), FetchErrorKind::Service);
    assert_eq!(error.message(), "No data found for NVDA");
}
