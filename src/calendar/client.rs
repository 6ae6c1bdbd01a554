use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::google::GoogleConfig;
use crate::helpers::time::{get_instant, to_rfc3339_z};
use crate::observability::metrics::get_metrics;

static OP_LIST: &str = "list_events";
static OP_INSERT: &str = "insert_event";
static TRANSPORT_ERROR: &str = "transport_error";

/// Upstream status and body, passed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Thin Google Calendar v3 client bound to one calendar.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: Client,
    api_url: String,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(cfg: &GoogleConfig, client: Client) -> Self {
        Self {
            client,
            api_url: cfg.calendar_api_url.to_owned(),
            calendar_id: cfg.calendar_id.to_owned(),
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Single events in the next 24 hours, ordered by start time.
    pub async fn upcoming_events(&self, access_token: &str, now: DateTime<Utc>) -> Result<CalendarResponse> {
        let later = now + Duration::days(1);
        let request = self
            .client
            .get(self.events_url()?)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", to_rfc3339_z(now)),
                ("timeMax", to_rfc3339_z(later)),
                ("singleEvents", "true".to_owned()),
                ("orderBy", "startTime".to_owned()),
            ]);
        self.send(OP_LIST, request).await
    }

    pub async fn insert_event(&self, access_token: &str, event: &Value) -> Result<CalendarResponse> {
        let request = self
            .client
            .post(self.events_url()?)
            .bearer_auth(access_token)
            .json(event);
        self.send(OP_INSERT, request).await
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<CalendarResponse> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = request.send().await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics.calendar_duration.with_label_values(&[operation]).observe(start.elapsed().as_secs_f64());
                metrics.calendar_requests.with_label_values(&[operation, TRANSPORT_ERROR]).inc();
                return Err(anyhow!("calendar {} request failed: {}", operation, e));
            }
        };

        let status = response.status();
        let text = response.text().await?;
        metrics.calendar_duration.with_label_values(&[operation]).observe(start.elapsed().as_secs_f64());
        metrics.calendar_requests.with_label_values(&[operation, status.as_str()]).inc();
        info!("calendar '{}' {} answered {}", self.calendar_id, operation, status);

        let body = serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!("calendar response is not JSON: {}", e);
            Value::String(text)
        });
        Ok(CalendarResponse { status, body })
    }

    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("calendar api url '{}' cannot be a base", self.api_url))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn calendar(api_url: String, calendar_id: &str) -> CalendarClient {
        let cfg = GoogleConfig {
            calendar_api_url: api_url,
            calendar_id: calendar_id.to_owned(),
            ..GoogleConfig::default()
        };
        CalendarClient::new(&cfg, Client::new())
    }

    #[test]
    fn events_url_encodes_calendar_id() {
        let client = calendar("https://www.googleapis.com/calendar/v3".into(), "team#1@group.calendar.google.com");
        assert_eq!(
            client.events_url().unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%231@group.calendar.google.com/events"
        );

        let trailing = calendar("https://www.googleapis.com/calendar/v3/".into(), "primary");
        assert_eq!(
            trailing.events_url().unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
    }

    #[tokio::test]
    async fn upcoming_events_queries_next_day() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/calendar/v3/calendars/primary/events")
                    .header("authorization", "Bearer tok1")
                    .query_param("timeMin", "2025-05-01T08:00:00Z")
                    .query_param("timeMax", "2025-05-02T08:00:00Z")
                    .query_param("singleEvents", "true")
                    .query_param("orderBy", "startTime");
                then.status(200).json_body(json!({"items": [{"id": "evt1"}]}));
            })
            .await;

        let client = calendar(server.url("/calendar/v3"), "primary");
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let response = client.upcoming_events("tok1", now).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["items"][0]["id"], "evt1");
    }

    #[tokio::test]
    async fn upstream_errors_pass_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/calendar/v3/calendars/primary/events");
                then.status(403).json_body(json!({"error": {"code": 403, "message": "forbidden"}}));
            })
            .await;

        let client = calendar(server.url("/calendar/v3"), "primary");
        let response = client.insert_event("tok1", &json!({"summary": "x"})).await.unwrap();

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["error"]["code"], 403);
    }
}
