use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use httpmock::prelude::*;
use matches_per_day::core::JsonPoster;
use matches_per_day::{
    DateRange, DateRangeForm, HttpPoster, Settings, SubmitStatus, TrackerError, DEFAULT_ENDPOINT,
};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        base_url: server.base_url(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_submit_posts_exact_body_to_endpoint() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/valorant/matches-per-day.json")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "date_begin": "2024-01-01T00:00:00.000Z",
                "date_end": "2024-01-02T00:00:00.000Z"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"match_date": "2024-01-01", "matches_played": 31}
            ]));
    });

    let poster = HttpPoster::new(&settings_for(&server))?;
    let range = DateRange::new(instant("2024-01-01T00:00:00Z"), instant("2024-01-02T00:00:00Z"));
    let form = DateRangeForm::with_range(poster, DEFAULT_ENDPOINT, range);

    let response = form.submit().await?;

    api_mock.assert_hits(1);
    assert_eq!(response[0]["matches_played"], 31);
    assert!(matches!(form.status(), SubmitStatus::Succeeded { request_id: 1, .. }));
    Ok(())
}

#[tokio::test]
async fn test_default_range_is_what_gets_posted() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/valorant/matches-per-day.json")
            .json_body(serde_json::json!({
                "date_begin": "2024-06-09T00:00:00.000Z",
                "date_end": "2024-06-10T23:59:59.999Z"
            }));
        then.status(200).json_body(serde_json::json!([]));
    });

    let poster = HttpPoster::new(&settings_for(&server))?;
    let reference = Utc.with_ymd_and_hms(2024, 6, 10, 15, 45, 0).unwrap();
    let form = DateRangeForm::new(poster, DEFAULT_ENDPOINT, &reference);

    form.submit().await?;

    api_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_picker_change_is_reflected_in_next_submit() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/valorant/matches-per-day.json")
            .json_body(serde_json::json!({
                "date_begin": "2023-03-01T00:00:00.000Z",
                "date_end": "2023-03-07T23:59:59.999Z"
            }));
        then.status(200).json_body(serde_json::json!([]));
    });

    let poster = HttpPoster::new(&settings_for(&server))?;
    let reference = Utc.with_ymd_and_hms(2024, 6, 10, 15, 45, 0).unwrap();
    let mut form = DateRangeForm::new(poster, DEFAULT_ENDPOINT, &reference);
    form.on_change(DateRange::from_dates(
        chrono::NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2023, 3, 7).unwrap(),
        &Utc,
    ));

    form.submit().await?;

    api_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_reported_not_panicked() -> Result<()> {
    // Nothing listens on port 1.
    let settings = Settings {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: Some(5),
        ..Settings::default()
    };
    let poster = HttpPoster::new(&settings)?;
    let reference = Utc.with_ymd_and_hms(2024, 6, 10, 15, 45, 0).unwrap();
    let form = DateRangeForm::new(poster, DEFAULT_ENDPOINT, &reference);

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, TrackerError::ApiError(_)));
    match form.status() {
        SubmitStatus::Failed { retryable, .. } => assert!(retryable),
        other => panic!("unexpected status: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_server_error_and_garbage_body_are_surfaced() -> Result<()> {
    let server = MockServer::start();
    let mut failing = server.mock(|when, then| {
        when.method(POST).path("/valorant/matches-per-day.json");
        then.status(500).body("Internal Server Error");
    });

    let poster = HttpPoster::new(&settings_for(&server))?;
    let reference = Utc.with_ymd_and_hms(2024, 6, 10, 15, 45, 0).unwrap();
    let form = DateRangeForm::new(poster, DEFAULT_ENDPOINT, &reference);

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, TrackerError::EndpointStatus { status: 500, .. }));
    failing.delete();

    server.mock(|when, then| {
        when.method(POST).path("/valorant/matches-per-day.json");
        then.status(200).body("<html>proxy login</html>");
    });

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidResponse { .. }));
    assert!(matches!(
        form.status(),
        SubmitStatus::Failed { request_id: 2, .. }
    ));
    Ok(())
}

/// Answers each call only when the test releases it, in whatever order it likes.
#[derive(Clone, Default)]
struct GatedPoster {
    gates: Arc<Mutex<Vec<oneshot::Receiver<serde_json::Value>>>>,
}

#[async_trait]
impl JsonPoster for GatedPoster {
    async fn post_json(
        &self,
        _path: &str,
        _payload: &serde_json::Value,
    ) -> matches_per_day::Result<serde_json::Value> {
        let gate = self.gates.lock().await.remove(0);
        Ok(gate.await.unwrap_or(serde_json::Value::Null))
    }
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer_status() -> Result<()> {
    let poster = GatedPoster::default();
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    poster.gates.lock().await.extend([first_rx, second_rx]);

    let reference = Utc.with_ymd_and_hms(2024, 6, 10, 15, 45, 0).unwrap();
    let form = DateRangeForm::new(poster, DEFAULT_ENDPOINT, &reference);

    let first = form.submit();
    let second = form.submit();

    let releaser = async move {
        tokio::task::yield_now().await;
        second_tx.send(serde_json::json!("second")).unwrap();
        tokio::task::yield_now().await;
        first_tx.send(serde_json::json!("first")).unwrap();
    };

    let (first_result, second_result, _) = tokio::join!(first, second, releaser);

    // Both callers see their own answers.
    assert_eq!(first_result?, serde_json::json!("first"));
    assert_eq!(second_result?, serde_json::json!("second"));

    // Only the newest submit is shown.
    assert_eq!(
        form.status(),
        SubmitStatus::Succeeded {
            request_id: 2,
            response: serde_json::json!("second"),
        }
    );
    Ok(())
}
