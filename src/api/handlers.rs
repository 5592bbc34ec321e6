//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveTime;

use super::AppState;
use super::types::{ApiError, ErrorResponse, WindowQuery, error, status_for};
use crate::aggregate::{ComparisonResult, RangeAggregator, RangeSeries};
use crate::error::EmissionsError;
use crate::record::DailyRecord;

fn reject(e: EmissionsError) -> ApiError {
    (status_for(&e), Json(ErrorResponse::from(e)))
}

/// Returns the home's record for the server's current day.
///
/// `GET /homes/{home_id}/today` → 200 + `DailyRecord` JSON, or 404
pub async fn get_today(
    State(state): State<Arc<AppState>>,
    Path(home_id): Path<String>,
) -> Result<Json<DailyRecord>, ApiError> {
    let now = state.today.and_time(NaiveTime::default()).and_utc();
    let record = RangeAggregator::new(&state.store)
        .get_today(&home_id, now)
        .map_err(reject)?;
    record.map(Json).ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            format!("no record for home `{home_id}` on {}", state.today),
        )
    })
}

/// Returns daily totals over a window, missing days as zero.
///
/// `GET /homes/{home_id}/range?days=N&end=YYYY-MM-DD` → 200 + `RangeSeries` JSON
/// `GET /homes/{home_id}/range?days=0` → 400 + `ErrorResponse`
pub async fn get_range(
    State(state): State<Arc<AppState>>,
    Path(home_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<RangeSeries>, ApiError> {
    let end = query.end.unwrap_or(state.today);
    RangeAggregator::new(&state.store)
        .get_range(&home_id, query.days(), end)
        .map(Json)
        .map_err(reject)
}

/// Returns the home's daily average next to the all-homes benchmark.
///
/// `GET /homes/{home_id}/comparison?days=N&end=YYYY-MM-DD` → 200 + `ComparisonResult` JSON
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
    Path(home_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ComparisonResult>, ApiError> {
    let end = query.end.unwrap_or(state.today);
    RangeAggregator::new(&state.store)
        .get_comparison(&home_id, query.days(), end)
        .map(Json)
        .map_err(reject)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::record::{DailyStore, MemoryStore, WriteMode};
    use crate::sim::types::HOURS_PER_DAY;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn make_test_state() -> Arc<AppState> {
        let store = MemoryStore::new();
        for d in 8..=10 {
            for (home, v) in [("a", 2.0), ("b", 1.0)] {
                let rec = DailyRecord::for_day(home, day(d))
                    .with_series("tv", vec![v; HOURS_PER_DAY]);
                store.write(rec, WriteMode::Upsert).unwrap();
            }
        }
        Arc::new(AppState {
            store,
            today: day(10),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn today_returns_record() {
        let (status, json) = get_json("/homes/a/today").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["homeId"], "a");
        assert_eq!(json["date"], "2025-07-10");
        assert_eq!(json["summary"]["totalEmissions"], 48.0);
        assert_eq!(json["summary"]["topAppliance"], "tv");
    }

    #[tokio::test]
    async fn today_unknown_home_returns_404() {
        let (status, json) = get_json("/homes/nobody/today").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn range_defaults_to_seven_days() {
        let (status, json) = get_json("/homes/a/range").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["days"], 7);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(7));
        assert_eq!(json["sufficient"], false);
        assert_eq!(json["data"][0]["date"], "2025-07-04");
        assert_eq!(json["data"][6]["total"], 48.0);
    }

    #[tokio::test]
    async fn range_with_explicit_end() {
        let (status, json) = get_json("/homes/b/range?days=2&end=2025-07-09").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sufficient"], true);
        assert_eq!(json["data"][0]["date"], "2025-07-08");
        assert_eq!(json["data"][1]["topAppliance"], "tv");
    }

    #[tokio::test]
    async fn range_zero_days_returns_400() {
        let (status, json) = get_json("/homes/a/range?days=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn range_above_max_window_returns_400() {
        let uri = format!("/homes/a/range?days={}", crate::aggregate::MAX_WINDOW_DAYS + 1);
        let (status, json) = get_json(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let msg = json["error"].as_str().unwrap_or_default();
        assert!(msg.contains("maximum window"), "{msg}");

        let (status, _) = get_json("/homes/nobody/comparison?days=20000000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn comparison_returns_benchmark() {
        let (status, json) = get_json("/homes/a/comparison?days=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["homeAvg"], 48.0);
        assert_eq!(json["globalAvg"], 36.0);
        assert_eq!(json["days"], 3);
        assert_eq!(json["sufficient"], true);
    }
}
