//! HTTP client for the forecasting API
//!
//! Every point array goes through [`crate::validate`] before it is typed, and
//! every clamp lands in the client's [`QualityCounters`]. Filters equal to
//! `ALL` or empty are left out of the query string.

use chrono::{DateTime, FixedOffset};
use gatecast_types::{
    CompositionDim, CompositionResponse, CompositionRow, DesigHourlyResponse, EnumsResponse,
    HeatmapCell, HeatmapResponse, MoveTypeHourlyResponse, MoveTypeShare, Next8hResponse,
    RankingEntry, RankingResponse, ShareResponse, SunburstResponse,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::config::GatecastConfig;
use crate::error::CoreError;
use crate::quality::{DataQualityReport, QualityCounters};
use crate::validate::{
    parse_forecast_points, parse_records, parse_time_points, sanitize_reported,
};
use crate::window::{
    compute_window, filter_value, today_window, DashboardQuery, TimeWindow, ViewMode,
};

pub const NEXT8H_PATH: &str = "/forecast/next8h";
pub const RANGE_PATH: &str = "/forecast/range";
pub const ENUMS_PATH: &str = "/meta/enums";
pub const RANKING_PATH: &str = "/analytics/terminal_ranking";
pub const SHARE_PATH: &str = "/analytics/movetype_share";
pub const MOVETYPE_HOURLY_PATH: &str = "/analytics/movetype_hourly";
pub const DESIG_HOURLY_PATH: &str = "/analytics/desig_hourly";
pub const HEATMAP_PATH: &str = "/analytics/terminal_hour_heatmap";
pub const SUNBURST_PATH: &str = "/analytics/sunburst";
pub const COMPOSITION_PATH: &str = "/analytics/composition_by_terminal";

/// Query string under construction
#[derive(Debug, Default)]
struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    fn window(window: &TimeWindow) -> Self {
        Self(vec![
            ("start_iso", window.start.clone()),
            ("end_iso", window.end.clone()),
        ])
    }

    fn required(mut self, key: &'static str, value: &str) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Only sent when not `ALL` or empty
    fn filter(mut self, key: &'static str, value: &str) -> Self {
        if let Some(v) = filter_value(value) {
            self.0.push((key, v.to_string()));
        }
        self
    }
}

/// Forecast response fields other than the points
#[derive(Debug, Deserialize)]
struct ForecastEnvelope {
    #[serde(default)]
    generated_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    capacity_per_hour: Option<f64>,
}

/// Client for the forecasting REST API
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
    default_capacity: f64,
    cache: Option<ResponseCache>,
    counters: QualityCounters,
}

impl ForecastClient {
    /// Build a client from configuration, without a response cache
    pub fn new(config: &GatecastConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| CoreError::Http {
                endpoint: config.base_url().to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            default_capacity: config.default_capacity_per_hour,
            cache: None,
            counters: QualityCounters::new(),
        })
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Share counters with other clients or a reporter
    pub fn with_counters(mut self, counters: QualityCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn counters(&self) -> &QualityCounters {
        &self.counters
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and return the JSON body, via the cache when configured
    async fn get_json(&self, path: &str, params: QueryParams) -> Result<Arc<Value>, CoreError> {
        let key = ResponseCache::key(path, &params.0);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!(request = %key, "Response cache hit");
                return Ok(hit);
            }
        }

        let url = format!("{}{}", self.base_url, path);
        tracing::info!(request = %key, "Fetching");

        let response = self
            .http
            .get(&url)
            .query(&params.0)
            .send()
            .await
            .map_err(|source| CoreError::Http {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(request = %key, status = status.as_u16(), "API returned error status");
            return Err(CoreError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| CoreError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;
        let body = Arc::new(body);

        if let Some(cache) = &self.cache {
            cache.insert(key, Arc::clone(&body)).await;
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T, CoreError> {
        T::deserialize(value).map_err(|e| CoreError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }

    fn finish(&self, path: &str, report: DataQualityReport) {
        if !report.is_clean() {
            tracing::debug!(endpoint = path, events = report.events.len(), "Response normalized");
        }
        report.flush_into(&self.counters);
    }

    fn decode_forecast(&self, path: &str, body: &Value) -> Result<Next8hResponse, CoreError> {
        let envelope: ForecastEnvelope = Self::decode(path, body)?;
        let (horizon_hours, mut report) =
            parse_forecast_points(body.get("horizon_hours").unwrap_or(&Value::Null));

        let capacity_per_hour = match envelope.capacity_per_hour {
            Some(capacity) => sanitize_reported(capacity, &mut report, None),
            None => self.default_capacity,
        };
        self.finish(path, report);

        Ok(Next8hResponse {
            horizon_hours,
            generated_at: envelope.generated_at,
            updated_at: envelope.updated_at,
            capacity_per_hour,
        })
    }

    /// Rolling 8-hour forecast for one terminal
    pub async fn next8h(
        &self,
        terminal: &str,
        move_type: &str,
        desig: &str,
    ) -> Result<Next8hResponse, CoreError> {
        let params = QueryParams::default()
            .required("terminal_id", terminal)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(NEXT8H_PATH, params).await?;
        self.decode_forecast(NEXT8H_PATH, &body)
    }

    /// Forecast over an explicit window
    pub async fn range(
        &self,
        terminal: &str,
        window: &TimeWindow,
        move_type: &str,
        desig: &str,
    ) -> Result<Next8hResponse, CoreError> {
        let params = QueryParams::default()
            .required("terminal_id", terminal)
            .required("start_iso", &window.start)
            .required("end_iso", &window.end)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(RANGE_PATH, params).await?;
        self.decode_forecast(RANGE_PATH, &body)
    }

    /// Forecast for a dashboard query at wall-clock time `now`.
    ///
    /// Returns the window the data covers alongside the response.
    pub async fn forecast(
        &self,
        query: &DashboardQuery,
        now: DateTime<FixedOffset>,
    ) -> Result<(TimeWindow, Next8hResponse), CoreError> {
        let (terminal, move_type, desig) = (&query.terminal, &query.move_type, &query.desig);

        if query.has_custom_range() {
            let window = compute_window(query, now);
            let response = self.range(terminal, &window, move_type, desig).await?;
            return Ok((window, response));
        }
        if query.mode == ViewMode::Today {
            let window = today_window(now);
            let response = self.range(terminal, &window, move_type, desig).await?;
            return Ok((window, response));
        }

        let window = compute_window(query, now);
        let response = self.next8h(terminal, move_type, desig).await?;
        Ok((window, response))
    }

    /// Terminals, move types and designations known to the backend
    pub async fn enums(&self) -> Result<EnumsResponse, CoreError> {
        let body = self.get_json(ENUMS_PATH, QueryParams::default()).await?;
        Self::decode(ENUMS_PATH, &body)
    }

    pub async fn terminal_ranking(
        &self,
        window: &TimeWindow,
        move_type: &str,
        desig: &str,
    ) -> Result<RankingResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(RANKING_PATH, params).await?;

        let (mut ranking, mut report) =
            parse_records::<RankingEntry>(body.get("ranking").unwrap_or(&Value::Null));
        for (idx, entry) in ranking.iter_mut().enumerate() {
            entry.total_pred = sanitize_reported(entry.total_pred, &mut report, Some(idx));
        }
        self.finish(RANKING_PATH, report);

        Ok(RankingResponse { ranking })
    }

    pub async fn movetype_share(
        &self,
        window: &TimeWindow,
        terminal: &str,
        desig: &str,
    ) -> Result<ShareResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("terminal_id", terminal)
            .filter("desig", desig);
        let body = self.get_json(SHARE_PATH, params).await?;

        let raw: ShareResponse = Self::decode(SHARE_PATH, &body)?;
        let mut report = DataQualityReport::new();
        let share = MoveTypeShare {
            inbound: sanitize_reported(raw.share.inbound, &mut report, None),
            outbound: sanitize_reported(raw.share.outbound, &mut report, None),
        };
        self.finish(SHARE_PATH, report);

        Ok(ShareResponse { share })
    }

    pub async fn movetype_hourly(
        &self,
        window: &TimeWindow,
        terminal: &str,
        desig: &str,
    ) -> Result<MoveTypeHourlyResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("terminal_id", terminal)
            .filter("desig", desig);
        let body = self.get_json(MOVETYPE_HOURLY_PATH, params).await?;

        let (points, report) = parse_time_points(body.get("points").unwrap_or(&Value::Null));
        self.finish(MOVETYPE_HOURLY_PATH, report);
        Ok(MoveTypeHourlyResponse { points })
    }

    pub async fn desig_hourly(
        &self,
        window: &TimeWindow,
        terminal: &str,
        move_type: &str,
    ) -> Result<DesigHourlyResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("terminal_id", terminal)
            .filter("move_type", move_type);
        let body = self.get_json(DESIG_HOURLY_PATH, params).await?;

        let (points, report) = parse_time_points(body.get("points").unwrap_or(&Value::Null));
        self.finish(DESIG_HOURLY_PATH, report);
        Ok(DesigHourlyResponse { points })
    }

    pub async fn terminal_hour_heatmap(
        &self,
        window: &TimeWindow,
        move_type: &str,
        desig: &str,
    ) -> Result<HeatmapResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(HEATMAP_PATH, params).await?;

        let (cells, report) =
            parse_records::<HeatmapCell>(body.get("cells").unwrap_or(&Value::Null));
        self.finish(HEATMAP_PATH, report);
        Ok(HeatmapResponse { cells })
    }

    pub async fn sunburst(
        &self,
        window: &TimeWindow,
        terminal: &str,
        move_type: &str,
        desig: &str,
    ) -> Result<SunburstResponse, CoreError> {
        let params = QueryParams::window(window)
            .filter("terminal_id", terminal)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(SUNBURST_PATH, params).await?;
        Self::decode(SUNBURST_PATH, &body)
    }

    pub async fn composition_by_terminal(
        &self,
        window: &TimeWindow,
        dim: CompositionDim,
        terminal: &str,
        move_type: &str,
        desig: &str,
    ) -> Result<CompositionResponse, CoreError> {
        let params = QueryParams::window(window)
            .required("dim", dim.as_str())
            .filter("terminal_id", terminal)
            .filter("move_type", move_type)
            .filter("desig", desig);
        let body = self.get_json(COMPOSITION_PATH, params).await?;

        let dim = body
            .get("dim")
            .and_then(|d| CompositionDim::deserialize(d).ok())
            .unwrap_or(dim);
        let (rows, report) =
            parse_records::<CompositionRow>(body.get("rows").unwrap_or(&Value::Null));
        self.finish(COMPOSITION_PATH, report);

        Ok(CompositionResponse { dim, rows })
    }
}
