use crate::activity::aggregate_at;
use crate::errors::{ActivityError, AppError};
use crate::models::{
    ActivityHeatmap, ActivityRecord, AltsRequest, AltsResponse, HeatmapQuery, HeatmapRequest,
    HistoryRequest, HistoryResponse, SeasonAtQuery, SeasonWindow, Selection, normalize_name,
};
use crate::seasons;
use crate::state::AppState;
use crate::storage::persist_data;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, Utc};
use tracing::info;

pub async fn list_seasons() -> Json<Vec<SeasonWindow>> {
    Json(seasons::catalog().seasons().to_vec())
}

pub async fn get_current_season() -> Json<SeasonWindow> {
    Json(seasons::current_season().clone())
}

pub async fn get_season(Path(id): Path<u32>) -> Result<Json<SeasonWindow>, AppError> {
    seasons::season_by_id(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ActivityError::UnknownSeason(id).into())
}

pub async fn get_season_at(Query(query): Query<SeasonAtQuery>) -> Result<Json<SeasonWindow>, AppError> {
    seasons::season_for_timestamp(query.ts)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no season covers timestamp {}", query.ts)))
}

pub async fn build_heatmap(
    State(state): State<AppState>,
    Json(payload): Json<HeatmapRequest>,
) -> Result<Json<ActivityHeatmap>, AppError> {
    let heatmap = aggregate_now(&state, &payload.records, payload.selection)?;
    Ok(Json(heatmap))
}

pub async fn add_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse>, AppError> {
    let character = require_name(&name)?;
    let bracket = payload.bracket.trim();
    if bracket.is_empty() {
        return Err(AppError::bad_request("bracket must not be empty"));
    }

    let added = payload.records.len();
    let mut data = state.data.lock().await;
    // Shared state only changes once the write has succeeded.
    let mut updated = data.clone();
    let response = {
        let history = updated.character_mut(&character);
        let records = history.brackets.entry(bracket.to_string()).or_default();
        records.extend(payload.records);
        let bracket_records = records.len();
        HistoryResponse {
            character: character.clone(),
            bracket: bracket.to_string(),
            added,
            bracket_records,
            total_records: history.record_count(),
        }
    };

    persist_data(&state.data_path, &updated).await?;
    *data = updated;
    info!(%character, bracket, added, "recorded activity");

    Ok(Json(response))
}

pub async fn set_alts(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<AltsRequest>,
) -> Result<Json<AltsResponse>, AppError> {
    let character = require_name(&name)?;
    let mut alts: Vec<String> = payload
        .alts
        .iter()
        .map(|alt| normalize_name(alt))
        .filter(|alt| !alt.is_empty() && *alt != character)
        .collect();
    alts.sort();
    alts.dedup();

    let mut data = state.data.lock().await;
    let mut updated = data.clone();
    updated.character_mut(&character).alts = alts.clone();
    persist_data(&state.data_path, &updated).await?;
    *data = updated;
    info!(%character, alts = alts.len(), "updated alts");

    Ok(Json(AltsResponse { character, alts }))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<ActivityHeatmap>, AppError> {
    let selection = selection_from_query(&query)?;
    let records = character_records(&state, &name).await?;
    let heatmap = aggregate_now(&state, &records, selection)?;
    Ok(Json(heatmap))
}

pub async fn get_character_seasons(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<SeasonWindow>>, AppError> {
    let records = character_records(&state, &name).await?;
    let timestamps: Vec<i64> = records.iter().map(|record| record.timestamp).collect();
    let windows = seasons::seasons_with_history(&timestamps)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(windows))
}

fn aggregate_now(
    state: &AppState,
    records: &[ActivityRecord],
    selection: Selection,
) -> Result<ActivityHeatmap, ActivityError> {
    match state.utc_offset {
        Some(offset) => aggregate_at(records, selection, &Utc::now().with_timezone(&offset)),
        None => aggregate_at(records, selection, &Local::now()),
    }
}

async fn character_records(state: &AppState, name: &str) -> Result<Vec<ActivityRecord>, AppError> {
    let character = require_name(name)?;
    let data = state.data.lock().await;
    data.flattened_history(&character)
        .ok_or_else(|| AppError::not_found(format!("unknown character: {character}")))
}

fn require_name(name: &str) -> Result<String, AppError> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(AppError::bad_request("character name must not be empty"));
    }
    Ok(name)
}

pub fn selection_from_query(query: &HeatmapQuery) -> Result<Selection, AppError> {
    let custom = match (query.from, query.to) {
        (Some(start), Some(end)) => Some(Selection::Custom { start, end }),
        (None, None) => None,
        _ => return Err(AppError::bad_request("from and to must be given together")),
    };

    let mut chosen = [
        query.year.map(|year| Selection::Year { year }),
        query.season.map(|id| Selection::Season { id }),
        custom,
    ]
    .into_iter()
    .flatten();

    let selection = chosen.next().unwrap_or_default();
    if chosen.next().is_some() {
        return Err(AppError::bad_request("use only one of year, season or from/to"));
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::AppData;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn unwritable_state() -> AppState {
        // A directory cannot be overwritten as a file.
        let config = Config {
            data_path: std::env::temp_dir(),
            ..Config::default()
        };
        AppState::new(&config, AppData::default())
    }

    fn history_request() -> HistoryRequest {
        HistoryRequest {
            bracket: "3v3".into(),
            records: vec![ActivityRecord {
                timestamp: 1_704_283_200_000,
                won: 3,
                lost: 2,
            }],
        }
    }

    #[tokio::test]
    async fn failed_write_does_not_keep_history() {
        let state = unwritable_state();

        for _ in 0..2 {
            let result = add_history(
                State(state.clone()),
                Path("Whazz".to_string()),
                Json(history_request()),
            )
            .await;
            assert_eq!(result.unwrap_err().status, StatusCode::INTERNAL_SERVER_ERROR);
        }

        let data = state.data.lock().await;
        assert!(data.character("whazz").is_none());
    }

    #[tokio::test]
    async fn failed_write_does_not_keep_alts() {
        let state = unwritable_state();
        let result = set_alts(
            State(state.clone()),
            Path("Whazz".to_string()),
            Json(AltsRequest {
                alts: vec!["alt".into()],
            }),
        )
        .await;
        assert!(result.is_err());
        assert!(state.data.lock().await.character("whazz").is_none());
    }

    #[tokio::test]
    async fn successful_write_commits_history() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let config = Config {
            data_path: std::env::temp_dir().join(format!("pvp_activity_handlers_{nanos}.json")),
            ..Config::default()
        };
        let state = AppState::new(&config, AppData::default());

        let Json(response) = add_history(
            State(state.clone()),
            Path("Whazz".to_string()),
            Json(history_request()),
        )
        .await
        .unwrap();
        assert_eq!(response.total_records, 1);
        assert_eq!(state.data.lock().await.character("whazz").unwrap().record_count(), 1);
        let _ = std::fs::remove_file(&config.data_path);
    }

    #[test]
    fn empty_query_is_rolling_year() {
        let selection = selection_from_query(&HeatmapQuery::default()).unwrap();
        assert_eq!(selection, Selection::RollingYear);
    }

    #[test]
    fn single_selector_is_used() {
        let query = HeatmapQuery {
            season: Some(38),
            ..HeatmapQuery::default()
        };
        assert_eq!(selection_from_query(&query).unwrap(), Selection::Season { id: 38 });

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let query = HeatmapQuery {
            from: Some(start),
            to: Some(end),
            ..HeatmapQuery::default()
        };
        assert_eq!(selection_from_query(&query).unwrap(), Selection::Custom { start, end });
    }

    #[test]
    fn conflicting_selectors_are_rejected() {
        let query = HeatmapQuery {
            year: Some(2024),
            season: Some(38),
            ..HeatmapQuery::default()
        };
        assert_eq!(selection_from_query(&query).unwrap_err().status, StatusCode::BAD_REQUEST);

        let query = HeatmapQuery {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..HeatmapQuery::default()
        };
        assert_eq!(selection_from_query(&query).unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
