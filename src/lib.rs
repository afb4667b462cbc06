pub mod activity;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod seasons;
pub mod state;
pub mod storage;

pub use activity::{aggregate, aggregate_at};
pub use app::router;
pub use config::Config;
pub use errors::{ActivityError, AppError};
pub use models::{ActivityHeatmap, ActivityRecord, DayBucket, Selection, SeasonWindow, WeekRow};
pub use seasons::{current_season, season_for_timestamp};
pub use state::AppState;
pub use storage::load_data;
