use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<AppData>(&bytes) {
            Ok(data) => {
                for (character, history) in &data.characters {
                    debug!(
                        %character,
                        brackets = history.brackets.len(),
                        records = history.record_count(),
                        alts = history.alts.len(),
                        "loaded character history"
                    );
                }
                info!(
                    characters = data.characters.len(),
                    records = data.record_count(),
                    "loaded activity history from {}",
                    path.display()
                );
                data
            }
            Err(err) => {
                error!("failed to parse activity history {}: {err}", path.display());
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read activity history {}: {err}", path.display());
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
