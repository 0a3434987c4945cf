//! Song catalog endpoint

use axum::{extract::State, Json};
use karaoke_common::db::{list_catalog, CatalogSong};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/songs
///
/// Catalog as `{title, artist}` pairs, sorted by artist then title.
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<CatalogSong>>> {
    match list_catalog(&state.db).await {
        Ok(songs) => Ok(Json(songs)),
        Err(e) => {
            let err = ApiError::from(e);
            err.log("list", "songs");
            Err(err)
        }
    }
}
