use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::{icons, repo};
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list))
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub title: String,
    pub icon: &'static str,
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let rows = repo::list(&state.db).await?;
    let out = rows
        .into_iter()
        .map(|c| CategoryResponse {
            icon: icons::resolve(&c.icon),
            title: c.title,
        })
        .collect();
    Ok(Json(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::repo::Category;
    use time::OffsetDateTime;

    #[test]
    fn response_resolves_icons_through_registry() {
        let rows = vec![
            Category {
                title: "Vehicles".into(),
                icon: "car".into(),
                created_at: OffsetDateTime::now_utc(),
            },
            Category {
                title: "Antiques".into(),
                icon: "gramophone".into(),
                created_at: OffsetDateTime::now_utc(),
            },
        ];
        let out: Vec<CategoryResponse> = rows
            .into_iter()
            .map(|c| CategoryResponse {
                icon: icons::resolve(&c.icon),
                title: c.title,
            })
            .collect();
        assert_eq!(out[0].icon, "car");
        assert_eq!(out[1].icon, icons::DEFAULT_ICON);
    }
}
