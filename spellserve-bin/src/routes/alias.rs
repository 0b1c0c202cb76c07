use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{blocking, ApiError, ApiJson, AppState, Empty, ListResponse};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AliasPath {
    alias: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AliasBody {
    /// dictionary code the alias points at
    dictionary: String,
}

pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        items: state.registry.list_aliases(),
    })
}

pub async fn get(
    State(state): State<AppState>,
    Path(AliasPath { alias }): Path<AliasPath>,
) -> Result<Json<AliasBody>, ApiError> {
    let code = state.registry.get_code_by_alias(&alias)?;
    Ok(Json(AliasBody {
        dictionary: code.to_string(),
    }))
}

pub async fn set(
    State(state): State<AppState>,
    Path(AliasPath { alias }): Path<AliasPath>,
    ApiJson(req): ApiJson<AliasBody>,
) -> Result<Json<Empty>, ApiError> {
    let registry = Arc::clone(&state.registry);
    blocking(move || {
        registry.set_alias(&alias, &req.dictionary)?;
        Ok(Json(Empty {}))
    })
    .await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(AliasPath { alias }): Path<AliasPath>,
) -> Result<Json<Empty>, ApiError> {
    let registry = Arc::clone(&state.registry);
    blocking(move || {
        registry.delete_alias(&alias)?;
        Ok(Json(Empty {}))
    })
    .await
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::tests::{app, call};

    #[tokio::test]
    async fn alias_lifecycle() {
        let t = app();
        call(
            &t.app,
            Method::POST,
            "/v1/dictionaries/en",
            Some(json!({ "alphabet": "abc" })),
        )
        .await;

        let (status, _) = call(
            &t.app,
            Method::PUT,
            "/v1/aliases/eng",
            Some(json!({ "dictionary": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&t.app, Method::GET, "/v1/aliases/eng", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "dictionary": "en" }));

        let (_, body) = call(&t.app, Method::GET, "/v1/aliases", None).await;
        assert_eq!(body, json!({ "items": [{ "code": "en", "aliases": ["eng"] }] }));

        let (status, _) = call(&t.app, Method::POST, "/v1/dictionaries/eng/save", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &t.app,
            Method::POST,
            "/v1/dictionaries/eng/add",
            Some(json!({ "phrases": [{ "text": "abc" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&t.app, Method::DELETE, "/v1/aliases/eng", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&t.app, Method::GET, "/v1/aliases/eng", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Alias 'eng' not found");
    }

    #[tokio::test]
    async fn alias_to_unknown_dictionary() {
        let t = app();

        let (status, _) = call(
            &t.app,
            Method::PUT,
            "/v1/aliases/eng",
            Some(json!({ "dictionary": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&t.app, Method::DELETE, "/v1/aliases/eng", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
