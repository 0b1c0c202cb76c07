use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use spellserve::checker::{self, Fix, Phrase};
use spellserve::dictionary::DictionaryOptions;

use super::{blocking, ApiError, ApiJson, AppState, Empty, ListResponse};

const MAX_ERRORS_LIMIT: u32 = 5;
const DEFAULT_FIX_LIMIT: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CodePath {
    /// dictionary code
    code: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// every character a word may contain, each once
    #[serde(default)]
    alphabet: String,
    /// largest edit distance of suggestions, 0 for the default of 2
    #[serde(default)]
    max_errors: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddRequest {
    #[serde(default)]
    phrases: Vec<Phrase>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AddResponse {
    /// number of words submitted
    words: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FixRequest {
    #[serde(default)]
    text: String,
    /// most suggestions per word
    #[serde(default = "default_fix_limit")]
    limit: usize,
}

fn default_fix_limit() -> usize {
    DEFAULT_FIX_LIMIT
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct FixResponse {
    fixes: Vec<Fix>,
}

pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        items: state.registry.list(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    Path(CodePath { code }): Path<CodePath>,
    ApiJson(req): ApiJson<CreateRequest>,
) -> Result<Json<Empty>, ApiError> {
    if req.alphabet.is_empty() {
        return Err(ApiError::InvalidArgument("alphabet is required".into()));
    }
    if req.max_errors > MAX_ERRORS_LIMIT {
        return Err(ApiError::InvalidArgument(format!(
            "maxErrors must be at most {}",
            MAX_ERRORS_LIMIT
        )));
    }

    let registry = Arc::clone(&state.registry);
    blocking(move || {
        registry.add(&code, DictionaryOptions::new(req.alphabet, req.max_errors))?;
        Ok(Json(Empty {}))
    })
    .await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(CodePath { code }): Path<CodePath>,
) -> Result<Json<Empty>, ApiError> {
    let registry = Arc::clone(&state.registry);
    blocking(move || {
        registry.delete(&code)?;
        Ok(Json(Empty {}))
    })
    .await
}

pub async fn save(
    State(state): State<AppState>,
    Path(CodePath { code }): Path<CodePath>,
) -> Result<Json<Empty>, ApiError> {
    let registry = Arc::clone(&state.registry);
    blocking(move || {
        registry.save(&code)?;
        Ok(Json(Empty {}))
    })
    .await
}

pub async fn add(
    State(state): State<AppState>,
    Path(CodePath { code }): Path<CodePath>,
    ApiJson(req): ApiJson<AddRequest>,
) -> Result<Json<AddResponse>, ApiError> {
    blocking(move || {
        let dictionary = state.registry.get(&code)?;
        let words = checker::add_phrases(&*dictionary, &state.splitter, &req.phrases);

        log::debug!("{} words added to '{}'", words, code);
        Ok(Json(AddResponse { words }))
    })
    .await
}

pub async fn fix(
    State(state): State<AppState>,
    Path(CodePath { code }): Path<CodePath>,
    ApiJson(req): ApiJson<FixRequest>,
) -> Result<Json<FixResponse>, ApiError> {
    blocking(move || {
        let dictionary = state.registry.get(&code)?;
        let fixes = checker::fix_text(&*dictionary, &state.splitter, &req.text, req.limit);

        Ok(Json(FixResponse { fixes }))
    })
    .await
}
