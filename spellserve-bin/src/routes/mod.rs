use std::sync::Arc;

use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::gen::GenContext;
use aide::openapi::{Info, OpenApi, Operation};
use aide::operation::{OperationInput, OperationOutput};
use aide::redoc::Redoc;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

use spellserve::registry::error::Chain;
use spellserve::registry::{ErrorKind, ListItem, Registry, RegistryError};
use spellserve::tokenizer::WordSplitter;

mod alias;
mod dictionary;

const OPENAPI_PATH: &str = "/openapi.json";

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub splitter: Arc<WordSplitter>,
}

#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct Empty {}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListResponse {
    items: Vec<ListItem>,
}

/// Builds the `/v1` API together with its OpenAPI document, served at
/// `/openapi.json` and rendered at `/docs`.
pub fn router(state: AppState) -> Router {
    let mut api = OpenApi {
        info: Info {
            title: "spellserve".into(),
            description: Some("Named spellchecking dictionaries with aliases.".into()),
            version: env!("CARGO_PKG_VERSION").into(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let app = ApiRouter::new()
        .api_route(
            "/v1/dictionaries",
            get_with(dictionary::list, |op| {
                op.summary("List dictionaries")
                    .description("Every dictionary code with the aliases pointing at it.")
            }),
        )
        .api_route(
            "/v1/dictionaries/:code",
            post_with(dictionary::create, |op| {
                op.summary("Create dictionary")
                    .description("Registers an empty dictionary under `code`. It is not written to disk until saved.")
            })
            .delete_with(dictionary::delete, |op| {
                op.summary("Delete dictionary")
                    .description("Removes the dictionary and its file. Aliases pointing at it are kept.")
            }),
        )
        .api_route(
            "/v1/dictionaries/:code/save",
            post_with(dictionary::save, |op| {
                op.summary("Save dictionary")
                    .description("Writes the dictionary to disk atomically.")
            }),
        )
        .api_route(
            "/v1/dictionaries/:code/add",
            post_with(dictionary::add, |op| {
                op.summary("Add phrases")
                    .description("Splits phrases into words and adds them with the phrase weight. `code` may be an alias.")
            }),
        )
        .api_route(
            "/v1/dictionaries/:code/fix",
            post_with(dictionary::fix, |op| {
                op.summary("Check text")
                    .description("Reports unknown words of `text` with up to `limit` suggestions each. `code` may be an alias.")
            }),
        )
        .api_route(
            "/v1/aliases",
            get_with(alias::list, |op| {
                op.summary("List aliases")
                    .description("Every dictionary code with the aliases pointing at it.")
            }),
        )
        .api_route(
            "/v1/aliases/:alias",
            get_with(alias::get, |op| {
                op.summary("Resolve alias").description("Code the alias points at.")
            })
            .put_with(alias::set, |op| {
                op.summary("Set alias")
                    .description("Points the alias at an existing dictionary, moving it if needed.")
            })
            .delete_with(alias::delete, |op| op.summary("Delete alias")),
        )
        .route("/docs", Redoc::new(OPENAPI_PATH).with_title("spellserve").axum_route())
        .finish_api(&mut api);

    app.route(OPENAPI_PATH, axum::routing::get(openapi))
        .layer(Extension(Arc::new(api)))
        .with_state(state)
}

async fn openapi(Extension(api): Extension<Arc<OpenApi>>) -> Json<OpenApi> {
    Json(OpenApi::clone(&api))
}

/// Runs registry work off the async workers; it may wait on the registry lock
/// and on disk syncs.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("registry task failed: {}", e)))?
}

/// JSON body whose rejections are reported as [`ApiError::InvalidArgument`].
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidArgument(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

impl<T: JsonSchema> OperationInput for ApiJson<T> {
    fn operation_input(ctx: &mut GenContext, operation: &mut Operation) {
        Json::<T>::operation_input(ctx, operation);
    }
}

#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    InvalidArgument(String),
    Internal(String),
}

impl OperationOutput for ApiError {
    type Inner = Self;
}

#[derive(Serialize, JsonSchema)]
struct ErrorBody {
    status: &'static str,
    error: String,
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Registry(e) => {
                let status = match e.kind() {
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                    ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Chain(&e).to_string())
            }
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let label = match status {
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "ALREADY_EXISTS",
            StatusCode::BAD_REQUEST => "INVALID_ARGUMENT",
            _ => {
                log::error!("request failed: {}", error);
                "INTERNAL"
            }
        };

        (
            status,
            Json(ErrorBody {
                status: label,
                error,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use spellserve::dictionary::{Dictionary, DictionaryOptions};
    use tower::ServiceExt;

    pub(crate) struct TestApp {
        pub app: Router,
        pub registry: Arc<Registry>,
        _dir: tempfile::TempDir,
    }

    pub(crate) fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(Registry::open(dir.path()).unwrap());
        let app = router(AppState {
            registry: Arc::clone(&registry),
            splitter: Arc::new(WordSplitter::default()),
        });

        TestApp {
            app,
            registry,
            _dir: dir,
        }
    }

    pub(crate) async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn unknown_route() {
        let t = app();
        let (status, _) = call(&t.app, Method::GET, "/v1/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn error_body() {
        let t = app();
        let (status, body) = call(&t.app, Method::DELETE, "/v1/dictionaries/en", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "status": "NOT_FOUND", "error": "Dictionary 'en' not found" })
        );
    }

    #[tokio::test]
    async fn openapi_lists_every_route() {
        let t = app();
        let (status, body) = call(&t.app, Method::GET, "/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);

        let paths = body["paths"].as_object().unwrap();
        let expected = [
            ("/v1/dictionaries", vec!["get"]),
            ("/v1/dictionaries/{code}", vec!["post", "delete"]),
            ("/v1/dictionaries/{code}/save", vec!["post"]),
            ("/v1/dictionaries/{code}/add", vec!["post"]),
            ("/v1/dictionaries/{code}/fix", vec!["post"]),
            ("/v1/aliases", vec!["get"]),
            ("/v1/aliases/{alias}", vec!["get", "put", "delete"]),
        ];

        assert_eq!(paths.len(), expected.len());
        for (path, methods) in expected {
            for method in methods {
                let op = &paths[path][method];
                assert!(op.is_object(), "missing {} {}", method, path);
                assert!(op["summary"].is_string(), "{} {} has no summary", method, path);
            }
        }
    }

    #[tokio::test]
    async fn docs_page() {
        let t = app();
        let request = Request::builder().uri("/docs").body(Body::empty()).unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains(OPENAPI_PATH));
    }

    #[tokio::test]
    async fn malformed_body() {
        let t = app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/dictionaries/en")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "INVALID_ARGUMENT");
        assert!(body["error"].is_string());

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/v1/aliases/eng")
            .body(Body::from(r#"{"dictionary":"en"}"#))
            .unwrap();
        let response = t.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &t.app,
            Method::POST,
            "/v1/dictionaries/en/fix",
            Some(json!({ "text": "abc", "limit": -1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn alias_write_during_save() {
        let t = app();
        let dictionary = t
            .registry
            .add("en", DictionaryOptions::new("abcdefghij", 0))
            .unwrap();
        let words: Vec<String> = (0..20_000u32)
            .map(|i| {
                i.to_string()
                    .bytes()
                    .map(|d| char::from(b'a' + d - b'0'))
                    .collect()
            })
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        dictionary.add_weighted(1, &words);

        let save = call(&t.app, Method::POST, "/v1/dictionaries/en/save", None);
        let alias = call(
            &t.app,
            Method::PUT,
            "/v1/aliases/eng",
            Some(json!({ "dictionary": "en" })),
        );
        let ((save_status, _), (alias_status, _)) = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            async { tokio::join!(save, alias) },
        )
        .await
        .unwrap();

        assert_eq!(save_status, StatusCode::OK);
        assert_eq!(alias_status, StatusCode::OK);
        assert_eq!(t.registry.get_code_by_alias("eng").unwrap().as_str(), "en");
        assert!(t.registry.dir().join("en.dict").is_file());
    }

    #[test]
    fn internal_errors_map_to_500() {
        let response = ApiError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::Registry(RegistryError::AlreadyExists("en".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
