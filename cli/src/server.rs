use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use petdiary_core::fields;
use petdiary_core::i18n::{Lang, Status};
use petdiary_core::models::{
    Category, GrowthDraft, GrowthLogEntry, HandprintRecord, ImageSlot, MilestoneDraft, PetName,
    ProfileRecord, ProfileEntry, validate_meal_grams,
};
use petdiary_core::service::{
    JournalService, load_warning, validate_milestone_batch, validate_profile_group,
};
use petdiary_core::session::Page;
use petdiary_core::store::Loaded;

const BODY_LIMIT: usize = 20 * 1024 * 1024; // 20 MB, room for a phone photo

#[derive(Clone)]
struct AppState {
    svc: Arc<JournalService>,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct LangQuery {
    #[serde(default)]
    lang: Lang,
}

#[derive(Deserialize)]
struct GrowthQuery {
    /// Comma-separated dates, any of which may match.
    dates: Option<String>,
    q: Option<String>,
}

#[derive(Deserialize)]
struct NotesQuery {
    #[serde(default)]
    latest: bool,
}

#[derive(Deserialize)]
struct BirthdayRequest {
    message: String,
}

#[derive(Deserialize)]
struct NoteRequest {
    text: String,
    date: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse<'a> {
    status: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct DataResponse<T> {
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

#[derive(Serialize)]
struct PageResponse {
    number: usize,
    slug: &'static str,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (
            status,
            Json(StatusResponse {
                status: "error",
                message: &message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn parse_pet(name: &str) -> Result<PetName, ApiError> {
    PetName::parse(name).map_err(|e| ApiError::BadRequest(format!("{e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    fields::parse_date(s)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))
}

/// A save outcome. Input is validated before the service is called, so an error
/// status here means the data could not be written.
fn status_response(status: &Status, lang: Lang, success: StatusCode) -> Response {
    let code = match status {
        Status::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Status::Success(_) => success,
        Status::Info(_) | Status::Warning(_) => StatusCode::OK,
    };
    (
        code,
        Json(StatusResponse {
            status: status.kind(),
            message: status.text(lang),
        }),
    )
        .into_response()
}

fn data_response<T: Serialize>(loaded: Loaded<T>, lang: Lang) -> Json<DataResponse<T>> {
    let warning = load_warning(&loaded).map(|s| s.text(lang).to_string());
    Json(DataResponse {
        data: loaded.value,
        warning,
    })
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn list_pages(Query(q): Query<LangQuery>) -> Json<Vec<PageResponse>> {
    let pages = Page::ALL
        .into_iter()
        .map(|p| PageResponse {
            number: p.number(),
            slug: p.slug(),
            title: p.title().text(q.lang).to_string(),
            notice: p.notice().map(|m| m.text(q.lang).to_string()),
        })
        .collect();
    Json(pages)
}

async fn get_basic(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
) -> Result<Json<DataResponse<Option<ProfileRecord>>>, ApiError> {
    let pet = parse_pet(&pet)?;
    Ok(data_response(state.svc.basic(&pet), q.lang))
}

async fn put_basic(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(record): Json<ProfileRecord>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let status = state.svc.save_basic(&pet, record);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_handprint(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
) -> Result<Json<DataResponse<Option<HandprintRecord>>>, ApiError> {
    let pet = parse_pet(&pet)?;
    Ok(data_response(state.svc.handprint(&pet), q.lang))
}

async fn put_handprint(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(record): Json<HandprintRecord>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let status = state.svc.save_handprint(&pet, record);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_milestones(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    Ok(data_response(state.svc.milestones(&pet), q.lang).into_response())
}

async fn put_milestones(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(drafts): Json<Vec<MilestoneDraft>>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    validate_milestone_batch(&drafts)
        .map_err(|e| ApiError::BadRequest(e.message().text(q.lang).to_string()))?;
    let status = state.svc.save_milestones(&pet, &drafts);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_birthday(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    Ok(data_response(state.svc.birthday(&pet), q.lang).into_response())
}

async fn put_birthday(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(req): Json<BirthdayRequest>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let status = state.svc.save_birthday(&pet, &req.message);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

/// Editable-grid save: replace every row of one profile category.
async fn put_profile_group(
    State(state): State<AppState>,
    Path((pet, category)): Path<(String, String)>,
    Query(q): Query<LangQuery>,
    Json(entries): Json<Vec<ProfileEntry>>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let category: Category = category
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{e}")))?;
    validate_profile_group(category, &entries)
        .map_err(|e| ApiError::BadRequest(e.message().text(q.lang).to_string()))?;
    let status = state.svc.replace_profile_group(&pet, category, &entries);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_growth(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Query(search): Query<GrowthQuery>,
) -> Result<Json<DataResponse<Vec<GrowthLogEntry>>>, ApiError> {
    let pet = parse_pet(&pet)?;
    let dates = search
        .dates
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(parse_date)
        .collect::<Result<Vec<_>, _>>()?;
    let loaded = state.svc.search_growth(&pet, &dates, search.q.as_deref());
    Ok(data_response(loaded, q.lang))
}

async fn post_growth(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(draft): Json<GrowthDraft>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    validate_meal_grams(draft.meal_grams).map_err(|e| ApiError::BadRequest(format!("{e}")))?;
    let status = state.svc.log_growth(&pet, draft);
    Ok(status_response(&status, q.lang, StatusCode::CREATED))
}

async fn put_growth(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(entries): Json<Vec<GrowthLogEntry>>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    for entry in &entries {
        validate_meal_grams(entry.meal_grams).map_err(|e| ApiError::BadRequest(format!("{e}")))?;
    }
    let status = state.svc.replace_growth_log(&pet, &entries);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_notes(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Query(nq): Query<NotesQuery>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    if nq.latest {
        return Ok(data_response(state.svc.latest_note(&pet), q.lang).into_response());
    }
    Ok(data_response(state.svc.notes(&pet), q.lang).into_response())
}

async fn post_note(
    State(state): State<AppState>,
    Path(pet): Path<String>,
    Query(q): Query<LangQuery>,
    Json(req): Json<NoteRequest>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let date = match req.date.as_deref() {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let status = state.svc.add_note_on(&pet, date, &req.text);
    Ok(status_response(&status, q.lang, StatusCode::CREATED))
}

fn parse_slot(slot: &str) -> Result<ImageSlot, ApiError> {
    slot.parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(format!("{e}")))
}

async fn put_image(
    State(state): State<AppState>,
    Path((pet, slot)): Path<(String, String)>,
    Query(q): Query<LangQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let slot = parse_slot(&slot)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("Image body is empty".to_string()));
    }
    let status = state.svc.save_photo(&pet, slot, &body);
    Ok(status_response(&status, q.lang, StatusCode::OK))
}

async fn get_image(
    State(state): State<AppState>,
    Path((pet, slot)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let pet = parse_pet(&pet)?;
    let slot = parse_slot(&slot)?;
    let path: PathBuf = state
        .svc
        .photo_path(&pet, slot)
        .ok_or_else(|| ApiError::NotFound(format!("No {slot} image for {pet}")))?;
    let bytes = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"))],
        bytes,
    )
        .into_response())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/pages", get(list_pages))
        .route("/api/pets/{pet}/basic", get(get_basic).put(put_basic))
        .route(
            "/api/pets/{pet}/handprint",
            get(get_handprint).put(put_handprint),
        )
        .route(
            "/api/pets/{pet}/milestones",
            get(get_milestones).put(put_milestones),
        )
        .route(
            "/api/pets/{pet}/birthday",
            get(get_birthday).put(put_birthday),
        )
        .route("/api/pets/{pet}/profile/{category}", put(put_profile_group))
        .route(
            "/api/pets/{pet}/growth",
            get(get_growth).post(post_growth).put(put_growth),
        )
        .route("/api/pets/{pet}/notes", get(get_notes).post(post_note))
        .route(
            "/api/pets/{pet}/images/{slot}",
            get(get_image).put(put_image),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(svc: JournalService, port: u16, bind: &str) -> anyhow::Result<()> {
    info!(data_dir = %svc.store().root().display(), "opening diary");
    let state = AppState { svc: Arc::new(svc) };
    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        eprintln!(
            "Warning: Listening on {bind}. Any device on your network can read and edit the diary."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let svc = JournalService::open(dir.path()).unwrap();
        let app = build_router(AppState { svc: Arc::new(svc) });
        (dir, app)
    }

    async fn send(app: &Router, request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get_req(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn security_headers_present() {
        let (_dir, app) = test_app();

        let response = app.oneshot(get_req("/api/pages")).await.unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn pages_are_listed_in_requested_language() {
        let (_dir, app) = test_app();

        let (status, json) = send(&app, get_req("/api/pages?lang=en")).await;
        assert_eq!(status, StatusCode::OK);
        let pages = json.as_array().unwrap();
        assert_eq!(pages.len(), 8);
        assert_eq!(pages[0]["title"], "1. Photo Page");
        assert_eq!(pages[4]["slug"], "growth-guide");
        assert!(pages[4]["notice"].is_string());
        assert!(pages[0].get("notice").is_none());

        let (_, json) = send(&app, get_req("/api/pages")).await;
        assert_eq!(json[7]["title"], "8. メモ欄");
    }

    #[tokio::test]
    async fn unknown_language_is_rejected() {
        let (_dir, app) = test_app();
        let (status, _) = send(&app, get_req("/api/pages?lang=fr")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn basic_info_round_trip() {
        let (_dir, app) = test_app();
        let record = serde_json::json!({
            "birth_date": "2024-01-01",
            "birth_time": "06:30:00",
            "place": "Osaka",
            "weather": "sunny"
        });

        let (status, json) = send(&app, json_req("PUT", "/api/pets/Momo/basic?lang=en", &record)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Saved!");

        let (status, json) = send(&app, get_req("/api/pets/Momo/basic")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["place"], "Osaka");
        assert_eq!(json["data"]["message"], "");
        assert!(json.get("warning").is_none());
    }

    #[tokio::test]
    async fn unknown_pet_reads_empty() {
        let (_dir, app) = test_app();

        let (status, json) = send(&app, get_req("/api/pets/Nobody/basic")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"].is_null());

        let (status, json) = send(&app, get_req("/api/pets/Nobody/growth")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn blank_pet_name_is_rejected() {
        let (_dir, app) = test_app();
        let (status, json) = send(&app, get_req("/api/pets/%20/notes")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn growth_entry_gets_days_since_birth() {
        let (_dir, app) = test_app();
        let record = serde_json::json!({ "birth_date": "2024-01-01", "birth_time": "06:30:00" });
        send(&app, json_req("PUT", "/api/pets/Momo/basic", &record)).await;

        let draft = serde_json::json!({
            "timestamp": "2024-01-10T08:00:00",
            "meal": "Kibble",
            "meal_grams": 50
        });
        let (status, json) = send(&app, json_req("POST", "/api/pets/Momo/growth", &draft)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["status"], "success");

        let (_, json) = send(&app, get_req("/api/pets/Momo/growth?q=kibble")).await;
        assert_eq!(json["data"][0]["days_since_birth"], 9);

        let (_, json) = send(&app, get_req("/api/pets/Momo/growth?dates=2024-01-11")).await;
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn heavy_meal_is_bad_request() {
        let (_dir, app) = test_app();
        let draft = serde_json::json!({ "timestamp": "2024-01-10T08:00:00", "meal_grams": 501 });
        let (status, _) = send(&app, json_req("POST", "/api/pets/Momo/growth", &draft)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, json) = send(&app, get_req("/api/pets/Momo/growth")).await;
        assert_eq!(json["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn bad_search_date_is_bad_request() {
        let (_dir, app) = test_app();
        let (status, _) = send(&app, get_req("/api/pets/Momo/growth?dates=someday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn milestones_batch_rules() {
        let (_dir, app) = test_app();

        let six: Vec<_> = (1..=6)
            .map(|d| serde_json::json!({ "date": format!("2024-02-0{d}"), "description": "step" }))
            .collect();
        let (status, _) = send(
            &app,
            json_req("PUT", "/api/pets/Momo/milestones", &serde_json::json!(six)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let blank = serde_json::json!([{ "date": "2024-02-01", "description": " " }]);
        let (status, json) = send(&app, json_req("PUT", "/api/pets/Momo/milestones", &blank)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "warning");

        let two = serde_json::json!([
            { "date": "2024-02-01", "description": "sat up" },
            { "date": "2024-02-03", "description": "rolled over" }
        ]);
        send(&app, json_req("PUT", "/api/pets/Momo/milestones", &two)).await;
        let (_, json) = send(&app, get_req("/api/pets/Momo/milestones")).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"][0]["weekday"], "Thursday");
    }

    #[tokio::test]
    async fn profile_group_rejects_wrong_category() {
        let (_dir, app) = test_app();
        let rows = serde_json::json!([{ "category": "birthday", "message": "hi" }]);
        let (status, _) = send(&app, json_req("PUT", "/api/pets/Momo/profile/handprint", &rows)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, json_req("PUT", "/api/pets/Momo/profile/birthday", &rows)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, json) = send(&app, get_req("/api/pets/Momo/birthday")).await;
        assert_eq!(json["data"]["message"], "hi");
    }

    #[tokio::test]
    async fn notes_newest_first() {
        let (_dir, app) = test_app();
        for (date, text) in [("2024-01-05", "old"), ("2024-03-01", "newest"), ("2024-02-01", "middle")] {
            let (status, _) = send(
                &app,
                json_req(
                    "POST",
                    "/api/pets/Momo/notes",
                    &serde_json::json!({ "text": text, "date": date }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, json) = send(&app, get_req("/api/pets/Momo/notes")).await;
        assert_eq!(json["data"][0]["text"], "newest");
        assert_eq!(json["data"][2]["text"], "old");

        let (_, json) = send(&app, get_req("/api/pets/Momo/notes?latest=true")).await;
        assert_eq!(json["data"]["text"], "newest");
    }

    #[tokio::test]
    async fn image_upload_and_download() {
        let (_dir, app) = test_app();

        let (status, _) = send(&app, get_req("/api/pets/Momo/images/hand")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let upload = axum::http::Request::put("/api/pets/Momo/images/hand")
            .body(Body::from(&b"\xFF\xD8jpeg"[..]))
            .unwrap();
        let (status, json) = send(&app, upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");

        let response = app
            .clone()
            .oneshot(get_req("/api/pets/Momo/images/hand"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"\xFF\xD8jpeg");
    }

    #[tokio::test]
    async fn photo_above_extractor_default_is_accepted() {
        let (_dir, app) = test_app();

        let photo = vec![0xFFu8; 3 * 1024 * 1024];
        let upload = axum::http::Request::put("/api/pets/Momo/images/photo1")
            .body(Body::from(photo))
            .unwrap();
        let (status, json) = send(&app, upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let (_dir, app) = test_app();

        let big_body = vec![0u8; BODY_LIMIT + 1];
        let response = app
            .oneshot(
                axum::http::Request::put("/api/pets/Momo/images/photo1")
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unknown_image_slot_is_bad_request() {
        let (_dir, app) = test_app();
        let (status, _) = send(&app, get_req("/api/pets/Momo/images/selfie")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn write_failure_is_server_error() {
        let (dir, app) = test_app();
        let images = dir.path().join("images");
        std::fs::remove_dir_all(&images).unwrap();
        std::fs::write(&images, b"not a directory").unwrap();

        let upload = axum::http::Request::put("/api/pets/Momo/images/photo1?lang=en")
            .body(Body::from(&b"jpeg"[..]))
            .unwrap();
        let (status, json) = send(&app, upload).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
    }
}
