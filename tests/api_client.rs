//! ApiClient against an in-process backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use pecha_admin::api::{ApiClient, ApiError, AssignCategoryRequest, MetadataFilterRequest};
use pecha_admin::app::state::{handle_message, AppMessage, AppState, UiUpdateSignal};
use pecha_admin::config::Settings;
use pecha_admin::models::{LanguagePolicy, SelectableOption};
use pecha_admin::ui::widgets::SearchableSelector;

#[derive(Default)]
struct Recorded {
    assignments: Mutex<Vec<(String, Value)>>,
    filters: Mutex<Vec<Value>>,
    auth: Mutex<Vec<String>>,
}

type Shared = Arc<Recorded>;

fn catalog() -> Value {
    json!({
        "categories": [{
            "id": "c1",
            "name": {"en": "Root", "bo": "རྩ་བ།"},
            "subcategories": {
                "c2": {"id": "c2", "name": {"en": "Child", "bo": "བུ།"}}
            }
        }]
    })
}

async fn categories(State(rec): State<Shared>, headers: HeaderMap) -> Json<Value> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        rec.auth.lock().unwrap().push(auth.to_string());
    }
    Json(catalog())
}

async fn filter(State(rec): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    rec.filters.lock().unwrap().push(body);
    Json(json!({
        "metadata": [
            {"id": "P1", "title": {"en": "Heart Sutra", "bo": "ཤེས་རབ་སྙིང་པོ།"}, "language": "bo"},
            {"id": "P2", "title": {"en": "Heart Sutra commentary"}, "commentary_of": "P1"}
        ]
    }))
}

async fn assign(
    State(rec): State<Shared>,
    Path(pecha_id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if pecha_id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Pecha not found"})));
    }
    rec.assignments.lock().unwrap().push((pecha_id, body));
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn annotations(Path(pecha_id): Path<String>) -> Json<Value> {
    if pecha_id != "P1" {
        return Json(json!({}));
    }
    Json(json!({
        "seg1": {"title": "Segmentation", "type": "segmentation"},
        "al1": {"title": "English", "type": "alignment", "aligned_to": "P9"}
    }))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn spawn_backend() -> (String, Shared) {
    let rec: Shared = Arc::default();
    let app = Router::new()
        .route("/api/categories", get(categories))
        .route("/api/metadata/filter/", post(filter))
        .route("/api/metadata/:id/category", put(assign))
        .route("/api/annotation/:id", get(annotations))
        .route("/broken/categories", get(broken))
        .with_state(rec.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), rec)
}

fn client(base: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5), token.map(String::from)).unwrap()
}

#[tokio::test]
async fn test_catalog_to_tree_selection() {
    let (base, rec) = spawn_backend().await;
    let api = client(&base, Some("secret"));

    let catalog = api.fetch_categories().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(rec.auth.lock().unwrap().as_slice(), ["Bearer secret"]);

    let mut tree = catalog.build_tree("c1").unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.root().compact_label(), "རྩ་བ། (Root)");

    let child = tree.find("c2").unwrap();
    assert!(tree.select(child));
    assert_eq!(tree.selected().map(|n| n.id.as_str()), Some("c2"));
    assert_eq!(tree.parent(child).map(|n| n.id.as_str()), Some("c1"));
}

#[tokio::test]
async fn test_filter_metadata_sends_page_and_limit() {
    let (base, rec) = spawn_backend().await;
    let api = client(&base, None);

    let pechas = api
        .filter_metadata(&MetadataFilterRequest::page(2, 25))
        .await
        .unwrap();
    assert_eq!(pechas.len(), 2);
    assert_eq!(pechas[1].commentary_of.as_deref(), Some("P1"));

    let bodies = rec.filters.lock().unwrap();
    assert_eq!(bodies[0], json!({"page": 2, "limit": 25}));

    // Options feed the selector; filtering narrows them
    let policy = LanguagePolicy::default();
    let mut selector = SearchableSelector::new("Pechas")
        .with_options(pechas.iter().map(|p| p.to_option(&policy)).collect());
    assert_eq!(selector.options()[0].label, "P1 - ཤེས་རབ་སྙིང་པོ།");
    selector.filter("commentary");
    let ids: Vec<&str> = selector.visible_options().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["P2"]);
}

#[tokio::test]
async fn test_assign_category_body() {
    let (base, rec) = spawn_backend().await;
    let api = client(&base, None);

    let request = AssignCategoryRequest {
        category_id: "c2".to_string(),
        site: "webuddhist".to_string(),
        relate_pecha: None,
    };
    api.assign_category("P1", &request).await.unwrap();

    let assignments = rec.assignments.lock().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].0, "P1");
    assert_eq!(
        assignments[0].1,
        json!({"category_id": "c2", "site": "webuddhist"})
    );
}

#[tokio::test]
async fn test_error_status_carries_backend_detail() {
    let (base, _rec) = spawn_backend().await;
    let api = client(&base, None);

    let request = AssignCategoryRequest {
        category_id: "c2".to_string(),
        site: "webuddhist".to_string(),
        relate_pecha: Some(true),
    };
    let err = api.assign_category("missing", &request).await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Pecha not found");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (base, _rec) = spawn_backend().await;
    let broken_base = base.replace("/api", "/broken");
    let api = client(&broken_base, None);

    match api.fetch_categories().await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected result: {:?}", other.is_ok()),
    }
}

#[tokio::test]
async fn test_annotations_map_keys_become_ids() {
    let (base, _rec) = spawn_backend().await;
    let api = client(&base, None);

    let mut entries = api.fetch_annotations("P1").await.unwrap();
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "al1");
    assert_eq!(entries[0].aligned_to.as_deref(), Some("P9"));
    assert_eq!(entries[1].to_option().label, "Segmentation (segmentation)");

    assert!(api.fetch_annotations("P2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_selector_filter_scenario() {
    let mut selector = SearchableSelector::new("Pechas").with_options(vec![
        SelectableOption::new("p1", "Alpha Text"),
        SelectableOption::new("p2", "Beta Text"),
    ]);
    selector.filter("beta");
    let visible: Vec<&SelectableOption> = selector.visible_options().collect();
    assert_eq!(visible, vec![&SelectableOption::new("p2", "Beta Text")]);
}

/// Drive the state manager by hand until `signal` arrives
async fn pump_until(
    state: &Arc<AppState>,
    rx: &mut mpsc::Receiver<AppMessage>,
    tx: &mpsc::Sender<AppMessage>,
    ui_rx: &mut broadcast::Receiver<UiUpdateSignal>,
    wanted: fn(&UiUpdateSignal) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            while let Ok(signal) = ui_rx.try_recv() {
                if wanted(&signal) {
                    return;
                }
            }
            if let Some(msg) = rx.recv().await {
                handle_message(state, msg, tx).await;
            }
        }
    })
    .await
    .expect("state manager did not produce the expected signal");
}

#[tokio::test]
async fn test_state_manager_assigns_to_target() {
    let (base, rec) = spawn_backend().await;
    let settings = Settings {
        api_base_url: base.clone(),
        site: "webuddhist".to_string(),
        ..Settings::default()
    };
    let api = ApiClient::from_settings(&settings).unwrap();
    let (ui_tx, mut ui_rx) = broadcast::channel(64);
    let state = Arc::new(AppState::new(settings, api, ui_tx));
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(AppMessage::FetchPechas { page: 0 }).await.unwrap();
    pump_until(&state, &mut rx, &tx, &mut ui_rx, |s| {
        matches!(s, UiUpdateSignal::PechasUpdated)
    })
    .await;

    let p1 = state.pechas.read().await.data.items[0].clone();
    tx.send(AppMessage::SetTargetPecha { pecha: p1 }).await.unwrap();
    pump_until(&state, &mut rx, &tx, &mut ui_rx, |s| {
        matches!(s, UiUpdateSignal::AnnotationsUpdated)
    })
    .await;

    tx.send(AppMessage::AssignCategory {
        pecha_id: "P1".to_string(),
        category_id: "c2".to_string(),
        relate_pecha: true,
    })
    .await
    .unwrap();
    pump_until(&state, &mut rx, &tx, &mut ui_rx, |s| {
        matches!(s, UiUpdateSignal::CategoryAssigned { .. })
    })
    .await;

    let target = state.target.read().await.clone().unwrap();
    assert_eq!(target.category.as_deref(), Some("c2"));
    assert_eq!(
        rec.assignments.lock().unwrap()[0].1,
        json!({"category_id": "c2", "site": "webuddhist", "relate_pecha": true})
    );
}
