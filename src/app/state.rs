//! Application state management

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::api::{ApiClient, ApiError, AssignCategoryRequest, MetadataFilterRequest};
use crate::app::notifications::Toast;
use crate::app::requests::{RequestKind, RequestSequencer, RequestToken};
use crate::config::Settings;
use crate::models::{AnnotationEntry, CategoryCatalog, PechaMetadata};

/// Most toasts kept at once; older ones are dropped first
const MAX_TOASTS: usize = 5;

/// Messages for state updates
#[derive(Debug)]
pub enum AppMessage {
    // User requests
    RefreshCatalog,
    FetchPechas {
        page: u32,
    },
    SetTargetPecha {
        pecha: PechaMetadata,
    },
    RefreshAnnotations,
    AssignCategory {
        pecha_id: String,
        category_id: String,
        relate_pecha: bool,
    },
    Notify(Toast),

    // Request completions
    CatalogLoaded {
        token: RequestToken,
        result: Result<CategoryCatalog, ApiError>,
    },
    PechasLoaded {
        token: RequestToken,
        page: u32,
        result: Result<Vec<PechaMetadata>, ApiError>,
    },
    AnnotationsLoaded {
        token: RequestToken,
        pecha_id: String,
        result: Result<Vec<AnnotationEntry>, ApiError>,
    },
    CategoryAssigned {
        token: RequestToken,
        pecha_id: String,
        category_id: String,
        result: Result<(), ApiError>,
    },
}

/// UI update signals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdateSignal {
    CatalogUpdated,
    PechasUpdated,
    TargetChanged,
    AnnotationsUpdated,
    CategoryAssigned { pecha_id: String, category_id: String },
    ToastsUpdated,
    LoadingChanged,
}

/// A value that is only ever replaced wholesale. `version` lets views
/// notice a replacement without comparing contents.
#[derive(Debug, Clone, Default)]
pub struct Snapshot<T> {
    pub version: u64,
    pub data: T,
}

impl<T> Snapshot<T> {
    pub fn replace(&mut self, data: T) {
        self.version += 1;
        self.data = data;
    }
}

/// One page of pechas
#[derive(Debug, Clone, Default)]
pub struct PechaPage {
    pub page: u32,
    pub items: Vec<PechaMetadata>,
    /// The backend returned a full page, so another one may follow
    pub has_more: bool,
}

/// Annotations of one pecha
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    pub pecha_id: Option<String>,
    pub entries: Vec<AnnotationEntry>,
}

/// Central application state
pub struct AppState {
    pub settings: Settings,
    pub api: ApiClient,
    pub catalog: RwLock<Snapshot<Option<CategoryCatalog>>>,
    pub pechas: RwLock<Snapshot<PechaPage>>,
    pub target: RwLock<Option<PechaMetadata>>,
    pub annotations: RwLock<Snapshot<AnnotationSet>>,
    pub toasts: RwLock<VecDeque<Toast>>,
    pub loading: RwLock<HashSet<RequestKind>>,
    pub last_refresh: RwLock<Option<DateTime<Utc>>>,
    pub requests: RequestSequencer,
    pub ui_update_tx: broadcast::Sender<UiUpdateSignal>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        api: ApiClient,
        ui_update_tx: broadcast::Sender<UiUpdateSignal>,
    ) -> Self {
        Self {
            settings,
            api,
            catalog: RwLock::new(Snapshot::default()),
            pechas: RwLock::new(Snapshot::default()),
            target: RwLock::new(None),
            annotations: RwLock::new(Snapshot::default()),
            toasts: RwLock::new(VecDeque::with_capacity(MAX_TOASTS)),
            loading: RwLock::new(HashSet::new()),
            last_refresh: RwLock::new(None),
            requests: RequestSequencer::new(),
            ui_update_tx,
        }
    }

    pub fn notify_ui(&self, signal: UiUpdateSignal) {
        let _ = self.ui_update_tx.send(signal);
    }

    pub async fn push_toast(&self, toast: Toast) {
        let mut toasts = self.toasts.write().await;
        toasts.push_back(toast);
        while toasts.len() > MAX_TOASTS {
            toasts.pop_front();
        }
        drop(toasts);
        self.notify_ui(UiUpdateSignal::ToastsUpdated);
    }

    /// Drop expired toasts; returns true when anything was removed
    pub async fn expire_toasts(&self, now: DateTime<Utc>) -> bool {
        let ttl = self.settings.toast_ttl();
        let mut toasts = self.toasts.write().await;
        let before = toasts.len();
        toasts.retain(|t| !t.is_expired(now, ttl));
        before != toasts.len()
    }

    pub async fn is_loading(&self, kind: RequestKind) -> bool {
        self.loading.read().await.contains(&kind)
    }

    async fn begin(&self, kind: RequestKind) -> RequestToken {
        let token = self.requests.issue(kind);
        self.loading.write().await.insert(kind);
        self.notify_ui(UiUpdateSignal::LoadingChanged);
        token
    }

    /// Finish a request. Returns false when a newer request of the same
    /// kind has been issued since, in which case the result must be ignored.
    async fn finish(&self, token: &RequestToken) -> bool {
        if !self.requests.is_current(token) {
            tracing::debug!("Dropping stale {:?} response (seq {})", token.kind, token.seq);
            return false;
        }
        self.loading.write().await.remove(&token.kind);
        self.notify_ui(UiUpdateSignal::LoadingChanged);
        true
    }

    async fn touch_refresh(&self) {
        *self.last_refresh.write().await = Some(Utc::now());
    }
}

/// Run the state manager task
pub async fn run_state_manager(
    state: Arc<AppState>,
    mut rx: mpsc::Receiver<AppMessage>,
    state_tx: mpsc::Sender<AppMessage>,
) {
    tracing::info!("State manager started");

    while let Some(msg) = rx.recv().await {
        handle_message(&state, msg, &state_tx).await;
    }

    tracing::info!("State manager stopped");
}

/// Apply one message. Requests are spawned so the manager keeps draining
/// its queue while they are in flight; their results come back as
/// completion messages on `state_tx`.
pub async fn handle_message(
    state: &Arc<AppState>,
    msg: AppMessage,
    state_tx: &mpsc::Sender<AppMessage>,
) {
    match msg {
        AppMessage::RefreshCatalog => {
            let token = state.begin(RequestKind::Catalog).await;
            let api = state.api.clone();
            let tx = state_tx.clone();
            tokio::spawn(async move {
                let result = api.fetch_categories().await;
                let _ = tx.send(AppMessage::CatalogLoaded { token, result }).await;
            });
        }

        AppMessage::FetchPechas { page } => {
            let token = state.begin(RequestKind::Pechas).await;
            let api = state.api.clone();
            let tx = state_tx.clone();
            let request = MetadataFilterRequest::page(page, state.settings.page_size.max(1));
            tokio::spawn(async move {
                let result = api.filter_metadata(&request).await;
                let _ = tx.send(AppMessage::PechasLoaded { token, page, result }).await;
            });
        }

        AppMessage::SetTargetPecha { pecha } => {
            tracing::info!("Target pecha: {}", pecha.id);
            let pecha_id = pecha.id.clone();
            *state.target.write().await = Some(pecha);
            state.annotations.write().await.replace(AnnotationSet {
                pecha_id: Some(pecha_id.clone()),
                entries: Vec::new(),
            });
            state.notify_ui(UiUpdateSignal::TargetChanged);
            state.notify_ui(UiUpdateSignal::AnnotationsUpdated);
            spawn_annotations(state, state_tx, pecha_id).await;
        }

        AppMessage::RefreshAnnotations => {
            let pecha_id = state.target.read().await.as_ref().map(|p| p.id.clone());
            match pecha_id {
                Some(id) => spawn_annotations(state, state_tx, id).await,
                None => state.push_toast(Toast::info("Choose a pecha first")).await,
            }
        }

        AppMessage::AssignCategory {
            pecha_id,
            category_id,
            relate_pecha,
        } => {
            tracing::info!("Assigning category {} to {}", category_id, pecha_id);
            let token = state.begin(RequestKind::Assign).await;
            let api = state.api.clone();
            let tx = state_tx.clone();
            let request = AssignCategoryRequest {
                category_id: category_id.clone(),
                site: state.settings.site.clone(),
                relate_pecha: relate_pecha.then_some(true),
            };
            tokio::spawn(async move {
                let result = api.assign_category(&pecha_id, &request).await;
                let _ = tx
                    .send(AppMessage::CategoryAssigned {
                        token,
                        pecha_id,
                        category_id,
                        result,
                    })
                    .await;
            });
        }

        AppMessage::Notify(toast) => state.push_toast(toast).await,

        AppMessage::CatalogLoaded { token, result } => {
            if !state.finish(&token).await {
                return;
            }
            match result {
                Ok(catalog) => {
                    tracing::info!("Loaded {} root categories", catalog.len());
                    state.catalog.write().await.replace(Some(catalog));
                    state.touch_refresh().await;
                    state.notify_ui(UiUpdateSignal::CatalogUpdated);
                }
                Err(e) => {
                    tracing::error!("Failed to load categories: {}", e);
                    state
                        .push_toast(Toast::error(format!("Failed to load categories: {}", e)))
                        .await;
                }
            }
        }

        AppMessage::PechasLoaded { token, page, result } => {
            if !state.finish(&token).await {
                return;
            }
            match result {
                Ok(items) => {
                    let has_more = items.len() as u32 >= state.settings.page_size.max(1);
                    let filter = state.settings.relation_filter;
                    let items: Vec<PechaMetadata> =
                        items.into_iter().filter(|p| filter.matches(p)).collect();
                    tracing::info!("Loaded {} pechas (page {})", items.len(), page);
                    state.pechas.write().await.replace(PechaPage {
                        page,
                        items,
                        has_more,
                    });
                    state.touch_refresh().await;
                    state.notify_ui(UiUpdateSignal::PechasUpdated);
                }
                Err(e) => {
                    tracing::error!("Failed to load pechas: {}", e);
                    state
                        .push_toast(Toast::error(format!("Failed to load pechas: {}", e)))
                        .await;
                }
            }
        }

        AppMessage::AnnotationsLoaded {
            token,
            pecha_id,
            result,
        } => {
            if !state.finish(&token).await {
                return;
            }
            let current = state.target.read().await.as_ref().map(|p| p.id.clone());
            if current.as_deref() != Some(pecha_id.as_str()) {
                tracing::debug!("Dropping annotations for {}: target changed", pecha_id);
                return;
            }
            match result {
                Ok(entries) => {
                    tracing::info!("Loaded {} annotations for {}", entries.len(), pecha_id);
                    state.annotations.write().await.replace(AnnotationSet {
                        pecha_id: Some(pecha_id),
                        entries,
                    });
                    state.notify_ui(UiUpdateSignal::AnnotationsUpdated);
                }
                Err(e) if e.is_not_found() => {
                    tracing::info!("No annotations for {}", pecha_id);
                    state.annotations.write().await.replace(AnnotationSet {
                        pecha_id: Some(pecha_id),
                        entries: Vec::new(),
                    });
                    state.notify_ui(UiUpdateSignal::AnnotationsUpdated);
                }
                Err(e) => {
                    tracing::error!("Failed to load annotations for {}: {}", pecha_id, e);
                    state
                        .push_toast(Toast::error(format!("Failed to load annotations: {}", e)))
                        .await;
                }
            }
        }

        AppMessage::CategoryAssigned {
            token,
            pecha_id,
            category_id,
            result,
        } => {
            // Every assignment was a deliberate user action; report all of them
            let _ = state.finish(&token).await;
            match result {
                Ok(()) => {
                    tracing::info!("Category {} assigned to {}", category_id, pecha_id);
                    record_category(state, &pecha_id, &category_id).await;
                    state
                        .push_toast(Toast::success(format!(
                            "Assigned category {} to {}",
                            category_id, pecha_id
                        )))
                        .await;
                    state.notify_ui(UiUpdateSignal::CategoryAssigned {
                        pecha_id,
                        category_id,
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to assign category to {}: {}", pecha_id, e);
                    state
                        .push_toast(Toast::error(format!("Failed to assign category: {}", e)))
                        .await;
                }
            }
        }
    }
}

async fn spawn_annotations(
    state: &Arc<AppState>,
    state_tx: &mpsc::Sender<AppMessage>,
    pecha_id: String,
) {
    let token = state.begin(RequestKind::Annotations).await;
    let api = state.api.clone();
    let tx = state_tx.clone();
    tokio::spawn(async move {
        let result = api.fetch_annotations(&pecha_id).await;
        let _ = tx
            .send(AppMessage::AnnotationsLoaded {
                token,
                pecha_id,
                result,
            })
            .await;
    });
}

/// Reflect a successful assignment in the cached pecha records
async fn record_category(state: &AppState, pecha_id: &str, category_id: &str) {
    if let Some(target) = state.target.write().await.as_mut() {
        if target.id == pecha_id {
            target.category = Some(category_id.to_string());
        }
    }

    let mut pechas = state.pechas.write().await;
    let mut page = pechas.data.clone();
    if let Some(p) = page.items.iter_mut().find(|p| p.id == pecha_id) {
        p.category = Some(category_id.to_string());
        pechas.replace(page);
    }
}
