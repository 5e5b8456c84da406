// Signet — App Window Registry
//
// Tracks which privileged UI windows are open, by type. The registry is a
// cache of the host platform's window list, not a source of truth: records
// can outlive their windows whenever the platform reaps a popup or the
// privileged process restarts, so `hydrate` reconciles on every cold start
// and callers treat `get_by_type` as a hint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::{
    StorageArea, StorageError, WindowGeometry, WindowHost, WindowId,
};

const WINDOW_PREFIX: &str = "signet.window.";

const DEFAULT_WIDTH: u32 = 400;
const DEFAULT_HEIGHT: u32 = 600;

/// Position used when the platform reports no focused window to center on.
const FALLBACK_POSITION: (i32, i32) = (100, 100);

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("malformed stored window record: {0}")]
    Malformed(String),
}

/// Kinds of privileged UI windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Main,
    Background,
    Registration,
}

impl WindowType {
    /// Entry document the window loads.
    pub fn entry_url(&self) -> &'static str {
        match self {
            WindowType::Main => "main.html",
            WindowType::Background => "background.html",
            WindowType::Registration => "registration.html",
        }
    }
}

/// One tracked privileged window, persisted so a later process can reopen
/// near the same position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppWindowRecord {
    pub window_id: WindowId,
    pub window_type: WindowType,
    pub left: i32,
    pub top: i32,
}

pub struct AppWindowRegistry {
    storage: Arc<dyn StorageArea>,
    host: Arc<dyn WindowHost>,
}

impl AppWindowRegistry {
    pub fn new(storage: Arc<dyn StorageArea>, host: Arc<dyn WindowHost>) -> Self {
        Self { storage, host }
    }

    /// Open a privileged window of the given type and track it.
    ///
    /// Window creation is best-effort UI, not a correctness-critical path:
    /// when the platform declines to allocate a handle (or errors), the
    /// failure is logged and `Ok(None)` is returned.
    pub async fn create_window(
        &self,
        window_type: WindowType,
        search_params: &[(&str, &str)],
        position_hint: Option<(i32, i32)>,
    ) -> Result<Option<WindowId>, RegistryError> {
        let url = build_url(window_type.entry_url(), search_params);

        let (left, top) = match position_hint {
            Some(position) => position,
            None => self.centered_position().await,
        };
        let geometry = WindowGeometry {
            left,
            top,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        };

        let window_id = match self.host.open_window(&url, geometry).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::warn!(?window_type, %url, "platform declined to open window");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(?window_type, %url, error = %e, "window creation failed");
                return Ok(None);
            }
        };

        let record = AppWindowRecord {
            window_id,
            window_type,
            left,
            top,
        };
        let value = serde_json::to_value(&record)
            .map_err(|e| RegistryError::Malformed(e.to_string()))?;
        self.storage.set(&storage_key(window_id), value).await?;

        tracing::debug!(window_id, ?window_type, "window opened and tracked");
        Ok(Some(window_id))
    }

    /// Reconcile persisted records against the platform's live window
    /// list, pruning records whose windows no longer exist. Must run on
    /// every privileged-context cold start: records may be stale from a
    /// previous process's lifetime.
    pub async fn hydrate(&self) -> Result<(), RegistryError> {
        let live: Vec<WindowId> = match self.host.list_windows().await {
            Ok(windows) => windows.into_iter().map(|w| w.id).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "window list unavailable; skipping hydrate");
                return Ok(());
            }
        };

        let mut stale = Vec::new();
        for record in self.all_records().await? {
            if !live.contains(&record.window_id) {
                stale.push(storage_key(record.window_id));
                tracing::debug!(
                    window_id = record.window_id,
                    window_type = ?record.window_type,
                    "pruning stale window record"
                );
            }
        }

        if !stale.is_empty() {
            let refs: Vec<&str> = stale.iter().map(String::as_str).collect();
            self.storage.remove(&refs).await?;
        }
        Ok(())
    }

    pub async fn get_by_type(
        &self,
        window_type: WindowType,
    ) -> Result<Vec<AppWindowRecord>, RegistryError> {
        Ok(self
            .all_records()
            .await?
            .into_iter()
            .filter(|r| r.window_type == window_type)
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<AppWindowRecord>, RegistryError> {
        let mut records = Vec::new();
        for (key, value) in self.storage.get_all().await? {
            if key.starts_with(WINDOW_PREFIX) {
                records.push(
                    serde_json::from_value(value)
                        .map_err(|e| RegistryError::Malformed(format!("{}: {}", key, e)))?,
                );
            }
        }
        Ok(records)
    }

    /// Default position: centered over the currently focused host window.
    async fn centered_position(&self) -> (i32, i32) {
        let current = match self.host.current_window().await {
            Ok(Some(window)) => window,
            _ => return FALLBACK_POSITION,
        };

        let g = current.geometry;
        let left = g.left + (g.width as i32 - DEFAULT_WIDTH as i32) / 2;
        let top = g.top + (g.height as i32 - DEFAULT_HEIGHT as i32) / 2;
        (left.max(0), top.max(0))
    }
}

fn storage_key(window_id: WindowId) -> String {
    format!("{}{}", WINDOW_PREFIX, window_id)
}

fn build_url(entry: &str, search_params: &[(&str, &str)]) -> String {
    if search_params.is_empty() {
        return entry.to_string();
    }

    let query: Vec<String> = search_params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    format!("{}?{}", entry, query.join("&"))
}

/// Percent-encode everything outside the URL-unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStorage, MockWindowHost};

    fn registry_with(host: Arc<MockWindowHost>) -> AppWindowRegistry {
        AppWindowRegistry::new(Arc::new(MemoryStorage::new()), host)
    }

    #[tokio::test]
    async fn test_create_window_tracks_a_record() {
        let host = Arc::new(MockWindowHost::new());
        let registry = registry_with(host.clone());

        let id = registry
            .create_window(WindowType::Main, &[("event", "r1")], None)
            .await
            .unwrap()
            .unwrap();

        let records = registry.get_by_type(WindowType::Main).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].window_id, id);
        assert_eq!(host.opened_urls(), vec!["main.html?event=r1".to_string()]);
    }

    #[tokio::test]
    async fn test_refused_window_is_logged_not_thrown() {
        let host = Arc::new(MockWindowHost::new());
        host.refuse_opens();
        let registry = registry_with(host);

        let result = registry
            .create_window(WindowType::Main, &[], None)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_default_position_centers_on_focused_window() {
        let host = Arc::new(MockWindowHost::with_current(WindowGeometry {
            left: 200,
            top: 100,
            width: 1600,
            height: 1200,
        }));
        let registry = registry_with(host);

        registry
            .create_window(WindowType::Main, &[], None)
            .await
            .unwrap()
            .unwrap();

        let records = registry.get_by_type(WindowType::Main).await.unwrap();
        assert_eq!(records[0].left, 200 + (1600 - 400) / 2);
        assert_eq!(records[0].top, 100 + (1200 - 600) / 2);
    }

    #[tokio::test]
    async fn test_explicit_position_hint_wins() {
        let host = Arc::new(MockWindowHost::new());
        let registry = registry_with(host);

        registry
            .create_window(WindowType::Registration, &[], Some((42, 24)))
            .await
            .unwrap()
            .unwrap();

        let records = registry.get_by_type(WindowType::Registration).await.unwrap();
        assert_eq!((records[0].left, records[0].top), (42, 24));
    }

    #[tokio::test]
    async fn test_hydrate_prunes_exactly_the_stale_record() {
        let host = Arc::new(MockWindowHost::new());
        let registry = registry_with(host.clone());

        let kept = registry
            .create_window(WindowType::Main, &[], None)
            .await
            .unwrap()
            .unwrap();
        let reaped = registry
            .create_window(WindowType::Background, &[], None)
            .await
            .unwrap()
            .unwrap();

        // The platform closes one window behind the registry's back.
        host.close(reaped);
        registry.hydrate().await.unwrap();

        let main = registry.get_by_type(WindowType::Main).await.unwrap();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].window_id, kept);
        assert!(registry
            .get_by_type(WindowType::Background)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_with_no_records_is_a_no_op() {
        let registry = registry_with(Arc::new(MockWindowHost::new()));
        assert!(registry.hydrate().await.is_ok());
    }

    #[test]
    fn test_url_components_are_percent_encoded() {
        let url = build_url("main.html", &[("event", "a b&c=d")]);
        assert_eq!(url, "main.html?event=a%20b%26c%3Dd");
    }

    #[test]
    fn test_url_without_params_is_bare_entry() {
        assert_eq!(build_url("background.html", &[]), "background.html");
    }
}
