// Signet — Host Window Collaborator
//
// Abstraction over the host platform's window list and popup creation.
// The platform, not this crate, owns window lifetimes: handles returned
// here may be invalidated at any time, which is why the registry layer
// reconciles against `list_windows` instead of trusting its own records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform-assigned window handle.
pub type WindowId = u32;

#[derive(Debug, Error)]
pub enum WindowHostError {
    #[error("window host error: {0}")]
    Host(String),
}

/// Screen geometry of a window, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// A window as reported by the host platform.
#[derive(Debug, Clone)]
pub struct HostWindow {
    pub id: WindowId,
    pub geometry: WindowGeometry,
    pub focused: bool,
}

/// Host windowing operations consumed by the registry.
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Every window the platform currently reports.
    async fn list_windows(&self) -> Result<Vec<HostWindow>, WindowHostError>;

    /// Ask the platform to open a popup window. Returns `None` when the
    /// platform declines to allocate a handle.
    async fn open_window(
        &self,
        url: &str,
        geometry: WindowGeometry,
    ) -> Result<Option<WindowId>, WindowHostError>;

    /// The currently focused window, if the platform reports one.
    async fn current_window(&self) -> Result<Option<HostWindow>, WindowHostError>;
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    /// A mock window host tracking opened windows in memory. Windows can be
    /// closed behind the registry's back to simulate the platform reaping
    /// them between process lifetimes.
    pub struct MockWindowHost {
        next_id: AtomicU32,
        refuse_open: AtomicBool,
        windows: Mutex<Vec<HostWindow>>,
        opened_urls: Mutex<Vec<String>>,
    }

    impl MockWindowHost {
        pub fn new() -> Self {
            Self {
                next_id: AtomicU32::new(1),
                refuse_open: AtomicBool::new(false),
                windows: Mutex::new(Vec::new()),
                opened_urls: Mutex::new(Vec::new()),
            }
        }

        /// A host whose focused window has the given geometry.
        pub fn with_current(geometry: WindowGeometry) -> Self {
            let host = Self::new();
            let id = host.next_id.fetch_add(1, Ordering::SeqCst);
            host.windows.lock().unwrap().push(HostWindow {
                id,
                geometry,
                focused: true,
            });
            host
        }

        /// Make subsequent `open_window` calls return `Ok(None)`.
        pub fn refuse_opens(&self) {
            self.refuse_open.store(true, Ordering::SeqCst);
        }

        /// Simulate the platform closing a window without telling anyone.
        pub fn close(&self, id: WindowId) {
            self.windows.lock().unwrap().retain(|w| w.id != id);
        }

        /// URLs passed to `open_window`, in order.
        pub fn opened_urls(&self) -> Vec<String> {
            self.opened_urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WindowHost for MockWindowHost {
        async fn list_windows(&self) -> Result<Vec<HostWindow>, WindowHostError> {
            Ok(self.windows.lock().unwrap().clone())
        }

        async fn open_window(
            &self,
            url: &str,
            geometry: WindowGeometry,
        ) -> Result<Option<WindowId>, WindowHostError> {
            if self.refuse_open.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.windows.lock().unwrap().push(HostWindow {
                id,
                geometry,
                focused: false,
            });
            self.opened_urls.lock().unwrap().push(url.to_string());
            Ok(Some(id))
        }

        async fn current_window(&self) -> Result<Option<HostWindow>, WindowHostError> {
            Ok(self
                .windows
                .lock()
                .unwrap()
                .iter()
                .find(|w| w.focused)
                .cloned())
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
