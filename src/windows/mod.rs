// Signet — Windows Module
//
// Registry of open privileged UI windows, reconciled against the host
// platform's window list.

mod registry;

pub use registry::{AppWindowRecord, AppWindowRegistry, RegistryError, WindowType};
