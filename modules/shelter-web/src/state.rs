use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

use shelter_store::AnimalShelter;

/// Shared across every session. The gateway is the only shared resource and
/// holds no per-session state.
pub struct AppState {
    pub shelter: AnimalShelter,
    pub logo: Option<Logo>,
}

/// Image embedded inline in the page header.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub mime: &'static str,
    pub data: String,
}

impl Logo {
    pub fn from_bytes(mime: &'static str, bytes: &[u8]) -> Self {
        Self {
            mime,
            data: STANDARD.encode(bytes),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }
}

/// Read and encode the logo once at startup. A missing or unreadable file
/// only drops the logo from the page.
pub fn load_logo(path: &Path) -> Option<Logo> {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), bytes = bytes.len(), "Loaded logo");
            Some(Logo::from_bytes(mime_for(path), &bytes))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read logo");
            None
        }
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
