use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

/// Logos above this size still load but are flagged in the log, since they are
/// stored inline in the team record.
const LARGE_LOGO_BYTES: usize = 512 * 1024;

pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Reads an image file into a `data:` URL.
pub fn read_logo_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read logo {}", path.display()))?;
    if bytes.is_empty() {
        bail!("logo file {} is empty", path.display());
    }
    if bytes.len() > LARGE_LOGO_BYTES {
        warn!(path = %path.display(), bytes = bytes.len(), "large logo embedded inline");
    }
    debug!(path = %path.display(), bytes = bytes.len(), "logo encoded");
    Ok(encode_data_url(mime_for(path), &bytes))
}
