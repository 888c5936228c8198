//! Center image encoding.
//!
//! Images are stored inline as `data:` URIs so an entry set stays a single
//! JSON document.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use spinwheel_abi::{IngestError, IngestResult};
use spinwheel_lib::klog_debug;

const FALLBACK_MIME: &str = "image/png";

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";

/// Guess an image type from its leading bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_MAGIC) {
        return Some("image/png");
    }
    if bytes.starts_with(JPEG_MAGIC) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC) {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        return Some("image/bmp");
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some("image/svg+xml");
    }
    None
}

/// Encode image bytes as a `data:` URI.
///
/// An explicit `mime` wins; otherwise the type is sniffed, falling back to
/// PNG. Input that is already a data URI is returned unchanged.
pub fn to_embeddable(bytes: &[u8], mime: Option<&str>) -> IngestResult<String> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyImage);
    }
    if bytes.starts_with(b"data:") {
        if let Ok(uri) = core::str::from_utf8(bytes) {
            return Ok(uri.trim().to_string());
        }
    }

    let mime = match mime.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime,
        None => sniff_mime(bytes).unwrap_or(FALLBACK_MIME),
    };
    klog_debug!("image: embedding {} bytes as {}", bytes.len(), mime);
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
