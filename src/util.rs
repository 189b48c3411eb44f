//! Shared pure helpers: text decoding, media types, resource keys.

use encoding_rs::Encoding;
use log::debug;

/// Encoding assumed when detection is skipped or inconclusive.
pub const DEFAULT_ENCODING: &Encoding = encoding_rs::UTF_8;

/// Detector confidence below which the default encoding is used instead.
pub const MIN_DETECTION_CONFIDENCE: f32 = 0.5;

/// Pick the encoding to decode `bytes` with.
///
/// Input without a single newline is too short for statistical detection to be
/// trustworthy, so it is assumed to be [`DEFAULT_ENCODING`]. Otherwise the
/// charset detector runs and its answer is used only when its confidence
/// reaches [`MIN_DETECTION_CONFIDENCE`].
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if memchr::memchr(b'\n', bytes).is_none() {
        return DEFAULT_ENCODING;
    }

    let (charset, confidence, _language) = chardet::detect(&bytes.to_vec());
    if confidence < MIN_DETECTION_CONFIDENCE {
        debug!(
            "Charset detection inconclusive ({charset}, {confidence:.2}), using {}",
            DEFAULT_ENCODING.name()
        );
        return DEFAULT_ENCODING;
    }

    let label = chardet::charset2encoding(&charset);
    Encoding::for_label(label.as_bytes()).unwrap_or(DEFAULT_ENCODING)
}

/// Decode bytes to a string, never failing.
///
/// A byte order mark wins over detection; invalid sequences are replaced
/// with U+FFFD rather than reported.
pub fn decode_text(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        debug!("Replaced malformed {} sequences while decoding", used.name());
    }
    text.into_owned()
}

/// Timestamp used to name lessons that have no header of their own.
pub fn timestamp_name() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

// ============================================================================
// Media Types
// ============================================================================

/// Image formats recognised by file extension when embedding resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
    WebP,
    Bmp,
    Icon,
    Tiff,
}

impl MediaFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Svg => "image/svg+xml",
            MediaFormat::WebP => "image/webp",
            MediaFormat::Bmp => "image/bmp",
            MediaFormat::Icon => "image/x-icon",
            MediaFormat::Tiff => "image/tiff",
        }
    }

    /// Detect the format from the extension of `path`, case-insensitively.
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some(MediaFormat::Jpeg),
            "png" => Some(MediaFormat::Png),
            "gif" => Some(MediaFormat::Gif),
            "svg" => Some(MediaFormat::Svg),
            "webp" => Some(MediaFormat::WebP),
            "bmp" => Some(MediaFormat::Bmp),
            "ico" => Some(MediaFormat::Icon),
            "tif" | "tiff" => Some(MediaFormat::Tiff),
            _ => None,
        }
    }
}

/// MIME type for an image path; unknown extensions are treated as JPEG.
pub fn mime_for_path(path: &str) -> &'static str {
    MediaFormat::from_path(path)
        .unwrap_or(MediaFormat::Jpeg)
        .mime_type()
}

// ============================================================================
// Resource Keys
// ============================================================================

/// Normalize a document path to the dictionary resource key convention.
///
/// Resource stores key their assets by backslash-separated paths with a
/// leading separator, e.g. `\images\cat.png`.
pub fn normalize_resource_key(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix("./").unwrap_or(path);
    let mut key = path.replace('/', "\\");
    if !key.starts_with('\\') {
        key.insert(0, '\\');
    }
    key
}
