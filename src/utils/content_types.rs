//! MIME types commonly sent with requests.

pub const AUDIO_AAC: &str = "audio/aac";
pub const AUDIO_MP3: &str = "audio/mpeg";
pub const AUDIO_WAV: &str = "audio/wav";
pub const AUDIO_WEBM: &str = "audio/webm";

/// Spaces become `+`, everything else outside the unreserved set is percent-encoded.
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const APPLICATION_JSON: &str = "application/json";

pub const IMAGE_BMP: &str = "image/bmp";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_ICO: &str = "image/x-icon";
pub const IMAGE_JPG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_SVG: &str = "image/svg+xml";

pub const VIDEO_MPEG: &str = "video/mpeg";
pub const VIDEO_WEBM: &str = "video/webm";

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_CSS: &str = "text/css";
pub const TEXT_CSV: &str = "text/csv";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_JAVASCRIPT: &str = "text/javascript";
