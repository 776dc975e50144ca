//! File name, size and data-URL helpers.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use tracing::{debug, instrument};

use crate::domain::DomainError;

pub const DEFAULT_MIME: &str = "application/octet-stream";
pub const DEFAULT_MAX_WIDTH: u32 = 1000;

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

const MIME_TYPES: &[(&str, &str)] = &[
    // images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    // video
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    // audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/mp4"),
    // documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("txt", "text/plain"),
    ("rtf", "application/rtf"),
    // other
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("zip", "application/zip"),
    ("rar", "application/x-rar-compressed"),
];

/// Decoded payload of a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Lowercased text after the last dot, empty when there is none.
pub fn ext(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Last path component; both `/` and `\` separate.
pub fn name(filepath: &str) -> &str {
    filepath.rsplit(['/', '\\']).next().unwrap_or(filepath)
}

/// Last path component without its extension; a leading dot is not an extension.
pub fn name_no_ext(filepath: &str) -> &str {
    let filename = name(filepath);
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// Human-readable size with 1024-based units, e.g. `1.5 KB`.
pub fn format_size(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);

    // Round to `decimals`, then drop trailing zeros
    let rounded = format!("{:.*}", decimals, scaled);
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        rounded.as_str()
    };
    format!("{} {}", trimmed, SIZE_UNITS[exponent])
}

/// `<stem>_<millis>.<ext>`, the extension kept only when present.
pub fn unique_name(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }
    let timestamp = chrono::Utc::now().timestamp_millis();
    let ext = ext(filename);
    let stem = name_no_ext(filename);
    if ext.is_empty() {
        format!("{stem}_{timestamp}")
    } else {
        format!("{stem}_{timestamp}.{ext}")
    }
}

pub fn mime_type(filename: &str) -> &'static str {
    let ext = ext(filename);
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// Approximate decoded size in MiB of a base64 string or data URL.
pub fn base64_size_mb(base64: &str) -> f64 {
    let payload = match base64.split_once(',') {
        Some((_, data)) => data,
        None => base64,
    };
    (payload.len() as f64 * 3.0 / 4.0) / (1024.0 * 1024.0)
}

pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Read a file and encode it as a data URL, the mime type guessed from its name.
#[instrument(level = "debug")]
pub fn read_as_data_url(path: &Path) -> Result<String, DomainError> {
    let bytes = std::fs::read(path).map_err(|e| DomainError::io(path, e))?;
    let mime = mime_type(&path.to_string_lossy());
    debug!("read {} bytes as {}", bytes.len(), mime);
    Ok(to_data_url(&bytes, mime))
}

impl Blob {
    /// Decode `data:<mime>;base64,<payload>`.
    pub fn from_data_url(data_url: &str) -> Result<Self, DomainError> {
        if data_url.is_empty() {
            return Err(DomainError::InvalidDataUrl {
                message: "empty input".to_string(),
            });
        }
        let (header, payload) =
            data_url
                .split_once(',')
                .ok_or_else(|| DomainError::InvalidDataUrl {
                    message: "missing ',' separator".to_string(),
                })?;
        let mime = header
            .split_once(':')
            .and_then(|(_, rest)| rest.split_once(';'))
            .map(|(mime, _)| mime.to_string())
            .ok_or(DomainError::UnknownMimeType)?;
        let bytes = BASE64.decode(payload.trim())?;
        Ok(Self { mime, bytes })
    }
}

/// Decode a data URL and write its bytes to `path`.
#[instrument(level = "debug", skip(data_url))]
pub fn write_data_url(data_url: &str, path: &Path) -> Result<Blob, DomainError> {
    if path.file_name().map_or(true, |n| n.is_empty()) {
        return Err(DomainError::EmptyFileName);
    }
    let blob = Blob::from_data_url(data_url)?;
    std::fs::write(path, &blob.bytes).map_err(|e| DomainError::io(path, e))?;
    Ok(blob)
}

/// Quality used when none is given: 0.9 up to 1 MiB of payload, 0.8 above.
pub fn auto_quality(data_url: &str) -> f32 {
    if base64_size_mb(data_url) <= 1.0 {
        0.9
    } else {
        0.8
    }
}

/// Re-encode an image data URL as JPEG, scaling the longer side down to `max_width`.
///
/// `quality` is in 0-1; `None` picks it from the payload size.
#[instrument(level = "debug", skip(data_url))]
pub fn compress_image(
    data_url: &str,
    max_width: u32,
    quality: Option<f32>,
) -> Result<String, DomainError> {
    let blob = Blob::from_data_url(data_url)?;
    let quality = quality.unwrap_or_else(|| auto_quality(data_url)).clamp(0.0, 1.0);

    let img = image::load_from_memory(&blob.bytes)?;
    let (width, height) = img.dimensions();
    let img = if width.max(height) > max_width {
        // resize keeps the aspect ratio within the bounding box
        img.resize(max_width, max_width, FilterType::Triangle)
    } else {
        img
    };
    debug!(
        "compressing {}x{} -> {}x{} at quality {}",
        width,
        height,
        img.width(),
        img.height(),
        quality
    );

    let mut out = Cursor::new(Vec::new());
    let jpeg_quality = ((quality * 100.0).round() as u8).max(1);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality);
        encoder.encode_image(&img.to_rgb8())?;
    }

    Ok(to_data_url(&out.into_inner(), "image/jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.JPG", "jpg")]
    #[case("archive.tar.gz", "gz")]
    #[case("README", "")]
    fn given_filename_when_taking_extension_then_lowercases(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(ext(input), expected);
    }

    #[test]
    fn given_paths_when_taking_names_then_strips_directories() {
        assert_eq!(name("/tmp/dir/report.pdf"), "report.pdf");
        assert_eq!(name(r"C:\docs\report.pdf"), "report.pdf");
        assert_eq!(name_no_ext("/tmp/dir/report.final.pdf"), "report.final");
        assert_eq!(name_no_ext(".bashrc"), ".bashrc");
    }

    #[rstest]
    #[case(0, 2, "0 Bytes")]
    #[case(512, 2, "512 Bytes")]
    #[case(1536, 2, "1.5 KB")]
    #[case(1_048_576, 2, "1 MB")]
    #[case(1_234_567, 1, "1.2 MB")]
    fn given_bytes_when_formatting_size_then_uses_units(
        #[case] bytes: u64,
        #[case] decimals: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(format_size(bytes, decimals), expected);
    }

    #[test]
    fn given_filename_when_making_unique_then_keeps_stem_and_extension() {
        let unique = unique_name("photo.png");
        assert!(unique.starts_with("photo_"));
        assert!(unique.ends_with(".png"));
        assert!(unique_name("").is_empty());
    }

    #[test]
    fn given_known_and_unknown_extensions_when_looking_up_mime_then_falls_back() {
        assert_eq!(mime_type("a.PNG"), "image/png");
        assert_eq!(mime_type("a.xyz"), DEFAULT_MIME);
    }

    #[test]
    fn given_bytes_when_round_tripping_data_url_then_decodes() {
        let url = to_data_url(b"hello", "text/plain");
        assert_eq!(url, "data:text/plain;base64,aGVsbG8=");

        let blob = Blob::from_data_url(&url).unwrap();
        assert_eq!(blob.mime, "text/plain");
        assert_eq!(blob.bytes, b"hello");
    }

    #[test]
    fn given_malformed_data_url_when_decoding_then_errors() {
        assert!(matches!(
            Blob::from_data_url("no separator"),
            Err(DomainError::InvalidDataUrl { .. })
        ));
        assert!(matches!(
            Blob::from_data_url("garbage,aGVsbG8="),
            Err(DomainError::UnknownMimeType)
        ));
        assert!(matches!(
            Blob::from_data_url("data:text/plain;base64,***"),
            Err(DomainError::Base64Decode(_))
        ));
    }

    #[test]
    fn given_base64_when_estimating_size_then_ignores_prefix() {
        let payload = "A".repeat(4 * 1024 * 1024);
        let url = format!("data:image/png;base64,{payload}");
        assert!((base64_size_mb(&url) - 3.0).abs() < 1e-9);
        assert_eq!(auto_quality(&url), 0.8);
        assert_eq!(auto_quality("data:image/png;base64,AAAA"), 0.9);
    }
}
