//! Image validation, naming and blob storage.

pub mod blob;
pub mod s3;

pub use blob::{BlobStore, InMemoryBlobStore};
pub use s3::S3BlobStore;

use chrono::Utc;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

/// 10 MiB, checked before any upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub const FOLDER_ARTICLES: &str = "articles";
pub const FOLDER_PROFILES: &str = "profiles";
pub const FOLDER_TEMP: &str = "temp";
pub const FOLDERS: [&str; 3] = [FOLDER_ARTICLES, FOLDER_PROFILES, FOLDER_TEMP];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

lazy_static! {
    static ref IMG_SRC: Regex =
        Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid img regex");
}

/// `image/PNG; charset=binary` -> `image/png`
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Every rule the upload violates; empty when the image is acceptable.
pub fn validate_image(content_type: &str, size: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if size == 0 {
        errors.push("No file selected".to_string());
        return errors;
    }

    let content_type = normalize_content_type(content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        errors.push(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_CONTENT_TYPES.join(", ")
        ));
    }

    if size > MAX_IMAGE_BYTES {
        errors.push(format!(
            "File too large. Maximum size: {}MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        ));
    }

    errors
}

/// Lowercased extension of `filename`, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Canonical extension for an allowed image content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match normalize_content_type(content_type).as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Content type a direct upload of an `ext` file must declare.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `[prefix-]{epoch_millis}-{6 random base36 chars}.{ext}`, keeping the original extension.
pub fn unique_filename(original: &str, prefix: Option<&str>) -> String {
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), random_base36(6));
    let stem = match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}-{}", prefix, stem),
        None => stem,
    };

    match file_extension(original) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Every `src` of an `<img>` tag in an HTML fragment, in document order.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}
