//! Article content helpers: slugs, YouTube embeds, plain-text excerpts.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Description length used in previews.
pub const EXCERPT_CHARS: usize = 150;

const YOUTUBE_ID_LEN: usize = 11;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("valid tag regex");
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid paragraph regex");
    static ref ANCHOR: Regex =
        Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>.*?</a>"#)
            .expect("valid anchor regex");
    static ref YOUTUBE_ID: Regex =
        Regex::new(r"(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?\s<]*)")
            .expect("valid youtube regex");
}

/// URL-friendly slug: lowercase ASCII letters and digits joined by single dashes.
///
/// Punctuation such as `*+~.()'"!:@` is dropped without leaving a separator;
/// whitespace, `-` and `_` become separators.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `{slugify(title)}-{epoch millis in base36}`. Titles with no ASCII letters or digits
/// (e.g. Telugu headlines) fall back to `article`.
pub fn unique_slug(title: &str, now: DateTime<Utc>) -> String {
    let base = slugify(title);
    let base = if base.is_empty() { "article".to_string() } else { base };
    let millis = now.timestamp_millis().max(0) as u64;
    format!("{}-{}", base, to_base36(millis))
}

/// 11-character YouTube video id from a watch, short or embed URL.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if !(url.contains("youtube.com") || url.contains("youtu.be")) {
        return None;
    }

    let id = YOUTUBE_ID
        .captures_iter(url)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())?;

    (id.len() == YOUTUBE_ID_LEN).then(|| id.to_string())
}

fn youtube_embed(video_id: &str) -> String {
    format!(
        concat!(
            r#"<div class="w-full aspect-video rounded-xl shadow-lg my-6 overflow-hidden">"#,
            r#"<iframe src="https://www.youtube.com/embed/{}" title="YouTube video player" "#,
            r#"frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; "#,
            r#"gyroscope; picture-in-picture; web-share" allowfullscreen class="w-full h-full">"#,
            r#"</iframe></div>"#
        ),
        video_id
    )
}

/// Replace standalone YouTube links with responsive embeds.
///
/// - a paragraph whose text is only a YouTube URL becomes an embed;
/// - an anchor pointing at a YouTube video becomes an embed.
///
/// Everything else is returned untouched.
pub fn embed_videos(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let paragraphs_done = PARAGRAPH.replace_all(html, |caps: &Captures| {
        let text = strip_html(&caps[1]);
        match youtube_video_id(&text) {
            Some(id) if !text.trim().contains(char::is_whitespace) => youtube_embed(&id),
            _ => caps[0].to_string(),
        }
    });

    ANCHOR
        .replace_all(&paragraphs_done, |caps: &Captures| {
            match youtube_video_id(&caps[1].replace("&amp;", "&")) {
                Some(id) => youtube_embed(&id),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Drop every HTML tag, keeping text content.
pub fn strip_html(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// First `max_chars` characters followed by `...`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let head: String = text.trim().chars().take(max_chars).collect();
    format!("{}...", head)
}
