//! Link-preview rendering for crawlers.
//!
//! Social networks do not run the SPA, so `/article/{slug}` serves the SPA shell with the
//! article's Open Graph and Twitter card tags already in `<head>`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::{excerpt, strip_html, EXCERPT_CHARS};
use crate::models::Article;

/// Shell used when no built frontend template is configured.
pub const DEFAULT_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>10TV News</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title>.*?</title>").expect("valid title regex");
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inject preview tags for `article` into `template`. Without an article the template
/// is returned as is.
pub fn render_preview(
    template: &str,
    article: Option<&Article>,
    base_url: &str,
    site_name: &str,
) -> String {
    let Some(article) = article else {
        return template.to_string();
    };

    let base_url = base_url.trim_end_matches('/');
    let title = format!("{} - {}", article.title, site_name);

    let raw_description = match article.summary.as_deref() {
        Some(summary) if !summary.trim().is_empty() => summary.to_string(),
        _ => strip_html(&article.content),
    };
    let description = excerpt(&raw_description, EXCERPT_CHARS);

    let image = article
        .cover_image_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| format!("{}/logo.png", base_url));
    let url = format!("{}/article/{}", base_url, article.slug);

    let (title, description, image, url) = (
        escape_html(&title),
        escape_html(&description),
        escape_html(&image),
        escape_html(&url),
    );

    let meta = format!(
        r#"
    <meta name="description" content="{description}" />
    <meta property="og:type" content="article" />
    <meta property="og:site_name" content="{site}" />
    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{description}" />
    <meta property="og:image" content="{image}" />
    <meta property="og:url" content="{url}" />
    <meta name="twitter:card" content="summary_large_image" />
    <meta name="twitter:title" content="{title}" />
    <meta name="twitter:description" content="{description}" />
    <meta name="twitter:image" content="{image}" />
"#,
        site = escape_html(site_name),
    );

    let titled = if TITLE.is_match(template) {
        TITLE
            .replace(template, regex::NoExpand(&format!("<title>{}</title>", title)))
            .into_owned()
    } else {
        template.to_string()
    };

    match titled.find("</head>") {
        Some(pos) => {
            let mut html = String::with_capacity(titled.len() + meta.len());
            html.push_str(&titled[..pos]);
            html.push_str(&meta);
            html.push_str(&titled[pos..]);
            html
        }
        None => titled,
    }
}
