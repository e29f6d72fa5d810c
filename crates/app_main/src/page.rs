//! Gallery page rendering

use app_core::{AppConfig, MutationKind};
use app_fs::{MediaItem, MediaKind};
use serde::Serialize;
use std::collections::HashMap;

const TEMPLATE: &str = include_str!("../assets/gallery.html");

/// Shown instead of the item list for an empty directory
pub const NO_MEDIA_HTML: &str = r#"<p class="empty">No images or videos found.</p>"#;

/// Viewer settings handed to the page script
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig<'a> {
    load_radius: usize,
    keep_radius: usize,
    audio_mode: bool,
    history_limit: usize,
    keybindings: &'a HashMap<String, Vec<String>>,
    endpoints: HashMap<MutationKind, Endpoint>,
}

#[derive(Debug, Serialize)]
struct Endpoint {
    method: &'static str,
    url: &'static str,
}

fn endpoints() -> HashMap<MutationKind, Endpoint> {
    [MutationKind::Delete, MutationKind::Favorite]
        .into_iter()
        .map(|kind| {
            let (method, url) = kind.endpoint();
            (kind, Endpoint { method, url })
        })
        .collect()
}

/// Render the gallery page for an ordered index
pub fn render_gallery(items: &[MediaItem], config: &AppConfig) -> String {
    let items_html = if items.is_empty() {
        NO_MEDIA_HTML.to_string()
    } else {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| media_item_html(index, item))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let radii = config.viewer.radii();
    let client = ClientConfig {
        load_radius: radii.load,
        keep_radius: radii.keep,
        audio_mode: config.viewer.audio_mode,
        history_limit: config.viewer.history_limit,
        keybindings: &config.keybindings,
        endpoints: endpoints(),
    };
    let config_json = match serde_json::to_string(&client) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize viewer config: {}", e);
            "{}".to_string()
        }
    };

    // Config first: item markup is user controlled and must not be scanned for placeholders
    TEMPLATE
        .replace("{{config_json}}", &script_safe(&config_json))
        .replace("{{items_html}}", &items_html)
}

fn media_item_html(index: usize, item: &MediaItem) -> String {
    let name = escape_html(&item.relative_path);
    let src = encode_path(&item.relative_path);

    let media_tag = match item.kind {
        MediaKind::Video => format!(
            r#"<video data-src="{src}" controls muted playsinline loop class="lazy-video" preload="none"></video>"#
        ),
        MediaKind::Image => format!(
            r#"<a href="{src}" target="_blank" rel="noopener"><img data-src="{src}" alt="" class="lazy-image" /></a>"#
        ),
    };

    format!(
        r#"<div class="item" data-index="{index}" data-name="{name}" data-group="{group}">{media_tag}</div>"#,
        group = escape_html(item.parent_dir()),
    )
}

/// Percent-encode each path segment, keeping the separators
pub fn encode_path(relative_path: &str) -> String {
    let mut encoded = String::with_capacity(relative_path.len() + 1);
    for segment in relative_path.split('/') {
        encoded.push('/');
        encoded.push_str(&urlencoding::encode(segment));
    }
    encoded
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON that cannot close the surrounding `<script>` element
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
