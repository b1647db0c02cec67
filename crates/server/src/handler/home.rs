use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use quill_core::config::{STATIC_BASE, Settings};

/// GET / — server-rendered homepage with a mount point for the client island.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.settings))
}

fn render_index(settings: &Settings) -> String {
    let name = escape_html(&settings.app_name);
    let env = escape_html(&settings.app_env);
    let version = escape_html(&settings.app_version);
    let banner = if settings.enable_demo_banner {
        r#"<div class="banner">Demo build: content may be reset at any time.</div>"#
    } else {
        ""
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{name}</title>
  <link rel="stylesheet" href="{STATIC_BASE}/assets/main.css">
</head>
<body>
  {banner}
  <main>
    <h1>{name}</h1>
    <p>Environment: <code>{env}</code> · Version: <code>{version}</code></p>
    <div id="root"></div>
  </main>
  <script type="module" src="{STATIC_BASE}/assets/main.js"></script>
</body>
</html>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
