//! HTML helpers and the page shell.

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render `disabled` when `flag` is set.
pub(crate) fn disabled_attr(flag: bool) -> &'static str {
    if flag { " disabled" } else { "" }
}

/// Full HTML document around `content`.
///
/// Scripts are served locally from `/static/vendor`; `scripts/fetch-vendor.sh`
/// downloads them.
#[must_use]
pub fn html_shell(title: &str, content: &str) -> String {
    let title = escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Ask Agy about Matt's portfolio of transformation projects">
    <title>{title} - MattGPT</title>

    <!-- HTMX and extensions (local) -->
    <script src="/static/vendor/htmx-2.0.8.min.js"></script>
    <script src="/static/vendor/htmx-sse.js"></script>

    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="app">
    <div id="app-shell" class="app-shell">
        <header class="app-header">
            <div class="app-header-inner">
                <div class="app-mark">🐾</div>
                <div>
                    <h1 class="app-title">MattGPT</h1>
                    <p class="app-tagline">Ask Agy about Matt's 20+ years of experience</p>
                </div>
            </div>
        </header>

        <main id="app" class="app-main">
            {content}
        </main>
    </div>
</body>
</html>"#
    )
}
