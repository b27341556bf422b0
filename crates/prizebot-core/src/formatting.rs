/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap already-escaped text in a monospace block.
pub fn pre(html: &str) -> String {
    format!("<pre>{html}</pre>")
}
