//! HTML landing pages served to the browser after the OAuth redirect.

const STYLE: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; margin: 0; display: flex; justify-content: center; align-items: center; min-height: 100vh; }
.card { background: #fff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); padding: 32px; max-width: 400px; width: 100%; }
h1 { font-size: 20px; margin: 0 0 8px; color: #333; }
.subtitle { color: #666; font-size: 14px; margin: 0; }
.error { background:#fee; border:1px solid #c00; color:#c00; padding:10px; border-radius:4px; margin-top:16px; }"#;

/// Page shown when the redirect carried a verifier code.
pub fn render_success() -> String {
    render_page(
        "Authorization complete",
        "Discogs access was granted. You can close this window and return to the application.",
        None,
    )
}

/// Page shown when the redirect carried an error or no verifier.
///
/// The message is HTML-escaped.
pub fn render_failure(message: &str) -> String {
    render_page(
        "Authorization failed",
        "Discogs access was not granted. Return to the application to try again.",
        Some(message),
    )
}

fn render_page(title: &str, subtitle: &str, error_message: Option<&str>) -> String {
    let error_html = error_message
        .map(|msg| format!(r#"<div class="error">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} - Discogs</title>
<style>
{STYLE}
</style>
</head>
<body>
<div class="card">
<h1>{title}</h1>
<p class="subtitle">{subtitle}</p>
{error_html}
</div>
</body>
</html>"#
    )
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_success_page() {
        let html = render_success();
        assert!(html.contains("Authorization complete"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_failure_page_escapes_message() {
        let html = render_failure("<b>denied</b>");
        assert!(html.contains("Authorization failed"));
        assert!(html.contains("&lt;b&gt;denied&lt;/b&gt;"));
        assert!(!html.contains("<b>denied</b>"));
    }
}
