//! Preview page rendering
//!
//! Templates are read from disk on every request so edits show up without a
//! restart. Each page carries the live-reload script.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use tera::{escape_html, Tera};

use super::discovery::TemplateEntry;
use super::placeholder::placeholder_context;

pub const LIVE_RELOAD_SCRIPT: &str = "<script>\n  \
    var eventSource = new EventSource('/sse')\n  \
    eventSource.onmessage = () => location.reload()\n\
</script>";

/// Read and render one template with placeholder data
pub fn render_template(path: &Path) -> anyhow::Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read template {}", path.display()))?;
    let context = placeholder_context(&source)
        .with_context(|| format!("failed to parse template {}", path.display()))?;
    Tera::one_off(&source, &context, true)
        .with_context(|| format!("failed to render template {}", path.display()))
}

/// Rendered template, or an error page describing why it failed, with the
/// live-reload script injected either way
pub fn render_preview(path: &Path) -> String {
    let html = render_template(path).unwrap_or_else(|err| error_page(&err));
    inject_live_reload(&html)
}

/// Insert the reload script before the first `</body>`; pages without one are
/// returned unchanged
pub fn inject_live_reload(html: &str) -> String {
    html.replacen("</body>", &format!("{LIVE_RELOAD_SCRIPT}</body>"), 1)
}

pub fn error_page(err: &anyhow::Error) -> String {
    let mut trace = String::new();
    for (depth, cause) in err.chain().enumerate() {
        if depth == 0 {
            let _ = writeln!(trace, "{cause}");
        } else {
            let _ = writeln!(trace, "  caused by: {cause}");
        }
    }
    format!(
        "<html>\n<body style=\"font-family: monospace; padding: 2rem;\">\n\
         <h1>Error rendering template</h1>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(&trace)
    )
}

pub fn homepage(templates: &[TemplateEntry]) -> String {
    let mut items = String::new();
    for t in templates {
        let _ = write!(
            items,
            "    <li>\n      <a href=\"/{url}\">/{url}</a>\n      \
             <span class=\"path\">{path}</span>\n    </li>\n",
            url = escape_html(&t.url),
            path = escape_html(&t.path.display().to_string()),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Email Template Preview</title>
  <style>
    body {{ font-family: system-ui; padding: 2rem; max-width: 800px; margin: 0 auto; }}
    h1 {{ border-bottom: 2px solid #000; padding-bottom: 1rem; }}
    ul {{ list-style: none; padding: 0; }}
    li {{ margin: 0.5rem 0; }}
    a {{ color: #0066cc; text-decoration: none; font-size: 1.1rem; }}
    a:hover {{ text-decoration: underline; }}
    .path {{ color: #666; font-size: 0.9rem; margin-left: 0.5rem; }}
  </style>
</head>
<body>
  <h1>Email Templates ({count})</h1>
  <ul>
{items}  </ul>
  {script}
</body>
</html>
"#,
        count = templates.len(),
        script = LIVE_RELOAD_SCRIPT,
    )
}
