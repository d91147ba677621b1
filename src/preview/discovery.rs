//! Template discovery: walks the routes tree for files ending in the
//! template suffix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Location on disk, read fresh on every preview request
    pub path: PathBuf,
    pub name: String,
    /// Route path without the suffix, `/`-separated and without a leading slash
    pub url: String,
}

/// Recursively collect every template under `routes_dir`, sorted by URL.
///
/// `routes/contact/send/contact.email.html` maps to `contact/send/contact`.
pub fn discover(routes_dir: &Path, suffix: &str) -> io::Result<Vec<TemplateEntry>> {
    let mut templates = Vec::new();
    scan(routes_dir, routes_dir, suffix, &mut templates)?;
    templates.sort_by(|a, b| a.url.cmp(&b.url));
    Ok(templates)
}

fn scan(root: &Path, dir: &Path, suffix: &str, out: &mut Vec<TemplateEntry>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            scan(root, &path, suffix, out)?;
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(suffix) {
            continue;
        }
        if let Some(url) = template_url(root, &path, suffix) {
            out.push(TemplateEntry { path, name, url });
        }
    }
    Ok(())
}

fn template_url(root: &Path, path: &Path, suffix: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");
    joined.strip_suffix(suffix).map(ToString::to_string)
}

/// Whether a changed path should trigger a reload
pub fn is_template(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(suffix))
}
