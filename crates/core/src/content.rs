//! Post collection loaded from a directory of markdown files with YAML front matter.

use std::{
    ffi::OsStr,
    path::{Component, Path},
};

use anyhow::{Context, Result, anyhow, bail};
use walkdir::WalkDir;

use crate::{
    config::ContentConfig,
    models::{Post, PostData},
};

const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

/// Load every post in the collection, sorted by id.
/// Drafts are skipped unless `include_drafts` is set.
pub fn load_posts(config: &ContentConfig) -> Result<Vec<Post>> {
    let root = config.posts_dir.as_path();
    let mut posts = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        if !entry.file_type().is_file() || !is_post_file(entry.path()) {
            continue;
        }
        let post = load_post(root, entry.path())?;
        if post.data.draft && !config.include_drafts {
            tracing::debug!(id = %post.id, "Skipping draft");
            continue;
        }
        posts.push(post);
    }
    posts.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(pair) = posts.windows(2).find(|pair| pair[0].id == pair[1].id) {
        bail!(
            "Duplicate post id {:?} ({} and {})",
            pair[0].id,
            pair[0].path.display(),
            pair[1].path.display()
        );
    }
    tracing::info!(count = posts.len(), dir = %root.display(), "Loaded posts");
    Ok(posts)
}

/// Parse a single post file. `root` is the collection directory the id is derived from.
pub fn load_post(root: &Path, path: &Path) -> Result<Post> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let front_matter = split_front_matter(&source)
        .ok_or_else(|| anyhow!("Missing front matter in {}", path.display()))?;
    let data: PostData = serde_yaml::from_str(front_matter)
        .with_context(|| format!("Invalid front matter in {}", path.display()))?;
    let id = match data.slug.as_deref() {
        Some(slug) if !slug.trim_matches('/').is_empty() => slug.trim_matches('/').to_string(),
        _ => {
            let relative = path.strip_prefix(root).unwrap_or(path);
            post_id(relative)
        }
    };
    Ok(Post { id, data, path: path.to_path_buf() })
}

/// Derive a post id from its path relative to the collection root.
/// Each segment is slugified and a trailing `index` segment is dropped.
pub fn post_id(relative: &Path) -> String {
    let stem = relative.with_extension("");
    let mut segments = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(slug::slugify(s.to_string_lossy())),
            _ => None,
        })
        .collect::<Vec<_>>();
    if segments.len() > 1 && segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }
    segments.join("/")
}

fn split_front_matter(source: &str) -> Option<&str> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

fn is_post_file(path: &Path) -> bool {
    let hidden = path.file_name().is_some_and(is_hidden);
    let ext = path.extension().and_then(OsStr::to_str).map(str::to_ascii_lowercase);
    !hidden && ext.is_some_and(|ext| POST_EXTENSIONS.contains(&ext.as_str()))
}

// Underscore-prefixed entries are private to the collection
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('_') || name.starts_with('.'))
}
