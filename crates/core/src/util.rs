use std::path::{Path, PathBuf};

/// Directory (and URL prefix) the generated images live under.
pub const OG_IMAGE_DIR: &str = "og-image";

/// Join two paths, only including the normal components.
pub fn join_normalized(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let mut out = base.as_ref().to_path_buf();
    out.extend(path.as_ref().components().filter(|v| matches!(v, std::path::Component::Normal(_))));
    out
}

/// Output file for a route slug, e.g. `dist/og-image/hello-world.png`.
pub fn og_image_file(out_dir: impl AsRef<Path>, slug: &str) -> PathBuf {
    join_normalized(out_dir.as_ref().join(OG_IMAGE_DIR), format!("{slug}.png"))
}
