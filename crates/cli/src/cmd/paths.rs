use anyhow::{Context, Result};
use argp::FromArgs;
use og_image_core::{config::ContentConfig, content::load_posts, paths::static_paths};
use typed_path::Utf8NativePathBuf;

use crate::util::{load_config, native_path};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Print the route of every generated image as JSON.
#[argp(subcommand, name = "paths")]
pub struct Args {
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// config file (default: config.yml)
    config: Option<Utf8NativePathBuf>,
    #[argp(switch)]
    /// print on a single line
    compact: bool,
}

pub fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    println!("{}", paths_json(&config.content, !args.compact)?);
    Ok(())
}

fn paths_json(content: &ContentConfig, pretty: bool) -> Result<String> {
    let routes = static_paths(&load_posts(content)?);
    let json =
        if pretty { serde_json::to_string_pretty(&routes) } else { serde_json::to_string(&routes) };
    json.context("Failed to serialize routes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_json() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, front_matter: &str| {
            std::fs::write(dir.path().join(name), format!("---\n{front_matter}---\nBody\n")).unwrap();
        };
        write("hello-world.md", "title: Hello, World!\npublishDate: 2023-01-01\n");
        write(
            "updated.md",
            "title: Updated\npublishDate: 2023-01-01\nupdatedDate: 2023-02-03\n",
        );
        write("custom.md", "title: Custom\npublishDate: 2023-01-01\nogImage: /custom.png\n");

        let content = ContentConfig { posts_dir: dir.path().to_path_buf(), include_drafts: false };
        let json = paths_json(&content, false).unwrap();
        assert_eq!(
            json,
            r#"[{"params":{"slug":"hello-world"},"props":{"pubDate":"2023-01-01","title":"Hello, World!"}},{"params":{"slug":"updated"},"props":{"pubDate":"2023-02-03","title":"Updated"}}]"#
        );
    }

    #[test]
    fn test_missing_directory() {
        let content = ContentConfig { posts_dir: "does/not/exist".into(), include_drafts: false };
        assert!(paths_json(&content, true).is_err());
    }
}
