use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub og: OgConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open config file {}", path.display()))?,
        );
        serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { port: 4321 } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    pub author: String,
    /// `time` format description used for the date shown on the image.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String { crate::date::DEFAULT_FORMAT.into() }

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    pub posts_dir: PathBuf,
    pub include_drafts: bool,
}

impl Default for ContentConfig {
    fn default() -> Self { Self { posts_dir: PathBuf::from("content/post"), include_drafts: false } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OgConfig {
    pub width: u32,
    pub height: u32,
    pub fonts: Vec<FontConfig>,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            fonts: vec![
                FontConfig {
                    name: "DejaVu Sans Mono".into(),
                    weight: 400,
                    style: FontStyle::Normal,
                    path: PathBuf::from("assets/dejavu-sans-mono.ttf"),
                },
                FontConfig {
                    name: "DejaVu Sans Mono".into(),
                    weight: 700,
                    style: FontStyle::Normal,
                    path: PathBuf::from("assets/dejavu-sans-mono-bold.ttf"),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontConfig {
    pub name: String,
    #[serde(default = "default_font_weight")]
    pub weight: u16,
    #[serde(default)]
    pub style: FontStyle,
    pub path: PathBuf,
}

fn default_font_weight() -> u16 { 400 }

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    pub out_dir: Option<PathBuf>,
    /// Maximum number of images rendered at once. Defaults to the available parallelism.
    pub concurrency: Option<usize>,
}

impl BuildConfig {
    pub fn out_dir(&self) -> PathBuf { self.out_dir.clone().unwrap_or_else(|| PathBuf::from("dist")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: Config = serde_yaml::from_str(
            "site:\n  title: Astro Theme Cactus\n  author: Chris Williams\n",
        )
        .unwrap();
        assert_eq!(config.site.title, "Astro Theme Cactus");
        assert_eq!(config.site.date_format, default_date_format());
        assert_eq!(config.server.port, 4321);
        assert_eq!((config.og.width, config.og.height), (1200, 630));
        assert_eq!(config.og.fonts.len(), 2);
        assert_eq!(config.og.fonts[0].name, "DejaVu Sans Mono");
        assert_eq!(config.og.fonts[1].weight, 700);
        assert_eq!(config.og.fonts[1].path, PathBuf::from("assets/dejavu-sans-mono-bold.ttf"));
        assert!(!config.content.include_drafts);
        assert_eq!(config.build.out_dir(), PathBuf::from("dist"));
    }

    #[test]
    fn test_font_overrides() {
        let config: Config = serde_yaml::from_str(
            r#"
site:
  title: Blog
  author: Me
og:
  width: 800
  height: 418
  fonts:
    - name: Inter
      path: fonts/inter.ttf
    - name: Inter
      weight: 700
      style: italic
      path: fonts/inter-bold-italic.ttf
"#,
        )
        .unwrap();
        assert_eq!(config.og.width, 800);
        assert_eq!(config.og.fonts[0].weight, 400);
        assert_eq!(config.og.fonts[0].style, FontStyle::Normal);
        assert_eq!(config.og.fonts[1].style, FontStyle::Italic);
    }

    #[test]
    fn test_missing_site_is_error() {
        assert!(serde_yaml::from_str::<Config>("server:\n  port: 80\n").is_err());
    }
}
