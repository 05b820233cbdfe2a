use anyhow::{Context, Result};
use image::ImageFormat;
use og_image_core::{
    config::{Config, OgConfig},
    date::DateFormatter,
    models::RouteProps,
};

use crate::{
    fonts::FontSet,
    layout::layout,
    markup::{SiteInfo, compose},
    svg::{render_image, to_svg},
};

/// Canvas size and fonts shared by every render.
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub fonts: FontSet,
}

impl RenderOptions {
    pub fn from_config(config: &OgConfig) -> Result<Self> {
        let fonts = FontSet::load(&config.fonts).context("Failed to load fonts")?;
        Ok(Self { width: config.width, height: config.height, fonts })
    }
}

/// Renders preview images for routes.
pub struct OgRenderer {
    options: RenderOptions,
    site: SiteInfo,
    dates: DateFormatter,
}

impl OgRenderer {
    pub fn new(options: RenderOptions, site: SiteInfo, dates: DateFormatter) -> Self {
        Self { options, site, dates }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let options = RenderOptions::from_config(&config.og)?;
        let dates = DateFormatter::new(&config.site.date_format)?;
        let site = SiteInfo { title: config.site.title.clone(), author: config.site.author.clone() };
        tracing::info!(
            width = options.width,
            height = options.height,
            fonts = config.og.fonts.len(),
            "Initialized image renderer"
        );
        Ok(Self::new(options, site, dates))
    }

    pub fn render_svg(&self, title: &str, date: &str) -> Result<String> {
        let tree = compose(title, date, &self.site);
        let document = layout(&tree, &self.options)?;
        Ok(to_svg(&document))
    }

    pub fn render_png(&self, title: &str, date: &str) -> Result<Vec<u8>> {
        let svg = self.render_svg(title, date)?;
        render_image(&svg, &self.options.fonts, ImageFormat::Png)
    }

    /// Render the PNG for a route's props.
    pub fn render(&self, props: &RouteProps) -> Result<Vec<u8>> {
        let date = self.dates.format(props.pub_date)?;
        self.render_png(&props.title, &date)
            .with_context(|| format!("Failed to render image for \"{}\"", props.title))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use og_image_core::config::{FontConfig, FontStyle};
    use time::macros::date;

    use super::*;

    const BACKGROUND: [u8; 4] = [0x1d, 0x1f, 0x21, 0xff];

    fn renderer_with(fonts: FontSet) -> OgRenderer {
        OgRenderer::new(
            RenderOptions { width: 1200, height: 630, fonts },
            SiteInfo { title: "Astro Cactus".into(), author: "Chris".into() },
            DateFormatter::default(),
        )
    }

    fn renderer() -> OgRenderer { renderer_with(FontSet::empty()) }

    fn bundled_fonts() -> FontSet {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let font = |weight, file| FontConfig {
            name: "DejaVu Sans Mono".into(),
            weight,
            style: FontStyle::Normal,
            path: assets.join(file),
        };
        FontSet::load(&[font(400, "dejavu-sans-mono.ttf"), font(700, "dejavu-sans-mono-bold.ttf")])
            .unwrap()
    }

    #[test]
    fn test_render_svg() {
        let svg = renderer().render_svg("Hello, World!", "Sunday 1 January 2023").unwrap();
        assert!(svg.contains("viewBox=\"0 0 1200 630\""));
        assert!(svg.contains(">Hello, World!</text>"));
        assert!(svg.contains(">Sunday 1 January 2023</text>"));
        assert!(svg.contains(">by Chris</text>"));
        assert!(svg.contains("fill=\"#1d1f21\""));
    }

    #[test]
    fn test_render_route() {
        let props = RouteProps { pub_date: date!(2023 - 01 - 01), title: "Hello, World!".into() };
        let renderer = renderer();
        let png = renderer.render(&props).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (1200, 630));
        assert_eq!(image.to_rgba8().get_pixel(0, 0).0, BACKGROUND);
        // Pure function of its inputs
        assert_eq!(renderer.render(&props).unwrap(), png);
    }

    #[test]
    fn test_render_long_title() {
        let title = "word ".repeat(200);
        let png = renderer().render_png(&title, "Monday 2 January 2023").unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (1200, 630));
    }

    #[test]
    fn test_render_with_bundled_fonts() {
        let renderer = renderer_with(bundled_fonts());
        let png = renderer.render_png("Hello, World!", "Sunday 1 January 2023").unwrap();
        assert_eq!(renderer.render_png("Hello, World!", "Sunday 1 January 2023").unwrap(), png);

        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (1200, 630));
        // Glyphs are drawn above the footer
        let inked = (40..437)
            .flat_map(|y| (40..1160).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 != BACKGROUND)
            .count();
        assert!(inked > 1000, "{inked}");

        // Without fonts the same region stays empty
        let png = self::renderer().render_png("Hello, World!", "Sunday 1 January 2023").unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert!(
            (40..437).all(|y| (40..1160).all(|x| image.get_pixel(x, y).0 == BACKGROUND))
        );
    }

    #[test]
    fn test_render_control_characters() {
        let png = renderer_with(bundled_fonts()).render_png("Tab\u{1}bed", "Date").unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (1200, 630));
    }

    #[test]
    fn test_render_empty_strings() {
        let png = renderer().render_png("", "").unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (1200, 630));
    }

    #[test]
    fn test_from_config_missing_fonts() {
        let config: Config = serde_yaml::from_str(
            "site:\n  title: Cactus\n  author: Chris\nog:\n  fonts:\n    - name: DejaVu Sans Mono\n      path: missing/font.ttf\n",
        )
        .unwrap();
        let err = OgRenderer::from_config(&config).err().unwrap();
        assert!(format!("{err:#}").contains("missing/font.ttf"));
    }
}
