use std::io::Cursor;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, RgbaImage};
use maud::{PreEscaped, html};
use resvg::{tiny_skia, usvg};

use crate::{
    fonts::FontSet,
    layout::{Document, Item},
};

/// Emit a laid out document as a standalone SVG.
pub fn to_svg(document: &Document) -> String {
    let (w, h) = (document.width, document.height);
    html! {
        (PreEscaped("<?xml version=\"1.0\" encoding=\"utf-8\"?>"))
        svg xmlns="http://www.w3.org/2000/svg" version="1.1" viewBox=(format!("0 0 {w} {h}")) width=(w) height=(h) {
            @for item in &document.items {
                @match item {
                    Item::Rect { x, y, width, height, fill } => {
                        rect x=(num(*x)) y=(num(*y)) width=(num(*width)) height=(num(*height)) fill=(fill.to_string()) {}
                    }
                    Item::Text { x, y, content, family, size, weight, fill } => {
                        text x=(num(*x)) y=(num(*y)) font-family=(family) font-size=(num(*size)) font-weight=(weight) fill=(fill.to_string()) {
                            (xml_text(content))
                        }
                    }
                    Item::Graphic { x, y, width, height, source } => {
                        image x=(num(*x)) y=(num(*y)) width=(num(*width)) height=(num(*height)) href=(data_uri(source)) {}
                    }
                }
            }
        }
    }
    .into_string()
}

/// Format a coordinate with at most two decimals.
fn num(value: f32) -> String {
    // Adding zero turns -0 into 0
    let value = (value * 100.0).round() / 100.0 + 0.0;
    value.to_string()
}

/// Drop characters that XML 1.0 does not allow in documents.
fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(
                c,
                '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
            )
        })
        .collect()
}

fn data_uri(svg: &str) -> String { format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)) }

/// Rasterize an SVG at its native size and encode it.
pub fn render_image(svg: &str, fonts: &FontSet, format: ImageFormat) -> Result<Vec<u8>> {
    let options = usvg::Options { fontdb: fonts.database(), ..Default::default() };
    let tree = usvg::Tree::from_str(svg, &options).context("Failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .with_context(|| format!("Invalid image size {}x{}", size.width(), size.height()))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    let pixels = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    let image = RgbaImage::from_raw(size.width(), size.height(), pixels)
        .context("Pixel buffer does not match image size")?;
    encode_image(&DynamicImage::ImageRgba8(image), format)
}

pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).with_context(|| format!("Failed to encode {format:?}"))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{markup::MARK, style::Color};

    fn document(items: Vec<Item>) -> Document { Document { width: 40, height: 20, items } }

    #[test]
    fn test_num() {
        assert_eq!(num(0.0), "0");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(40.0), "40");
        assert_eq!(num(121.0512), "121.05");
        assert_eq!(num(82.5), "82.5");
    }

    #[test]
    fn test_to_svg() {
        let svg = to_svg(&document(vec![
            Item::Rect { x: 0.0, y: 0.0, width: 40.0, height: 20.0, fill: Color::WHITE },
            Item::Text {
                x: 1.5,
                y: 16.0,
                content: "<b>Tom & Jerry</b>".into(),
                family: "DejaVu Sans Mono".into(),
                size: 20.0,
                weight: 700,
                fill: Color { r: 0x1d, g: 0x1f, b: 0x21 },
            },
        ]));
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><svg "));
        assert!(svg.contains("viewBox=\"0 0 40 20\" width=\"40\" height=\"20\""));
        assert!(svg.contains("<rect x=\"0\" y=\"0\" width=\"40\" height=\"20\" fill=\"#ffffff\"></rect>"));
        assert!(svg.contains(
            "<text x=\"1.5\" y=\"16\" font-family=\"Roboto Mono\" font-size=\"20\" \
             font-weight=\"700\" fill=\"#1d1f21\">&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</text>"
        ));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        assert_eq!(xml_text("Tab\u{1}bed\u{b}\u{FFFE}"), "Tabbed");
        assert_eq!(xml_text("a\tb\nc é 🦀"), "a\tb\nc é 🦀");

        let svg = to_svg(&document(vec![Item::Text {
            x: 0.0,
            y: 10.0,
            content: "Tab\u{1}bed".into(),
            family: "DejaVu Sans Mono".into(),
            size: 10.0,
            weight: 400,
            fill: Color::WHITE,
        }]));
        assert!(svg.contains(">Tabbed</text>"));
        render_image(&svg, &FontSet::empty(), ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_graphic_data_uri() {
        let svg = to_svg(&document(vec![Item::Graphic {
            x: 2.0,
            y: 3.0,
            width: MARK.width,
            height: MARK.height,
            source: MARK.source,
        }]));
        let prefix = "href=\"data:image/svg+xml;base64,";
        let start = svg.find(prefix).unwrap() + prefix.len();
        let end = start + svg[start..].find('"').unwrap();
        let decoded = STANDARD.decode(&svg[start..end]).unwrap();
        assert_eq!(decoded, MARK.source.as_bytes());
    }

    #[test]
    fn test_render_image() {
        let svg = to_svg(&document(vec![Item::Rect {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 20.0,
            fill: Color { r: 0x1d, g: 0x1f, b: 0x21 },
        }]));
        let png = render_image(&svg, &FontSet::empty(), ImageFormat::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (40, 20));
        assert_eq!(image.get_pixel(10, 10).0, [0x1d, 0x1f, 0x21, 0xff]);
    }

    #[test]
    fn test_render_translucent_fill() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4">
            <rect width="4" height="4" fill="#ff0000" fill-opacity="0.5"/></svg>"##;
        let png = render_image(svg, &FontSet::empty(), ImageFormat::Png).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        let [r, g, b, a] = image.get_pixel(1, 1).0;
        // Stored straight, not premultiplied
        assert_eq!((r, g, b), (0xff, 0, 0));
        assert!((127..=128).contains(&a), "{a}");
    }

    #[test]
    fn test_render_invalid_svg() {
        let err = render_image("<svg", &FontSet::empty(), ImageFormat::Png).unwrap_err();
        assert!(err.to_string().contains("Failed to parse SVG"));
    }
}
