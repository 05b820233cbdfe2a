//! Utility class (Tailwind-style) parsing for markup elements.
//!
//! Only the subset needed by the preview templates is understood. Any other
//! class is rejected so that typos surface as render errors instead of silently
//! changing the layout.

use std::fmt;

use thiserror::Error;

/// One spacing unit, in pixels (`p-1` = 4px).
const SPACING_UNIT: f32 = 4.0;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum StyleError {
    #[error("unknown utility class `{0}`")]
    UnknownClass(String),
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("invalid value in `{0}`")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 0xff, g: 0xff, b: 0xff };

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(value: &str) -> Option<Color> {
        let hex = value.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Color { r: digits.next()??, g: digits.next()??, b: digits.next()?? })
            }
            6 => Some(Color { r: channel(&hex[0..2])?, g: channel(&hex[2..4])?, b: channel(&hex[4..6])? }),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Direction {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    Between,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Align {
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Full,
    Px(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Normal,
    /// Multiple of the font size; inherited as a ratio.
    Relative(f32),
    Px(f32),
}

impl LineHeight {
    pub fn resolve(self, font_size: f32) -> f32 {
        match self {
            LineHeight::Normal => font_size * 1.2,
            LineHeight::Relative(ratio) => font_size * ratio,
            LineHeight::Px(px) => px,
        }
    }
}

/// Per-side values, unset sides are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
}

impl Sides {
    fn set(&mut self, sides: &str, value: f32) {
        match sides {
            "" => *self = Sides { top: Some(value), right: Some(value), bottom: Some(value), left: Some(value) },
            "x" => (self.left, self.right) = (Some(value), Some(value)),
            "y" => (self.top, self.bottom) = (Some(value), Some(value)),
            "t" => self.top = Some(value),
            "r" => self.right = Some(value),
            "b" => self.bottom = Some(value),
            "l" => self.left = Some(value),
            _ => {}
        }
    }
}

/// Styles declared by an element's classes. Text properties (`color`,
/// `font_size`, `font_weight`, `line_height`) are only overrides; the layout
/// inherits them from the parent when unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub direction: Direction,
    pub grow: f32,
    /// `None` shrinks like `1`.
    pub shrink: Option<f32>,
    /// Main size before growing or shrinking, in pixels; the measured size when unset.
    pub basis: Option<f32>,
    pub width: Dimension,
    pub height: Dimension,
    pub padding: Sides,
    pub margin: Sides,
    pub border: Sides,
    pub border_color: Option<Color>,
    pub background: Option<Color>,
    pub justify: Justify,
    pub align: Align,
    pub color: Option<Color>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    /// Explicit `leading-*` value.
    pub leading: Option<LineHeight>,
    /// Line height implied by a `text-<size>` class; `leading-*` wins over it.
    pub size_line_height: Option<LineHeight>,
}

impl Style {
    pub fn parse(classes: &str) -> Result<Style, StyleError> {
        let mut style = Style::default();
        for class in classes.split_whitespace() {
            style.apply(class)?;
        }
        Ok(style)
    }

    pub fn line_height(&self) -> Option<LineHeight> { self.leading.or(self.size_line_height) }

    pub fn flex_shrink(&self) -> f32 { self.shrink.unwrap_or(1.0) }

    fn apply(&mut self, class: &str) -> Result<(), StyleError> {
        let unknown = || StyleError::UnknownClass(class.to_string());
        match class {
            "flex" => {}
            "flex-row" => self.direction = Direction::Row,
            "flex-col" => self.direction = Direction::Column,
            "flex-1" => (self.grow, self.shrink, self.basis) = (1.0, Some(1.0), Some(0.0)),
            "flex-auto" => (self.grow, self.shrink, self.basis) = (1.0, Some(1.0), None),
            "flex-none" => (self.grow, self.shrink) = (0.0, Some(0.0)),
            "grow" | "flex-grow" => self.grow = 1.0,
            "grow-0" | "flex-grow-0" => self.grow = 0.0,
            "shrink" | "flex-shrink" => self.shrink = Some(1.0),
            "shrink-0" | "flex-shrink-0" => self.shrink = Some(0.0),
            "justify-start" => self.justify = Justify::Start,
            "justify-center" => self.justify = Justify::Center,
            "justify-end" => self.justify = Justify::End,
            "justify-between" => self.justify = Justify::Between,
            "items-stretch" => self.align = Align::Stretch,
            "items-start" => self.align = Align::Start,
            "items-center" => self.align = Align::Center,
            "items-end" => self.align = Align::End,
            _ => {
                if let Some(value) = class.strip_prefix("w-") {
                    self.width = dimension(class, value)?;
                } else if let Some(value) = class.strip_prefix("h-") {
                    self.height = dimension(class, value)?;
                } else if let Some(value) = class.strip_prefix("bg-") {
                    self.background = Some(color(class, value)?);
                } else if let Some(value) = class.strip_prefix("text-") {
                    self.apply_text(class, value)?;
                } else if let Some(value) = class.strip_prefix("font-") {
                    self.font_weight = Some(font_weight(value).ok_or_else(unknown)?);
                } else if let Some(value) = class.strip_prefix("leading-") {
                    self.leading = Some(leading(class, value)?);
                } else if class == "border" || class.starts_with("border-") {
                    self.apply_border(class)?;
                } else if let Some((sides, value)) = spacing_class(class, 'p') {
                    self.padding.set(sides, spacing(class, value)?);
                } else if let Some((sides, value)) = spacing_class(class, 'm') {
                    self.margin.set(sides, spacing(class, value)?);
                } else {
                    return Err(unknown());
                }
            }
        }
        Ok(())
    }

    fn apply_text(&mut self, class: &str, value: &str) -> Result<(), StyleError> {
        if let Some((size, line_height)) = font_size(value) {
            self.font_size = Some(size);
            self.size_line_height = Some(line_height);
        } else if let Some(px) = arbitrary(value).and_then(|v| v.strip_suffix("px")) {
            self.font_size = Some(px.parse().map_err(|_| StyleError::InvalidValue(class.into()))?);
        } else {
            self.color = Some(color(class, value)?);
        }
        Ok(())
    }

    fn apply_border(&mut self, class: &str) -> Result<(), StyleError> {
        let rest = class.strip_prefix("border").unwrap_or_default();
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        let (sides, value) = match rest.split_once('-') {
            Some((sides @ ("x" | "y" | "t" | "r" | "b" | "l"), value)) => (sides, value),
            _ if matches!(rest, "x" | "y" | "t" | "r" | "b" | "l") => (rest, ""),
            _ => ("", rest),
        };
        if value.is_empty() {
            self.border.set(sides, 1.0);
        } else if let Ok(width) = value.parse::<f32>() {
            self.border.set(sides, width);
        } else if sides.is_empty() {
            self.border_color = Some(color(class, value)?);
        } else {
            return Err(StyleError::UnknownClass(class.into()));
        }
        Ok(())
    }
}

/// Splits `px-4` into (`x`, `4`) for the given prefix letter.
fn spacing_class(class: &str, prefix: char) -> Option<(&str, &str)> {
    let rest = class.strip_prefix(prefix)?;
    let (sides, value) = rest.split_once('-')?;
    matches!(sides, "" | "x" | "y" | "t" | "r" | "b" | "l").then_some((sides, value))
}

fn arbitrary(value: &str) -> Option<&str> { value.strip_prefix('[')?.strip_suffix(']') }

fn spacing(class: &str, value: &str) -> Result<f32, StyleError> {
    let invalid = || StyleError::InvalidValue(class.to_string());
    if value == "px" {
        return Ok(1.0);
    }
    if let Some(value) = arbitrary(value) {
        return value.strip_suffix("px").and_then(|v| v.parse().ok()).ok_or_else(invalid);
    }
    value.parse::<f32>().map(|v| v * SPACING_UNIT).map_err(|_| invalid())
}

fn dimension(class: &str, value: &str) -> Result<Dimension, StyleError> {
    match value {
        "full" => Ok(Dimension::Full),
        "auto" => Ok(Dimension::Auto),
        _ => spacing(class, value).map(Dimension::Px),
    }
}

fn color(class: &str, value: &str) -> Result<Color, StyleError> {
    match value {
        "white" => Ok(Color::WHITE),
        "black" => Ok(Color::BLACK),
        _ => {
            let hex = arbitrary(value).ok_or_else(|| StyleError::UnknownClass(class.into()))?;
            Color::from_hex(hex).ok_or_else(|| StyleError::InvalidColor(hex.into()))
        }
    }
}

fn font_size(value: &str) -> Option<(f32, LineHeight)> {
    let (size, line_height) = match value {
        "xs" => (12.0, LineHeight::Px(16.0)),
        "sm" => (14.0, LineHeight::Px(20.0)),
        "base" => (16.0, LineHeight::Px(24.0)),
        "lg" => (18.0, LineHeight::Px(28.0)),
        "xl" => (20.0, LineHeight::Px(28.0)),
        "2xl" => (24.0, LineHeight::Px(32.0)),
        "3xl" => (30.0, LineHeight::Px(36.0)),
        "4xl" => (36.0, LineHeight::Px(40.0)),
        "5xl" => (48.0, LineHeight::Relative(1.0)),
        "6xl" => (60.0, LineHeight::Relative(1.0)),
        "7xl" => (72.0, LineHeight::Relative(1.0)),
        "8xl" => (96.0, LineHeight::Relative(1.0)),
        "9xl" => (128.0, LineHeight::Relative(1.0)),
        _ => return None,
    };
    Some((size, line_height))
}

fn font_weight(value: &str) -> Option<u16> {
    Some(match value {
        "thin" => 100,
        "extralight" => 200,
        "light" => 300,
        "normal" => 400,
        "medium" => 500,
        "semibold" => 600,
        "bold" => 700,
        "extrabold" => 800,
        "black" => 900,
        _ => return None,
    })
}

fn leading(class: &str, value: &str) -> Result<LineHeight, StyleError> {
    Ok(LineHeight::Relative(match value {
        "none" => 1.0,
        "tight" => 1.25,
        "snug" => 1.375,
        "normal" => 1.5,
        "relaxed" => 1.625,
        "loose" => 2.0,
        _ => return spacing(class, value).map(LineHeight::Px),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_classes() {
        let style = Style::parse("flex flex-col w-full h-full bg-[#1d1f21] text-[#c9cacc]").unwrap();
        assert_eq!(style.direction, Direction::Column);
        assert_eq!(style.width, Dimension::Full);
        assert_eq!(style.height, Dimension::Full);
        assert_eq!(style.background, Some(Color { r: 0x1d, g: 0x1f, b: 0x21 }));
        assert_eq!(style.color, Some(Color { r: 0xc9, g: 0xca, b: 0xcc }));
        assert_eq!(style.font_size, None);
    }

    #[test]
    fn test_flex_factors() {
        let style = Style::parse("flex-1").unwrap();
        assert_eq!((style.grow, style.flex_shrink(), style.basis), (1.0, 1.0, Some(0.0)));

        let style = Style::parse("grow").unwrap();
        assert_eq!((style.grow, style.flex_shrink(), style.basis), (1.0, 1.0, None));

        let style = Style::parse("flex-1 shrink-0").unwrap();
        assert_eq!((style.grow, style.flex_shrink(), style.basis), (1.0, 0.0, Some(0.0)));

        let style = Style::parse("flex-none").unwrap();
        assert_eq!((style.grow, style.flex_shrink()), (0.0, 0.0));

        assert_eq!(Style::default().flex_shrink(), 1.0);
    }

    #[test]
    fn test_footer_classes() {
        let style = Style::parse(
            "flex items-center justify-between w-full p-10 border-t border-[#2bbc89] text-xl",
        )
        .unwrap();
        assert_eq!(style.direction, Direction::Row);
        assert_eq!(style.align, Align::Center);
        assert_eq!(style.justify, Justify::Between);
        assert_eq!(style.padding.left, Some(40.0));
        assert_eq!(style.padding.bottom, Some(40.0));
        assert_eq!(style.border, Sides { top: Some(1.0), ..Default::default() });
        assert_eq!(style.border_color, Some(Color { r: 0x2b, g: 0xbc, b: 0x89 }));
        assert_eq!(style.font_size, Some(20.0));
        assert_eq!(style.line_height(), Some(LineHeight::Px(28.0)));
    }

    #[test]
    fn test_leading_wins_over_text_size() {
        // Order of the classes does not matter
        for classes in ["text-6xl leading-snug", "leading-snug text-6xl"] {
            let style = Style::parse(classes).unwrap();
            assert_eq!(style.font_size, Some(60.0));
            assert_eq!(style.line_height(), Some(LineHeight::Relative(1.375)));
        }
    }

    #[test]
    fn test_spacing() {
        let style = Style::parse("mb-6 ml-3 px-2.5 pt-[10px] m-px").unwrap();
        assert_eq!(style.margin, Sides {
            top: Some(1.0),
            right: Some(1.0),
            bottom: Some(1.0),
            left: Some(1.0)
        });
        assert_eq!(style.padding.left, Some(10.0));
        assert_eq!(style.padding.right, Some(10.0));
        assert_eq!(style.padding.top, Some(10.0));

        let style = Style::parse("mb-6 ml-3").unwrap();
        assert_eq!(style.margin.bottom, Some(24.0));
        assert_eq!(style.margin.left, Some(12.0));
        assert_eq!(style.margin.top, None);
    }

    #[test]
    fn test_text_and_font() {
        let style = Style::parse("text-white font-semibold text-[18px]").unwrap();
        assert_eq!(style.color, Some(Color::WHITE));
        assert_eq!(style.font_weight, Some(600));
        assert_eq!(style.font_size, Some(18.0));
        assert_eq!(style.line_height(), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(Style::parse("flex wobble"), Err(StyleError::UnknownClass("wobble".into())));
        assert_eq!(Style::parse("text-[#zzzzzz]"), Err(StyleError::InvalidColor("#zzzzzz".into())));
        assert_eq!(Style::parse("bg-[#12345]"), Err(StyleError::InvalidColor("#12345".into())));
        assert_eq!(Style::parse("p-x"), Err(StyleError::InvalidValue("p-x".into())));
        assert_eq!(Style::parse("font-heavy"), Err(StyleError::UnknownClass("font-heavy".into())));
        assert_eq!(Style::parse("text-purple"), Err(StyleError::UnknownClass("text-purple".into())));
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#1D1F21"), Some(Color { r: 0x1d, g: 0x1f, b: 0x21 }));
        assert_eq!(Color::from_hex("1d1f21"), None);
        assert_eq!(Color { r: 0x2b, g: 0xbc, b: 0x89 }.to_string(), "#2bbc89");
    }
}
