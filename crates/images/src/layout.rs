//! Lays a markup tree out onto a fixed-size canvas.
//!
//! Every element is a flex container (row by default). Sizing follows a
//! simplified flexbox: children start from their basis (the measured size
//! unless set, `0` for `flex-1`), growable children absorb the remaining
//! space, and when the children overflow they shrink in proportion to their
//! shrink factor times their size. Content that still overflows is left to be
//! clipped by the canvas. Text wraps greedily on whitespace.

use anyhow::{Context, Result};

use crate::{
    RenderOptions,
    fonts::FontSet,
    markup::{Graphic, Node, Tag},
    style::{Align, Color, Dimension, Direction, Justify, LineHeight, Sides, Style, StyleError},
};

const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_FONT_WEIGHT: u16 = 400;
// Tolerance when comparing measured widths against the available width
const EPSILON: f32 = 0.01;

/// A laid out page, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Color,
    },
    /// A single line of text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        content: String,
        family: String,
        size: f32,
        weight: u16,
        fill: Color,
    },
    Graphic {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        source: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Edges {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Edges {
    fn horizontal(&self) -> f32 { self.left + self.right }

    fn vertical(&self) -> f32 { self.top + self.bottom }
}

impl From<Sides> for Edges {
    fn from(sides: Sides) -> Self {
        Edges {
            top: sides.top.unwrap_or_default(),
            right: sides.right.unwrap_or_default(),
            bottom: sides.bottom.unwrap_or_default(),
            left: sides.left.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    fn inset(self, edges: Edges) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Size {
    width: f32,
    height: f32,
}

/// Size along the parent's main and cross axes.
#[derive(Debug, Clone, Copy)]
struct Extent {
    main: f32,
    cross: f32,
}

/// Inherited text properties.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextProps {
    color: Color,
    size: f32,
    weight: u16,
    line_height: LineHeight,
}

impl TextProps {
    fn line_height_px(&self) -> f32 { self.line_height.resolve(self.size) }
}

enum Kind<'a> {
    Box,
    Text(&'a str),
    Graphic(&'a Graphic),
}

/// A markup node with its classes resolved and text properties inherited.
struct Styled<'a> {
    kind: Kind<'a>,
    style: Style,
    margin: Edges,
    padding: Edges,
    border: Edges,
    text: TextProps,
    children: Vec<Styled<'a>>,
}

impl<'a> Styled<'a> {
    fn leaf(kind: Kind<'a>, text: TextProps) -> Self {
        Styled {
            kind,
            style: Style::default(),
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            text,
            children: vec![],
        }
    }
}

pub fn layout(root: &Node, options: &RenderOptions) -> Result<Document> {
    let inherited = TextProps {
        color: Color::BLACK,
        size: DEFAULT_FONT_SIZE,
        weight: DEFAULT_FONT_WEIGHT,
        line_height: LineHeight::Normal,
    };
    let root = resolve(root, &inherited).context("Invalid markup")?;
    let mut layout =
        Layout { fonts: &options.fonts, family: options.fonts.default_family(), items: vec![] };
    let canvas = Rect { x: 0.0, y: 0.0, width: options.width as f32, height: options.height as f32 };
    layout.place(&root, canvas.inset(root.margin));
    Ok(Document { width: options.width, height: options.height, items: layout.items })
}

fn resolve<'a>(node: &'a Node, parent: &TextProps) -> Result<Styled<'a>, StyleError> {
    let element = match node {
        Node::Element(element) => element,
        Node::Text(value) => return Ok(Styled::leaf(Kind::Text(value), *parent)),
        Node::Graphic(graphic) => return Ok(Styled::leaf(Kind::Graphic(graphic), *parent)),
    };
    let style = Style::parse(&element.class)?;
    // Element defaults: (font size scale, font weight, vertical margin in em)
    let (scale, weight, margin_em) = match element.tag {
        Tag::Div => (None, None, 0.0),
        Tag::P => (None, None, 1.0),
        Tag::H1 => (Some(2.0), Some(700), 0.67),
    };
    let size = style.font_size.or(scale.map(|scale| parent.size * scale)).unwrap_or(parent.size);
    let text = TextProps {
        color: style.color.unwrap_or(parent.color),
        size,
        weight: style.font_weight.or(weight).unwrap_or(parent.weight),
        line_height: style.line_height().unwrap_or(parent.line_height),
    };
    let margin = Edges {
        top: style.margin.top.unwrap_or(margin_em * size),
        right: style.margin.right.unwrap_or_default(),
        bottom: style.margin.bottom.unwrap_or(margin_em * size),
        left: style.margin.left.unwrap_or_default(),
    };
    let children =
        element.children.iter().map(|child| resolve(child, &text)).collect::<Result<Vec<_>, _>>()?;
    Ok(Styled {
        kind: Kind::Box,
        margin,
        padding: style.padding.into(),
        border: style.border.into(),
        style,
        text,
        children,
    })
}

/// Break `text` into lines no wider than `max_width`, collapsing whitespace.
/// Words wider than a full line are split between characters.
///
/// `measure` must be additive (no kerning): each word and the separating space
/// are measured once and line widths are summed from them.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let limit = max_width + EPSILON;
    let space = measure(" ");
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;
    for word in text.split_whitespace() {
        let word_width = measure(word);
        if !line.is_empty() {
            if width + space + word_width <= limit {
                line.push(' ');
                line.push_str(word);
                width += space + word_width;
                continue;
            }
            lines.push(std::mem::take(&mut line));
        }
        if word_width <= limit {
            line.push_str(word);
            width = word_width;
            continue;
        }
        width = 0.0;
        let mut buf = [0; 4];
        for c in word.chars() {
            let char_width = measure(c.encode_utf8(&mut buf));
            if !line.is_empty() && width + char_width > limit {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            line.push(c);
            width += char_width;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct Layout<'a> {
    fonts: &'a FontSet,
    family: &'a str,
    items: Vec<Item>,
}

impl Layout<'_> {
    fn text_width(&self, text: &str, props: &TextProps) -> f32 {
        self.fonts.text_width(text, self.family, props.weight, props.size)
    }

    fn wrap(&self, text: &str, props: &TextProps, max_width: f32) -> Vec<String> {
        wrap_text(text, max_width, |s| self.text_width(s, props))
    }

    /// Border-box size of `node` when given `available` width.
    fn measure(&self, node: &Styled, available: f32) -> Size {
        match node.kind {
            Kind::Text(value) => {
                let lines = self.wrap(value, &node.text, available);
                let width =
                    lines.iter().map(|line| self.text_width(line, &node.text)).fold(0.0, f32::max);
                Size { width, height: lines.len() as f32 * node.text.line_height_px() }
            }
            Kind::Graphic(graphic) => Size { width: graphic.width, height: graphic.height },
            Kind::Box => {
                let frame_x = node.padding.horizontal() + node.border.horizontal();
                let frame_y = node.padding.vertical() + node.border.vertical();
                let fixed_width = match node.style.width {
                    Dimension::Px(width) => Some(width),
                    Dimension::Full => Some(available),
                    Dimension::Auto => None,
                };
                let inner = (fixed_width.unwrap_or(available) - frame_x).max(0.0);
                let content = self.measure_content(node, inner);
                Size {
                    width: fixed_width.unwrap_or(content.width + frame_x),
                    height: match node.style.height {
                        Dimension::Px(height) => height,
                        _ => content.height + frame_y,
                    },
                }
            }
        }
    }

    fn measure_content(&self, node: &Styled, inner: f32) -> Size {
        let mut size = Size::default();
        let mut remaining = inner;
        for child in &node.children {
            let available = match node.style.direction {
                Direction::Column => inner,
                Direction::Row => remaining,
            };
            let child_size = self.measure(child, (available - child.margin.horizontal()).max(0.0));
            let width = child_size.width + child.margin.horizontal();
            let height = child_size.height + child.margin.vertical();
            match node.style.direction {
                Direction::Column => {
                    size.width = size.width.max(width);
                    size.height += height;
                }
                Direction::Row => {
                    size.width += width;
                    size.height = size.height.max(height);
                    remaining = (remaining - width).max(0.0);
                }
            }
        }
        size
    }

    fn child_extent(&self, parent: &Styled, child: &Styled, content: Rect) -> Extent {
        let stretch = parent.style.align == Align::Stretch && !matches!(child.kind, Kind::Graphic(_));
        let available = (content.width - child.margin.horizontal()).max(0.0);
        match parent.style.direction {
            Direction::Column => {
                let width = match child.style.width {
                    Dimension::Px(width) => width,
                    Dimension::Full => content.width,
                    Dimension::Auto if stretch => available,
                    Dimension::Auto => self.measure(child, available).width,
                };
                let height = match child.style.height {
                    Dimension::Px(height) => height,
                    Dimension::Full => content.height,
                    Dimension::Auto => self.measure(child, width).height,
                };
                Extent { main: height, cross: width }
            }
            Direction::Row => {
                let width = match child.style.width {
                    Dimension::Px(width) => width,
                    Dimension::Full => content.width,
                    Dimension::Auto => self.measure(child, available).width,
                };
                let height = match child.style.height {
                    Dimension::Px(height) => height,
                    Dimension::Full => content.height,
                    Dimension::Auto if stretch => {
                        (content.height - child.margin.vertical()).max(0.0)
                    }
                    Dimension::Auto => self.measure(child, width).height,
                };
                Extent { main: width, cross: height }
            }
        }
    }

    fn place(&mut self, node: &Styled, rect: Rect) {
        if let Some(fill) = node.style.background {
            self.items.push(Item::Rect { x: rect.x, y: rect.y, width: rect.width, height: rect.height, fill });
        }
        self.paint_border(node, rect);
        let content = rect.inset(node.border).inset(node.padding);
        match node.kind {
            Kind::Text(value) => self.place_text(value, &node.text, content),
            Kind::Graphic(graphic) => self.items.push(Item::Graphic {
                x: content.x,
                y: content.y,
                width: graphic.width,
                height: graphic.height,
                source: graphic.source,
            }),
            Kind::Box => self.place_children(node, content),
        }
    }

    fn paint_border(&mut self, node: &Styled, rect: Rect) {
        let fill = node.style.border_color.unwrap_or(node.text.color);
        let border = node.border;
        let sides = [
            (border.top, Rect { height: border.top, ..rect }),
            (border.bottom, Rect { y: rect.y + rect.height - border.bottom, height: border.bottom, ..rect }),
            (border.left, Rect { width: border.left, ..rect }),
            (border.right, Rect { x: rect.x + rect.width - border.right, width: border.right, ..rect }),
        ];
        for (width, side) in sides {
            if width > 0.0 {
                self.items.push(Item::Rect {
                    x: side.x,
                    y: side.y,
                    width: side.width,
                    height: side.height,
                    fill,
                });
            }
        }
    }

    fn place_text(&mut self, value: &str, props: &TextProps, content: Rect) {
        let line_height = props.line_height_px();
        let metrics = self.fonts.line_metrics(self.family, props.weight, props.size);
        // Center the glyph box within each line box
        let half_leading = (line_height - (metrics.ascent + metrics.descent)) / 2.0;
        for (i, line) in self.wrap(value, props, content.width).into_iter().enumerate() {
            self.items.push(Item::Text {
                x: content.x,
                y: content.y + i as f32 * line_height + half_leading + metrics.ascent,
                content: line,
                family: self.family.to_string(),
                size: props.size,
                weight: props.weight,
                fill: props.color,
            });
        }
    }

    fn place_children(&mut self, node: &Styled, content: Rect) {
        let direction = node.style.direction;
        let (main_size, cross_size) = match direction {
            Direction::Row => (content.width, content.height),
            Direction::Column => (content.height, content.width),
        };
        let main_margins = |child: &Styled| match direction {
            Direction::Row => child.margin.horizontal(),
            Direction::Column => child.margin.vertical(),
        };
        let mut extents = node
            .children
            .iter()
            .map(|child| {
                let extent = self.child_extent(node, child, content);
                Extent { main: child.style.basis.unwrap_or(extent.main), ..extent }
            })
            .collect::<Vec<_>>();
        let free_space = |extents: &[Extent]| {
            let used = node.children.iter().zip(extents).map(|(c, e)| e.main + main_margins(c));
            main_size - used.sum::<f32>()
        };
        let mut free = free_space(&extents);
        let total_grow = node.children.iter().map(|child| child.style.grow).sum::<f32>();
        if free > 0.0 && total_grow > 0.0 {
            for (child, extent) in node.children.iter().zip(extents.iter_mut()) {
                extent.main += free * child.style.grow / total_grow;
            }
            free = 0.0;
        }
        let total_shrink = node
            .children
            .iter()
            .zip(&extents)
            .map(|(child, extent)| child.style.flex_shrink() * extent.main)
            .sum::<f32>();
        if free < 0.0 && total_shrink > 0.0 {
            for (child, extent) in node.children.iter().zip(extents.iter_mut()) {
                let weight = child.style.flex_shrink() * extent.main;
                extent.main = (extent.main + free * weight / total_shrink).max(0.0);
            }
            free = free_space(&extents);
        }
        let count = node.children.len();
        let (mut cursor, gap) = match node.style.justify {
            Justify::Start => (0.0, 0.0),
            Justify::Center => (free / 2.0, 0.0),
            Justify::End => (free, 0.0),
            Justify::Between if count > 1 && free > 0.0 => (0.0, free / (count - 1) as f32),
            Justify::Between => (0.0, 0.0),
        };
        for (child, extent) in node.children.iter().zip(&extents) {
            let m = child.margin;
            let (main_start, main_end, cross_start, cross_end) = match direction {
                Direction::Row => (m.left, m.right, m.top, m.bottom),
                Direction::Column => (m.top, m.bottom, m.left, m.right),
            };
            let cross_offset = match node.style.align {
                Align::Start | Align::Stretch => cross_start,
                Align::Center => {
                    cross_start + (cross_size - cross_start - cross_end - extent.cross) / 2.0
                }
                Align::End => cross_size - cross_end - extent.cross,
            };
            let main_offset = cursor + main_start;
            let rect = match direction {
                Direction::Row => Rect {
                    x: content.x + main_offset,
                    y: content.y + cross_offset,
                    width: extent.main,
                    height: extent.cross,
                },
                Direction::Column => Rect {
                    x: content.x + cross_offset,
                    y: content.y + main_offset,
                    width: extent.cross,
                    height: extent.main,
                },
            };
            self.place(child, rect);
            cursor = main_offset + extent.main + main_end + gap;
        }
    }
}
