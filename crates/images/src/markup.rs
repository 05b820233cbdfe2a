//! Declarative markup tree for preview images.

/// Decorative mark shown next to the site title.
pub const MARK: Graphic =
    Graphic { width: 96.0, height: 112.0, source: include_str!("../assets/mark.svg") };

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Graphic(Graphic),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tag {
    Div,
    P,
    H1,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    /// Utility classes, see [`crate::style`].
    pub class: String,
    pub children: Vec<Node>,
}

/// A fixed-size standalone SVG document embedded in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Graphic {
    pub width: f32,
    pub height: f32,
    pub source: &'static str,
}

/// Branding shown on every image.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
}

pub fn element(tag: Tag, class: &str, children: Vec<Node>) -> Node {
    Node::Element(Element { tag, class: class.to_string(), children })
}

pub fn text(value: impl Into<String>) -> Node { Node::Text(value.into()) }

/// Build the preview layout: date and title on top, branding along the bottom.
pub fn compose(title: &str, date: &str, site: &SiteInfo) -> Node {
    element(Tag::Div, "flex flex-col w-full h-full bg-[#1d1f21] text-[#c9cacc]", vec![
        element(Tag::Div, "flex flex-col flex-1 w-full p-10 justify-center", vec![
            element(Tag::P, "text-2xl mb-6", vec![text(date)]),
            element(Tag::H1, "text-6xl font-bold leading-snug text-white", vec![text(title)]),
        ]),
        element(
            Tag::Div,
            "flex items-center justify-between w-full p-10 border-t border-[#2bbc89] text-xl",
            vec![
                element(Tag::Div, "flex items-center", vec![
                    Node::Graphic(MARK),
                    element(Tag::P, "ml-3 font-semibold", vec![text(site.title.as_str())]),
                ]),
                element(Tag::P, "", vec![text(format!("by {}", site.author))]),
            ],
        ),
    ])
}
