use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use og_image_core::config::{FontConfig, FontStyle};
use resvg::usvg::fontdb::{self, Database, Family, Language, Query, Source, Stretch, Weight};

/// Advance used for characters no loaded face can measure, as a fraction of the font size.
const FALLBACK_ADVANCE: f32 = 0.6;
const FALLBACK_ASCENT: f32 = 0.8;
const FALLBACK_DESCENT: f32 = 0.2;

pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub data: Arc<Vec<u8>>,
}

/// Per-face metrics in em units, read once when the face is registered.
struct FaceMetrics {
    advances: HashMap<char, f32>,
    ascender: f32,
    descender: f32,
}

impl FaceMetrics {
    fn parse(face: &FontFace) -> Result<Self> {
        let parsed = ttf_parser::Face::parse(&face.data, 0)
            .with_context(|| format!("Invalid font data for {} {}", face.family, face.weight))?;
        let units_per_em = parsed.units_per_em() as f32;
        let mut advances = HashMap::new();
        if let Some(cmap) = parsed.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    if let Some(c) = char::from_u32(code_point)
                        && let Some(glyph) = subtable.glyph_index(code_point)
                        && let Some(advance) = parsed.glyph_hor_advance(glyph)
                    {
                        advances.entry(c).or_insert(advance as f32 / units_per_em);
                    }
                });
            }
        }
        Ok(Self {
            advances,
            ascender: parsed.ascender() as f32 / units_per_em,
            descender: -(parsed.descender() as f32) / units_per_em,
        })
    }
}

/// Vertical metrics in pixels for a given font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// The fonts available to layout and rasterization.
///
/// Faces are registered under the family, weight and style they were declared
/// with, regardless of the names stored in the font files.
pub struct FontSet {
    db: Arc<Database>,
    metrics: HashMap<fontdb::ID, Arc<FaceMetrics>>,
    default_family: Option<String>,
}

impl FontSet {
    pub fn empty() -> Self {
        Self { db: Arc::new(Database::new()), metrics: HashMap::new(), default_family: None }
    }

    /// Read the configured font files.
    pub fn load(configs: &[FontConfig]) -> Result<Self> {
        let mut faces = Vec::with_capacity(configs.len());
        for config in configs {
            let data = std::fs::read(&config.path)
                .with_context(|| format!("Failed to read font {}", config.path.display()))?;
            tracing::debug!(family = %config.name, weight = config.weight, path = %config.path.display(), "Loaded font");
            faces.push(FontFace {
                family: config.name.clone(),
                weight: config.weight,
                style: config.style,
                data: Arc::new(data),
            });
        }
        Self::from_faces(faces)
    }

    pub fn from_faces(faces: Vec<FontFace>) -> Result<Self> {
        let mut db = Database::new();
        let mut metrics = HashMap::new();
        let default_family = faces.first().map(|face| face.family.clone());
        for face in faces {
            let face_metrics = Arc::new(FaceMetrics::parse(&face)?);
            for id in db.load_font_source(Source::Binary(face.data.clone())) {
                let Some(mut info) = db.face(id).cloned() else { continue };
                db.remove_face(id);
                info.families = vec![(face.family.clone(), Language::English_UnitedStates)];
                info.weight = Weight(face.weight);
                info.style = match face.style {
                    FontStyle::Normal => fontdb::Style::Normal,
                    FontStyle::Italic => fontdb::Style::Italic,
                };
                let id = db.push_face_info(info);
                metrics.insert(id, face_metrics.clone());
            }
        }
        Ok(Self { db: Arc::new(db), metrics, default_family })
    }

    pub fn database(&self) -> Arc<Database> { self.db.clone() }

    /// Family used for all text: the first declared face's family.
    pub fn default_family(&self) -> &str { self.default_family.as_deref().unwrap_or("sans-serif") }

    /// Closest registered face, using CSS font matching.
    fn query(&self, family: &str, weight: u16) -> Option<fontdb::ID> {
        self.db.query(&Query {
            families: &[Family::Name(family)],
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    fn face(&self, family: &str, weight: u16) -> Option<&FaceMetrics> {
        self.query(family, weight).and_then(|id| self.metrics.get(&id)).map(Arc::as_ref)
    }

    /// Horizontal advance of `text` in pixels.
    pub fn text_width(&self, text: &str, family: &str, weight: u16, size: f32) -> f32 {
        let Some(face) = self.face(family, weight) else {
            return text.chars().count() as f32 * FALLBACK_ADVANCE * size;
        };
        text.chars()
            .map(|c| face.advances.get(&c).copied().unwrap_or(FALLBACK_ADVANCE))
            .sum::<f32>()
            * size
    }

    pub fn line_metrics(&self, family: &str, weight: u16, size: f32) -> LineMetrics {
        match self.face(family, weight) {
            Some(m) => LineMetrics { ascent: m.ascender * size, descent: m.descender * size },
            None => LineMetrics { ascent: FALLBACK_ASCENT * size, descent: FALLBACK_DESCENT * size },
        }
    }
}
