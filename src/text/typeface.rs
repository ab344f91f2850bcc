//! Fonts in the "typeface" JSON format.
//!
//! Each glyph carries its horizontal advance (`ha`) and an outline string made
//! of commands in font units:
//!
//! - `m x y` starts a new sub-path
//! - `l x y` draws a line
//! - `q x y cx cy` draws a quadratic curve, end point first
//! - `b x y c1x c1y c2x c2y` draws a cubic curve, end point first
//!
//! Outlines are parsed when the font is loaded so that a malformed file is
//! reported once, as a load failure, instead of on every text build.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, bail};
use cgmath::Vector2;
use serde::Deserialize;

use crate::text::path::{Shape, ShapePath};

#[derive(Deserialize)]
struct TypefaceJson {
    glyphs: HashMap<String, GlyphJson>,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundingBoxJson,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    family_name: String,
}

#[derive(Deserialize)]
struct GlyphJson {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Deserialize)]
struct BoundingBoxJson {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

/// One outline command in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Vector2<f32>),
    LineTo(Vector2<f32>),
    QuadTo {
        ctrl: Vector2<f32>,
        to: Vector2<f32>,
    },
    CubicTo {
        ctrl1: Vector2<f32>,
        ctrl2: Vector2<f32>,
        to: Vector2<f32>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    pub outline: Vec<OutlineCommand>,
}

#[derive(Clone, Debug)]
pub struct Font {
    pub family_name: String,
    /// Font units per em.
    pub resolution: f32,
    /// Distance between baselines in font units.
    pub line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: TypefaceJson =
            serde_json::from_str(json).context("font is not valid typeface JSON")?;
        if !(raw.resolution.is_finite() && raw.resolution > 0.0) {
            bail!("font resolution must be positive, got {}", raw.resolution);
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                log::debug!("skipping glyph entry {:?}: not a single character", key);
                continue;
            };
            let outline = match &glyph.o {
                Some(o) => parse_outline(o).with_context(|| format!("glyph {:?}", ch))?,
                None => Vec::new(),
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            line_height: raw.bounding_box.y_max - raw.bounding_box.y_min + raw.underline_thickness,
            glyphs,
        })
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Lay out `text` at `size` world units per em and return its filled
    /// shapes, flattened with `curve_segments` points per curve.
    ///
    /// Characters without a glyph are drawn as `?`; if that is missing too
    /// they are skipped without advancing.
    pub fn generate_shapes(&self, text: &str, size: f32, curve_segments: u32) -> Vec<Shape> {
        let scale = size / self.resolution;
        let line_height = self.line_height * scale;
        let mut offset = Vector2::new(0.0f32, 0.0f32);
        let mut reported = HashSet::new();
        let mut shapes = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch).or_else(|| self.glyph('?')) else {
                if reported.insert(ch) {
                    log::warn!("font {:?} has no glyph for {:?}", self.family_name, ch);
                }
                continue;
            };
            let path = glyph_path(glyph, scale, offset);
            shapes.extend(path.to_shapes(curve_segments));
            offset.x += glyph.advance * scale;
        }
        shapes
    }
}

fn glyph_path(glyph: &Glyph, scale: f32, offset: Vector2<f32>) -> ShapePath {
    let place = |p: Vector2<f32>| p * scale + offset;
    let mut path = ShapePath::new();
    for command in &glyph.outline {
        match *command {
            OutlineCommand::MoveTo(p) => path.move_to(place(p)),
            OutlineCommand::LineTo(p) => path.line_to(place(p)),
            OutlineCommand::QuadTo { ctrl, to } => path.quad_to(place(ctrl), place(to)),
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                path.cubic_to(place(ctrl1), place(ctrl2), place(to))
            }
        }
    }
    path
}

pub fn parse_outline(outline: &str) -> anyhow::Result<Vec<OutlineCommand>> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();
    let point = |tokens: &mut std::str::SplitWhitespace<'_>| -> anyhow::Result<Vector2<f32>> {
        let mut coord = || -> anyhow::Result<f32> {
            let token = tokens.next().context("outline ends in the middle of a command")?;
            token
                .parse::<f32>()
                .with_context(|| format!("{:?} is not a number", token))
        };
        let x = coord()?;
        let y = coord()?;
        Ok(Vector2::new(x, y))
    };

    while let Some(command) = tokens.next() {
        let parsed = match command {
            "m" => OutlineCommand::MoveTo(point(&mut tokens)?),
            "l" => OutlineCommand::LineTo(point(&mut tokens)?),
            "q" => {
                let to = point(&mut tokens)?;
                let ctrl = point(&mut tokens)?;
                OutlineCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = point(&mut tokens)?;
                let ctrl1 = point(&mut tokens)?;
                let ctrl2 = point(&mut tokens)?;
                OutlineCommand::CubicTo { ctrl1, ctrl2, to }
            }
            // sub-paths are implicitly closed
            "z" => continue,
            other => bail!("unknown outline command {:?}", other),
        };
        commands.push(parsed);
    }
    Ok(commands)
}
