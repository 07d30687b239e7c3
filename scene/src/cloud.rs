use blobs::category_index;
use embedviz::Embedding;
use glam::Vec3;
use ndarray::ArrayView2;

use crate::SceneError;

pub const DEFAULT_PALETTE: [&str; 4] = ["#22c55e", "#3b82f6", "#f59e0b", "#ef4444"];

/// Color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn to_u8(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<Rgb, SceneError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(SceneError::InvalidColor(hex.to_string()));
    }
    let channel = |k: usize| {
        u8::from_str_radix(&digits[2 * k..2 * k + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| SceneError::InvalidColor(hex.to_string()))
    };
    Ok(Rgb {
        r: channel(0)?,
        g: channel(1)?,
        b: channel(2)?,
    })
}

/// Palette slot of point `i`: the index range is split into one contiguous
/// block per color, independent of the point's label.
pub fn palette_index(i: usize, n: usize, palette_len: usize) -> usize {
    category_index(i, n, palette_len).min(palette_len.saturating_sub(1))
}

/// Renderable points: positions, per-point colors and hover labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    labels: Vec<String>,
}

impl PointCloud {
    pub fn new(positions: Vec<Vec3>, colors: Vec<Rgb>, labels: Vec<String>) -> Result<Self, SceneError> {
        if colors.len() != positions.len() || labels.len() != positions.len() {
            return Err(SceneError::LengthMismatch {
                positions: positions.len(),
                colors: colors.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            positions,
            colors,
            labels,
        })
    }

    /// Builds a cloud from an `N x k` projection.
    ///
    /// Projections with fewer than three columns are padded with zeros,
    /// extra columns are ignored.
    pub fn from_projection(
        positions: ArrayView2<'_, f64>,
        labels: Vec<String>,
        palette: &[Rgb],
    ) -> Result<Self, SceneError> {
        if palette.is_empty() {
            return Err(SceneError::EmptyPalette);
        }
        let n = positions.nrows();
        let points = positions
            .rows()
            .into_iter()
            .map(|row| {
                let mut p = [0.0f32; 3];
                for (dst, src) in p.iter_mut().zip(row.iter()) {
                    *dst = *src as f32;
                }
                Vec3::from_array(p)
            })
            .collect();
        let colors = (0..n).map(|i| palette[palette_index(i, n, palette.len())]).collect();
        Self::new(points, colors, labels)
    }

    pub fn from_embedding(embedding: &Embedding, palette: &[Rgb]) -> Result<Self, SceneError> {
        let labels = (0..embedding.len())
            .map(|i| embedding.label(i).unwrap_or_default())
            .collect();
        Self::from_projection(embedding.positions.view(), labels, palette)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn label(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str)
    }
}
