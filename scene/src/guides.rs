//! World-space reference lines drawn with the cloud: a ground grid and the
//! three coordinate axes. They stay fixed while the point group turns.

use glam::Vec3;

use crate::SceneError;
use crate::cloud::{Rgb, parse_hex_color};
use crate::config::{AxesConfig, GridConfig, SceneConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Rgb,
}

const X_AXIS: Rgb = Rgb { r: 1.0, g: 0.0, b: 0.0 };
const Y_AXIS: Rgb = Rgb { r: 0.0, g: 1.0, b: 0.0 };
const Z_AXIS: Rgb = Rgb { r: 0.0, g: 0.0, b: 1.0 };

/// `divisions + 1` lines along each of X and Z, spaced `size / divisions`
/// apart. With an even division count the two middle lines take the center
/// color.
pub fn grid_lines(grid: &GridConfig) -> Result<Vec<GuideLine>, SceneError> {
    if grid.divisions == 0 {
        return Err(SceneError::InvalidGuides("grid needs at least one division".to_string()));
    }
    if !(grid.size.is_finite() && grid.size > 0.0 && grid.y.is_finite()) {
        return Err(SceneError::InvalidGuides(format!(
            "grid size {} at height {} is not drawable",
            grid.size, grid.y
        )));
    }
    let center_color = parse_hex_color(&grid.center_color)?;
    let line_color = parse_hex_color(&grid.line_color)?;

    let half = grid.size / 2.0;
    let step = grid.size / grid.divisions as f32;
    let center = (grid.divisions % 2 == 0).then_some(grid.divisions / 2);
    let mut lines = Vec::with_capacity(2 * (grid.divisions as usize + 1));
    for i in 0..=grid.divisions {
        let k = -half + i as f32 * step;
        let color = if Some(i) == center { center_color } else { line_color };
        lines.push(GuideLine {
            from: Vec3::new(-half, grid.y, k),
            to: Vec3::new(half, grid.y, k),
            color,
        });
        lines.push(GuideLine {
            from: Vec3::new(k, grid.y, -half),
            to: Vec3::new(k, grid.y, half),
            color,
        });
    }
    Ok(lines)
}

pub fn axes_lines(axes: &AxesConfig) -> Result<Vec<GuideLine>, SceneError> {
    if !(axes.length.is_finite() && axes.length > 0.0) {
        return Err(SceneError::InvalidGuides(format!("axis length {} must be positive", axes.length)));
    }
    Ok([(Vec3::X, X_AXIS), (Vec3::Y, Y_AXIS), (Vec3::Z, Z_AXIS)]
        .into_iter()
        .map(|(dir, color)| GuideLine {
            from: Vec3::ZERO,
            to: dir * axes.length,
            color,
        })
        .collect())
}

/// Every visible guide of `config`: the grid first, then the axes.
pub fn guide_lines(config: &SceneConfig) -> Result<Vec<GuideLine>, SceneError> {
    let mut lines = Vec::new();
    if config.grid.visible {
        lines.extend(grid_lines(&config.grid)?);
    }
    if config.axes.visible {
        lines.extend(axes_lines(&config.axes)?);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let lines = grid_lines(&GridConfig::default()).unwrap();
        assert_eq!(lines.len(), 62);
        assert!(lines.iter().all(|l| l.from.y == -10.0 && l.to.y == -10.0));
        assert_eq!(lines[0].from, Vec3::new(-30.0, -10.0, -30.0));
        assert_eq!(lines[0].to, Vec3::new(30.0, -10.0, -30.0));

        let center = parse_hex_color("#7c3aed").unwrap();
        let centered: Vec<_> = lines.iter().filter(|l| l.color == center).collect();
        assert_eq!(centered.len(), 2);
        assert!(centered.iter().all(|l| l.from.x == 0.0 || l.from.z == 0.0));
    }

    #[test]
    fn test_odd_divisions_have_no_center_line() {
        let grid = GridConfig {
            divisions: 3,
            ..GridConfig::default()
        };
        let line = parse_hex_color(&grid.line_color).unwrap();
        let lines = grid_lines(&grid).unwrap();
        assert_eq!(lines.len(), 8);
        assert!(lines.iter().all(|l| l.color == line));
    }

    #[test]
    fn test_axes_follow_coordinate_directions() {
        let lines = axes_lines(&AxesConfig::default()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].to, Vec3::new(12.0, 0.0, 0.0));
        assert_eq!(lines[1].to, Vec3::new(0.0, 12.0, 0.0));
        assert_eq!(lines[2].to, Vec3::new(0.0, 0.0, 12.0));
        assert_eq!(lines[0].color, X_AXIS);
        assert!(axes_lines(&AxesConfig { visible: true, length: 0.0 }).is_err());
    }

    #[test]
    fn test_hidden_guides_are_skipped() {
        let mut config = SceneConfig::default();
        assert_eq!(guide_lines(&config).unwrap().len(), 65);
        config.grid.visible = false;
        assert_eq!(guide_lines(&config).unwrap().len(), 3);
        config.axes.visible = false;
        assert!(guide_lines(&config).unwrap().is_empty());
    }
}
