use egui::{Color32, Pos2};
use glam::{Mat4, Vec3, Vec4};
use log::debug;
use point_scene::{
    FrameView, GuideLine, PointCloud, RenderBackend, RenderCapability, RenderError, Rgb, Tooltip, Viewport,
    ndc_to_screen, project_with,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A projected point, in canvas-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub center: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub hovered: bool,
}

/// A projected guide line, in canvas-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Pos2,
    pub to: Pos2,
    pub color: Color32,
}

/// What the backend produced for the last frame. The UI paints it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CanvasFrame {
    /// Painted under the dots.
    pub segments: Vec<Segment>,
    /// Back to front.
    pub dots: Vec<Dot>,
    pub tooltip: Option<Tooltip>,
    pub frame: u64,
}

pub type SharedCanvas = Rc<RefCell<CanvasFrame>>;

/// Creates [`EguiBackend`]s drawing into a shared [`CanvasFrame`].
pub struct EguiCapability {
    canvas: SharedCanvas,
}

impl EguiCapability {
    pub fn new(canvas: SharedCanvas) -> Self {
        Self { canvas }
    }
}

impl RenderCapability for EguiCapability {
    fn name(&self) -> &str {
        "egui painter"
    }

    fn create_backend(&self, viewport: Viewport) -> Result<Box<dyn RenderBackend>, RenderError> {
        if viewport.is_empty() {
            return Err(RenderError::Backend("canvas has no area".to_string()));
        }
        Ok(Box::new(EguiBackend {
            canvas: Rc::clone(&self.canvas),
            points: Vec::new(),
            colors: Vec::new(),
            guides: Vec::new(),
            point_size: 0.0,
            viewport,
        }))
    }
}

pub struct EguiBackend {
    canvas: SharedCanvas,
    points: Vec<Vec3>,
    colors: Vec<Color32>,
    guides: Vec<(Vec3, Vec3, Color32)>,
    point_size: f32,
    viewport: Viewport,
}

/// Smallest radius a dot is drawn with, in pixels.
const MIN_DOT_RADIUS: f32 = 1.5;

fn color32(c: Rgb) -> Color32 {
    let [r, g, b] = c.to_u8();
    Color32::from_rgb(r, g, b)
}

/// Clips the clip-space segment `a`-`b` to the near plane (`z >= -w`) and
/// returns its endpoints in normalized device coordinates.
fn clip_segment(a: Vec4, b: Vec4) -> Option<(Vec3, Vec3)> {
    let (da, db) = (a.z + a.w, b.z + b.w);
    if da < 0.0 && db < 0.0 {
        return None;
    }
    let (a, b) = if da < 0.0 {
        (a + (b - a) * (da / (da - db)), b)
    } else if db < 0.0 {
        (a, a + (b - a) * (da / (da - db)))
    } else {
        (a, b)
    };
    if a.w <= 1e-6 || b.w <= 1e-6 {
        return None;
    }
    Some((a.truncate() / a.w, b.truncate() / b.w))
}

impl EguiBackend {
    fn to_screen(&self, ndc: Vec3) -> Pos2 {
        let [x, y] = ndc_to_screen([ndc.x, ndc.y], self.viewport);
        Pos2::new(x, y)
    }

    fn project_guides(&self, view_projection: &Mat4) -> Vec<Segment> {
        self.guides
            .iter()
            .filter_map(|&(from, to, color)| {
                let (a, b) = clip_segment(*view_projection * from.extend(1.0), *view_projection * to.extend(1.0))?;
                Some(Segment {
                    from: self.to_screen(a),
                    to: self.to_screen(b),
                    color,
                })
            })
            .collect()
    }
}

impl RenderBackend for EguiBackend {
    fn upload(&mut self, cloud: &PointCloud, point_size: f32) -> Result<(), RenderError> {
        self.points = cloud.positions().to_vec();
        self.colors = cloud.colors().iter().copied().map(color32).collect();
        self.point_size = point_size;
        debug!("uploaded {} points", self.points.len());
        Ok(())
    }

    fn set_guides(&mut self, lines: &[GuideLine]) {
        self.guides = lines.iter().map(|l| (l.from, l.to, color32(l.color))).collect();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let view_projection = frame.camera.view_projection();
        let model_view_projection = view_projection * Mat4::from_rotation_y(frame.group_rotation_y);

        let mut projected: Vec<(f32, Dot)> = Vec::with_capacity(self.points.len());
        for (i, (point, color)) in self.points.iter().zip(&self.colors).enumerate() {
            let Some((ndc, w)) = project_with(&model_view_projection, *point) else {
                continue;
            };
            if !(-1.0..=1.0).contains(&ndc.z) {
                continue;
            }
            let hovered = frame.hovered == Some(i);
            let radius = frame
                .camera
                .screen_size(self.point_size, w, self.viewport)
                .max(MIN_DOT_RADIUS);
            projected.push((
                w,
                Dot {
                    center: self.to_screen(ndc),
                    radius: if hovered { radius * 1.6 } else { radius },
                    color: *color,
                    hovered,
                },
            ));
        }
        projected.sort_by(|a, b| b.0.total_cmp(&a.0));

        let segments = self.project_guides(&view_projection);
        let mut canvas = self.canvas.borrow_mut();
        canvas.segments = segments;
        canvas.dots = projected.into_iter().map(|(_, dot)| dot).collect();
        canvas.frame = frame.frame;
        Ok(())
    }

    fn set_tooltip(&mut self, tooltip: Option<Tooltip>) {
        self.canvas.borrow_mut().tooltip = tooltip;
    }

    fn dispose(&mut self) -> Result<(), RenderError> {
        self.points.clear();
        self.colors.clear();
        self.guides.clear();
        *self.canvas.borrow_mut() = CanvasFrame::default();
        Ok(())
    }
}
