use crate::camera::OrbitCamera;
use crate::config::CameraConfig;

/// Drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width over height, 1 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() { 1.0 } else { self.width / self.height }
    }

    /// Canvas-local pixel position to normalized device coordinates.
    pub fn to_ndc(&self, x: f32, y: f32) -> [f32; 2] {
        if self.is_empty() {
            return [0.0, 0.0];
        }
        [(x / self.width) * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0]
    }
}

/// Input in canvas-local pixels, already stripped of host specifics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    ButtonPressed { x: f32, y: f32 },
    ButtonReleased,
    DragMoved { x: f32, y: f32 },
    Wheel { delta_y: f32 },
    Resized { width: f32, height: f32 },
}

/// Mutable interaction state of a mounted view.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub camera: OrbitCamera,
    pub pointer_ndc: [f32; 2],
    pub dragging: bool,
    last_drag: [f32; 2],
    pub hovered: Option<usize>,
    pub group_rotation_y: f32,
    pub viewport: Viewport,
    pub frames: u64,
}

impl SceneState {
    pub fn new(camera_config: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            camera: OrbitCamera::from_config(camera_config, viewport.aspect()),
            pointer_ndc: [0.0, 0.0],
            dragging: false,
            last_drag: [0.0, 0.0],
            hovered: None,
            group_rotation_y: 0.0,
            viewport,
            frames: 0,
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer_ndc = self.viewport.to_ndc(x, y);
    }

    pub fn button_pressed(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_drag = [x, y];
    }

    pub fn button_released(&mut self) {
        self.dragging = false;
    }

    /// Orbits the camera by the distance moved since the last drag position.
    /// Ignored unless a button is held.
    pub fn drag_moved(&mut self, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        let dx = x - self.last_drag[0];
        let dy = y - self.last_drag[1];
        self.camera.orbit(dx, dy);
        self.last_drag = [x, y];
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.zoom(delta_y);
    }

    /// Zero-sized resizes are ignored so the aspect stays finite.
    pub fn resized(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            InputEvent::ButtonPressed { x, y } => self.button_pressed(x, y),
            InputEvent::ButtonReleased => self.button_released(),
            InputEvent::DragMoved { x, y } => self.drag_moved(x, y),
            InputEvent::Wheel { delta_y } => self.wheel(delta_y),
            InputEvent::Resized { width, height } => self.resized(width, height),
        }
    }

    /// One frame of idle motion.
    pub fn advance(&mut self, auto_rotate_speed: f32) {
        self.group_rotation_y += auto_rotate_speed;
        self.frames += 1;
    }
}
