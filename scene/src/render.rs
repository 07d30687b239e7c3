use log::{info, warn};
use std::rc::Rc;
use thiserror::Error;

use crate::camera::OrbitCamera;
use crate::cloud::PointCloud;
use crate::guides::GuideLine;
use crate::state::Viewport;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("rendering is unavailable: {0}")]
    Unavailable(String),
    #[error("no container to render into")]
    NoContainer,
    #[error("render backend failed: {0}")]
    Backend(String),
}

/// Label shown next to the hovered point, at pixel position `screen`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub screen: [f32; 2],
}

/// Per-frame inputs for drawing the uploaded cloud.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: &'a OrbitCamera,
    pub group_rotation_y: f32,
    pub viewport: Viewport,
    pub hovered: Option<usize>,
    pub frame: u64,
}

/// A live drawing surface.
pub trait RenderBackend {
    fn upload(&mut self, cloud: &PointCloud, point_size: f32) -> Result<(), RenderError>;

    /// Replaces the world-space reference lines. Backends without line
    /// support may ignore them.
    fn set_guides(&mut self, _lines: &[GuideLine]) {}

    fn resize(&mut self, viewport: Viewport);

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;

    fn set_tooltip(&mut self, tooltip: Option<Tooltip>);

    /// Releases everything the backend holds. Called once, at unmount.
    fn dispose(&mut self) -> Result<(), RenderError>;
}

/// Something able to create render backends, loaded lazily.
pub trait RenderCapability {
    fn name(&self) -> &str;

    fn create_backend(&self, viewport: Viewport) -> Result<Box<dyn RenderBackend>, RenderError>;
}

type Loader = Box<dyn FnMut() -> Result<Rc<dyn RenderCapability>, RenderError>>;

/// Loads the render capability on first use and hands out the same instance
/// afterwards. A failed load is retried on the next request.
pub struct CapabilityCache {
    loader: Loader,
    loaded: Option<Rc<dyn RenderCapability>>,
    attempts: usize,
}

impl CapabilityCache {
    pub fn new(loader: impl FnMut() -> Result<Rc<dyn RenderCapability>, RenderError> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            loaded: None,
            attempts: 0,
        }
    }

    /// A cache already holding `capability`.
    pub fn preloaded(capability: Rc<dyn RenderCapability>) -> Self {
        Self {
            loader: Box::new(|| Err(RenderError::Unavailable("no loader".to_string()))),
            loaded: Some(capability),
            attempts: 0,
        }
    }

    pub fn get_or_load(&mut self) -> Result<Rc<dyn RenderCapability>, RenderError> {
        if let Some(capability) = &self.loaded {
            return Ok(Rc::clone(capability));
        }
        self.attempts += 1;
        match (self.loader)() {
            Ok(capability) => {
                info!("loaded render capability `{}`", capability.name());
                self.loaded = Some(Rc::clone(&capability));
                Ok(capability)
            }
            Err(e) => {
                warn!("render capability failed to load (attempt {}): {}", self.attempts, e);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// How many times the loader has been invoked.
    pub fn load_attempts(&self) -> usize {
        self.attempts
    }
}
