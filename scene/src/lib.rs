//! Interactive 3D point cloud view of an [`embedviz::Embedding`].
//!
//! The view owns no window or GPU context. A [`Host`] supplies the frame
//! loop, the event listeners and the container size, and a
//! [`RenderCapability`] supplies the drawing backend, so the whole lifecycle
//! runs headless under test.

pub mod camera;
pub mod cloud;
pub mod config;
pub mod guides;
pub mod listeners;
pub mod picking;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod view;

use embedviz::PipelineError;
use thiserror::Error;

pub use camera::{OrbitCamera, ndc_to_screen, project_with};
pub use cloud::{DEFAULT_PALETTE, PointCloud, Rgb, parse_hex_color};
pub use config::{AxesConfig, CameraConfig, GridConfig, SceneConfig};
pub use guides::{GuideLine, guide_lines};
pub use listeners::{EventKind, EventTarget, HostEvent, ListenerId, ListenerRegistry};
pub use picking::{Hit, Ray, pick_nearest};
pub use render::{CapabilityCache, FrameView, RenderBackend, RenderCapability, RenderError, Tooltip};
pub use scheduler::{FrameTask, FrameTick, FrameTicker};
pub use state::{InputEvent, SceneState, Viewport};
pub use view::{FrameSettings, Host, MountedView, NeuralView, render_frame};

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("invalid color `{0}`, expected #rrggbb")]
    InvalidColor(String),
    #[error("palette has no colors")]
    EmptyPalette,
    #[error("invalid camera config: {0}")]
    InvalidCamera(String),
    #[error("invalid guide config: {0}")]
    InvalidGuides(String),
    #[error("point cloud has {positions} positions, {colors} colors and {labels} labels")]
    LengthMismatch {
        positions: usize,
        colors: usize,
        labels: usize,
    },
    #[error("failed to read scene config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),
}
