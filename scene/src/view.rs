use embedviz::Embedding;
use log::{debug, info, warn};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::SceneError;
use crate::camera::{OrbitCamera, ndc_to_screen};
use crate::cloud::PointCloud;
use crate::config::SceneConfig;
use crate::guides::guide_lines;
use crate::listeners::{EventKind, EventTarget, HostEvent, ListenerId, ListenerRegistry};
use crate::picking::pick_nearest;
use crate::render::{CapabilityCache, FrameView, RenderBackend, RenderError, Tooltip};
use crate::scheduler::{FrameTask, FrameTicker};
use crate::state::{InputEvent, SceneState, Viewport};

/// What a view is mounted into: the frame loop, the event sources and the
/// container size. `container` is `None` while there is nothing to draw in.
///
/// Event coordinates are canvas-local pixels for both targets; window events
/// may fall outside the canvas.
#[derive(Default)]
pub struct Host {
    pub ticker: FrameTicker,
    pub listeners: ListenerRegistry,
    pub container: Option<Viewport>,
}

impl Host {
    pub fn new(container: Option<Viewport>) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }
}

/// Per-frame constants taken from the config at mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    pub pick_threshold: f32,
    pub auto_rotate_speed: f32,
}

impl From<&SceneConfig> for FrameSettings {
    fn from(config: &SceneConfig) -> Self {
        Self {
            pick_threshold: config.pick_threshold,
            auto_rotate_speed: config.auto_rotate_speed,
        }
    }
}

/// One animation frame: turn the group, pick under the pointer, update the
/// tooltip and draw.
pub fn render_frame(
    state: &mut SceneState,
    cloud: &PointCloud,
    settings: FrameSettings,
    backend: &mut dyn RenderBackend,
) -> Result<(), RenderError> {
    state.advance(settings.auto_rotate_speed);

    let ray = state.camera.ray_through(state.pointer_ndc);
    let hit = pick_nearest(&ray, cloud.positions(), state.group_rotation_y, settings.pick_threshold);
    state.hovered = hit.map(|h| h.index);

    let tooltip = hit.and_then(|h| {
        let (ndc, _) = state.camera.project(h.point)?;
        Some(Tooltip {
            text: cloud.label(h.index)?.to_string(),
            screen: ndc_to_screen([ndc.x, ndc.y], state.viewport),
        })
    });
    backend.set_tooltip(tooltip);

    backend.draw(&FrameView {
        camera: &state.camera,
        group_rotation_y: state.group_rotation_y,
        viewport: state.viewport,
        hovered: state.hovered,
        frame: state.frames,
    })
}

/// Entry points for putting the point cloud view on screen.
pub struct NeuralView;

impl NeuralView {
    /// Mounts the view, logging and returning `None` if it cannot be shown.
    pub fn mount(host: &mut Host, cache: &mut CapabilityCache, config: &SceneConfig) -> Option<MountedView> {
        match Self::try_mount(host, cache, config) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("point cloud view not mounted: {}", e);
                None
            }
        }
    }

    pub fn try_mount(
        host: &mut Host,
        cache: &mut CapabilityCache,
        config: &SceneConfig,
    ) -> Result<MountedView, SceneError> {
        config.camera.validate()?;
        let capability = cache.get_or_load()?;
        let viewport = host.container.ok_or(RenderError::NoContainer)?;

        let embedding = embedviz::run(&config.embedding)?;
        let palette = config.palette_rgb()?;
        let guides = guide_lines(config)?;
        let cloud = Rc::new(PointCloud::from_embedding(&embedding, &palette)?);

        let mut backend = capability.create_backend(viewport)?;
        if let Err(e) = backend.upload(&cloud, config.point_size) {
            if let Err(dispose) = backend.dispose() {
                debug!("dispose after failed upload: {}", dispose);
            }
            return Err(e.into());
        }
        backend.set_guides(&guides);
        let backend: Rc<RefCell<Box<dyn RenderBackend>>> = Rc::new(RefCell::new(backend));
        let state = Rc::new(RefCell::new(SceneState::new(&config.camera, viewport)));

        let listeners = register_listeners(&mut host.listeners, &state, &backend);

        let settings = FrameSettings::from(config);
        let frame_task = {
            let state = Rc::clone(&state);
            let backend = Rc::clone(&backend);
            let cloud = Rc::clone(&cloud);
            host.ticker.schedule_repeating(move |_| {
                let mut state = state.borrow_mut();
                let mut backend = backend.borrow_mut();
                if let Err(e) = render_frame(&mut state, &cloud, settings, &mut **backend) {
                    warn!("frame {} not drawn: {}", state.frames, e);
                }
            })
        };

        info!(
            "mounted point cloud view with {} points via `{}` at {}x{}",
            cloud.len(),
            capability.name(),
            viewport.width,
            viewport.height
        );
        Ok(MountedView {
            state,
            backend,
            cloud,
            embedding,
            frame_task,
            listeners,
        })
    }
}

/// Adds a listener that translates host events into scene input.
fn forward(
    registry: &mut ListenerRegistry,
    state: &Rc<RefCell<SceneState>>,
    target: EventTarget,
    kind: EventKind,
    to_input: fn(&HostEvent) -> Option<InputEvent>,
) -> ListenerId {
    let state = Rc::clone(state);
    registry.add(target, kind, move |event| {
        if let Some(input) = to_input(event) {
            state.borrow_mut().apply(input);
        }
    })
}

fn register_listeners(
    registry: &mut ListenerRegistry,
    state: &Rc<RefCell<SceneState>>,
    backend: &Rc<RefCell<Box<dyn RenderBackend>>>,
) -> Vec<ListenerId> {
    let mut ids = vec![
        forward(registry, state, EventTarget::Canvas, EventKind::PointerMove, |e| match *e {
            HostEvent::PointerMove { x, y } => Some(InputEvent::PointerMoved { x, y }),
            _ => None,
        }),
        forward(registry, state, EventTarget::Canvas, EventKind::PointerDown, |e| match *e {
            HostEvent::PointerDown { x, y } => Some(InputEvent::ButtonPressed { x, y }),
            _ => None,
        }),
        forward(registry, state, EventTarget::Canvas, EventKind::Wheel, |e| match *e {
            HostEvent::Wheel { delta_y } => Some(InputEvent::Wheel { delta_y }),
            _ => None,
        }),
        forward(registry, state, EventTarget::Window, EventKind::PointerUp, |e| match *e {
            HostEvent::PointerUp => Some(InputEvent::ButtonReleased),
            _ => None,
        }),
        // Drags keep tracking when the pointer leaves the canvas.
        forward(registry, state, EventTarget::Window, EventKind::PointerMove, |e| match *e {
            HostEvent::PointerMove { x, y } => Some(InputEvent::DragMoved { x, y }),
            _ => None,
        }),
    ];

    let (state, backend) = (Rc::clone(state), Rc::clone(backend));
    ids.push(registry.add(EventTarget::Window, EventKind::Resize, move |event| {
        if let HostEvent::Resize { width, height } = *event {
            let mut state = state.borrow_mut();
            state.apply(InputEvent::Resized { width, height });
            backend.borrow_mut().resize(state.viewport);
        }
    }));
    ids
}

/// A view on screen. Call [`MountedView::unmount`] to take it down; dropping
/// it leaves its frame task and listeners attached.
#[must_use = "an unmounted view keeps drawing until `unmount` is called"]
pub struct MountedView {
    state: Rc<RefCell<SceneState>>,
    backend: Rc<RefCell<Box<dyn RenderBackend>>>,
    cloud: Rc<PointCloud>,
    embedding: Embedding,
    frame_task: FrameTask,
    listeners: Vec<ListenerId>,
}

impl MountedView {
    pub fn state(&self) -> Ref<'_, SceneState> {
        self.state.borrow()
    }

    pub fn camera(&self) -> OrbitCamera {
        self.state.borrow().camera
    }

    pub fn hovered(&self) -> Option<usize> {
        self.state.borrow().hovered
    }

    pub fn hovered_label(&self) -> Option<String> {
        self.hovered()
            .and_then(|i| self.cloud.label(i))
            .map(str::to_string)
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn listener_ids(&self) -> &[ListenerId] {
        &self.listeners
    }

    /// Stops the frame task, detaches every listener added at mount and
    /// disposes the backend. Dispose failures are logged, not returned.
    pub fn unmount(self, host: &mut Host) {
        self.frame_task.cancel();
        host.ticker.purge();
        let removed = self
            .listeners
            .iter()
            .filter(|id| host.listeners.remove(**id))
            .count();
        if removed != self.listeners.len() {
            debug!("{} listeners were already detached", self.listeners.len() - removed);
        }
        if let Err(e) = self.backend.borrow_mut().dispose() {
            warn!("render backend failed to dispose: {}", e);
        }
        info!("unmounted point cloud view");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    #[derive(Default)]
    struct Recorder {
        tooltips: Vec<Option<Tooltip>>,
        frames: Vec<(u64, Option<usize>)>,
    }

    impl RenderBackend for Recorder {
        fn upload(&mut self, _cloud: &PointCloud, _point_size: f32) -> Result<(), RenderError> {
            Ok(())
        }

        fn resize(&mut self, _viewport: Viewport) {}

        fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
            self.frames.push((frame.frame, frame.hovered));
            Ok(())
        }

        fn set_tooltip(&mut self, tooltip: Option<Tooltip>) {
            self.tooltips.push(tooltip);
        }

        fn dispose(&mut self) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn single_point() -> PointCloud {
        let white = crate::cloud::parse_hex_color("#ffffff").unwrap();
        PointCloud::new(vec![Vec3::ZERO], vec![white], vec!["tech_0".to_string()]).unwrap()
    }

    fn settings() -> FrameSettings {
        FrameSettings {
            pick_threshold: 1.0,
            auto_rotate_speed: 0.0005,
        }
    }

    #[test]
    fn test_hover_at_center() {
        let mut state = SceneState::new(&CameraConfig::default(), Viewport::new(800.0, 600.0));
        state.pointer_moved(400.0, 300.0);
        let mut backend = Recorder::default();
        render_frame(&mut state, &single_point(), settings(), &mut backend).unwrap();

        assert_eq!(state.hovered, Some(0));
        let tooltip = backend.tooltips[0].clone().unwrap();
        assert_eq!(tooltip.text, "tech_0");
        assert_abs_diff_eq!(tooltip.screen[0], 400.0, epsilon = 1e-2);
        assert_abs_diff_eq!(tooltip.screen[1], 300.0, epsilon = 1e-2);
        assert_eq!(backend.frames, vec![(1, Some(0))]);
    }

    #[test]
    fn test_miss_clears_hover() {
        let mut state = SceneState::new(&CameraConfig::default(), Viewport::new(800.0, 600.0));
        state.hovered = Some(0);
        state.pointer_moved(0.0, 0.0);
        let mut backend = Recorder::default();
        render_frame(&mut state, &single_point(), settings(), &mut backend).unwrap();

        assert_eq!(state.hovered, None);
        assert_eq!(backend.tooltips, vec![None]);
        assert_abs_diff_eq!(state.group_rotation_y, 0.0005);
    }
}
