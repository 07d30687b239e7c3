use approx::assert_abs_diff_eq;
use point_scene::{
    CapabilityCache, EventTarget, FrameView, GuideLine, Host, HostEvent, MountedView, NeuralView, PointCloud,
    RenderBackend, RenderCapability, RenderError, SceneConfig, SceneError, Tooltip, Viewport, ndc_to_screen,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct Calls {
    created: usize,
    uploaded: Vec<usize>,
    draws: Vec<(u64, Option<usize>)>,
    tooltips: Vec<Option<Tooltip>>,
    resizes: Vec<Viewport>,
    guides: Vec<usize>,
    disposed: usize,
    dropped: usize,
}

struct FakeBackend {
    calls: Rc<RefCell<Calls>>,
    fail_dispose: bool,
}

impl RenderBackend for FakeBackend {
    fn upload(&mut self, cloud: &PointCloud, _point_size: f32) -> Result<(), RenderError> {
        self.calls.borrow_mut().uploaded.push(cloud.len());
        Ok(())
    }

    fn set_guides(&mut self, lines: &[GuideLine]) {
        self.calls.borrow_mut().guides.push(lines.len());
    }

    fn resize(&mut self, viewport: Viewport) {
        self.calls.borrow_mut().resizes.push(viewport);
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        self.calls.borrow_mut().draws.push((frame.frame, frame.hovered));
        Ok(())
    }

    fn set_tooltip(&mut self, tooltip: Option<Tooltip>) {
        self.calls.borrow_mut().tooltips.push(tooltip);
    }

    fn dispose(&mut self) -> Result<(), RenderError> {
        self.calls.borrow_mut().disposed += 1;
        if self.fail_dispose {
            Err(RenderError::Backend("context already lost".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.calls.borrow_mut().dropped += 1;
    }
}

struct FakeCapability {
    calls: Rc<RefCell<Calls>>,
    fail_dispose: bool,
}

impl RenderCapability for FakeCapability {
    fn name(&self) -> &str {
        "fake"
    }

    fn create_backend(&self, _viewport: Viewport) -> Result<Box<dyn RenderBackend>, RenderError> {
        self.calls.borrow_mut().created += 1;
        Ok(Box::new(FakeBackend {
            calls: Rc::clone(&self.calls),
            fail_dispose: self.fail_dispose,
        }))
    }
}

struct Fixture {
    host: Host,
    cache: CapabilityCache,
    calls: Rc<RefCell<Calls>>,
    loads: Rc<Cell<usize>>,
}

fn fixture_with(fail_first_loads: usize, fail_dispose: bool) -> Fixture {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let loads = Rc::new(Cell::new(0));
    let (c, l) = (Rc::clone(&calls), Rc::clone(&loads));
    let cache = CapabilityCache::new(move || {
        l.set(l.get() + 1);
        if l.get() <= fail_first_loads {
            return Err(RenderError::Unavailable("module failed to load".to_string()));
        }
        Ok(Rc::new(FakeCapability {
            calls: Rc::clone(&c),
            fail_dispose,
        }) as Rc<dyn RenderCapability>)
    });
    Fixture {
        host: Host::new(Some(Viewport::new(800.0, 600.0))),
        cache,
        calls,
        loads,
    }
}

fn fixture() -> Fixture {
    fixture_with(0, false)
}

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.embedding.seed = Some(11);
    config
}

fn mount(f: &mut Fixture, config: &SceneConfig) -> MountedView {
    NeuralView::mount(&mut f.host, &mut f.cache, config).expect("view should mount")
}

#[test]
fn test_mount_uploads_cloud_and_registers_listeners() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    assert_eq!(f.calls.borrow().created, 1);
    assert_eq!(f.calls.borrow().uploaded, vec![240]);
    // 31 grid lines each way plus three axes.
    assert_eq!(f.calls.borrow().guides, vec![65]);
    assert_eq!(f.host.listeners.len(), 6);
    assert_eq!(view.listener_ids().len(), 6);
    assert_eq!(f.host.ticker.live_tasks(), 1);
    assert_eq!(view.embedding().len(), 240);
    assert_eq!(view.cloud().label(75), Some("tech_75"));
    view.unmount(&mut f.host);
}

#[test]
fn test_capability_loads_once_across_mounts() {
    let mut f = fixture();
    let first = mount(&mut f, &config());
    first.unmount(&mut f.host);
    let second = mount(&mut f, &config());
    assert_eq!(f.loads.get(), 1);
    assert_eq!(f.cache.load_attempts(), 1);
    assert_eq!(f.calls.borrow().created, 2);
    second.unmount(&mut f.host);
}

#[test]
fn test_failed_load_leaves_view_blank_and_is_retried() {
    let mut f = fixture_with(1, false);
    assert!(NeuralView::mount(&mut f.host, &mut f.cache, &config()).is_none());
    assert!(f.host.listeners.is_empty());
    assert_eq!(f.host.ticker.live_tasks(), 0);
    assert!(!f.cache.is_loaded());

    let view = mount(&mut f, &config());
    assert_eq!(f.loads.get(), 2);
    view.unmount(&mut f.host);
}

#[test]
fn test_missing_container() {
    let mut f = fixture();
    f.host.container = None;
    assert!(NeuralView::mount(&mut f.host, &mut f.cache, &config()).is_none());
    assert_eq!(f.calls.borrow().created, 0);
    assert!(f.host.listeners.is_empty());
    assert_eq!(f.host.ticker.live_tasks(), 0);
}

#[test]
fn test_invalid_embedding_config_fails_mount() {
    let mut f = fixture();
    let mut config = config();
    config.embedding.dataset.n_points = 0;
    assert!(NeuralView::try_mount(&mut f.host, &mut f.cache, &config).is_err());
    assert!(f.host.listeners.is_empty());
}

#[test]
fn test_frames_draw_and_rotate() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    for _ in 0..3 {
        assert_eq!(f.host.ticker.tick(), 1);
    }
    let frames: Vec<u64> = f.calls.borrow().draws.iter().map(|d| d.0).collect();
    assert_eq!(frames, vec![1, 2, 3]);
    assert_abs_diff_eq!(view.state().group_rotation_y, 0.0015, epsilon = 1e-6);
    assert_eq!(f.calls.borrow().tooltips.len(), 3);
    view.unmount(&mut f.host);
}

#[test]
fn test_unmount_stops_frames_and_listeners() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    f.host.ticker.tick();
    view.unmount(&mut f.host);

    assert!(f.host.listeners.is_empty());
    assert_eq!(f.host.ticker.live_tasks(), 0);
    assert_eq!(f.host.ticker.tick(), 0);
    assert_eq!(f.calls.borrow().draws.len(), 1);
    assert_eq!(f.calls.borrow().disposed, 1);

    assert_eq!(f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::Wheel { delta_y: 1.0 }), 0);
    assert_eq!(f.host.listeners.dispatch(EventTarget::Window, &HostEvent::PointerUp), 0);
}

#[test]
fn test_unmount_releases_backend_without_another_tick() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    f.host.ticker.tick();
    view.unmount(&mut f.host);
    assert_eq!(f.calls.borrow().dropped, 1);
}

#[test]
fn test_hidden_guides_are_not_uploaded() {
    let mut f = fixture();
    let mut config = config();
    config.grid.visible = false;
    config.axes.visible = false;
    let view = mount(&mut f, &config);
    assert_eq!(f.calls.borrow().guides, vec![0]);
    view.unmount(&mut f.host);
}

#[test]
fn test_invalid_camera_config_fails_mount_without_panicking() {
    for json in [
        r#"{ "min_radius": 90.0, "max_radius": 10.0 }"#,
        r#"{ "phi_epsilon": 2.0 }"#,
        r#"{ "near": 5.0, "far": 1.0 }"#,
    ] {
        let mut f = fixture();
        let mut config = config();
        config.camera = serde_json::from_str(json).unwrap();
        assert!(matches!(
            NeuralView::try_mount(&mut f.host, &mut f.cache, &config),
            Err(SceneError::InvalidCamera(_))
        ));
        assert!(NeuralView::mount(&mut f.host, &mut f.cache, &config).is_none());
        assert_eq!(f.calls.borrow().created, 0);
        assert!(f.host.listeners.is_empty());
        assert_eq!(f.host.ticker.live_tasks(), 0);
    }
}

#[test]
fn test_dispose_failure_is_swallowed() {
    let mut f = fixture_with(0, true);
    let view = mount(&mut f, &config());
    view.unmount(&mut f.host);
    assert_eq!(f.calls.borrow().disposed, 1);
    assert!(f.host.listeners.is_empty());
    assert_eq!(f.host.ticker.live_tasks(), 0);
}

#[test]
fn test_drag_through_host_events_clamps_phi() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    let listeners = &mut f.host.listeners;

    // Moving without a pressed button only updates the pointer.
    listeners.dispatch(EventTarget::Window, &HostEvent::PointerMove { x: 100.0, y: 9000.0 });
    assert_abs_diff_eq!(view.camera().phi, std::f32::consts::FRAC_PI_4);

    listeners.dispatch(EventTarget::Canvas, &HostEvent::PointerDown { x: 100.0, y: 100.0 });
    listeners.dispatch(EventTarget::Window, &HostEvent::PointerMove { x: 100.0, y: 9000.0 });
    assert_abs_diff_eq!(view.camera().phi, 0.001);
    listeners.dispatch(EventTarget::Window, &HostEvent::PointerMove { x: 100.0, y: -90000.0 });
    assert_abs_diff_eq!(view.camera().phi, std::f32::consts::PI - 0.001);

    listeners.dispatch(EventTarget::Window, &HostEvent::PointerUp);
    let settled = view.camera();
    listeners.dispatch(EventTarget::Window, &HostEvent::PointerMove { x: 500.0, y: 500.0 });
    assert_eq!(view.camera(), settled);
    view.unmount(&mut f.host);
}

#[test]
fn test_wheel_through_host_events_clamps_radius() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    for _ in 0..100 {
        f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::Wheel { delta_y: 100.0 });
    }
    assert_eq!(view.camera().radius, 80.0);
    for _ in 0..100 {
        f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::Wheel { delta_y: -100.0 });
    }
    assert_eq!(view.camera().radius, 5.0);
    // Wheel events on the window are not the canvas's.
    f.host.listeners.dispatch(EventTarget::Window, &HostEvent::Wheel { delta_y: 100.0 });
    assert_eq!(view.camera().radius, 5.0);
    view.unmount(&mut f.host);
}

#[test]
fn test_resize_reaches_camera_and_backend() {
    let mut f = fixture();
    let view = mount(&mut f, &config());
    f.host.listeners.dispatch(
        EventTarget::Window,
        &HostEvent::Resize {
            width: 1200.0,
            height: 400.0,
        },
    );
    assert_eq!(view.camera().aspect, 3.0);
    assert_eq!(f.calls.borrow().resizes, vec![Viewport::new(1200.0, 400.0)]);
    view.unmount(&mut f.host);
}

#[test]
fn test_hover_shows_label_of_point_under_pointer() {
    let mut f = fixture();
    let mut config = config();
    config.auto_rotate_speed = 0.0;
    let view = mount(&mut f, &config);

    let target = view.cloud().positions()[42];
    let (ndc, _) = view.camera().project(target).expect("point in front of camera");
    let [x, y] = ndc_to_screen([ndc.x, ndc.y], Viewport::new(800.0, 600.0));
    f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::PointerMove { x, y });
    f.host.ticker.tick();

    let hovered = view.hovered().expect("a point under the pointer");
    let label = view.hovered_label().expect("hovered point has a label");
    assert_eq!(view.cloud().label(hovered), Some(label.as_str()));
    let tooltip = f.calls.borrow().tooltips[0].clone().expect("tooltip shown");
    assert_eq!(tooltip.text, label);
    assert_eq!(f.calls.borrow().draws[0].1, Some(hovered));
    view.unmount(&mut f.host);
}

#[test]
fn test_pointer_away_from_cloud_clears_hover() {
    let mut f = fixture();
    let mut config = config();
    config.embedding.projection.target_min = -1.0;
    config.embedding.projection.target_max = 1.0;
    let view = mount(&mut f, &config);

    f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::PointerMove { x: 400.0, y: 300.0 });
    f.host.ticker.tick();
    f.host.listeners.dispatch(EventTarget::Canvas, &HostEvent::PointerMove { x: 0.0, y: 0.0 });
    f.host.ticker.tick();

    assert_eq!(view.hovered(), None);
    assert_eq!(f.calls.borrow().tooltips.last(), Some(&None));
    view.unmount(&mut f.host);
}
