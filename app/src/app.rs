use crate::backend::{EguiCapability, SharedCanvas};
use crate::ui;

use eframe::egui;
use eframe::{App, Frame};
use log::info;
use point_scene::{CapabilityCache, Host, MountedView, NeuralView, RenderCapability, SceneConfig};
use std::rc::Rc;

/// Top-level state: the host the view is mounted into and the view itself.
pub struct VisualizerApp {
    pub host: Host,
    pub cache: CapabilityCache,
    pub view: Option<MountedView>,
    pub config: SceneConfig,
    /// Filled by the egui backend, painted by the central panel.
    pub canvas: SharedCanvas,
    /// Whether the user wants the view on screen.
    pub show_view: bool,
    /// Set when the last mount attempt failed, so it is not retried every frame.
    pub mount_failed: bool,
}

impl VisualizerApp {
    pub fn new(config: SceneConfig) -> Self {
        let canvas = SharedCanvas::default();
        let loader_canvas = Rc::clone(&canvas);
        let cache = CapabilityCache::new(move || {
            Ok(Rc::new(EguiCapability::new(Rc::clone(&loader_canvas))) as Rc<dyn RenderCapability>)
        });
        Self {
            host: Host::default(),
            cache,
            view: None,
            config,
            canvas,
            show_view: true,
            mount_failed: false,
        }
    }

    /// Mounts the view once the canvas has a size.
    pub fn ensure_mounted(&mut self) {
        if !self.show_view || self.view.is_some() || self.mount_failed || self.host.container.is_none() {
            return;
        }
        self.view = NeuralView::mount(&mut self.host, &mut self.cache, &self.config);
        self.mount_failed = self.view.is_none();
    }

    pub fn unmount(&mut self) {
        if let Some(view) = self.view.take() {
            view.unmount(&mut self.host);
        }
    }

    /// Draws a fresh dataset with `seed` and remounts.
    pub fn reseed(&mut self, seed: u64) {
        info!("re-rolling the dataset with seed {}", seed);
        self.config.embedding.seed = Some(seed);
        self.unmount();
        self.mount_failed = false;
        self.ensure_mounted();
    }

    pub fn set_show_view(&mut self, show: bool) {
        self.show_view = show;
        self.mount_failed = false;
        if show {
            self.ensure_mounted();
        } else {
            self.unmount();
        }
    }
}

impl App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ui::draw_side_panel(self, ctx);
        ui::draw_central_panel(self, ctx);
    }
}
