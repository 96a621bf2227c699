//! Per-frame driver: input → brush/layout → frame resource rotation →
//! uploads → command recording → submission.

mod input;
mod stats;

pub use input::*;

use crate::config::{Config, ConfigError};
use crate::scene::Scene;
use crate::style::{StyleError, StyleTable};
use crate::terrain::{BrushChannel, GRID_INDEX_COUNT, TerrainGrid, apply_brush, pick_uv};
use crate::ui::{Element, MuidCounter, ParseError, ViewportSize, build, hit_test, layout};
use crate::view::{
    BufferOverflow, CommandAllocator, DrawCommand, FrameResourceDesc, FrameResources, GpuTimeline,
    PassConstants, PipelineKind, ProjectError, SyncError, TopDownCamera, UiBufferWriter, project,
};
use glam::Vec2;
use stats::FrameStats;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("gpu synchronisation failed: {0}")]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Buffer(#[from] BufferOverflow),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("draw called without a successful update")]
    DrawWithoutUpdate,
}

/// Non-fatal problems found while loading the stylesheet and markup.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub style: Vec<StyleError>,
    pub markup: Vec<ParseError>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.style.is_empty() && self.markup.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since start.
    pub total: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

impl FrameTime {
    pub fn new(total: f32, delta: f32) -> Self {
        Self { total, delta }
    }
}

/// What one `update` + `draw` pair did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub frame_resource: usize,
    pub fence: u64,
    pub waited_for_gpu: bool,
    pub ui_records: usize,
    pub terrain_uploaded: bool,
    pub brush_touched: usize,
    pub commands: usize,
}

struct PendingFrame {
    started_at: Instant,
    waited_for_gpu: bool,
    ui_records: usize,
    terrain_uploaded: bool,
    brush_touched: usize,
}

pub struct App {
    config: Config,
    styles: StyleTable,
    muids: MuidCounter,
    document: Element,
    viewport: ViewportSize,
    layout_dirty: bool,
    camera: TopDownCamera,
    grid: TerrainGrid,
    scene: Scene,
    frames: FrameResources,
    main_pass: PassConstants,
    input: InputState,
    brush_channel: BrushChannel,
    frame_index: u64,
    pending: Option<PendingFrame>,
    stats: FrameStats,
}

impl App {
    pub fn new(
        config: Config,
        markup: &str,
        stylesheet: &str,
        viewport: ViewportSize,
        timeline: Box<dyn GpuTimeline>,
    ) -> Result<(Self, Diagnostics), AppError> {
        config.validate()?;

        let (styles, style_errors) = StyleTable::parse(stylesheet);
        for error in &style_errors {
            log::warn!("stylesheet: {error}");
        }
        let mut muids = MuidCounter::new();
        let outcome = build(markup, &styles, &mut muids);
        let viewport = ViewportSize::new(viewport.width, viewport.height);
        let mut document = outcome.root;
        layout(&mut document, viewport);

        let camera = TopDownCamera::new(
            config.camera_radius,
            (config.camera_radius_min, config.camera_radius_max),
            config.pan_limit(),
        )
        .with_projection(config.fov_y, config.near_z, config.far_z);
        let frames = FrameResources::new(
            config.frame_resources,
            FrameResourceDesc {
                pass_count: config.pass_count,
                object_capacity: config.object_capacity,
                ui_capacity: config.ui_capacity,
            },
            timeline,
        );
        let main_pass = PassConstants {
            ambient_light: config.ambient_light,
            fog_color: config.fog_color,
            fog_start: config.fog_start,
            fog_range: config.fog_range,
            ..PassConstants::default()
        };

        log::info!(
            "app: {} elements, {} style rules, {} frame resources",
            document.iter().count(),
            styles.len(),
            config.frame_resources
        );

        let app = Self {
            grid: TerrainGrid::new(config.map_extent, config.frame_resources),
            scene: Scene::new(config.frame_resources, GRID_INDEX_COUNT as u32),
            config,
            styles,
            muids,
            document,
            viewport,
            layout_dirty: false,
            camera,
            frames,
            main_pass,
            input: InputState::default(),
            brush_channel: BrushChannel::default(),
            frame_index: 0,
            pending: None,
            stats: FrameStats::new_from_env(),
        };
        let diagnostics = Diagnostics {
            style: style_errors,
            markup: outcome.errors,
        };
        Ok((app, diagnostics))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Element {
        &self.document
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &TopDownCamera {
        &self.camera
    }

    pub fn frame_resources(&self) -> &FrameResources {
        &self.frames
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn brush_channel(&self) -> BrushChannel {
        self.brush_channel
    }

    /// Commands recorded for the most recently drawn frame.
    pub fn commands(&self) -> &[DrawCommand] {
        self.frames.current().allocator.commands()
    }

    /// Replaces the UI document. Muids keep counting from the previous
    /// document so no id is ever reused.
    pub fn load_document(&mut self, markup: &str) -> Vec<ParseError> {
        let outcome = build(markup, &self.styles, &mut self.muids);
        self.document = outcome.root;
        layout(&mut self.document, self.viewport);
        self.layout_dirty = false;
        outcome.errors
    }

    /// Waits for in-flight frames, then relayouts on the next update.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), AppError> {
        self.frames.flush()?;
        self.viewport = ViewportSize::new(width, height);
        self.layout_dirty = true;
        Ok(())
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let delta = self.input.move_pointer(Vec2::new(x, y));
        if self.input.is_pressed(PointerButton::Right) {
            self.camera.zoom_by_drag(delta.x, delta.y);
        }
    }

    pub fn set_button(&mut self, button: PointerButton, pressed: bool) {
        self.input.set_button(button, pressed);
    }

    pub fn key_down(&mut self, key: char) {
        if let Some(channel) = BrushChannel::from_hotkey(key) {
            log::debug!("brush channel {}", channel.index());
            self.brush_channel = channel;
        }
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: char) {
        self.input.key_up(key);
    }

    /// True when the pointer is over an enabled element other than the
    /// document root.
    pub fn pointer_over_ui(&self) -> bool {
        let pointer = self.input.pointer();
        hit_test(&self.document, pointer.x, pointer.y)
            .is_some_and(|element| element.muid != self.document.muid)
    }

    /// CPU half of a frame. Blocks until the next frame resource is free,
    /// then refreshes every buffer in it.
    pub fn update(&mut self, time: FrameTime) -> Result<(), AppError> {
        let started_at = Instant::now();
        self.camera.pan_by(self.input.pan_direction(), time.delta);

        let waits_before = self.frames.wait_count();
        self.frames.advance()?;
        let waited_for_gpu = self.frames.wait_count() > waits_before;

        if self.layout_dirty {
            layout(&mut self.document, self.viewport);
            self.layout_dirty = false;
        }

        let brush_touched = self.apply_held_brush();
        self.scene.animate_materials(time.delta);
        self.update_main_pass(time);

        let set = self.frames.current_mut();
        self.scene.update_object_constants(&mut set.object_cb)?;
        self.scene.update_material_constants(&mut self.main_pass);
        set.pass_cb.copy_data(0, &self.main_pass)?;
        let terrain_uploaded = self.grid.upload_into(&mut set.terrain_vb)?;
        let ui_records = project(&self.document, &mut UiBufferWriter::new(&mut set.ui_cb))?;

        self.pending = Some(PendingFrame {
            started_at,
            waited_for_gpu,
            ui_records,
            terrain_uploaded,
            brush_touched,
        });
        Ok(())
    }

    /// Brush strength is per sampled frame, not per input event.
    fn apply_held_brush(&mut self) -> usize {
        if !self.input.is_pressed(PointerButton::Left) || self.pointer_over_ui() {
            return 0;
        }
        let view_proj = self.camera.view_proj(self.viewport.aspect_ratio());
        let Some(uv) = pick_uv(
            view_proj,
            self.grid.half_extent(),
            self.viewport,
            self.input.pointer(),
        ) else {
            return 0;
        };
        apply_brush(&mut self.grid, uv, self.config.brush_radius, self.brush_channel)
    }

    fn update_main_pass(&mut self, time: FrameTime) {
        let view = self.camera.view();
        let proj = self.camera.proj(self.viewport.aspect_ratio());
        let view_proj = proj * view;

        let pass = &mut self.main_pass;
        pass.view = view.to_cols_array_2d();
        pass.inv_view = view.inverse().to_cols_array_2d();
        pass.proj = proj.to_cols_array_2d();
        pass.inv_proj = proj.inverse().to_cols_array_2d();
        pass.view_proj = view_proj.to_cols_array_2d();
        pass.inv_view_proj = view_proj.inverse().to_cols_array_2d();
        pass.eye_pos_w = self.camera.eye().to_array();
        pass.render_target_size = [self.viewport.width, self.viewport.height];
        pass.inv_render_target_size = [1.0 / self.viewport.width, 1.0 / self.viewport.height];
        pass.near_z = self.camera.near_z();
        pass.far_z = self.camera.far_z();
        pass.total_time = time.total;
        pass.delta_time = time.delta;
    }

    /// GPU half of a frame: records the draw stream into the current frame
    /// resource and submits it.
    pub fn draw(&mut self) -> Result<FrameReport, AppError> {
        let pending = self.pending.take().ok_or(AppError::DrawWithoutUpdate)?;
        let frame = self.frames.current_index();
        let set = self.frames.current_mut();

        set.allocator.reset();
        set.allocator.record(DrawCommand::SetViewport {
            width: self.viewport.width,
            height: self.viewport.height,
        });
        set.allocator.record(DrawCommand::Clear {
            color: self.main_pass.fog_color,
        });
        set.allocator.record(DrawCommand::SetPipeline(PipelineKind::Terrain));
        let pass_offset = set.pass_cb.offset_of(0);
        set.allocator.record(DrawCommand::BindPassConstants {
            frame,
            offset: pass_offset,
        });
        for item in self.scene.items() {
            let object_offset = set.object_cb.offset_of(item.obj_cb_index);
            set.allocator.record(DrawCommand::DrawTerrain {
                frame,
                object_offset,
                material: item.material,
                index_count: item.index_count,
                start_index: item.start_index,
                base_vertex: item.base_vertex,
            });
        }
        if pending.ui_records > 0 {
            set.allocator.record(DrawCommand::SetPipeline(PipelineKind::Ui));
            set.allocator.record(DrawCommand::DrawUiQuads {
                frame,
                first: 0,
                count: pending.ui_records as u32,
            });
        }
        let commands = set.allocator.commands().len();

        let fence = self.frames.submit()?;
        self.frame_index += 1;
        self.stats
            .record_frame(pending.started_at.elapsed(), pending.waited_for_gpu);

        Ok(FrameReport {
            frame_index: self.frame_index,
            frame_resource: frame,
            fence,
            waited_for_gpu: pending.waited_for_gpu,
            ui_records: pending.ui_records,
            terrain_uploaded: pending.terrain_uploaded,
            brush_touched: pending.brush_touched,
            commands,
        })
    }

    /// Waits for the GPU to finish everything submitted.
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        self.frames.flush()?;
        log::info!("app: shut down after {} frames", self.frame_index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppError, FrameTime, PointerButton};
    use crate::config::Config;
    use crate::ui::ViewportSize;
    use crate::view::{CpuTimeline, DrawCommand};

    fn small_config() -> Config {
        Config {
            object_capacity: 4,
            ui_capacity: 16,
            ..Config::default()
        }
    }

    fn app(markup: &str) -> App {
        let (app, diagnostics) = App::new(
            small_config(),
            markup,
            "panel { background-color: #333; border-width: 1 }",
            ViewportSize::new(800.0, 600.0),
            Box::new(CpuTimeline::immediate()),
        )
        .unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        app
    }

    #[test]
    fn draw_requires_update() {
        let mut app = app("<root/>");
        assert!(matches!(app.draw(), Err(AppError::DrawWithoutUpdate)));
        app.update(FrameTime::new(0.0, 0.016)).unwrap();
        let report = app.draw().unwrap();
        assert_eq!(report.fence, 1);
        assert_eq!(report.frame_resource, 0);
        assert!(matches!(app.draw(), Err(AppError::DrawWithoutUpdate)));
    }

    #[test]
    fn pointer_over_panel_blocks_painting() {
        let mut app = app(r#"<root><panel width=100 height=600/></root>"#);
        app.set_button(PointerButton::Left, true);

        app.pointer_moved(50.0, 300.0);
        app.update(FrameTime::new(0.0, 0.016)).unwrap();
        assert_eq!(app.draw().unwrap().brush_touched, 0);

        app.pointer_moved(400.0, 300.0);
        app.update(FrameTime::new(0.016, 0.016)).unwrap();
        let report = app.draw().unwrap();
        assert!(report.brush_touched > 0);
        assert!(report.terrain_uploaded);
    }

    #[test]
    fn hotkeys_and_right_drag() {
        let mut app = app("<root/>");
        app.key_down('4');
        assert_eq!(app.brush_channel().index(), 3);

        let radius = app.camera().radius();
        app.set_button(PointerButton::Right, true);
        app.pointer_moved(0.0, 0.0);
        app.pointer_moved(50.0, 0.0);
        assert_eq!(app.camera().radius(), radius + 10.0);
    }

    #[test]
    fn draw_stream_binds_current_frame_resource() {
        let mut app = app(r#"<root><panel width=10 height=10/></root>"#);
        app.update(FrameTime::new(0.0, 0.016)).unwrap();
        app.draw().unwrap();
        app.update(FrameTime::new(0.016, 0.016)).unwrap();
        let report = app.draw().unwrap();
        assert_eq!(report.frame_resource, 1);
        // root (1) + bordered panel (2)
        assert_eq!(report.ui_records, 3);

        let commands = app.commands();
        assert_eq!(commands.len(), report.commands);
        assert!(commands.contains(&DrawCommand::DrawUiQuads {
            frame: 1,
            first: 0,
            count: 3
        }));
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, DrawCommand::DrawTerrain { index_count: 390150, .. }))
        );
    }

    #[test]
    fn resize_relayouts_document() {
        let mut app = app("<root><panel/></root>");
        app.update(FrameTime::default()).unwrap();
        app.draw().unwrap();
        app.resize(320.0, 0.0).unwrap();
        app.update(FrameTime::default()).unwrap();
        let root = app.document().size_in_display().unwrap();
        assert_eq!((root.width, root.height), (320.0, 1.0));
        app.shutdown().unwrap();
    }
}
