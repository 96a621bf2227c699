use std::thread;
use std::time::Duration;
use ytml::terrain::GRID_SIZE;
use ytml::ui::ViewportSize;
use ytml::view::{CpuTimeline, DrawCommand, PipelineKind};
use ytml::{App, Config, FrameTime, PointerButton};

const MARKUP: &str = r#"
<ytml>
  <panel id=toolbar height=40 border-width=1 background-color=#202020>
    <button id=paint left=4 top=4 width=60 height=30/>
  </panel>
  <label id=hidden display=none width=10 height=10/>
</ytml>
"#;

fn config() -> Config {
    Config {
        object_capacity: 8,
        ui_capacity: 64,
        ..Config::default()
    }
}

fn new_app(timeline: CpuTimeline) -> App {
    let (app, diagnostics) = App::new(
        config(),
        MARKUP,
        "button { border-width: 2; border-color: white }",
        ViewportSize::new(800.0, 600.0),
        Box::new(timeline),
    )
    .unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    app
}

fn frame(app: &mut App, n: u32) -> ytml::FrameReport {
    let dt = 1.0 / 60.0;
    app.update(FrameTime::new(n as f32 * dt, dt)).unwrap();
    app.draw().unwrap()
}

#[test]
fn frame_resources_rotate_and_fences_increase() {
    let mut app = new_app(CpuTimeline::immediate());
    let reports: Vec<_> = (0..7).map(|n| frame(&mut app, n)).collect();

    let order: Vec<usize> = reports.iter().map(|r| r.frame_resource).collect();
    assert_eq!(order, [0, 1, 2, 0, 1, 2, 0]);
    let fences: Vec<u64> = reports.iter().map(|r| r.fence).collect();
    assert_eq!(fences, [1, 2, 3, 4, 5, 6, 7]);
    assert!(reports.iter().all(|r| !r.waited_for_gpu));

    // Root, bordered toolbar (2), bordered button (2); the hidden label
    // emits nothing.
    assert!(reports.iter().all(|r| r.ui_records == 5));

    // The grid is uploaded into each of the three sets once, then idles.
    let uploads: Vec<bool> = reports.iter().map(|r| r.terrain_uploaded).collect();
    assert_eq!(uploads, [true, true, true, false, false, false, false]);
}

#[test]
fn draw_stream_orders_terrain_before_ui() {
    let mut app = new_app(CpuTimeline::immediate());
    frame(&mut app, 0);
    let commands = app.commands();

    let terrain = commands
        .iter()
        .position(|c| *c == DrawCommand::SetPipeline(PipelineKind::Terrain))
        .unwrap();
    let ui = commands
        .iter()
        .position(|c| *c == DrawCommand::SetPipeline(PipelineKind::Ui))
        .unwrap();
    assert!(terrain < ui);
    assert_eq!(
        commands[0],
        DrawCommand::SetViewport {
            width: 800.0,
            height: 600.0
        }
    );
    assert_eq!(
        commands.last(),
        Some(&DrawCommand::DrawUiQuads {
            frame: 0,
            first: 0,
            count: 5
        })
    );
}

#[test]
fn painting_shifts_weights_under_the_pointer_only_off_ui() {
    let mut app = new_app(CpuTimeline::immediate());
    app.key_down('2');
    app.set_button(PointerButton::Left, true);

    // Over the toolbar: nothing is painted.
    app.pointer_moved(400.0, 20.0);
    assert!(app.pointer_over_ui());
    assert_eq!(frame(&mut app, 0).brush_touched, 0);

    // Centre of the window looks straight down at the centre of the map.
    app.pointer_moved(400.0, 300.0);
    assert!(!app.pointer_over_ui());
    let report = frame(&mut app, 1);
    assert!(report.brush_touched > 0);

    let vertex = app.grid().vertex(GRID_SIZE / 2, GRID_SIZE / 2).unwrap();
    assert!(vertex.weights[1] > 0.0, "{:?}", vertex.weights);
    assert!((vertex.weight_sum() - 1.0).abs() < 1e-4);

    // Holding the button keeps painting, so every frame re-uploads the grid.
    let uploads: Vec<bool> = (2..6).map(|n| frame(&mut app, n).terrain_uploaded).collect();
    assert_eq!(uploads, [true, true, true, true]);
}

#[test]
fn cpu_blocks_when_it_runs_ahead_of_the_gpu() {
    let timeline = CpuTimeline::new();
    let completer = timeline.completer();
    let mut app = new_app(timeline);

    // Three frames fit in the ring without waiting.
    for n in 0..3 {
        assert!(!frame(&mut app, n).waited_for_gpu);
    }
    assert_eq!(completer.pending(), 3);

    let gpu = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        completer.complete(1);
        completer
    });
    let report = frame(&mut app, 3);
    assert!(report.waited_for_gpu);
    assert_eq!(report.frame_resource, 0);
    assert_eq!(report.fence, 4);

    let completer = gpu.join().unwrap();
    completer.complete_all();
    app.shutdown().unwrap();
    assert_eq!(completer.pending(), 0);
}

#[test]
fn resize_flushes_and_relayouts() {
    let timeline = CpuTimeline::immediate();
    let mut app = new_app(timeline);
    frame(&mut app, 0);

    app.resize(1024.0, 768.0).unwrap();
    frame(&mut app, 1);
    let toolbar = app.document().find_by_id("toolbar").unwrap();
    let rect = toolbar.size_in_display().unwrap();
    assert_eq!((rect.width, rect.height), (1024.0, 40.0));
    assert!(matches!(
        app.commands()[0],
        DrawCommand::SetViewport { width, .. } if width == 1024.0
    ));
}

#[test]
fn reloading_the_document_keeps_muids_unique() {
    let mut app = new_app(CpuTimeline::immediate());
    let before: Vec<u64> = app.document().iter().map(|e| e.muid.0).collect();
    let errors = app.load_document("<ytml><panel id=a/><panel id=b></ytml>");
    assert_eq!(errors.len(), 1);
    let after: Vec<u64> = app.document().iter().map(|e| e.muid.0).collect();
    assert_eq!(after.len(), 3);
    let max_before = before.iter().copied().max().unwrap();
    assert!(after.iter().all(|id| *id > max_before));
}
