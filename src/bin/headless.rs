//! Runs the frame loop without a window. A worker thread stands in for the
//! GPU: it retires each submitted frame after a short delay, so the CPU side
//! really does block on frame resources when it runs ahead.
//!
//! Usage: `ytml-headless [config.json] [frame-count]`

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use ytml::ui::ViewportSize;
use ytml::view::CpuTimeline;
use ytml::{App, Config, FrameTime, PointerButton};

const MARKUP: &str = r#"
<ytml>
  <panel id=toolbar class=bar height=48>
    <button id=grass class=tool left=8 top=8 width=96 height=32/>
    <button id=water class=tool left=112 top=8 width=96 height=32/>
    <label id=status left=220 top=14 width=240 height=20/>
  </panel>
  <panel id=palette class=side width=120 top=56 height=50%/>
</ytml>
"#;

const STYLESHEET: &str = r#"
.bar { background-color: rgba(20, 20, 24, 0.85); border-width: 0 0 1 0; border-color: #555 }
.tool { background-color: #3a3f4b; border-width: 1; border-color: #8899aa }
#status { background-color: transparent }
.side { background-color: #2b2b30; border-width: 2; border-color: #111 }
"#;

const GPU_FRAME_TIME: Duration = Duration::from_millis(4);

fn main() -> ExitCode {
    #[cfg(feature = "logging")]
    let _ = env_logger::try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("ytml-headless: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let frame_count: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 120,
    };

    let timeline = CpuTimeline::new();
    let completer = timeline.completer();
    let running = Arc::new(AtomicBool::new(true));
    let gpu = {
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("ytml-gpu".into())
            .spawn(move || {
                let mut retired = 0;
                while running.load(Ordering::Acquire) || completer.pending() > 0 {
                    let Some(signalled) =
                        completer.wait_for_signal(retired, Duration::from_millis(50))
                    else {
                        continue;
                    };
                    for value in retired + 1..=signalled {
                        thread::sleep(GPU_FRAME_TIME);
                        completer.complete(value);
                    }
                    retired = signalled;
                }
            })?
    };

    let viewport = ViewportSize::new(1280.0, 720.0);
    let (mut app, diagnostics) = App::new(config, MARKUP, STYLESHEET, viewport, Box::new(timeline))?;
    for error in &diagnostics.markup {
        log::warn!("markup: {error}");
    }

    // Sweep the pointer across the map with the left button held, switching
    // brush channel halfway through.
    app.set_button(PointerButton::Left, true);
    app.key_down('w');
    let started = Instant::now();
    let mut last = started;
    let mut painted = 0usize;
    let mut waits = 0u64;
    for frame in 0..frame_count {
        if frame == frame_count / 2 {
            app.key_up('w');
            app.key_down('2');
        }
        let t = frame as f32 / frame_count.max(1) as f32;
        app.pointer_moved(320.0 + 640.0 * t, 200.0 + 320.0 * t);

        let now = Instant::now();
        let time = FrameTime::new(
            now.duration_since(started).as_secs_f32(),
            now.duration_since(last).as_secs_f32(),
        );
        last = now;

        app.update(time)?;
        let report = app.draw()?;
        painted += report.brush_touched;
        waits += report.waited_for_gpu as u64;
        log::debug!("{report:?}");
    }
    app.shutdown()?;

    running.store(false, Ordering::Release);
    if gpu.join().is_err() {
        return Err("gpu thread panicked".into());
    }

    println!(
        "frames={frame_count} fence={} gpu_waits={waits} painted_vertices={painted} elapsed={:.2?}",
        app.frame_resources().current_fence(),
        started.elapsed()
    );
    Ok(())
}
