//! Desktop viewer: runs the engine against an emulated panel.
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- --scale 4
//! cargo run --release -- --frames 600 --blocking    # headless benchmark
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use clap::Parser;
use glam::{Vec2, vec2};
use log::{info, warn};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use raycast3d_rs::{
    demo,
    display::{Framebuffer, SharedFramebuffer},
    engine::{BlockingLink, Engine, EngineConfig, TransferEngine, ThreadedLink},
    renderer::{SCREEN_HEIGHT, SCREEN_WIDTH, to_rgb888},
    world::TileMap,
};

const MOVE_SPEED: f32 = 3.0; // map units / s
const TURN_SPEED: f32 = 120.0; // degrees / s
const BODY_RADIUS: f32 = 0.2;

#[derive(Parser, Debug)]
#[command(name = "viewer", about = "Fixed-point raycaster on an emulated 160x128 panel")]
struct Opts {
    /// TOML engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window magnification: 1, 2, 4 or 8.
    #[arg(long, default_value_t = 4)]
    scale: u8,

    /// Write bands synchronously instead of on the link thread.
    #[arg(long)]
    blocking: bool,

    /// Emulated bus speed in bytes per second (threaded link only).
    #[arg(long)]
    bus_rate: Option<u32>,

    /// Render this many frames without a window, then exit.
    #[arg(long)]
    frames: Option<u64>,
}

type DynEngine = Engine<Box<dyn TransferEngine>>;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let fb = Framebuffer::shared();
    let link: Box<dyn TransferEngine> = if opts.blocking {
        Box::new(BlockingLink::new(fb.clone()))
    } else {
        Box::new(ThreadedLink::with_throughput(fb.clone(), opts.bus_rate)?)
    };

    let mut engine = Engine::new(&config, link);
    demo::populate(&mut engine)?;

    match opts.frames {
        Some(n) => headless(&mut engine, n),
        None => interactive(&mut engine, &fb, opts.scale),
    }
}

/// Spin in place for `frames` frames and report the average frame time.
fn headless(engine: &mut DynEngine, frames: u64) -> anyhow::Result<()> {
    let step = 360.0 / frames.max(1) as f32;
    let t0 = Instant::now();
    let mut failed = 0u64;
    for _ in 0..frames {
        engine.camera_mut().rotate(step);
        if let Err(e) = engine.render_frame() {
            warn!("{e}");
            failed += 1;
        }
    }
    engine.flush()?;

    let avg_ms = t0.elapsed().as_secs_f64() * 1000.0 / frames.max(1) as f64;
    info!("{frames} frames, {failed} failed, avg {avg_ms:.3} ms");
    println!("avg frame: {:.3} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
    Ok(())
}

fn interactive(engine: &mut DynEngine, fb: &SharedFramebuffer, scale: u8) -> anyhow::Result<()> {
    let scale = match scale {
        1 => Scale::X1,
        2 => Scale::X2,
        8 => Scale::X8,
        _ => Scale::X4,
    };
    let mut win = Window::new(
        "raycast3d",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            scale,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(60);

    let mut rgb = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let mut show_fps = false;
    let mut last = Instant::now();

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last.elapsed().as_secs_f32().min(0.1);
        last = Instant::now();

        /* input ------------------------------------------------------------ */
        let mut forward = 0.0;
        let mut strafe = 0.0;
        let mut turn = 0.0;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            forward += 1.0;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            forward -= 1.0;
        }
        if win.is_key_down(Key::A) {
            strafe -= 1.0;
        }
        if win.is_key_down(Key::D) {
            strafe += 1.0;
        }
        if win.is_key_down(Key::Left) {
            turn -= 1.0;
        }
        if win.is_key_down(Key::Right) {
            turn += 1.0;
        }
        if win.is_key_pressed(Key::F, KeyRepeat::No) {
            show_fps = !show_fps;
            if show_fps {
                engine.display_fps(2, 2, 0xFFE0);
            } else {
                engine.disable_fps();
            }
        }

        if turn != 0.0 {
            engine.camera_mut().rotate(turn * TURN_SPEED * dt);
        }
        if forward != 0.0 || strafe != 0.0 {
            walk(engine, forward * MOVE_SPEED * dt, strafe * MOVE_SPEED * dt);
        }

        /* draw -------------------------------------------------------------- */
        let t0 = Instant::now();
        engine.queue_foreground_sprite(demo::WEAPON.clone(), 80, 128, 3, demo::KEY);
        if let Err(e) = engine.render_frame() {
            warn!("{e}");
        }
        acc_time += t0.elapsed();
        acc_frames += 1;

        {
            let panel = fb.lock().map_err(|_| anyhow!("framebuffer lock poisoned"))?;
            for (dst, &src) in rgb.iter_mut().zip(panel.pixels()) {
                *dst = to_rgb888(src);
            }
        }
        win.update_with_buffer(&rgb, SCREEN_WIDTH, SCREEN_HEIGHT)?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }

    engine.flush()?;
    Ok(())
}

/// Move with wall sliding: each axis is accepted separately if the body
/// edge in that direction stays on open floor.
fn walk(engine: &mut DynEngine, forward: f32, strafe: f32) {
    let cam = engine.camera();
    let from = cam.position();
    let to = cam.peek_move(forward, strafe);
    let pos = slide(engine.map(), from, to);
    engine.camera_mut().set_position(pos.x, pos.y);
}

fn slide(map: &TileMap, from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let mut pos = from;
    let probe_x = to.x + BODY_RADIUS * delta.x.signum();
    if map.is_open(vec2(probe_x, pos.y)) {
        pos.x = to.x;
    }
    let probe_y = to.y + BODY_RADIUS * delta.y.signum();
    if map.is_open(vec2(pos.x, probe_y)) {
        pos.y = to.y;
    }
    pos
}
