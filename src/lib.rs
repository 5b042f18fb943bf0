//! Fixed-point raycasting engine for small SPI panels.
//!
//! The frame is split into vertical bands; each band is rendered into one of
//! two buffers while the other is on its way to the display.  All world and
//! rendering math is Q16.16 fixed point.
//!
//! ```no_run
//! use raycast3d_rs::{demo, display::Framebuffer, engine::{BlockingLink, Engine, EngineConfig}};
//!
//! let mut engine = Engine::new(&EngineConfig::default(), BlockingLink::new(Framebuffer::default()));
//! demo::populate(&mut engine)?;
//! engine.camera_mut().rotate(15.0);
//! engine.queue_text(2, 2, "hello", 0xFFFF);
//! engine.render_frame()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod demo;
pub mod display;
pub mod engine;
pub mod math;
pub mod renderer;
pub mod world;
