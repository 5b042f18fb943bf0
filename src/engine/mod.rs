//! Frame pipeline: the [`Engine`] context, band double-buffering and the
//! transfer links that carry finished bands to the display.

mod buffers;
mod config;
#[allow(clippy::module_inception)]
mod engine;
mod fps;
mod link;
pub mod transfer;

pub use buffers::DoubleBuffer;
pub use config::{ConfigError, EngineConfig, FpsOverlayConfig, PassesConfig, RenderPasses};
pub use engine::{Engine, FrameStats};
pub use fps::{FPS_WINDOW, FpsCounter};
pub use link::{BlockingLink, ThreadedLink};
pub use transfer::{
    Completion, CompletionSender, MAX_TRANSFER_BYTES, StartError, TransferEngine, TransferError,
    completion,
};
