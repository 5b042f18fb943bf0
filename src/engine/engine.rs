use log::{debug, warn};

use crate::{
    engine::{
        buffers::DoubleBuffer,
        config::{EngineConfig, FpsOverlayConfig, RenderPasses},
        fps::FpsCounter,
        transfer::{TransferEngine, TransferError},
    },
    renderer::{
        BAND_COUNT, Background, Band, FgSprite, OverlayQueue, Rgb565, Software, TextEntry,
    },
    world::{Camera, Image, SpriteTable, TextureSet, TileMap},
};

/// What one call to [`Engine::render_frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 1-based frame counter.
    pub frame: u64,
    /// Screen columns whose ray hit a wall.
    pub wall_columns: usize,
    /// (sprite, band) pairs that put pixels on screen.
    pub sprite_slices: usize,
    pub fps: u32,
}

/// The whole renderer: world state, the band pipeline and the link it
/// feeds.
///
/// A frame is rendered as [`BAND_COUNT`] vertical bands.  Each band is
/// cleared to the background, gets walls, sprites and overlays, and is handed
/// to the link while the next band is drawn into the other buffer.
pub struct Engine<L: TransferEngine> {
    link: L,
    buffers: DoubleBuffer,
    renderer: Software,
    overlays: OverlayQueue,

    camera: Camera,
    map: TileMap,
    textures: TextureSet,
    sprites: SpriteTable,

    fps: FpsCounter,
    fps_overlay: Option<FpsOverlayConfig>,
    passes: RenderPasses,
    frames: u64,
}

impl<L: TransferEngine> Engine<L> {
    pub fn new(config: &EngineConfig, link: L) -> Self {
        debug!("engine init: {config:?}");
        let background = Background::new(
            config.sky_color,
            config.floor_color,
            config.floor_gradient,
        );
        Self {
            link,
            buffers: DoubleBuffer::new(config.transfer_timeout()),
            renderer: Software::new(background),
            overlays: OverlayQueue::default(),
            camera: Camera::default(),
            map: TileMap::default(),
            textures: TextureSet::default(),
            sprites: SpriteTable::default(),
            fps: FpsCounter::default(),
            fps_overlay: config.fps,
            passes: config.render_passes(),
            frames: 0,
        }
    }

    /*──────────────────────── frame ─────────────────────────────────*/

    /// Render and ship one frame.
    ///
    /// A transport failure stops the frame at the failing band; the buffers
    /// are already recovered, so the next call starts clean.  The overlay
    /// queues are emptied either way.
    pub fn render_frame(&mut self) -> Result<FrameStats, TransferError> {
        self.fps.tick();
        self.frames += 1;

        let mut stats = FrameStats {
            frame: self.frames,
            fps: self.fps.fps(),
            ..FrameStats::default()
        };
        let fps_text = self
            .fps_overlay
            .map(|o| TextEntry::new(o.x, o.y, &format!("FPS: {}", stats.fps), o.color));

        self.renderer.begin_frame();
        let result = self.render_bands(&mut stats, fps_text.as_ref());
        self.overlays.clear();

        if let Err(e) = &result {
            warn!("frame {}: {e}", self.frames);
        }
        result.map(|()| stats)
    }

    fn render_bands(
        &mut self,
        stats: &mut FrameStats,
        fps_text: Option<&TextEntry>,
    ) -> Result<(), TransferError> {
        for band in 0..BAND_COUNT {
            let mut target = Band::new(band, self.buffers.front_mut());
            self.renderer.clear_band(&mut target);

            if self.passes.contains(RenderPasses::WALLS) {
                stats.wall_columns +=
                    self.renderer
                        .draw_walls(&mut target, &self.camera, &self.map, &self.textures);
            }
            if self.passes.contains(RenderPasses::SPRITES) {
                stats.sprite_slices +=
                    self.renderer
                        .draw_sprites(&mut target, &self.camera, &self.sprites);
            }
            if self.passes.contains(RenderPasses::OVERLAYS) {
                self.overlays.draw(&mut target);
                if let Some(text) = fps_text {
                    text.draw(&mut target);
                }
            }

            self.buffers.present(band, &mut self.link)?;
        }
        Ok(())
    }

    /// Wait for the last band of the previous frame to land.
    pub fn flush(&mut self) -> Result<(), TransferError> {
        self.buffers.flush()
    }

    /*──────────────────────── world access ──────────────────────────*/

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn set_textures(&mut self, textures: TextureSet) {
        debug!("texture set replaced ({} textures)", textures.len());
        self.textures = textures;
    }

    pub fn sprites(&self) -> &SpriteTable {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteTable {
        &mut self.sprites
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn renderer(&self) -> &Software {
        &self.renderer
    }

    /*──────────────────────── overlays ──────────────────────────────*/

    /// Queue a line of text for the next frame only.
    ///
    /// Returns `false` (and draws nothing) once the queue is full.
    pub fn queue_text(&mut self, x: i32, y: i32, text: &str, color: Rgb565) -> bool {
        let queued = self.overlays.push_text(TextEntry::new(x, y, text, color));
        if !queued {
            warn!("text overlay queue full, dropping {text:?}");
        }
        queued
    }

    /// Queue a screen-space image for the next frame only, bottom-centre at
    /// `(x, y)`.
    pub fn queue_foreground_sprite(
        &mut self,
        image: Image,
        x: i32,
        y: i32,
        scale: u8,
        transparent: Rgb565,
    ) -> bool {
        let queued = self.overlays.push_sprite(FgSprite {
            image,
            x,
            y,
            scale,
            transparent,
        });
        if !queued {
            warn!("foreground sprite queue full");
        }
        queued
    }

    /*──────────────────────── settings ──────────────────────────────*/

    pub fn set_sky_color(&mut self, color: Rgb565) {
        debug!("sky colour {color:#06x}");
        self.renderer.background_mut().set_sky(color);
    }

    pub fn set_floor_color(&mut self, color: Rgb565) {
        debug!("floor colour {color:#06x}");
        self.renderer.background_mut().set_floor(color);
    }

    /// `0.0` flat .. `1.0` black at the horizon; clamped.
    pub fn set_floor_gradient(&mut self, gradient: f32) {
        debug!("floor gradient {gradient}");
        self.renderer.background_mut().set_gradient(gradient);
    }

    pub fn display_fps(&mut self, x: i32, y: i32, color: Rgb565) {
        self.fps_overlay = Some(FpsOverlayConfig { x, y, color });
    }

    pub fn disable_fps(&mut self) {
        self.fps_overlay = None;
    }

    pub fn passes(&self) -> RenderPasses {
        self.passes
    }

    pub fn set_passes(&mut self, passes: RenderPasses) {
        self.passes = passes;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
