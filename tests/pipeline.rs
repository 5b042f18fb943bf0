//! End-to-end: engine → bands → link → emulated panel.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use raycast3d_rs::{
    demo,
    display::{DisplaySink, DisplayWindow, Framebuffer},
    engine::{
        BlockingLink, Completion, CompletionSender, Engine, EngineConfig, StartError,
        ThreadedLink, TransferEngine, TransferError, completion,
    },
    renderer::{BAND_COUNT, PixelBuffer},
    world::{FULL_SCALE, Image, MAP_HEIGHT, MAP_WIDTH, TextureSet, Tiles, WallTexture},
};

/* tiny helpers ---------------------------------------------------*/

const WHITE: u16 = 0xFFFF;
const GREEN: u16 = 0x07E0;
const KEY: u16 = 0xF81F;

fn black_background() -> EngineConfig {
    EngineConfig {
        sky_color: 0,
        floor_color: 0,
        floor_gradient: 0.0,
        transfer_timeout_ms: 1_000,
        ..EngineConfig::default()
    }
}

fn bordered() -> Tiles {
    let mut t = [[0; MAP_WIDTH]; MAP_HEIGHT];
    for i in 0..MAP_WIDTH {
        t[0][i] = 1;
        t[MAP_HEIGHT - 1][i] = 1;
    }
    for row in t.iter_mut() {
        row[0] = 1;
        row[MAP_WIDTH - 1] = 1;
    }
    t
}

fn white_walls() -> TextureSet {
    TextureSet::from_textures([WallTexture::new("WHITE", 2, vec![WHITE; 4]).unwrap()]).unwrap()
}

fn blocking_engine() -> Engine<BlockingLink<Framebuffer>> {
    let mut e = Engine::new(&black_background(), BlockingLink::new(Framebuffer::default()));
    e.set_textures(white_walls());
    e
}

/// Lit pixels in screen column `x`.
fn column_height(fb: &Framebuffer, x: usize) -> usize {
    (0..128).filter(|&y| fb.pixel(x, y) != 0).count()
}

/* sinks ------------------------------------------------------------*/

#[derive(Default)]
struct WindowLog(Vec<DisplayWindow>);

impl DisplaySink for WindowLog {
    fn write_window(&mut self, window: DisplayWindow, _bytes: &[u8]) {
        self.0.push(window);
    }
}

/// Holds each buffer for a moment and checks nobody wrote into it meanwhile.
#[derive(Clone, Default)]
struct ScribbleCheck {
    log: Arc<Mutex<Vec<(usize, bool)>>>,
}

impl DisplaySink for ScribbleCheck {
    fn write_window(&mut self, _window: DisplayWindow, bytes: &[u8]) {
        let before = bytes.to_vec();
        thread::sleep(Duration::from_millis(1));
        let untouched = before == bytes;
        self.log
            .lock()
            .unwrap()
            .push((bytes.as_ptr() as usize, untouched));
    }
}

/// Delivers bands normally until stalled; a stalled transfer never finishes.
#[derive(Default)]
struct StallingLink {
    panel: Framebuffer,
    stalled: bool,
    held: Vec<(CompletionSender, PixelBuffer)>,
}

impl StallingLink {
    /// Unwedge the bus; whatever was stuck on it is lost.
    fn release(&mut self) {
        self.stalled = false;
        self.held.clear();
    }
}

impl TransferEngine for StallingLink {
    fn start(
        &mut self,
        window: DisplayWindow,
        buffer: PixelBuffer,
    ) -> Result<Completion, StartError> {
        if !self.held.is_empty() {
            return Err(StartError::Busy(buffer));
        }
        if self.stalled {
            let (done, c) = completion();
            self.held.push((done, buffer));
            return Ok(c);
        }
        self.panel.write_window(window, buffer.as_bytes());
        Ok(Completion::ready(buffer))
    }

    fn is_busy(&self) -> bool {
        !self.held.is_empty()
    }
}

/* tests ------------------------------------------------------------*/

#[test]
fn bands_go_out_left_to_right_every_frame() {
    let mut e = Engine::new(&black_background(), BlockingLink::new(WindowLog::default()));
    for _ in 0..3 {
        e.render_frame().unwrap();
    }
    let expected: Vec<_> = (0..3)
        .flat_map(|_| (0..BAND_COUNT).map(DisplayWindow::for_band))
        .collect();
    assert_eq!(e.link().sink().0, expected);
}

#[test]
fn in_flight_buffer_is_never_drawn_into() {
    let check = ScribbleCheck::default();
    let link = ThreadedLink::spawn(check.clone()).unwrap();
    let mut e = Engine::new(&black_background(), link);
    demo::populate(&mut e).unwrap();

    for _ in 0..5 {
        e.camera_mut().rotate(10.0);
        e.render_frame().unwrap();
    }
    e.flush().unwrap();

    let log = check.log.lock().unwrap();
    assert_eq!(log.len(), 5 * BAND_COUNT);
    assert!(log.iter().all(|&(_, untouched)| untouched));
    // consecutive bands always travel in different buffers
    assert!(log.windows(2).all(|w| w[0].0 != w[1].0));
}

#[test]
fn threaded_link_matches_blocking_link() {
    let shared = Framebuffer::shared();
    let mut threaded = Engine::new(
        &black_background(),
        ThreadedLink::with_throughput(shared.clone(), Some(2_000_000)).unwrap(),
    );
    let mut blocking = Engine::new(&black_background(), BlockingLink::new(Framebuffer::default()));
    demo::populate(&mut threaded).unwrap();
    demo::populate(&mut blocking).unwrap();

    spin(&mut threaded, 33.0);
    spin(&mut blocking, 33.0);
    threaded.flush().unwrap();

    assert_eq!(*shared.lock().unwrap(), *blocking.link().sink());
}

fn spin<L: TransferEngine>(e: &mut Engine<L>, degrees: f32) {
    e.camera_mut().rotate(degrees);
    e.render_frame().unwrap();
}

#[test]
fn nearer_wall_draws_taller() {
    let mut e = blocking_engine();
    e.map_mut().load(&bordered());

    e.camera_mut().set_position(12.0, 12.0);
    e.camera_mut().set_direction(0.0, -1.0);
    e.render_frame().unwrap();
    let far = column_height(e.link().sink(), 80);

    e.camera_mut().set_position(12.0, 2.0);
    e.render_frame().unwrap();
    let near = column_height(e.link().sink(), 80);

    assert!(far > 0);
    assert!(far < near, "far {far} near {near}");
    assert_eq!(near, 128);
}

#[test]
fn walls_hide_sprites_behind_them() {
    let mut tiles = bordered();
    for x in 1..MAP_WIDTH - 1 {
        tiles[6][x] = 1;
    }
    let sprite = Image::new(vec![GREEN; 16], 4, 4).unwrap();

    let mut e = blocking_engine();
    e.map_mut().load(&tiles);
    e.camera_mut().set_position(12.5, 12.5);
    e.camera_mut().set_direction(0.0, -1.0);

    // behind the wall row
    let id = e
        .sprites_mut()
        .add(12.5, 4.5, sprite, FULL_SCALE, KEY)
        .unwrap();
    e.render_frame().unwrap();
    assert_eq!(e.link().sink().pixel(80, 64), 0x7BEF);

    // in front of it
    assert!(e.sprites_mut().move_to(id, 12.5, 9.5));
    e.render_frame().unwrap();
    assert_eq!(e.link().sink().pixel(80, 64), GREEN);

    // gone
    assert!(e.sprites_mut().remove(id));
    e.render_frame().unwrap();
    assert_eq!(e.link().sink().pixel(80, 64), 0x7BEF);
}

#[test]
fn open_map_renders_without_walls() {
    let mut e = blocking_engine();
    e.camera_mut().set_position(12.3, 12.7);
    for _ in 0..8 {
        e.camera_mut().rotate(45.0);
        let stats = e.render_frame().unwrap();
        assert_eq!(stats.wall_columns, 0);
    }
    assert!(e.link().sink().pixels().iter().all(|&p| p == 0));
}

#[test]
fn demo_level_is_closed() {
    let mut e = blocking_engine();
    demo::populate(&mut e).unwrap();
    for _ in 0..36 {
        e.camera_mut().rotate(10.0);
        assert_eq!(e.render_frame().unwrap().wall_columns, 160);
    }
}

#[test]
fn stalled_link_fails_the_frame_and_recovers() {
    let config = EngineConfig {
        transfer_timeout_ms: 20,
        ..black_background()
    };
    let mut e = Engine::new(&config, StallingLink::default());
    e.link_mut().stalled = true;

    assert!(e.queue_text(0, 0, "HI", WHITE));
    let err = e.render_frame().unwrap_err();
    assert!(matches!(err, TransferError::Timeout { band: 0, .. }), "{err}");

    // still wedged: the next frame is refused rather than hanging
    let err = e.render_frame().unwrap_err();
    assert!(matches!(err, TransferError::Busy { band: 0, .. }), "{err}");

    e.link_mut().release();
    let stats = e.render_frame().unwrap();
    assert_eq!(stats.frame, 3);

    let panel = &e.link().panel;
    assert_eq!(panel.writes(), BAND_COUNT as u64);
    // the text was queued for the failed frame only
    assert!(panel.pixels().iter().all(|&p| p == 0));
}
