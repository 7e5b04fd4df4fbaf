/// Terminal host for the spinning cube
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use spincube_core::{
    RenderLoop, SceneConfig, SceneError, SurfaceError, Texture, TextureError, TickStatus,
};
use std::io::{self, stdout, Stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod renderer;

pub use renderer::HalfBlockSurface;

/// Rows kept free above the picture for the status line
const STATUS_ROWS: u16 = 1;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Read and decode a texture from the filesystem
pub fn load_texture(path: &str) -> Result<Texture, TextureError> {
    let bytes =
        std::fs::read(Path::new(path)).map_err(|err| TextureError::unavailable(path, err))?;
    Texture::decode(&bytes)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    render_loop: RenderLoop,
    surface: HalfBlockSurface<Stdout>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &SceneConfig) -> Result<Self, TerminalError> {
        let (columns, rows) = terminal::size()?;
        let (width, height) = renderer::frame_size(columns, rows, STATUS_ROWS);

        let texture = load_texture(&config.cube.texture);
        let render_loop = RenderLoop::with_texture(config, width, height, texture)?;

        Ok(Self {
            render_loop,
            surface: HalfBlockSurface::new(stdout(), STATUS_ROWS),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<(), TerminalError> {
        terminal::enable_raw_mode()?;
        undo_on_error(
            execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide),
            terminal::disable_raw_mode,
        )?;

        self.render_loop.start();
        let result = self.main_loop();
        self.render_loop.stop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<(), TerminalError> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }
            if !self.running {
                break;
            }

            match self.render_loop.tick(&mut self.surface)? {
                TickStatus::Continue => self.draw_status()?,
                TickStatus::Halt => break,
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code, modifiers, ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.running = false
                }
                _ => {}
            },
            Event::Resize(columns, rows) => {
                let (width, height) = renderer::frame_size(columns, rows, STATUS_ROWS);
                self.render_loop.resize(width, height);
                execute!(stdout(), terminal::Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn draw_status(&mut self) -> io::Result<()> {
        let rotation = self.render_loop.rotation();
        let texture = if self.render_loop.scene().has_texture() {
            self.render_loop.scene().texture_source().to_string()
        } else {
            "none".to_string()
        };

        let out = self.surface.writer_mut();
        queue!(
            out,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "spincube | FPS: {:.1} | rotation x {:.2} y {:.2} | texture: {} | Q=Quit",
                self.fps, rotation.x, rotation.y, texture
            )),
            ResetColor
        )?;
        out.flush()
    }
}

/// Run `undo` when `result` failed, keeping the original error
fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if result.is_err() {
        if let Err(err) = undo() {
            log::warn!("terminal restore failed: {}", err);
        }
    }
    result
}
