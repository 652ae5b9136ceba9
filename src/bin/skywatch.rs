use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};

use demoreel::config;
use demoreel::render::{Canvas, ColorMode, RenderMode};
use demoreel::scroll::font::{Font, draw_text};
use demoreel::sky::SkyAnimation;
use demoreel::weather::{self, WeatherSnapshot, provider};

#[derive(Parser)]
#[command(name = "skywatch", about = "Animated weather and clock kiosk for the terminal")]
struct Cli {
    /// Latitude of the displayed location
    #[arg(long)]
    lat: Option<f64>,

    /// Longitude of the displayed location
    #[arg(long)]
    lon: Option<f64>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Weather refresh period in seconds
    #[arg(long)]
    refresh: Option<u64>,

    /// Hide the text overlay, sky only
    #[arg(long)]
    clean: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let file_config = config::load_config();

    let latitude = cli.lat.or(file_config.latitude).unwrap_or(59.3293);
    let longitude = cli.lon.or(file_config.longitude).unwrap_or(18.0686);
    let render_mode = cli
        .render
        .or(file_config.render.map(RenderMode::from))
        .unwrap_or(RenderMode::HalfBlock);
    let color_mode = cli
        .color
        .or(file_config.color.map(ColorMode::from))
        .unwrap_or(ColorMode::TrueColor);
    let fps = cli.fps.or(file_config.fps).unwrap_or(30).clamp(1, 120);
    let refresh = Duration::from_secs(cli.refresh.or(file_config.refresh).unwrap_or(300).max(30));
    let frame_dur = Duration::from_secs_f64(1.0 / fps as f64);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(
        &mut writer,
        latitude,
        longitude,
        render_mode,
        color_mode,
        cli.clean,
        refresh,
        frame_dur,
    );

    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

#[allow(clippy::too_many_arguments)]
fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    latitude: f64,
    longitude: f64,
    initial_render: RenderMode,
    initial_color: ColorMode,
    initial_clean: bool,
    refresh: Duration,
    frame_dur: Duration,
) -> io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut render_mode = initial_render;
    let mut color_mode = initial_color;
    let mut hide_overlay = initial_clean;

    let mut canvas = Canvas::new(cols as usize, rows as usize, render_mode, color_mode);
    let mut sky = SkyAnimation::new(canvas.width, canvas.height);
    let mut font = Font::new((canvas.height / 80).max(1));

    let mut snapshot = WeatherSnapshot::default();
    let mut have_weather = false;
    // Fetch immediately on the first pass through the loop.
    let mut last_fetch: Option<Instant> = None;

    let mut last_frame = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        render_mode = match render_mode {
                            RenderMode::Braille => RenderMode::HalfBlock,
                            RenderMode::HalfBlock => RenderMode::Ascii,
                            RenderMode::Ascii => RenderMode::Braille,
                        };
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('c') => {
                        color_mode = match color_mode {
                            ColorMode::TrueColor => ColorMode::Ansi256,
                            ColorMode::Ansi256 => ColorMode::Ansi16,
                            ColorMode::Ansi16 => ColorMode::Mono,
                            ColorMode::Mono => ColorMode::TrueColor,
                        };
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('h') => hide_overlay = !hide_overlay,
                    _ => {}
                },
                _ => {}
            }
        }

        if rebuild_canvas && cols >= 10 && rows >= 5 {
            canvas = Canvas::new(cols as usize, rows as usize, render_mode, color_mode);
            sky.resize(canvas.width, canvas.height);
            font.set_scale((canvas.height / 80).max(1));
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        // Weather refresh on its own slow timer. The fetch is synchronous;
        // a stall here only delays the next refresh, and on failure the
        // previous snapshot stays on screen.
        if last_fetch.is_none_or(|at| at.elapsed() >= refresh) {
            last_fetch = Some(Instant::now());
            match provider::fetch(latitude, longitude) {
                Ok(snap) => {
                    snapshot = snap;
                    have_weather = true;
                }
                Err(_) => {
                    // Keep animating the previous (or default) sky; the
                    // overlay shows that no data has arrived yet.
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        sky.update(dt, &snapshot);
        sky.draw(&mut canvas);

        if !hide_overlay {
            draw_overlay(&mut canvas, &mut font, &snapshot, have_weather);
        }

        let frame = canvas.render();

        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;

        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

/// Clock, temperature and sun times over the animated sky.
fn draw_overlay(canvas: &mut Canvas, font: &mut Font, snapshot: &WeatherSnapshot, have_weather: bool) {
    let now = chrono::Local::now();
    let clock = now.format("%H:%M").to_string();

    // Big clock: double the overlay font scale.
    let base_scale = font.scale();
    font.set_scale(base_scale * 2);
    let clock_w = font.line_width(&clock);
    let x = (canvas.width as f64 - clock_w) / 2.0;
    let line = font.line_height() as f64;
    draw_text(canvas, font, &clock, x, line * 0.5, (255, 255, 255));
    font.set_scale(base_scale);

    if !have_weather {
        let text = "WAITING FOR WEATHER...";
        let w = font.line_width(text);
        draw_text(
            canvas,
            font,
            text,
            (canvas.width as f64 - w) / 2.0,
            line * 2.2,
            (220, 220, 230),
        );
        return;
    }

    let lines = [
        format!(
            "{:.0}C  {}",
            snapshot.temperature,
            snapshot.kind.description().to_ascii_uppercase()
        ),
        format!("WIND {:.0} KM/H", snapshot.windspeed),
        format!(
            "SUN {} - {}",
            weather::format_hours(snapshot.sunrise),
            weather::format_hours(snapshot.sunset)
        ),
    ];

    let mut y = line * 2.2;
    for text in &lines {
        let w = font.line_width(text);
        let x = (canvas.width as f64 - w) / 2.0;
        draw_text(canvas, font, text, x, y, (240, 240, 250));
        y += font.line_height() as f64 * 1.3;
    }
}
