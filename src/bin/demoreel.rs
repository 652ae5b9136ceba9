use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};

use demoreel::config;
use demoreel::demo::{DemoOptions, DemoPlayer};
use demoreel::render::{Canvas, ColorMode, RenderMode};
use demoreel::scenes;
use demoreel::scroll::ScrollStyle;

/// Scroll text shown when no --text file is given.
const DEFAULT_SCROLL_TEXT: &str = "    DEMOREEL    *** GREETINGS TO THE DEMOSCENE ***    \
    {STYLE:roller}PURE TERMINAL PIXELS, NO GPU REQUIRED!{STYLE:wave}    \
    {COLOR:255,220,80}PRESS N FOR THE NEXT SCENE{COLOR:0,0,0}{PAUSE:1.5}    \
    {SKIP:0.5}WRAPPING AROUND NOW...    ";

#[derive(Parser)]
#[command(name = "demoreel", about = "Terminal demoscene effects player")]
struct Cli {
    /// Scenes to rotate through, in order (use --list to see all)
    scenes: Vec<String>,

    /// Seconds per scene before the cross-fade
    #[arg(short, long)]
    duration: Option<f64>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Scroll text file (control codes: {PAUSE:s} {SPEED:px} {STYLE:name} {COLOR:r,g,b} {SKIP:screens})
    #[arg(short, long)]
    text: Option<std::path::PathBuf>,

    /// Scroll render style
    #[arg(long, value_enum)]
    scroll_style: Option<ScrollStyle>,

    /// Scroll speed in canvas px/s
    #[arg(long)]
    scroll_speed: Option<f64>,

    /// Roller effect preset: 0 plain, 1 outline, 2 +shadow, 3 +glow
    #[arg(short = 'p', long)]
    preset: Option<u8>,

    /// List available scenes and exit
    #[arg(short, long)]
    list: bool,

    /// Print the default config file and exit
    #[arg(long)]
    print_config: bool,

    /// Hide the status bar for pure animation mode
    #[arg(long)]
    clean: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let file_config = config::load_config();

    if cli.list {
        println!("Available scenes:");
        for &(name, desc) in scenes::SCENES {
            println!("  {:<12} {}", name, desc);
        }
        println!("\nRender modes: braille, half-block, ascii");
        println!("Color modes: mono, ansi16, ansi256, true-color");
        return Ok(());
    }

    if cli.print_config {
        print!("{}", config::default_config_string());
        return Ok(());
    }

    let scene_names = if !cli.scenes.is_empty() {
        cli.scenes.clone()
    } else if let Some(scenes) = file_config.scenes.clone() {
        scenes
    } else {
        scenes::SCENE_NAMES.iter().map(|s| s.to_string()).collect()
    };

    let scroll_text = match cli.text.as_ref().or(file_config.text.as_ref()) {
        Some(path) => std::fs::read_to_string(path)?.replace('\n', " "),
        None => DEFAULT_SCROLL_TEXT.to_string(),
    };

    let opts = DemoOptions {
        scene_names,
        scene_duration: cli.duration.or(file_config.duration).unwrap_or(10.0),
        scroll_text,
        scroll_style: cli
            .scroll_style
            .or(file_config.scroll_style)
            .unwrap_or(ScrollStyle::Wave),
        scroll_speed: cli.scroll_speed.or(file_config.scroll_speed).unwrap_or(40.0),
        roller_preset: cli.preset.or(file_config.roller_preset).unwrap_or(1),
    };

    let render_mode = cli
        .render
        .or(file_config.render.map(RenderMode::from))
        .unwrap_or(RenderMode::HalfBlock);
    let color_mode = cli
        .color
        .or(file_config.color.map(ColorMode::from))
        .unwrap_or(ColorMode::TrueColor);
    let fps = cli.fps.or(file_config.fps).unwrap_or(30).clamp(1, 120);
    let hide_status = cli.clean || file_config.clean.unwrap_or(false);
    let frame_dur = Duration::from_secs_f64(1.0 / fps as f64);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(
        &mut writer,
        &opts,
        render_mode,
        color_mode,
        hide_status,
        frame_dur,
    );

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    if let Err(ref e) = result
        && e.kind() == io::ErrorKind::InvalidInput
    {
        eprintln!("{}", e);
    }
    result
}

const RENDER_MODES: [RenderMode; 3] = [RenderMode::Braille, RenderMode::HalfBlock, RenderMode::Ascii];
const COLOR_MODES: [ColorMode; 4] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16, ColorMode::Mono];

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    opts: &DemoOptions,
    initial_render: RenderMode,
    initial_color: ColorMode,
    initial_hide: bool,
    frame_dur: Duration,
) -> io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut render_mode = initial_render;
    let mut color_mode = initial_color;
    let mut hide_status = initial_hide;

    let display_rows = |rows: u16, hide: bool| -> usize {
        if hide {
            rows as usize
        } else {
            (rows as usize).saturating_sub(1)
        }
    };

    let mut canvas = Canvas::new(
        cols as usize,
        display_rows(rows, hide_status),
        render_mode,
        color_mode,
    );
    let mut player = DemoPlayer::new(opts, canvas.width, canvas.height)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        // Handle input (non-blocking)
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
                    KeyCode::Right | KeyCode::Char('n') => player.next_scene(),
                    KeyCode::Left | KeyCode::Char('p') => player.prev_scene(),
                    KeyCode::Char('r') => {
                        let idx = RENDER_MODES.iter().position(|&m| m == render_mode).unwrap_or(0);
                        render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('c') => {
                        let idx = COLOR_MODES.iter().position(|&m| m == color_mode).unwrap_or(0);
                        color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            canvas = Canvas::new(
                cols as usize,
                display_rows(rows, hide_status),
                render_mode,
                color_mode,
            );
            player.resize(&opts.scroll_text, canvas.width, canvas.height);
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        // Timing
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        // Update & render
        player.tick(&mut canvas, dt);
        let frame = canvas.render();

        // Skip the frame if the terminal changed size under us
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

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let status = format!(
                " {} | {:?} | {:?} | {:.0} fps | [←/→] scene  [r] render  [c] color  [h] hide  [q] quit ",
                player.scene_name(),
                render_mode,
                color_mode,
                actual_fps,
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
