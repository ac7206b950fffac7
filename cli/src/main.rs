use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use linestream_tui::{default_config_path, load_config, App, EventHandler};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

fn main() -> Result<()> {
    init_logging()?;

    // Optional config path as the only argument
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new(config)?;
    let event_handler = EventHandler::new(app.config.tick_rate_ms);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("session started");

    // Main loop
    let result = run_app(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print result
    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    info!("session ended");
    Ok(())
}

/// Log to `<data dir>/linestream/linestream.log`; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("linestream");
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("linestream.log"))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| linestream_tui::ui::render(f, app))?;

        // Handle events
        match event_handler.next()? {
            linestream_tui::Event::Key(key) => {
                linestream_tui::event::handle_key_event(key, app);
            }
            linestream_tui::Event::Mouse(mouse) => {
                linestream_tui::event::handle_mouse_event(mouse, app);
            }
            linestream_tui::Event::Resize | linestream_tui::Event::Tick => {}
        }

        // Advance the focus timer
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
