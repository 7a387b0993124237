//! Timing TestKit - psychophysical timing tests in the terminal

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs,
    io::{stdout, Stdout},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
};

use timing_testkit::{
    config::Config,
    input::{HoldListener, HoldMode, InputEvent},
    store::ResultStore,
    timing::SystemClock,
    ui::{self, App, AppState, AppView},
};

const LOG_FILE: &str = "timing-testkit.log";

/// Log to a file next to the data; the terminal belongs to the UI
fn init_logging(data_dir: &Path) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {} - using default configuration", e);
            Config::default()
        }
    };

    let data_dir = config
        .storage
        .resolved_data_dir()
        .context("Could not determine data directory")?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Could not create {}", data_dir.display()))?;
    init_logging(&data_dir);
    log::info!("Timing TestKit {} starting", env!("CARGO_PKG_VERSION"));

    let store = ResultStore::open(&data_dir).context("Could not open result store")?;

    let quit_flag = Arc::new(AtomicBool::new(false));
    {
        let flag = quit_flag.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            log::warn!("Could not install signal handler: {}", e);
        }
    }

    // Hold gesture source: global key state, then terminal release events,
    // then toggle presses
    let (event_tx, event_rx) = mpsc::channel::<InputEvent>();
    let mut listener = HoldListener::try_new(config.ui.hold_key, event_tx);
    let enhanced = listener.is_none() && matches!(supports_keyboard_enhancement(), Ok(true));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store, Box::new(SystemClock));
    app.hold_mode = if listener.is_some() {
        HoldMode::DeviceQuery
    } else if enhanced {
        HoldMode::Enhanced
    } else {
        HoldMode::Toggle
    };
    log::info!("Hold input: {}", app.hold_mode.describe());
    app.set_status(format!("Hold input: {}", app.hold_mode.describe()));

    let result = run(
        &mut terminal,
        &mut app,
        listener.as_mut(),
        &event_rx,
        &quit_flag,
    );

    // Cleanup terminal
    if enhanced {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("Exited with error: {:#}", e);
    }
    result?;

    log::info!("Timing TestKit exiting");
    println!("\nTiming TestKit session complete.");
    println!("Results are stored in {}", data_dir.display());

    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut listener: Option<&mut HoldListener>,
    event_rx: &mpsc::Receiver<InputEvent>,
    quit_flag: &AtomicBool,
) -> Result<()> {
    let tick_rate = app.config.refresh_interval();

    loop {
        // Key state is only meaningful while the active test is shown
        if app.view == AppView::Active {
            if let Some(listener) = listener.as_deref_mut() {
                listener.poll(app.now_ms());
            }
        }
        while let Ok(input) = event_rx.try_recv() {
            app.process_input(input);
        }

        app.tick();
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle terminal events
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if quit_flag.load(Ordering::SeqCst) {
            app.quit();
        }
        if app.state == AppState::Quitting {
            break;
        }
    }

    Ok(())
}
