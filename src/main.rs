use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use study_quiz::{
    db, logger, spawn_service_worker, App, AppConfig, AppError, HttpQuizService,
    LocalQuizService, QuizDataService,
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn build_service(config: &AppConfig) -> Result<Arc<dyn QuizDataService>, AppError> {
    match &config.service_url {
        Some(url) => Ok(Arc::new(HttpQuizService::new(
            url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?)),
        None => Ok(Arc::new(LocalQuizService::new(
            &config.quizzes_dir,
            &config.submissions_dir,
        ))),
    }
}

fn main() -> Result<(), AppError> {
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;
    if let Err(e) = logger::init(&config.log_file) {
        eprintln!("Could not open log file {}: {}", config.log_file.display(), e);
    }
    info!("Starting study-quiz");

    let db = match db::init_db(&config.db_path()) {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("History disabled, database unavailable: {}", e);
            None
        }
    };

    let service = build_service(&config)?;
    let service_label = service.describe();
    info!("Using {}", service_label);

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (response_tx, response_rx) = crossbeam_channel::unbounded();
    let worker = spawn_service_worker(service, response_tx, request_rx)?;

    let mut app = App::new(config, service_label, request_tx, db);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &response_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Closing the request channel stops the worker.
    drop(app);
    if worker.join().is_err() {
        error!("Service worker panicked");
    }

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    responses: &crossbeam_channel::Receiver<study_quiz::ServiceResponse>,
) -> Result<(), AppError> {
    while !app.should_quit() {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }

        while let Ok(response) = responses.try_recv() {
            app.handle_response(response);
        }
        app.on_tick();
    }
    info!("Exiting");
    Ok(())
}
