use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};
use typesprint::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::init_logging,
    passage::PassagePool,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    store::{MemoryResultStore, ResultStore, SqliteResultStore},
};

/// thirty second typing speed test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A thirty second typing test in the terminal. Type the passage as fast and as accurately as you can; net wpm, raw wpm and accuracy are saved when the time runs out."
)]
pub struct Cli {
    /// custom passage to type instead of the built-in ones
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// json file with the passages to pick from
    #[clap(long)]
    passages: Option<PathBuf>,

    /// database file the latest result is written to
    #[clap(long)]
    results_db: Option<PathBuf>,

    /// print the latest saved result and exit
    #[clap(long)]
    last: bool,

    /// remember --passages, --results-db and --log-level in the config file
    #[clap(long)]
    save_config: bool,

    /// log filter, e.g. "debug" (RUST_LOG takes precedence)
    #[clap(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Overlay command line settings on the loaded config
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref passages) = self.passages {
            config.passages_file = Some(passages.clone());
        }
        if let Some(ref results_db) = self.results_db {
            config.results_db = Some(results_db.clone());
        }
        if let Some(ref log_level) = self.log_level {
            config.log_level = log_level.clone();
        }
    }

    fn passage_pool(&self, config: &Config) -> typesprint::Result<PassagePool> {
        if let Some(ref prompt) = self.prompt {
            return PassagePool::single(prompt.as_str());
        }
        match config.passages_file {
            Some(ref path) => PassagePool::from_file(path),
            None => PassagePool::builtin(),
        }
    }
}

fn open_store(config: &Config) -> Box<dyn ResultStore> {
    let opened = match config.results_db {
        Some(ref path) => SqliteResultStore::open(path),
        None => SqliteResultStore::open_default(),
    };

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "results database unavailable, keeping results in memory");
            Box::new(MemoryResultStore::default())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    if cli.save_config {
        config_store.save(&config)?;
    }

    init_logging(&config.log_level, AppDirs::log_path().as_deref());

    let store = open_store(&config);

    if cli.last {
        match store.latest()? {
            Some(record) => println!("{record}"),
            None => println!("no results recorded yet"),
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let pool = cli.passage_pool(&config)?;
    info!(pool = pool.name(), passages = pool.len(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(pool, store);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        if app.take_redraw() {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => app.request_redraw(),
            AppEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typesprint"]);

        assert_eq!(cli.prompt, None);
        assert_eq!(cli.passages, None);
        assert_eq!(cli.results_db, None);
        assert!(!cli.last);
        assert!(!cli.save_config);
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["typesprint", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));

        let cli = Cli::parse_from(["typesprint", "--prompt", "custom text"]);
        assert_eq!(cli.prompt, Some("custom text".to_string()));
    }

    #[test]
    fn test_cli_paths_and_flags() {
        let cli = Cli::parse_from([
            "typesprint",
            "--passages",
            "pool.json",
            "--results-db",
            "r.db",
            "--last",
            "--log-level",
            "debug",
        ]);

        assert_eq!(cli.passages, Some(PathBuf::from("pool.json")));
        assert_eq!(cli.results_db, Some(PathBuf::from("r.db")));
        assert!(cli.last);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["typesprint", "--results-db", "mine.db", "--log-level", "warn"]);
        let mut config = Config {
            passages_file: Some(PathBuf::from("kept.json")),
            ..Config::default()
        };

        cli.apply_to(&mut config);

        assert_eq!(config.passages_file, Some(PathBuf::from("kept.json")));
        assert_eq!(config.results_db, Some(PathBuf::from("mine.db")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_prompt_wins_over_passage_file() {
        let cli = Cli::parse_from(["typesprint", "-p", "just this"]);
        let config = Config {
            passages_file: Some(PathBuf::from("/does/not/exist.json")),
            ..Config::default()
        };

        let pool = cli.passage_pool(&config).unwrap();

        assert_eq!(pool.passages(), ["just this"]);
    }

    #[test]
    fn test_default_pool_is_builtin() {
        let cli = Cli::parse_from(["typesprint"]);
        let pool = cli.passage_pool(&Config::default()).unwrap();
        assert_eq!(pool.name(), "default");
    }

    #[test]
    fn test_open_store_uses_configured_path() {
        let dir = tempdir().unwrap();
        let config = Config {
            results_db: Some(dir.path().join("results.db")),
            ..Config::default()
        };

        let store = open_store(&config);

        assert!(store.latest().unwrap().is_none());
        assert!(dir.path().join("results.db").exists());
    }
}
