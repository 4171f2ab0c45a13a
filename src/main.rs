pub mod ui;

use clap::Parser;
use crossterm::{
    event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use startype::{
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::Difficulty,
    scores::{ScoreDb, ScoreEntry, ScoreSink},
    session::SessionController,
    words::{FileWordStore, WordSource},
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc, Arc},
};

/// Side length of the square game space the orbit lives in. Spawn
/// radii top out at 280, so everything fits with margin.
pub const ORBIT_SPAN: f64 = 640.0;
/// Collision threshold around the player sprite, in game units.
pub const PLAYER_RADIUS: f64 = 40.0;

const TOP_SCORE_ROWS: usize = 5;

/// orbital typing defense for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Words orbit your planet and spiral inward; type them before they hit. Difficulty controls how many words are live, how fast they close in, and what a hit is worth."
)]
pub struct Cli {
    /// difficulty tier to play
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// word list file to play from (line per word)
    #[clap(long)]
    words_file: Option<PathBuf>,

    /// score history database
    #[clap(long)]
    scores_db: Option<PathBuf>,

    /// print the top N scores and exit
    #[clap(long, value_name = "N")]
    top: Option<usize>,

    /// add a word to the word list and exit
    #[clap(long, value_name = "WORD")]
    add_word: Option<String>,

    /// print the word list and exit
    #[clap(long)]
    list_words: bool,

    /// dump the score history as CSV to stdout and exit
    #[clap(long)]
    export_scores: bool,
}

impl Cli {
    fn is_headless(&self) -> bool {
        self.top.is_some() || self.add_word.is_some() || self.list_words || self.export_scores
    }
}

/// Events multiplexed onto the UI thread: terminal input plus the
/// game loop's render/terminal notifications.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Frame,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    pub controller: Arc<SessionController>,
    pub screen: Screen,
    pub input: String,
    pub player_name: String,
    pub top_scores: Vec<ScoreEntry>,
    pub score_saved: bool,
}

fn open_words(cli: &Cli) -> io::Result<FileWordStore> {
    match &cli.words_file {
        Some(path) => FileWordStore::open_path(path),
        None => FileWordStore::open(),
    }
}

fn open_scores(cli: &Cli) -> rusqlite::Result<ScoreDb> {
    match &cli.scores_db {
        Some(path) => ScoreDb::open_path(path),
        None => ScoreDb::open(),
    }
}

fn run_headless(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Some(word) = &cli.add_word {
        open_words(cli)?.add_word(word)?;
        println!("added: {}", word.trim());
    }
    if cli.list_words {
        for word in open_words(cli)?.all_words() {
            println!("{}", word);
        }
    }
    if let Some(limit) = cli.top {
        let db = open_scores(cli)?;
        let top = db.load_top_scores(limit)?;
        if top.is_empty() {
            println!("No scores recorded yet.");
        }
        for (rank, entry) in top.iter().enumerate() {
            println!("{}. {} - {}", rank + 1, entry.name, entry.score);
        }
    }
    if cli.export_scores {
        open_scores(cli)?.export_csv(io::stdout().lock())?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.is_headless() {
        return run_headless(&cli);
    }

    if !stdin().is_tty() {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.error(clap::error::ErrorKind::Io, "stdin must be a tty")
            .exit();
    }

    let words = Arc::new(open_words(&cli)?);
    let scores = Arc::new(open_scores(&cli)?);
    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(d) = cli.difficulty {
        config.difficulty = d;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_game(&mut terminal, words, scores, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    config_store.save(&result?)?;
    Ok(())
}

/// Forwards crossterm events into the shared channel from a dedicated
/// reader thread.
fn spawn_key_reader(tx: mpsc::Sender<GameEvent>) {
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(GameEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(GameEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

/// Runs the interactive session; returns the config to persist
/// (difficulty played, last name used for saving).
fn run_game<B: Backend>(
    terminal: &mut Terminal<B>,
    words: Arc<FileWordStore>,
    scores: Arc<ScoreDb>,
    config: &Config,
) -> Result<Config, Box<dyn Error>> {
    let controller = Arc::new(SessionController::new(words, scores));
    controller.set_orbit_center((ORBIT_SPAN / 2.0) as i32, (ORBIT_SPAN / 2.0) as i32);
    controller.set_collision_radius(PLAYER_RADIUS);

    let (tx, rx) = mpsc::channel();
    spawn_key_reader(tx.clone());

    // The loop thread only ever touches these senders; redrawing
    // happens back on this thread when the events arrive.
    let over_tx = tx.clone();
    controller.on_game_over(move || {
        let _ = over_tx.send(GameEvent::Over);
    });
    let start = {
        let controller = controller.clone();
        move || {
            let frame_tx = tx.clone();
            controller.start_game(config.difficulty, move || {
                let _ = frame_tx.send(GameEvent::Frame);
            });
        }
    };

    let mut app = App {
        controller: controller.clone(),
        screen: Screen::Playing,
        input: String::new(),
        player_name: config.player_name.clone(),
        top_scores: Vec::new(),
        score_saved: false,
    };

    start();
    terminal.draw(|f| f.render_widget(&app, f.area()))?;

    loop {
        match rx.recv()? {
            GameEvent::Frame | GameEvent::Resize => {
                terminal.draw(|f| f.render_widget(&app, f.area()))?;
            }
            GameEvent::Over => {
                app.screen = Screen::GameOver;
                app.score_saved = false;
                app.top_scores = controller.top_scores(TOP_SCORE_ROWS).unwrap_or_default();
                terminal.draw(|f| f.render_widget(&app, f.area()))?;
            }
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match app.screen {
                    Screen::Playing => match key.code {
                        KeyCode::Esc => controller.toggle_pause(),
                        KeyCode::Enter => {
                            controller.submit_input(&app.input);
                            app.input.clear();
                        }
                        KeyCode::Backspace => {
                            app.input.pop();
                        }
                        KeyCode::Char(c) => app.input.push(c),
                        _ => {}
                    },
                    Screen::GameOver => match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Enter => {
                            if app.score_saved {
                                app.screen = Screen::Playing;
                                app.input.clear();
                                start();
                            } else if !app.player_name.trim().is_empty() {
                                controller.save_score(&app.player_name)?;
                                app.score_saved = true;
                                app.top_scores =
                                    controller.top_scores(TOP_SCORE_ROWS).unwrap_or_default();
                            }
                        }
                        KeyCode::Backspace => {
                            app.player_name.pop();
                        }
                        KeyCode::Char(c) => {
                            if !app.score_saved {
                                app.player_name.push(c);
                            }
                        }
                        _ => {}
                    },
                }
                terminal.draw(|f| f.render_widget(&app, f.area()))?;
            }
        }
    }

    controller.stop_game();
    Ok(Config {
        difficulty: config.difficulty,
        player_name: app.player_name.clone(),
    })
}
