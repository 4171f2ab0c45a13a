use directories::ProjectDirs;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static BANK_DIR: Dir = include_dir!("words");

/// Returned by `random_word` when the backing store has no words at
/// all. A defined sentinel, not a failure.
pub const EMPTY_SENTINEL: &str = "empty";

/// Source of candidate words for the spawner.
///
/// Implementations are called from both the UI path (add/list) and the
/// game loop (random sampling), so they carry their own interior
/// synchronization.
pub trait WordSource: Send + Sync {
    /// Some word from the store, or [`EMPTY_SENTINEL`] if it is empty.
    fn random_word(&self) -> String;
    fn add_word(&self, word: &str) -> io::Result<()>;
    /// Read-only snapshot of the full word list, in stored order.
    fn all_words(&self) -> Vec<String>;
}

#[derive(Deserialize, Debug)]
struct StarterBank {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    size: u32,
    words: Vec<String>,
}

fn starter_words() -> Vec<String> {
    let file = BANK_DIR
        .get_file("starter.json")
        .expect("starter word bank not found");
    let bank: StarterBank = serde_json::from_str(
        file.contents_utf8()
            .expect("unable to interpret word bank as a string"),
    )
    .expect("unable to deserialize word bank json");
    bank.words
}

/// Line-per-word file store, seeded from the embedded starter bank
/// when the file is missing or empty.
#[derive(Debug)]
pub struct FileWordStore {
    path: PathBuf,
    words: Mutex<Vec<String>>,
}

impl FileWordStore {
    pub fn open() -> io::Result<Self> {
        let path = if let Some(pd) = ProjectDirs::from("", "", "startype") {
            pd.config_dir().join("words.txt")
        } else {
            PathBuf::from("startype_words.txt")
        };
        Self::open_path(path)
    }

    pub fn open_path<P: AsRef<Path>>(p: P) -> io::Result<Self> {
        let path = p.as_ref().to_path_buf();
        let mut words = load_words(&path);
        if words.is_empty() {
            words = starter_words();
            write_words(&path, &words)?;
        }
        Ok(Self {
            path,
            words: Mutex::new(words),
        })
    }
}

fn load_words(path: &Path) -> Vec<String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .unique()
        .collect()
}

fn write_words(path: &Path, words: &[String]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, words.join("\n") + "\n")
}

impl WordSource for FileWordStore {
    fn random_word(&self) -> String {
        let words = self.words.lock().unwrap();
        if words.is_empty() {
            return EMPTY_SENTINEL.to_string();
        }
        let idx = rand::thread_rng().gen_range(0..words.len());
        words[idx].clone()
    }

    fn add_word(&self, word: &str) -> io::Result<()> {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let mut words = self.words.lock().unwrap();
        if words.iter().any(|w| w == trimmed) {
            return Ok(());
        }
        words.push(trimmed.to_string());
        write_words(&self.path, &words)
    }

    fn all_words(&self) -> Vec<String> {
        self.words.lock().unwrap().clone()
    }
}

/// Deterministic in-memory source cycling through a fixed list; used
/// by unit and integration tests that need predictable spawns.
#[derive(Debug)]
pub struct FixedWordSource {
    words: Vec<String>,
    cursor: Mutex<usize>,
}

impl FixedWordSource {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            cursor: Mutex::new(0),
        }
    }
}

impl WordSource for FixedWordSource {
    fn random_word(&self) -> String {
        if self.words.is_empty() {
            return EMPTY_SENTINEL.to_string();
        }
        let mut cursor = self.cursor.lock().unwrap();
        let word = self.words[*cursor % self.words.len()].clone();
        *cursor += 1;
        word
    }

    fn add_word(&self, _word: &str) -> io::Result<()> {
        Ok(())
    }

    fn all_words(&self) -> Vec<String> {
        self.words.clone()
    }
}
