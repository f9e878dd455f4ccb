// ============================================
// src/save_data.rs
// Results history: what was played, scored and graded
// ============================================

use bincode::config::standard;
use bincode::{Decode, Encode};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config;
use crate::games::Summary;
use crate::scoring::Grade;

const RESULTS_FILE: &str = "results.bin";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode results: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("results file is corrupt: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    /// Registry slug
    pub game: String,
    pub score: u32,
    pub correct: u32,
    pub total: Option<u32>,
    pub grade: Option<Grade>,
}

impl ResultRecord {
    pub fn new(game: &str, summary: &Summary) -> Self {
        Self {
            timestamp: Utc::now(),
            game: game.to_string(),
            score: summary.score,
            correct: summary.correct,
            total: summary.total,
            grade: summary.grade,
        }
    }
}

/// bincode representation (timestamp as seconds, grade as a code)
#[derive(Encode, Decode)]
struct ResultRecordBin {
    timestamp_secs: i64,
    game: String,
    score: u32,
    correct: u32,
    total: Option<u32>,
    grade: Option<u8>,
}

fn grade_code(grade: Grade) -> u8 {
    match grade {
        Grade::APlus => 0,
        Grade::A => 1,
        Grade::B => 2,
        Grade::C => 3,
        Grade::D => 4,
        Grade::F => 5,
    }
}

fn grade_from_code(code: u8) -> Option<Grade> {
    Some(match code {
        0 => Grade::APlus,
        1 => Grade::A,
        2 => Grade::B,
        3 => Grade::C,
        4 => Grade::D,
        5 => Grade::F,
        _ => return None,
    })
}

impl From<&ResultRecord> for ResultRecordBin {
    fn from(record: &ResultRecord) -> Self {
        Self {
            timestamp_secs: record.timestamp.timestamp(),
            game: record.game.clone(),
            score: record.score,
            correct: record.correct,
            total: record.total,
            grade: record.grade.map(grade_code),
        }
    }
}

impl From<ResultRecordBin> for ResultRecord {
    fn from(bin: ResultRecordBin) -> Self {
        Self {
            timestamp: Utc.timestamp_opt(bin.timestamp_secs, 0).single().unwrap_or_default(),
            game: bin.game,
            score: bin.score,
            correct: bin.correct,
            total: bin.total,
            grade: bin.grade.and_then(grade_from_code),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub records: Vec<ResultRecord>,
}

#[derive(Encode, Decode)]
struct HistoryBin {
    records: Vec<ResultRecordBin>,
}

impl From<&History> for HistoryBin {
    fn from(history: &History) -> Self {
        Self {
            records: history.records.iter().map(ResultRecordBin::from).collect(),
        }
    }
}

impl From<HistoryBin> for History {
    fn from(bin: HistoryBin) -> Self {
        Self {
            records: bin.records.into_iter().map(ResultRecord::from).collect(),
        }
    }
}

impl History {
    /// Highest score per game slug.
    pub fn best_scores(&self) -> BTreeMap<&str, u32> {
        let mut best = BTreeMap::new();
        for record in &self.records {
            let entry = best.entry(record.game.as_str()).or_insert(0);
            *entry = (*entry).max(record.score);
        }
        best
    }

    pub fn best_for(&self, game: &str) -> Option<u32> {
        self.records
            .iter()
            .filter(|r| r.game == game)
            .map(|r| r.score)
            .max()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// MARK: Store

/// The results file: bincode first, with a JSON copy next to it that is
/// read when the binary one cannot be.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `results.bin` in the platform data directory.
    pub fn open_default() -> Self {
        Self::at(config::data_dir().join(RESULTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn json_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }

    fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Reads the history. A missing file is an empty history.
    pub fn load(&self) -> Result<History, StoreError> {
        match fs::read(&self.path) {
            Ok(buffer) => match bincode::decode_from_slice::<HistoryBin, _>(&buffer, standard()) {
                Ok((bin, _)) => return Ok(History::from(bin)),
                Err(err) => {
                    warn!("{}: {err}, trying the json copy", self.path.display());
                    let json = self.json_path();
                    if json.exists() {
                        let text = fs::read_to_string(&json).map_err(Self::io_error(&json))?;
                        return Ok(serde_json::from_str(&text)?);
                    }
                    return Err(err.into());
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(Self::io_error(&self.path)(err)),
        }
        Ok(History::default())
    }

    /// Like [`load`](Self::load), but logs problems and starts empty.
    pub fn load_or_default(&self) -> History {
        self.load().unwrap_or_else(|err| {
            warn!("could not load results: {err}");
            History::default()
        })
    }

    pub fn save(&self, history: &History) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(Self::io_error(dir))?;
        }
        let encoded = bincode::encode_to_vec(HistoryBin::from(history), standard())?;
        fs::write(&self.path, encoded).map_err(Self::io_error(&self.path))?;

        let json = self.json_path();
        fs::write(&json, history.to_json()?).map_err(Self::io_error(&json))?;
        debug!("saved {} results to {}", history.records.len(), self.path.display());
        Ok(())
    }

    /// Adds `record` to the stored history. An unreadable history is left
    /// untouched and reported.
    pub fn append(&self, record: ResultRecord) -> Result<(), StoreError> {
        let mut history = self.load()?;
        history.records.push(record);
        self.save(&history)
    }

    /// Deletes the history and its JSON copy.
    pub fn clear(&self) -> Result<(), StoreError> {
        for path in [self.path.clone(), self.json_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(Self::io_error(&path)(err)),
            }
        }
        Ok(())
    }
}
