use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

const BUILTIN_FILE: &str = "default.json";

#[derive(Deserialize, Debug)]
struct PassageFile {
    name: String,
    passages: Vec<String>,
}

/// Fixed set of texts a test picks its passage from
#[derive(Clone, Debug, PartialEq)]
pub struct PassagePool {
    name: String,
    passages: Vec<String>,
}

impl PassagePool {
    /// The pool shipped with the binary
    pub fn builtin() -> Result<Self> {
        let file = PASSAGE_DIR
            .get_file(BUILTIN_FILE)
            .ok_or_else(|| Error::MissingBuiltin(BUILTIN_FILE.to_string()))?;
        let raw = file
            .contents_utf8()
            .ok_or_else(|| Error::MissingBuiltin(BUILTIN_FILE.to_string()))?;
        Self::from_json(raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: PassageFile = serde_json::from_str(raw)?;
        Self::build(file.name, file.passages)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// A pool holding only the given text, used for custom prompts
    pub fn single(text: impl Into<String>) -> Result<Self> {
        Self::build("custom".to_string(), vec![text.into()])
    }

    fn build(name: String, passages: Vec<String>) -> Result<Self> {
        if passages.is_empty() {
            return Err(Error::EmptyPool { name });
        }

        // newlines and tabs can't be typed into the prompt
        let passages: Vec<String> = passages
            .iter()
            .map(|p| p.split_whitespace().join(" "))
            .collect();

        if let Some(index) = passages.iter().position(|p| p.is_empty()) {
            return Err(Error::EmptyPassage { name, index });
        }

        Ok(Self { name, passages })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Uniformly random passage
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.passages
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
