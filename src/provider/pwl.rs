// Word lists - in-memory word sets and file-backed personal word lists
// File format: one word per line, '#' starts a comment line, optional UTF-8 BOM

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const BOM: char = '\u{feff}';

/// Maximum Damerau-Levenshtein distance for a suggestion candidate
pub const MAX_SUGGEST_DISTANCE: usize = 2;

/// In-memory word set with case-aware lookup
#[derive(Debug, Default, Clone)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse word-list file content
    pub fn parse(content: &str) -> Self {
        let mut list = Self::new();
        for (index, line) in content.lines().enumerate() {
            let line = if index == 0 {
                line.strip_prefix(BOM).unwrap_or(line)
            } else {
                line
            };
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            list.insert(line);
        }
        list
    }

    /// Load a word list from disk.
    ///
    /// Invalid UTF-8 makes the whole file unreadable; it is reported and
    /// treated as missing.
    pub fn load(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Some(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                crate::warn!("Failed to read word list {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn insert(&mut self, word: &str) -> bool {
        self.words.insert(word.to_string())
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether `word` is in the list.
    ///
    /// Title-case and all-caps words also match their lower-case form, and
    /// all-caps words match their title-case form.
    pub fn check(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }

        let all_caps = is_all_caps(word);
        if all_caps || is_title_case(word) {
            if self.words.contains(&word.to_lowercase()) {
                return true;
            }
            if all_caps && self.words.contains(&to_title_case(word)) {
                return true;
            }
        }
        false
    }

    /// Candidates within [`MAX_SUGGEST_DISTANCE`] edits, nearest first.
    ///
    /// Casing of the candidates follows the casing of `word`.
    pub fn suggest(&self, word: &str) -> Vec<(usize, String)> {
        let needle = word.to_lowercase();
        let mut candidates: Vec<(usize, String)> = self
            .words
            .iter()
            .filter_map(|candidate| {
                let distance = strsim::damerau_levenshtein(&needle, &candidate.to_lowercase());
                if distance > MAX_SUGGEST_DISTANCE {
                    return None;
                }
                let adapted = match_case(candidate, word);
                if adapted == word {
                    return None;
                }
                Some((distance, adapted))
            })
            .collect();
        candidates.sort();
        candidates
    }
}

/// A word list optionally persisted to a file.
///
/// The file is re-read whenever its modification time changes, so edits made
/// by other processes are picked up on the next lookup.
#[derive(Debug, Default)]
pub struct PersonalWordList {
    list: WordList,
    path: Option<PathBuf>,
    modified: Option<SystemTime>,
}

impl PersonalWordList {
    /// A word list that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (creating if necessary) a word list file
    pub fn open(path: &Path) -> io::Result<Self> {
        OpenOptions::new().create(true).append(true).open(path)?;
        let mut pwl = Self {
            list: WordList::new(),
            path: Some(path.to_path_buf()),
            modified: None,
        };
        pwl.refresh();
        Ok(pwl)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn refresh(&mut self) {
        let Some(path) = &self.path else {
            return;
        };
        let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
            return;
        };
        if self.modified == Some(modified) {
            return;
        }
        self.list = WordList::load(path).unwrap_or_default();
        self.modified = Some(modified);
        crate::trace!("Reloaded {} words from {:?}", self.list.len(), path);
    }

    fn mark_written(&mut self) {
        if let Some(path) = &self.path {
            self.modified = fs::metadata(path).and_then(|m| m.modified()).ok();
        }
    }

    pub fn check(&mut self, word: &str) -> bool {
        self.refresh();
        self.list.check(word)
    }

    pub fn suggest(&mut self, word: &str) -> Vec<(usize, String)> {
        self.refresh();
        self.list.suggest(word)
    }

    /// Add a word, appending it to the backing file
    pub fn add(&mut self, word: &str) -> io::Result<()> {
        self.refresh();
        self.list.insert(word);

        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let existing = fs::read(&path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if existing.last().is_some_and(|&b| b != b'\n') {
            file.write_all(b"\n")?;
        }
        writeln!(file, "{}", word)?;
        drop(file);
        self.mark_written();
        Ok(())
    }

    /// Remove a word, rewriting the backing file without it
    pub fn remove(&mut self, word: &str) -> io::Result<()> {
        if !self.check(word) {
            return Ok(());
        }
        self.list.remove(word);

        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let content = fs::read_to_string(&path)?;
        let (bom, body) = match content.strip_prefix(BOM) {
            Some(body) => (BOM.to_string(), body),
            None => (String::new(), content.as_str()),
        };

        let mut rewritten = bom;
        for line in body.lines() {
            if line.trim_end_matches('\r') == word {
                continue;
            }
            rewritten.push_str(line);
            rewritten.push('\n');
        }
        fs::write(&path, rewritten)?;
        self.mark_written();
        Ok(())
    }
}

fn is_all_caps(word: &str) -> bool {
    let mut has_upper = false;
    for c in word.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}

fn is_title_case(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| !c.is_uppercase()),
        _ => false,
    }
}

fn to_title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Give `candidate` the casing style of `model`
fn match_case(candidate: &str, model: &str) -> String {
    if is_all_caps(model) && model.chars().count() > 1 {
        candidate.to_uppercase()
    } else if is_title_case(model) && !is_title_case(candidate) && !is_all_caps(candidate) {
        to_title_case(candidate)
    } else {
        candidate.to_string()
    }
}

#[cfg(test)]
#[path = "pwl_test.rs"]
mod tests;
