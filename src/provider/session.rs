// Per-dictionary session: session include/exclude sets layered over the
// user's personal word list and exclude list

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use super::pwl::PersonalWordList;

/// Language reported for personal word-list dictionaries
pub const PERSONAL_WORDLIST: &str = "Personal Wordlist";

#[derive(Debug)]
pub struct Session {
    language: String,
    personal: PersonalWordList,
    exclude: PersonalWordList,
    session_include: HashSet<String>,
    session_exclude: HashSet<String>,
}

impl Session {
    /// Session for a provider dictionary, persisting to `<dir>/<tag>.dic`
    /// and `<dir>/<tag>.exc`.
    ///
    /// Creates `dir` if needed; falls back to in-memory lists when the files
    /// cannot be opened.
    pub fn for_language(tag: &str, user_config_dir: &Path) -> Self {
        let personal_path = user_config_dir.join(format!("{}.dic", tag));
        let exclude_path = user_config_dir.join(format!("{}.exc", tag));

        if !user_config_dir.is_dir() {
            if let Err(e) = fs::create_dir_all(user_config_dir) {
                crate::warn!("Could not create {:?}: {}", user_config_dir, e);
            }
        }

        let personal = PersonalWordList::open(&personal_path).unwrap_or_else(|e| {
            crate::warn!("Personal word list {:?} unavailable: {}", personal_path, e);
            PersonalWordList::in_memory()
        });
        let exclude = PersonalWordList::open(&exclude_path).unwrap_or_else(|e| {
            crate::warn!("Exclude list {:?} unavailable: {}", exclude_path, e);
            PersonalWordList::in_memory()
        });

        Self {
            language: tag.to_string(),
            personal,
            exclude,
            session_include: HashSet::new(),
            session_exclude: HashSet::new(),
        }
    }

    /// Session for a personal word-list dictionary.
    ///
    /// The file is the whole dictionary, so removals simply drop the word
    /// from it; the exclude list stays in memory.
    pub fn for_pwl(path: &Path) -> io::Result<Self> {
        let personal = PersonalWordList::open(path)?;
        Ok(Self {
            language: PERSONAL_WORDLIST.to_string(),
            personal,
            exclude: PersonalWordList::in_memory(),
            session_include: HashSet::new(),
            session_exclude: HashSet::new(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn personal_path(&self) -> Option<&Path> {
        self.personal.path()
    }

    /// Excluded: in the session exclude set or the exclude list, and not
    /// added back to the session.
    pub fn excludes(&mut self, word: &str) -> bool {
        !self.session_include.contains(word)
            && (self.session_exclude.contains(word) || self.exclude.check(word))
    }

    /// Accepted: added to the session, or in the personal list and not in
    /// the exclude list.
    pub fn contains(&mut self, word: &str) -> bool {
        self.session_include.contains(word)
            || (self.personal.check(word) && !self.exclude.check(word))
    }

    pub fn add_to_session(&mut self, word: &str) {
        self.session_exclude.remove(word);
        self.session_include.insert(word.to_string());
    }

    pub fn remove_from_session(&mut self, word: &str) {
        self.session_include.remove(word);
        self.session_exclude.insert(word.to_string());
    }

    pub fn add_personal(&mut self, word: &str) -> io::Result<()> {
        self.personal.add(word)?;
        self.exclude.remove(word)
    }

    pub fn remove_personal(&mut self, word: &str) -> io::Result<()> {
        self.personal.remove(word)?;
        self.exclude.add(word)
    }

    pub fn personal_suggestions(&mut self, word: &str) -> Vec<(usize, String)> {
        self.personal.suggest(word)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
