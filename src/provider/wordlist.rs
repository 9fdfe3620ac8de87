//! In-process provider backed by plain word-list files.
//!
//! Each configured engine is one provider backend with a directory of
//! `<tag>.dic` files. Broker and dictionary resources live in a handle table
//! guarded by a single mutex; callbacks are always invoked after the lock is
//! released so they may call back into the provider.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use super::pwl::WordList;
use super::session::{Session, PERSONAL_WORDLIST};
use super::tag;
use super::{DictionaryInfo, Provider, ProviderInfo, RawBroker, RawDict};
use crate::config::{BrokerConfig, EngineConfig};

/// Maximum number of suggestions returned for one word
pub const MAX_SUGGESTIONS: usize = 15;

const INVALID_TAG: &str = "invalid tag character found";
const EMPTY_WORD: &str = "word must not be empty";

/// One provider backend
#[derive(Debug)]
struct Engine {
    info: ProviderInfo,
    dictionary_dir: PathBuf,
}

impl Engine {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            info: ProviderInfo {
                name: config.name.clone(),
                description: config.description.clone(),
                file: config.dictionary_dir.display().to_string(),
            },
            dictionary_dir: config.dictionary_dir.clone(),
        }
    }

    fn dictionary_path(&self, tag: &str) -> PathBuf {
        self.dictionary_dir.join(format!("{}.dic", tag))
    }

    fn has_dictionary(&self, tag: &str) -> bool {
        self.dictionary_path(tag).is_file()
    }

    fn load(&self, tag: &str) -> Option<WordList> {
        WordList::load(&self.dictionary_path(tag))
    }

    /// Valid tags with a `.dic` file, sorted
    fn list_dicts(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dictionary_dir) else {
            return Vec::new();
        };
        let mut tags: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "dic"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|tag| tag::is_valid(tag))
            .collect();
        tags.sort();
        tags
    }
}

#[derive(Debug, Default)]
struct BrokerSlot {
    orderings: HashMap<String, String>,
    error: Option<String>,
}

impl BrokerSlot {
    fn set_ordering(&mut self, tag: &str, ordering: &str) {
        let tag = tag::normalize(tag);
        let ordering = ordering.trim();
        if !tag.is_empty() && !ordering.is_empty() {
            self.orderings.insert(tag, ordering.to_string());
        }
    }
}

#[derive(Debug)]
struct DictSlot {
    broker: RawBroker,
    /// Index into the engine list; `None` for personal word-list dictionaries
    engine: Option<usize>,
    words: WordList,
    session: Session,
    /// Preferred corrections per misspelling, most recent first
    replacements: HashMap<String, Vec<String>>,
    error: Option<String>,
}

impl DictSlot {
    fn check(&mut self, word: &str) -> i32 {
        if word.is_empty() {
            self.error = Some(EMPTY_WORD.to_string());
            return -1;
        }
        if self.session.excludes(word) {
            return 1;
        }
        if self.session.contains(word) {
            return 0;
        }
        match self.engine {
            Some(_) if self.words.check(word) => 0,
            _ => 1,
        }
    }

    fn suggest(&mut self, word: &str) -> Vec<String> {
        if word.is_empty() {
            self.error = Some(EMPTY_WORD.to_string());
            return Vec::new();
        }

        let stored = self.replacements.get(word).cloned().unwrap_or_default();
        let from_engine = self.words.suggest(word).into_iter().map(|(_, w)| w);
        let from_personal = self
            .session
            .personal_suggestions(word)
            .into_iter()
            .map(|(_, w)| w);

        let mut suggestions: Vec<String> = Vec::new();
        for candidate in stored.into_iter().chain(from_engine).chain(from_personal) {
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
            if suggestions.contains(&candidate) || self.session.excludes(&candidate) {
                continue;
            }
            suggestions.push(candidate);
        }
        suggestions
    }

    fn store_replacement(&mut self, misspelling: &str, correction: &str) {
        let corrections = self.replacements.entry(misspelling.to_string()).or_default();
        corrections.retain(|c| c != correction);
        corrections.insert(0, correction.to_string());
    }

    fn report_io(&mut self, action: &str, result: std::io::Result<()>) {
        if let Err(e) = result {
            self.error = Some(format!("Failed to {}: {}", action, e));
        }
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    brokers: HashMap<RawBroker, BrokerSlot>,
    dicts: HashMap<RawDict, DictSlot>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Provider serving dictionaries from word-list files on disk.
#[derive(Debug)]
pub struct WordListProvider {
    engines: Vec<Engine>,
    config: BrokerConfig,
    state: Mutex<State>,
}

impl WordListProvider {
    pub fn new(config: BrokerConfig) -> Self {
        let engines = config.engines.iter().map(Engine::from_config).collect();
        Self {
            engines,
            config,
            state: Mutex::new(State::default()),
        }
    }

    /// Engine indexes for `tag`, most preferred first.
    ///
    /// Names in the ordering that match no engine are ignored; engines the
    /// ordering leaves out follow in configuration order.
    fn ordered_engines(&self, orderings: &HashMap<String, String>, tag: &str) -> Vec<usize> {
        let mut order: Vec<usize> = Vec::with_capacity(self.engines.len());
        if let Some(ordering) = orderings.get(tag).or_else(|| orderings.get("*")) {
            for name in ordering.split(',').map(str::trim) {
                for (index, engine) in self.engines.iter().enumerate() {
                    if engine.info.name == name && !order.contains(&index) {
                        order.push(index);
                    }
                }
            }
        }
        for index in 0..self.engines.len() {
            if !order.contains(&index) {
                order.push(index);
            }
        }
        order
    }

    fn open_dict(&self, state: &mut State, broker: RawBroker, tag: &str) -> Option<RawDict> {
        let orderings = &state.brokers.get(&broker)?.orderings;
        let (engine, words) = self
            .ordered_engines(orderings, tag)
            .into_iter()
            .find_map(|index| self.engines[index].load(tag).map(|words| (index, words)))?;

        let session = Session::for_language(tag, &self.config.user_config_dir);
        let dict = RawDict(state.next_id());
        state.dicts.insert(
            dict,
            DictSlot {
                broker,
                engine: Some(engine),
                words,
                session,
                replacements: HashMap::new(),
                error: None,
            },
        );
        crate::debug!(
            "Opened {} dictionary {:?} from engine {}",
            tag,
            dict,
            self.engines[engine].info.name
        );
        Some(dict)
    }

    fn dict_exists(&self, tag: &str) -> bool {
        self.engines.iter().any(|engine| engine.has_dictionary(tag))
    }

    /// Run `f` against a broker slot with its error cleared.
    fn with_broker<T>(&self, broker: RawBroker, default: T, f: impl FnOnce(&mut BrokerSlot) -> T) -> T {
        let mut state = self.state.lock();
        match state.brokers.get_mut(&broker) {
            Some(slot) => {
                slot.error = None;
                f(slot)
            }
            None => default,
        }
    }

    /// Run `f` against a dictionary slot with its error cleared.
    fn with_dict<T>(&self, dict: RawDict, default: T, f: impl FnOnce(&mut DictSlot) -> T) -> T {
        let mut state = self.state.lock();
        match state.dicts.get_mut(&dict) {
            Some(slot) => {
                slot.error = None;
                f(slot)
            }
            None => default,
        }
    }
}

impl Provider for WordListProvider {
    fn broker_init(&self) -> Option<RawBroker> {
        let mut slot = BrokerSlot::default();
        for (tag, ordering) in self.config.load_orderings() {
            slot.set_ordering(&tag, &ordering);
        }

        let mut state = self.state.lock();
        let broker = RawBroker(state.next_id());
        state.brokers.insert(broker, slot);
        Some(broker)
    }

    fn broker_free(&self, broker: RawBroker) {
        let mut state = self.state.lock();
        if state.brokers.remove(&broker).is_none() {
            return;
        }
        let before = state.dicts.len();
        state.dicts.retain(|_, slot| slot.broker != broker);
        let reclaimed = before - state.dicts.len();
        if reclaimed > 0 {
            crate::debug!("Broker {:?} freed with {} dictionaries still open", broker, reclaimed);
        }
    }

    fn broker_request_dict(&self, broker: RawBroker, tag: &str) -> Option<RawDict> {
        let mut state = self.state.lock();
        let slot = state.brokers.get_mut(&broker)?;
        slot.error = None;

        let normalized = tag::normalize(tag);
        if !tag::is_valid(&normalized) {
            slot.error = Some(INVALID_TAG.to_string());
            return None;
        }

        self.open_dict(&mut state, broker, &normalized).or_else(|| {
            let language = tag::iso_639(&normalized);
            if language == normalized {
                return None;
            }
            self.open_dict(&mut state, broker, language)
        })
    }

    fn broker_request_pwl_dict(&self, broker: RawBroker, path: &Path) -> Option<RawDict> {
        let mut state = self.state.lock();
        let slot = state.brokers.get_mut(&broker)?;
        slot.error = None;

        let session = match Session::for_pwl(path) {
            Ok(session) => session,
            Err(e) => {
                crate::debug!("Personal word list {:?} failed to open: {}", path, e);
                slot.error = Some(format!("Couldn't open personal wordlist '{}'", path.display()));
                return None;
            }
        };

        let dict = RawDict(state.next_id());
        state.dicts.insert(
            dict,
            DictSlot {
                broker,
                engine: None,
                words: WordList::new(),
                session,
                replacements: HashMap::new(),
                error: None,
            },
        );
        Some(dict)
    }

    fn broker_free_dict(&self, broker: RawBroker, dict: RawDict) {
        let mut state = self.state.lock();
        if let Some(slot) = state.brokers.get_mut(&broker) {
            slot.error = None;
        }
        if state.dicts.get(&dict).is_some_and(|slot| slot.broker == broker) {
            state.dicts.remove(&dict);
        }
    }

    fn broker_dict_exists(&self, broker: RawBroker, tag: &str) -> i32 {
        self.with_broker(broker, 0, |slot| {
            let normalized = tag::normalize(tag);
            if !tag::is_valid(&normalized) {
                slot.error = Some(INVALID_TAG.to_string());
                return 0;
            }
            let language = tag::iso_639(&normalized);
            let exists = self.dict_exists(&normalized)
                || (language != normalized && self.dict_exists(language));
            i32::from(exists)
        })
    }

    fn broker_set_ordering(&self, broker: RawBroker, tag: &str, ordering: &str) {
        self.with_broker(broker, (), |slot| slot.set_ordering(tag, ordering));
    }

    fn broker_get_error(&self, broker: RawBroker) -> Option<String> {
        let state = self.state.lock();
        state.brokers.get(&broker).and_then(|slot| slot.error.clone())
    }

    fn broker_describe(&self, broker: RawBroker, describe: &mut dyn FnMut(ProviderInfo)) {
        if !self.with_broker(broker, false, |_| true) {
            return;
        }
        for engine in &self.engines {
            describe(engine.info.clone());
        }
    }

    fn broker_list_dicts(&self, broker: RawBroker, describe: &mut dyn FnMut(DictionaryInfo)) {
        let Some(orderings) = self.with_broker(broker, None, |slot| Some(slot.orderings.clone())) else {
            return;
        };

        // Each tag is attributed to its most preferred engine
        let mut best: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for (index, engine) in self.engines.iter().enumerate() {
            for tag in engine.list_dicts() {
                let order = self.ordered_engines(&orderings, &tag);
                let Some(priority) = order.iter().position(|&i| i == index) else {
                    continue;
                };
                let keep = best.get(&tag).map_or(true, |&(current, _)| priority < current);
                if keep {
                    best.insert(tag, (priority, index));
                }
            }
        }

        for (language, (_, index)) in best {
            describe(DictionaryInfo {
                language,
                provider: self.engines[index].info.clone(),
            });
        }
    }

    fn dict_check(&self, dict: RawDict, word: &str) -> i32 {
        self.with_dict(dict, -1, |slot| slot.check(word))
    }

    fn dict_suggest(&self, dict: RawDict, word: &str) -> Vec<String> {
        self.with_dict(dict, Vec::new(), |slot| slot.suggest(word))
    }

    fn dict_add(&self, dict: RawDict, word: &str) {
        self.with_dict(dict, (), |slot| {
            let result = slot.session.add_personal(word);
            slot.report_io("update personal word list", result);
        });
    }

    fn dict_add_to_session(&self, dict: RawDict, word: &str) {
        self.with_dict(dict, (), |slot| slot.session.add_to_session(word));
    }

    fn dict_is_added(&self, dict: RawDict, word: &str) -> bool {
        self.with_dict(dict, false, |slot| slot.session.contains(word))
    }

    fn dict_remove(&self, dict: RawDict, word: &str) {
        self.with_dict(dict, (), |slot| {
            let result = slot.session.remove_personal(word);
            slot.report_io("update exclude list", result);
        });
    }

    fn dict_remove_from_session(&self, dict: RawDict, word: &str) {
        self.with_dict(dict, (), |slot| slot.session.remove_from_session(word));
    }

    fn dict_is_removed(&self, dict: RawDict, word: &str) -> bool {
        self.with_dict(dict, false, |slot| slot.session.excludes(word))
    }

    fn dict_store_replacement(&self, dict: RawDict, misspelling: &str, correction: &str) {
        self.with_dict(dict, (), |slot| slot.store_replacement(misspelling, correction));
    }

    fn dict_describe(&self, dict: RawDict, describe: &mut dyn FnMut(DictionaryInfo)) {
        let info = self.with_dict(dict, None, |slot| {
            let provider = match slot.engine {
                Some(index) => self.engines[index].info.clone(),
                None => ProviderInfo {
                    name: PERSONAL_WORDLIST.to_string(),
                    description: PERSONAL_WORDLIST.to_string(),
                    file: slot
                        .session
                        .personal_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                },
            };
            Some(DictionaryInfo {
                language: slot.session.language().to_string(),
                provider,
            })
        });
        if let Some(info) = info {
            describe(info);
        }
    }

    fn dict_get_error(&self, dict: RawDict) -> Option<String> {
        let state = self.state.lock();
        state.dicts.get(&dict).and_then(|slot| slot.error.clone())
    }
}

#[cfg(test)]
#[path = "wordlist_test.rs"]
mod tests;
