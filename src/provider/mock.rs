// Mock provider for broker and dictionary tests
// Counts native frees and lets tests inject errors and out-of-contract results

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{DictionaryInfo, Provider, ProviderInfo, RawBroker, RawDict};

pub const MOCK_PROVIDER: &str = "mock";

#[derive(Debug, Default)]
pub struct MockState {
    next_id: u64,
    pub live_brokers: HashSet<RawBroker>,
    pub live_dicts: HashMap<RawDict, (RawBroker, String)>,
    pub broker_frees: usize,
    pub dict_frees: usize,
    /// Tags the mock can serve
    pub known_tags: HashSet<String>,
    /// Words every dictionary accepts
    pub words: Vec<String>,
    pub fail_init: bool,
    pub init_error: Option<String>,
    pub request_error: Option<String>,
    pub dict_exists_result: Option<i32>,
    pub ordering_error: Option<String>,
    pub check_error: Option<String>,
    pub suggest_error: Option<String>,
    pub broker_error: HashMap<RawBroker, String>,
    pub dict_error: HashMap<RawDict, String>,
    pub session_words: HashSet<String>,
    pub describe_calls: usize,
}

#[derive(Debug, Default)]
pub struct MockProvider {
    pub state: Mutex<MockState>,
}

impl MockProvider {
    /// Mock serving "en_US" with the words "hello" and "help"
    pub fn new() -> Self {
        let provider = Self::default();
        {
            let mut state = provider.state.lock();
            state.known_tags.insert("en_US".to_string());
            state.words = vec!["hello".to_string(), "help".to_string()];
        }
        provider
    }

    fn info() -> ProviderInfo {
        ProviderInfo {
            name: MOCK_PROVIDER.to_string(),
            description: "Mock Provider".to_string(),
            file: "mock.so".to_string(),
        }
    }

    fn open(&self, broker: RawBroker, key: String) -> RawDict {
        let mut state = self.state.lock();
        state.next_id += 1;
        let dict = RawDict(state.next_id);
        state.live_dicts.insert(dict, (broker, key));
        dict
    }
}

impl Provider for MockProvider {
    fn broker_init(&self) -> Option<RawBroker> {
        let mut state = self.state.lock();
        if state.fail_init {
            return None;
        }
        state.next_id += 1;
        let broker = RawBroker(state.next_id);
        state.live_brokers.insert(broker);
        if let Some(error) = state.init_error.clone() {
            state.broker_error.insert(broker, error);
        }
        Some(broker)
    }

    fn broker_free(&self, broker: RawBroker) {
        let mut state = self.state.lock();
        assert!(state.live_brokers.remove(&broker), "broker freed twice");
        state.broker_frees += 1;
        state.live_dicts.retain(|_, (owner, _)| *owner != broker);
    }

    fn broker_request_dict(&self, broker: RawBroker, tag: &str) -> Option<RawDict> {
        {
            let mut state = self.state.lock();
            state.broker_error.remove(&broker);
            if let Some(error) = state.request_error.clone() {
                state.broker_error.insert(broker, error);
                return None;
            }
            if !state.known_tags.contains(tag) {
                return None;
            }
        }
        Some(self.open(broker, tag.to_string()))
    }

    fn broker_request_pwl_dict(&self, broker: RawBroker, path: &Path) -> Option<RawDict> {
        Some(self.open(broker, path.display().to_string()))
    }

    fn broker_free_dict(&self, broker: RawBroker, dict: RawDict) {
        let mut state = self.state.lock();
        assert!(state.live_brokers.contains(&broker), "dictionary freed after its broker");
        assert!(state.live_dicts.remove(&dict).is_some(), "dictionary freed twice");
        state.dict_frees += 1;
    }

    fn broker_dict_exists(&self, _broker: RawBroker, tag: &str) -> i32 {
        let state = self.state.lock();
        state
            .dict_exists_result
            .unwrap_or_else(|| i32::from(state.known_tags.contains(tag)))
    }

    fn broker_set_ordering(&self, broker: RawBroker, _tag: &str, _ordering: &str) {
        let mut state = self.state.lock();
        if let Some(error) = state.ordering_error.clone() {
            state.broker_error.insert(broker, error);
        }
    }

    fn broker_get_error(&self, broker: RawBroker) -> Option<String> {
        self.state.lock().broker_error.get(&broker).cloned()
    }

    fn broker_describe(&self, _broker: RawBroker, describe: &mut dyn FnMut(ProviderInfo)) {
        self.state.lock().describe_calls += 1;
        describe(Self::info());
    }

    fn broker_list_dicts(&self, _broker: RawBroker, describe: &mut dyn FnMut(DictionaryInfo)) {
        let mut tags: Vec<String> = {
            let mut state = self.state.lock();
            state.describe_calls += 1;
            state.known_tags.iter().cloned().collect()
        };
        tags.sort();
        for language in tags {
            describe(DictionaryInfo {
                language,
                provider: Self::info(),
            });
        }
    }

    fn dict_check(&self, dict: RawDict, word: &str) -> i32 {
        let mut state = self.state.lock();
        state.dict_error.remove(&dict);
        if let Some(error) = state.check_error.clone() {
            state.dict_error.insert(dict, error);
            return -1;
        }
        let known = state.words.iter().any(|w| w == word) || state.session_words.contains(word);
        if known {
            0
        } else {
            1
        }
    }

    fn dict_suggest(&self, dict: RawDict, word: &str) -> Vec<String> {
        let mut state = self.state.lock();
        state.dict_error.remove(&dict);
        if let Some(error) = state.suggest_error.clone() {
            state.dict_error.insert(dict, error);
            return Vec::new();
        }
        state
            .words
            .iter()
            .filter(|w| strsim::damerau_levenshtein(w, word) <= 2)
            .cloned()
            .collect()
    }

    fn dict_add(&self, dict: RawDict, word: &str) {
        let mut state = self.state.lock();
        state.dict_error.insert(dict, format!("cannot persist {}", word));
        state.session_words.insert(word.to_string());
    }

    fn dict_add_to_session(&self, dict: RawDict, word: &str) {
        let mut state = self.state.lock();
        state.dict_error.remove(&dict);
        state.session_words.insert(word.to_string());
    }

    fn dict_is_added(&self, _dict: RawDict, word: &str) -> bool {
        self.state.lock().session_words.contains(word)
    }

    fn dict_remove(&self, _dict: RawDict, word: &str) {
        self.state.lock().session_words.remove(word);
    }

    fn dict_remove_from_session(&self, _dict: RawDict, word: &str) {
        self.state.lock().session_words.remove(word);
    }

    fn dict_is_removed(&self, _dict: RawDict, word: &str) -> bool {
        !self.state.lock().session_words.contains(word)
    }

    fn dict_store_replacement(&self, _dict: RawDict, _misspelling: &str, _correction: &str) {}

    fn dict_describe(&self, dict: RawDict, describe: &mut dyn FnMut(DictionaryInfo)) {
        let language = {
            let mut state = self.state.lock();
            state.describe_calls += 1;
            state.live_dicts.get(&dict).map(|(_, key)| key.clone())
        };
        if let Some(language) = language {
            describe(DictionaryInfo {
                language,
                provider: Self::info(),
            });
        }
    }

    fn dict_get_error(&self, dict: RawDict) -> Option<String> {
        self.state.lock().dict_error.get(&dict).cloned()
    }
}
