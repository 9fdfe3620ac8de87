// Provider interface - the native spell-checking layer the broker fronts
// Handles are opaque; errors are reported out-of-band through get_error calls

mod pwl;
mod session;
mod tag;
mod wordlist;

#[cfg(test)]
pub(crate) mod mock;

use serde::Serialize;
use std::path::Path;

pub use wordlist::WordListProvider;

/// Opaque handle to a provider-side broker resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawBroker(pub u64);

/// Opaque handle to a provider-side dictionary resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawDict(pub u64);

/// Identity of one provider backend
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    /// Provider identifier, as used in orderings
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// File the provider was loaded from
    pub file: String,
}

/// A dictionary as described by its provider
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryInfo {
    /// Language tag (or "Personal Wordlist")
    pub language: String,
    /// Provider supplying the dictionary
    pub provider: ProviderInfo,
}

/// Operations a spell-checking provider exposes to the broker.
///
/// Calls returning `Option` yield `None` for an invalid handle. Errors are not
/// returned directly: after any call the broker reads `broker_get_error` or
/// `dict_get_error`, mirroring a C-style provider library.
pub trait Provider: Send + Sync {
    /// Create a broker resource
    fn broker_init(&self) -> Option<RawBroker>;

    /// Free a broker resource, reclaiming any dictionaries still open on it
    fn broker_free(&self, broker: RawBroker);

    /// Request a dictionary for a language tag
    fn broker_request_dict(&self, broker: RawBroker, tag: &str) -> Option<RawDict>;

    /// Request a dictionary backed by a personal word-list file
    fn broker_request_pwl_dict(&self, broker: RawBroker, path: &Path) -> Option<RawDict>;

    /// Free a dictionary resource
    fn broker_free_dict(&self, broker: RawBroker, dict: RawDict);

    /// 0 when no dictionary exists for `tag`, 1 when one does
    fn broker_dict_exists(&self, broker: RawBroker, tag: &str) -> i32;

    /// Set the comma-separated provider preference for `tag` ("*" for all)
    fn broker_set_ordering(&self, broker: RawBroker, tag: &str, ordering: &str);

    /// Error left by the last broker call, if any
    fn broker_get_error(&self, broker: RawBroker) -> Option<String>;

    /// Invoke `describe` once per provider backend
    fn broker_describe(&self, broker: RawBroker, describe: &mut dyn FnMut(ProviderInfo));

    /// Invoke `describe` once per available dictionary
    fn broker_list_dicts(&self, broker: RawBroker, describe: &mut dyn FnMut(DictionaryInfo));

    /// 0 when correct, positive when misspelled, negative on error
    fn dict_check(&self, dict: RawDict, word: &str) -> i32;

    /// Candidate corrections in provider-defined order
    fn dict_suggest(&self, dict: RawDict, word: &str) -> Vec<String>;

    /// Add to the personal word list
    fn dict_add(&self, dict: RawDict, word: &str);

    /// Accept for the lifetime of this dictionary only
    fn dict_add_to_session(&self, dict: RawDict, word: &str);

    /// Whether the word is accepted by the session or personal list
    fn dict_is_added(&self, dict: RawDict, word: &str) -> bool;

    /// Add to the exclude list
    fn dict_remove(&self, dict: RawDict, word: &str);

    /// Reject for the lifetime of this dictionary only
    fn dict_remove_from_session(&self, dict: RawDict, word: &str);

    /// Whether the word is excluded by the session or exclude list
    fn dict_is_removed(&self, dict: RawDict, word: &str) -> bool;

    /// Record a preferred correction for future suggestions
    fn dict_store_replacement(&self, dict: RawDict, misspelling: &str, correction: &str);

    /// Invoke `describe` once with this dictionary's description
    fn dict_describe(&self, dict: RawDict, describe: &mut dyn FnMut(DictionaryInfo));

    /// Error left by the last dictionary call, if any
    fn dict_get_error(&self, dict: RawDict) -> Option<String>;
}
