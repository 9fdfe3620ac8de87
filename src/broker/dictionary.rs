// Dictionary: one provider-backed spell-checking resource
// Keeps its broker alive; fires disposal notifications exactly once

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use super::handle::DictResource;
use super::Broker;
use crate::error::{require, BrokerError, BrokerResult};
use crate::provider::{DictionaryInfo, Provider, RawDict};

const KIND: &str = "Dictionary";

type Subscriber = Box<dyn FnOnce(&Dictionary) + Send>;

pub(crate) struct DictionaryInner {
    // Declared before `broker` so the native dictionary is freed first on drop
    resource: DictResource,
    broker: Broker,
    state: Mutex<DictionaryState>,
}

#[derive(Default)]
struct DictionaryState {
    disposed: bool,
    information: Option<DictionaryInfo>,
    subscribers: Vec<Subscriber>,
}

/// Handle to a spell-checking dictionary obtained from a [`Broker`].
///
/// Clones share the same dictionary; equality is identity. Dropping the last
/// clone frees the native resource without firing disposal notifications.
#[derive(Clone)]
pub struct Dictionary {
    inner: Arc<DictionaryInner>,
}

impl Dictionary {
    pub(crate) fn new(broker: Broker, resource: DictResource) -> Self {
        Self {
            inner: Arc::new(DictionaryInner {
                resource,
                broker,
                state: Mutex::new(DictionaryState::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<DictionaryInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<DictionaryInner> {
        &self.inner
    }

    /// Lock the state, failing if the dictionary is disposed.
    ///
    /// Callers hold the guard across the provider call so disposal cannot
    /// free the resource mid-operation.
    fn live(&self) -> BrokerResult<MutexGuard<'_, DictionaryState>> {
        let state = self.inner.state.lock();
        if state.disposed || self.inner.resource.is_orphaned() {
            return Err(BrokerError::DisposedUse(KIND));
        }
        Ok(state)
    }

    fn provider(&self) -> &dyn Provider {
        self.inner.resource.provider()
    }

    fn raw(&self) -> RawDict {
        self.inner.resource.raw()
    }

    fn last_error(&self) -> Option<String> {
        self.provider()
            .dict_get_error(self.raw())
            .filter(|message| !message.is_empty())
    }

    /// Run a list mutation whose provider errors are logged, not returned
    fn mutate(&self, action: &str, word: &str, f: impl FnOnce(&dyn Provider, RawDict)) -> BrokerResult<()> {
        let _state = self.live()?;
        require(word, "word")?;
        f(self.provider(), self.raw());
        if let Some(error) = self.last_error() {
            crate::warn!("Ignoring provider error from {} {:?}: {}", action, word, error);
        }
        Ok(())
    }

    /// Whether `word` is spelled correctly
    pub fn check(&self, word: &str) -> BrokerResult<bool> {
        let _state = self.live()?;
        require(word, "word")?;
        let result = self.provider().dict_check(self.raw(), word);
        if result < 0 {
            let message = self
                .last_error()
                .unwrap_or_else(|| format!("Unable to check {:?}", word));
            return Err(BrokerError::ProviderError(message));
        }
        Ok(result == 0)
    }

    /// Candidate corrections for `word`, in provider order
    pub fn suggest(&self, word: &str) -> BrokerResult<Vec<String>> {
        let _state = self.live()?;
        require(word, "word")?;
        let suggestions = self.provider().dict_suggest(self.raw(), word);
        if let Some(error) = self.last_error() {
            return Err(BrokerError::ProviderError(error));
        }
        Ok(suggestions)
    }

    /// Add `word` to the personal word list
    pub fn add(&self, word: &str) -> BrokerResult<()> {
        self.mutate("add", word, |provider, raw| provider.dict_add(raw, word))
    }

    /// Accept `word` until this dictionary is released
    pub fn add_to_session(&self, word: &str) -> BrokerResult<()> {
        self.mutate("add_to_session", word, |provider, raw| {
            provider.dict_add_to_session(raw, word)
        })
    }

    /// Add `word` to the exclude list
    pub fn remove(&self, word: &str) -> BrokerResult<()> {
        self.mutate("remove", word, |provider, raw| provider.dict_remove(raw, word))
    }

    /// Reject `word` until this dictionary is released
    pub fn remove_from_session(&self, word: &str) -> BrokerResult<()> {
        self.mutate("remove_from_session", word, |provider, raw| {
            provider.dict_remove_from_session(raw, word)
        })
    }

    pub fn is_added(&self, word: &str) -> BrokerResult<bool> {
        let _state = self.live()?;
        require(word, "word")?;
        Ok(self.provider().dict_is_added(self.raw(), word))
    }

    pub fn is_removed(&self, word: &str) -> BrokerResult<bool> {
        let _state = self.live()?;
        require(word, "word")?;
        Ok(self.provider().dict_is_removed(self.raw(), word))
    }

    /// Record `correction` as the preferred suggestion for `misspelling`
    pub fn store_replacement(&self, misspelling: &str, correction: &str) -> BrokerResult<()> {
        let _state = self.live()?;
        require(misspelling, "misspelling")?;
        require(correction, "correction")?;
        self.provider()
            .dict_store_replacement(self.raw(), misspelling, correction);
        if let Some(error) = self.last_error() {
            crate::warn!("Ignoring provider error from store_replacement: {}", error);
        }
        Ok(())
    }

    /// Language and provider of this dictionary, fetched once
    pub fn information(&self) -> BrokerResult<DictionaryInfo> {
        let mut state = self.live()?;
        if let Some(information) = &state.information {
            return Ok(information.clone());
        }

        let mut described = None;
        self.provider()
            .dict_describe(self.raw(), &mut |info| described = Some(info));
        let information = described.ok_or_else(|| {
            BrokerError::ProviderError(
                self.last_error()
                    .unwrap_or_else(|| "Provider did not describe the dictionary".to_string()),
            )
        })?;

        state.information = Some(information.clone());
        Ok(information)
    }

    /// Subscribe to this dictionary's disposal.
    ///
    /// The callback runs once, after the dictionary already reads as
    /// disposed.
    pub fn on_disposed(&self, callback: impl FnOnce(&Dictionary) + Send + 'static) -> BrokerResult<()> {
        let mut state = self.live()?;
        state.subscribers.push(Box::new(callback));
        Ok(())
    }

    /// Free the native resource and notify subscribers. Idempotent.
    pub fn dispose(&self) {
        let subscribers = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            self.inner.resource.release();
            state.disposed = true;
            std::mem::take(&mut state.subscribers)
        };

        crate::debug!(
            "Disposed dictionary {:?}, notifying {} subscribers",
            self.raw(),
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber(self);
        }
    }

    /// True once disposed, or once the owning broker was disposed even if
    /// this dictionary was never cached there
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed || self.inner.resource.is_orphaned()
    }

    /// The broker this dictionary was requested from
    pub fn broker(&self) -> Broker {
        self.inner.broker.clone()
    }

    pub(crate) fn owner(&self) -> &Broker {
        &self.inner.broker
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Dictionary {}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("resource", &self.inner.resource)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
#[path = "dictionary_test.rs"]
mod tests;
