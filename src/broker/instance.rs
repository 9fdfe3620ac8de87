// Broker: owns the provider broker resource and its dictionary caches
// Disposal cascades to every dictionary still reachable through a cache

use parking_lot::{Mutex, MutexGuard};
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cache::DictionaryCache;
use super::dictionary::Dictionary;
use super::handle::{BrokerResource, DictResource};
use crate::config::BrokerConfig;
use crate::error::{require, BrokerError, BrokerResult};
use crate::provider::{
    DictionaryInfo, Provider, ProviderInfo, RawBroker, RawDict, WordListProvider,
};

const KIND: &str = "Broker";

struct BrokerInner {
    resource: Arc<BrokerResource>,
    state: Mutex<BrokerState>,
}

struct BrokerState {
    disposed: bool,
    cache_dictionaries: bool,
    by_tag: DictionaryCache<String>,
    by_pwl_path: DictionaryCache<PathBuf>,
    providers: Option<Arc<[ProviderInfo]>>,
    dictionaries: Option<Arc<[DictionaryInfo]>>,
}

impl BrokerState {
    fn tag_cache(&mut self) -> &mut DictionaryCache<String> {
        &mut self.by_tag
    }

    fn pwl_cache(&mut self) -> &mut DictionaryCache<PathBuf> {
        &mut self.by_pwl_path
    }
}

/// Entry point for requesting dictionaries.
///
/// Clones share one broker. Every [`Dictionary`] holds a clone, so a broker
/// stays alive while any of its dictionaries do. [`Broker::dispose`] frees
/// the native broker and disposes every dictionary still reachable through
/// its caches.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<BrokerInner>,
}

impl Broker {
    /// Create a broker backed by word-list engines found in the user config
    /// directory.
    pub fn init() -> BrokerResult<Self> {
        let config = BrokerConfig::discover()
            .map_err(|e| BrokerError::InitializationFailure(e.to_string()))?;
        Self::from_config(config)
    }

    /// Create a broker backed by word-list engines from `config`
    pub fn from_config(config: BrokerConfig) -> BrokerResult<Self> {
        let cache_dictionaries = config.cache_dictionaries;
        let broker = Self::with_provider(Arc::new(WordListProvider::new(config)))?;
        broker.inner.state.lock().cache_dictionaries = cache_dictionaries;
        Ok(broker)
    }

    /// Create a broker on top of an arbitrary provider
    pub fn with_provider(provider: Arc<dyn Provider>) -> BrokerResult<Self> {
        let raw = provider.broker_init().ok_or_else(|| {
            BrokerError::InitializationFailure("Unable to initialize broker".to_string())
        })?;
        let resource = Arc::new(BrokerResource::new(provider, raw));

        // Dropping `resource` on this path frees the native broker
        if let Some(error) = resource
            .provider()
            .broker_get_error(raw)
            .filter(|message| !message.is_empty())
        {
            return Err(BrokerError::InitializationFailure(error));
        }

        crate::info!("Broker {:?} initialized", raw);
        Ok(Self {
            inner: Arc::new(BrokerInner {
                resource,
                state: Mutex::new(BrokerState {
                    disposed: false,
                    cache_dictionaries: true,
                    by_tag: DictionaryCache::new(),
                    by_pwl_path: DictionaryCache::new(),
                    providers: None,
                    dictionaries: None,
                }),
            }),
        })
    }

    fn live(&self) -> BrokerResult<MutexGuard<'_, BrokerState>> {
        let state = self.inner.state.lock();
        if state.disposed {
            return Err(BrokerError::DisposedUse(KIND));
        }
        Ok(state)
    }

    fn provider(&self) -> &dyn Provider {
        self.inner.resource.provider()
    }

    fn raw(&self) -> RawBroker {
        self.inner.resource.raw()
    }

    fn last_error(&self) -> Option<String> {
        self.provider()
            .broker_get_error(self.raw())
            .filter(|message| !message.is_empty())
    }

    fn verify_no_errors(&self) -> BrokerResult<()> {
        match self.last_error() {
            Some(error) => Err(BrokerError::ProviderError(error)),
            None => Ok(()),
        }
    }

    /// Dictionary for a language tag such as "en_US"
    pub fn request_dictionary(&self, language_tag: &str) -> BrokerResult<Dictionary> {
        require(language_tag, "language_tag")?;
        self.request(
            BrokerState::tag_cache,
            language_tag,
            |provider, raw| provider.broker_request_dict(raw, language_tag),
            || {
                format!(
                    "There is no provider that supplies a dictionary for {}",
                    language_tag
                )
            },
        )
    }

    /// Dictionary backed by the personal word list at `path`, created if
    /// missing
    pub fn request_pwl_dictionary(&self, path: &Path) -> BrokerResult<Dictionary> {
        if path.as_os_str().is_empty() {
            return Err(BrokerError::InvalidArgument("pwl_file"));
        }
        self.request(
            BrokerState::pwl_cache,
            path,
            |provider, raw| provider.broker_request_pwl_dict(raw, path),
            || format!("Unable to create pwl file {}", path.display()),
        )
    }

    fn request<K, Q>(
        &self,
        cache: fn(&mut BrokerState) -> &mut DictionaryCache<K>,
        key: &Q,
        open: impl FnOnce(&dyn Provider, RawBroker) -> Option<RawDict>,
        not_found: impl FnOnce() -> String,
    ) -> BrokerResult<Dictionary>
    where
        K: Borrow<Q> + Hash + Eq + Debug,
        Q: ToOwned<Owned = K> + Hash + Eq + Debug + ?Sized,
    {
        let mut state = self.live()?;

        if state.cache_dictionaries {
            if let Some(dictionary) = cache(&mut *state).try_get(key) {
                crate::trace!("Cache hit for {:?}", key);
                return Ok(dictionary);
            }
        }

        let raw = open(self.provider(), self.raw());
        let error = self.last_error();
        // Wrapped before the checks so a handle returned alongside an error is freed
        let resource = raw.map(|raw| DictResource::new(self.inner.resource.clone(), raw));
        if let Some(error) = error {
            return Err(BrokerError::ProviderError(error));
        }
        let resource = resource.ok_or_else(|| BrokerError::NotFound(not_found()))?;

        let dictionary = Dictionary::new(self.clone(), resource);
        dictionary.on_disposed(|dictionary| dictionary.owner().forget(dictionary))?;
        if state.cache_dictionaries {
            cache(&mut *state).register(key.to_owned(), &dictionary);
        }

        crate::debug!("Opened dictionary for {:?}", key);
        Ok(dictionary)
    }

    /// Drop any cache entry for this exact dictionary
    fn forget(&self, dictionary: &Dictionary) {
        let mut state = self.inner.state.lock();
        state.by_tag.unregister(dictionary);
        state.by_pwl_path.unregister(dictionary);
    }

    /// Whether any provider supplies a dictionary for `language_tag`
    pub fn dictionary_exists(&self, language_tag: &str) -> BrokerResult<bool> {
        let _state = self.live()?;
        require(language_tag, "language_tag")?;
        let result = self.provider().broker_dict_exists(self.raw(), language_tag);
        self.verify_no_errors()?;
        match result {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BrokerError::ProviderError(format!(
                "dict_exists returned unexpected value {}",
                other
            ))),
        }
    }

    /// Set the provider preference for `language_tag` ("*" for every tag).
    ///
    /// `ordering` is a comma-separated list of provider names, most preferred
    /// first. Unknown names are ignored by the provider.
    pub fn set_ordering(&self, language_tag: &str, ordering: &str) -> BrokerResult<()> {
        let _state = self.live()?;
        require(language_tag, "language_tag")?;
        self.provider()
            .broker_set_ordering(self.raw(), language_tag, ordering);
        self.verify_no_errors()
    }

    /// Providers known to this broker, enumerated once.
    ///
    /// A provider error during enumeration is returned and nothing is cached.
    pub fn providers(&self) -> BrokerResult<Arc<[ProviderInfo]>> {
        let mut state = self.live()?;
        if let Some(providers) = &state.providers {
            return Ok(providers.clone());
        }

        let mut providers = Vec::new();
        self.provider()
            .broker_describe(self.raw(), &mut |info| providers.push(info));
        self.verify_no_errors()?;
        let providers: Arc<[ProviderInfo]> = providers.into();
        state.providers = Some(providers.clone());
        Ok(providers)
    }

    /// Dictionaries available from every provider, enumerated once.
    ///
    /// A provider error during enumeration is returned and nothing is cached.
    pub fn dictionaries(&self) -> BrokerResult<Arc<[DictionaryInfo]>> {
        let mut state = self.live()?;
        if let Some(dictionaries) = &state.dictionaries {
            return Ok(dictionaries.clone());
        }

        let mut dictionaries = Vec::new();
        self.provider()
            .broker_list_dicts(self.raw(), &mut |info| dictionaries.push(info));
        self.verify_no_errors()?;
        let dictionaries: Arc<[DictionaryInfo]> = dictionaries.into();
        state.dictionaries = Some(dictionaries.clone());
        Ok(dictionaries)
    }

    /// Whether new requests consult and fill the dictionary caches
    pub fn cache_dictionaries(&self) -> BrokerResult<bool> {
        Ok(self.live()?.cache_dictionaries)
    }

    /// Toggle caching for subsequent requests; existing entries are kept
    pub fn set_cache_dictionaries(&self, enabled: bool) -> BrokerResult<()> {
        self.live()?.cache_dictionaries = enabled;
        Ok(())
    }

    /// Free the native broker and dispose every dictionary still reachable
    /// through the caches. Idempotent.
    pub fn dispose(&self) {
        let cascade = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            self.inner.resource.release();
            state.disposed = true;
            let mut live = state.by_tag.drain_live_entries();
            live.extend(state.by_pwl_path.drain_live_entries());
            live
        };

        crate::info!(
            "Broker {:?} disposed, cascading to {} live dictionaries",
            self.raw(),
            cascade.len()
        );
        for dictionary in &cascade {
            dictionary.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }
}

impl PartialEq for Broker {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Broker {}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("resource", &self.inner.resource)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
#[path = "instance_test.rs"]
mod tests;
