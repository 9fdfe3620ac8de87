// Spell-checking dictionary broker
// Hands out provider-backed dictionaries by language tag or personal word list,
// reuses live ones, and tears everything down when the owning broker goes away.

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod broker;
mod config;
mod error;
mod provider;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use broker::{default_broker, Broker, DefaultBrokerRegistry, Dictionary};
pub use config::{BrokerConfig, ConfigError, EngineConfig};
pub use error::{BrokerError, BrokerResult};
pub use provider::{DictionaryInfo, Provider, ProviderInfo, RawBroker, RawDict, WordListProvider};
