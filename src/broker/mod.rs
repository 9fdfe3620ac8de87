// Broker module - dictionary handles with managed lifetimes
//
// A Broker owns the provider's broker resource and caches the dictionaries it
// hands out without owning them. Each Dictionary keeps its Broker alive.

mod cache;
mod dictionary;
mod handle;
mod instance;
mod registry;

pub use dictionary::Dictionary;
pub use instance::Broker;
pub use registry::{default_broker, DefaultBrokerRegistry};
