// Process-wide default broker, recreated on access after disposal

use parking_lot::Mutex;

use super::Broker;
use crate::error::BrokerResult;

/// Holder of at most one live [`Broker`].
///
/// `get` builds a broker with the factory when none is held or the held one
/// has been disposed, and otherwise hands back the held instance.
pub struct DefaultBrokerRegistry {
    slot: Mutex<Option<Broker>>,
    factory: fn() -> BrokerResult<Broker>,
}

impl DefaultBrokerRegistry {
    pub const fn new(factory: fn() -> BrokerResult<Broker>) -> Self {
        Self {
            slot: parking_lot::const_mutex(None),
            factory,
        }
    }

    pub fn get(&self) -> BrokerResult<Broker> {
        let mut slot = self.slot.lock();
        if let Some(broker) = slot.as_ref().filter(|broker| !broker.is_disposed()) {
            return Ok(broker.clone());
        }

        if slot.is_some() {
            crate::debug!("Default broker was disposed, creating a new one");
        }
        let broker = (self.factory)()?;
        *slot = Some(broker.clone());
        Ok(broker)
    }
}

static DEFAULT_BROKER: DefaultBrokerRegistry = DefaultBrokerRegistry::new(Broker::init);

/// The process-wide default broker
pub fn default_broker() -> BrokerResult<Broker> {
    DEFAULT_BROKER.get()
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
