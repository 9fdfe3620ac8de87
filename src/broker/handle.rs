// Owned wrappers around provider resources
// Each frees its native resource exactly once, on release() or drop

use parking_lot::Mutex;
use std::sync::Arc;

use crate::provider::{Provider, RawBroker, RawDict};

/// Owned provider broker resource.
pub(crate) struct BrokerResource {
    provider: Arc<dyn Provider>,
    raw: RawBroker,
    /// Held while freeing so a dictionary release cannot interleave with it
    released: Mutex<bool>,
}

impl BrokerResource {
    pub fn new(provider: Arc<dyn Provider>, raw: RawBroker) -> Self {
        Self {
            provider,
            raw,
            released: Mutex::new(false),
        }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn raw(&self) -> RawBroker {
        self.raw
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock()
    }

    /// Free the native broker. Subsequent calls are no-ops.
    pub fn release(&self) {
        let mut released = self.released.lock();
        if *released {
            return;
        }
        *released = true;
        crate::trace!("Freeing broker resource {:?}", self.raw);
        self.provider.broker_free(self.raw);
    }
}

impl Drop for BrokerResource {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for BrokerResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerResource")
            .field("raw", &self.raw)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Owned provider dictionary resource.
///
/// Keeps the broker resource it was requested from alive. When that broker
/// has already been freed, the provider reclaimed the dictionary along with
/// it and releasing skips the native call.
pub(crate) struct DictResource {
    broker: Arc<BrokerResource>,
    raw: RawDict,
    released: Mutex<bool>,
}

impl DictResource {
    pub fn new(broker: Arc<BrokerResource>, raw: RawDict) -> Self {
        Self {
            broker,
            raw,
            released: Mutex::new(false),
        }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.broker.provider()
    }

    pub fn raw(&self) -> RawDict {
        self.raw
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock()
    }

    /// Whether the broker resource this dictionary came from has been freed
    pub fn is_orphaned(&self) -> bool {
        self.broker.is_released()
    }

    /// Free the native dictionary. Subsequent calls are no-ops.
    pub fn release(&self) {
        let mut released = self.released.lock();
        if *released {
            return;
        }
        *released = true;

        let broker_released = self.broker.released.lock();
        if *broker_released {
            crate::trace!(
                "Broker {:?} already freed, dictionary {:?} was reclaimed with it",
                self.broker.raw,
                self.raw
            );
            return;
        }
        crate::trace!("Freeing dictionary resource {:?}", self.raw);
        self.broker.provider.broker_free_dict(self.broker.raw, self.raw);
    }
}

impl Drop for DictResource {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for DictResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictResource")
            .field("raw", &self.raw)
            .field("broker", &self.broker.raw)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_test.rs"]
mod tests;
