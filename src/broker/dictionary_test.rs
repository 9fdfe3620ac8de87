// Tests for Dictionary
// Test cases:
// - Check/suggest against a word list, provider errors surface as ProviderError
// - List mutations swallow provider errors
// - Dispose is idempotent, notifies once, and subscribers observe the disposed state
// - Every operation on a disposed dictionary fails with DisposedUse
// - Information is fetched from the provider once
// - Dropping without dispose frees the native dictionary silently

use super::*;
use crate::provider::mock::{MockProvider, MOCK_PROVIDER};
use std::sync::atomic::{AtomicUsize, Ordering};

fn create_test_dictionary() -> (Arc<MockProvider>, Dictionary) {
    let mock = Arc::new(MockProvider::new());
    let broker = Broker::with_provider(mock.clone()).unwrap();
    let dictionary = broker.request_dictionary("en_US").unwrap();
    (mock, dictionary)
}

// ==================== Spell Checking ====================

#[test]
fn test_check_and_suggest() {
    let (_mock, dictionary) = create_test_dictionary();

    assert!(dictionary.check("hello").unwrap());
    assert!(!dictionary.check("helo").unwrap());

    let suggestions = dictionary.suggest("helo").unwrap();
    assert!(suggestions.contains(&"hello".to_string()));
}

#[test]
fn test_check_negative_result_is_provider_error() {
    let (mock, dictionary) = create_test_dictionary();
    mock.state.lock().check_error = Some("backend crashed".to_string());

    assert_eq!(
        dictionary.check("hello"),
        Err(BrokerError::ProviderError("backend crashed".to_string()))
    );
}

#[test]
fn test_suggest_error_is_provider_error() {
    let (mock, dictionary) = create_test_dictionary();
    mock.state.lock().suggest_error = Some("no suggestions today".to_string());

    assert_eq!(
        dictionary.suggest("helo"),
        Err(BrokerError::ProviderError("no suggestions today".to_string()))
    );
}

#[test]
fn test_empty_word_is_invalid_argument() {
    let (_mock, dictionary) = create_test_dictionary();

    assert_eq!(dictionary.check(""), Err(BrokerError::InvalidArgument("word")));
    assert_eq!(dictionary.add(""), Err(BrokerError::InvalidArgument("word")));
    assert_eq!(
        dictionary.store_replacement("helo", ""),
        Err(BrokerError::InvalidArgument("correction"))
    );
}

// ==================== Word Lists ====================

#[test]
fn test_add_ignores_provider_error() {
    let (mock, dictionary) = create_test_dictionary();

    // The mock reports an error for every add but still records the word
    assert!(dictionary.add("rustacean").is_ok());
    assert!(mock.state.lock().dict_error.values().any(|e| e.contains("rustacean")));
    assert!(dictionary.is_added("rustacean").unwrap());
    assert!(dictionary.check("rustacean").unwrap());
}

#[test]
fn test_session_add_and_remove() {
    let (_mock, dictionary) = create_test_dictionary();

    dictionary.add_to_session("helo").unwrap();
    assert!(dictionary.is_added("helo").unwrap());
    assert!(!dictionary.is_removed("helo").unwrap());

    dictionary.remove_from_session("helo").unwrap();
    assert!(dictionary.is_removed("helo").unwrap());

    dictionary.remove("helo").unwrap();
    dictionary.store_replacement("helo", "hello").unwrap();
}

// ==================== Information ====================

#[test]
fn test_information_is_fetched_once() {
    let (mock, dictionary) = create_test_dictionary();
    let before = mock.state.lock().describe_calls;

    let info = dictionary.information().unwrap();
    assert_eq!(info.language, "en_US");
    assert_eq!(info.provider.name, MOCK_PROVIDER);
    assert_eq!(dictionary.information().unwrap(), info);

    assert_eq!(mock.state.lock().describe_calls, before + 1);
}

// ==================== Disposal ====================

#[test]
fn test_dispose_is_idempotent_and_notifies_once() {
    let (mock, dictionary) = create_test_dictionary();
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = fired.clone();
    dictionary
        .on_disposed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    dictionary.dispose();
    dictionary.dispose();

    assert!(dictionary.is_disposed());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(mock.state.lock().dict_frees, 1);
}

#[test]
fn test_subscriber_observes_disposed_state() {
    let (_mock, dictionary) = create_test_dictionary();
    let observed = Arc::new(Mutex::new(None));

    let slot = observed.clone();
    dictionary
        .on_disposed(move |dictionary| {
            *slot.lock() = Some(dictionary.check("hello"));
        })
        .unwrap();
    dictionary.dispose();

    assert_eq!(
        *observed.lock(),
        Some(Err(BrokerError::DisposedUse("Dictionary")))
    );
}

#[test]
fn test_disposed_dictionary_rejects_every_operation() {
    let (_mock, dictionary) = create_test_dictionary();
    dictionary.dispose();

    let disposed = BrokerError::DisposedUse("Dictionary");
    assert_eq!(dictionary.check("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.suggest("helo"), Err(disposed.clone()));
    assert_eq!(dictionary.add("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.add_to_session("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.remove("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.remove_from_session("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.is_added("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.is_removed("hello"), Err(disposed.clone()));
    assert_eq!(dictionary.store_replacement("helo", "hello"), Err(disposed.clone()));
    assert_eq!(dictionary.information(), Err(disposed.clone()));
    assert_eq!(dictionary.on_disposed(|_| {}), Err(disposed));
}

#[test]
fn test_drop_without_dispose_frees_resource() {
    let (mock, dictionary) = create_test_dictionary();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    dictionary
        .on_disposed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let clone = dictionary.clone();
    drop(dictionary);
    assert_eq!(mock.state.lock().dict_frees, 0);

    drop(clone);
    assert_eq!(mock.state.lock().dict_frees, 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_identity_and_owner() {
    let (_mock, dictionary) = create_test_dictionary();
    let broker = dictionary.broker();

    broker.set_cache_dictionaries(false).unwrap();
    let other = broker.request_dictionary("en_US").unwrap();

    assert_eq!(dictionary, dictionary.clone());
    assert_ne!(dictionary, other);
    assert_eq!(other.broker(), broker);
}
