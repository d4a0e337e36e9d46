//! Integration tests for cache/store consistency through the public API

use chatcache_core::{CacheProxy, ChatId, ChatStore, CoreError, PinOutcome, UserId};
use std::sync::Arc;

fn setup() -> (Arc<ChatStore>, CacheProxy) {
    let store = Arc::new(ChatStore::with_defaults());
    let proxy = CacheProxy::with_defaults(Arc::clone(&store));
    (store, proxy)
}

fn u(id: u64) -> UserId {
    UserId::new(id)
}

#[test]
fn test_full_scenario() {
    let (store, proxy) = setup();

    let chat = store.create_chat([u(1), u(2)]).unwrap();
    let m1 = proxy.send_message(chat, u(1), "hi").unwrap();

    let messages = proxy.get_messages(chat).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id(), m1);
    assert_eq!(messages[0].content(), "hi");

    assert_eq!(proxy.pin_message(chat, m1), PinOutcome::Pinned);
    let pinned: Vec<_> = proxy.list_pinned(chat).unwrap().iter().map(|m| m.id()).collect();
    assert_eq!(pinned, vec![m1]);

    assert_eq!(proxy.pin_message(chat, m1), PinOutcome::AlreadyPinned);
    let pinned: Vec<_> = proxy.list_pinned(chat).unwrap().iter().map(|m| m.id()).collect();
    assert_eq!(pinned, vec![m1]);
}

#[test]
fn test_send_then_read_on_cold_cache() {
    let (store, proxy) = setup();
    let chat = store.create_chat([u(1)]).unwrap();
    store.send_message(chat, u(1), "older").unwrap();

    let m = proxy.send_message(chat, u(1), "newest").unwrap();
    let messages = proxy.get_messages(chat).unwrap();

    assert_eq!(proxy.stats().misses, 1);
    assert_eq!(messages.last().unwrap().id(), m);
    assert_eq!(messages.last().unwrap().content(), "newest");
}

#[test]
fn test_read_send_read_reflects_write() {
    let (store, proxy) = setup();
    let chat = store.create_chat([u(1), u(2)]).unwrap();

    let warm = proxy.get_messages(chat).unwrap();
    assert!(warm.is_empty());

    let m = proxy.send_message(chat, u(2), "fresh").unwrap();
    let messages = proxy.get_messages(chat).unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id(), m);
    assert_eq!(proxy.stats().misses, 2);
}

#[test]
fn test_send_to_one_chat_leaves_other_alone() {
    let (store, proxy) = setup();
    let a = store.create_chat([u(1), u(2)]).unwrap();
    let b = store.create_chat([u(1), u(3)]).unwrap();
    proxy.send_message(b, u(3), "b-history").unwrap();

    let b_before = proxy.get_messages(b).unwrap();
    proxy.get_messages(a).unwrap();

    proxy.send_message(a, u(1), "only in a").unwrap();

    let b_after = proxy.get_messages(b).unwrap();
    assert!(Arc::ptr_eq(&b_before, &b_after), "chat B entry must survive");
    assert_eq!(store.get_messages(b).unwrap().len(), 1);
    assert_eq!(store.get_messages(a).unwrap().len(), 1);

    let stats = proxy.stats();
    assert_eq!(stats.cached_chats, 1, "only chat B stays cached");
    assert_eq!(stats.invalidations, 1);

    let misses = stats.misses;
    let a_after = proxy.get_messages(a).unwrap();
    assert_eq!(a_after.len(), 1);
    assert_eq!(a_after[0].content(), "only in a");
    assert_eq!(proxy.stats().misses, misses + 1, "chat A must be refetched");
}

#[test]
fn test_unknown_chat_fails_everywhere() {
    let (store, proxy) = setup();
    let never = ChatId::new(31337);

    assert!(matches!(
        store.get_messages(never),
        Err(CoreError::ChatNotFound { chat_id }) if chat_id == never
    ));
    assert!(matches!(
        proxy.get_messages(never),
        Err(CoreError::ChatNotFound { chat_id }) if chat_id == never
    ));
    assert!(proxy.list_pinned(never).unwrap_err().is_not_found());
    assert_eq!(
        proxy.pin_message(never, chatcache_core::MessageId::new(1)),
        PinOutcome::ChatNotFound
    );
}

#[test]
fn test_pin_unknown_message_is_noop() {
    let (store, proxy) = setup();
    let chat = store.create_chat([u(1)]).unwrap();
    let m = proxy.send_message(chat, u(1), "real").unwrap();

    let bogus = chatcache_core::MessageId::new(m.get() + 100);
    assert_eq!(proxy.pin_message(chat, bogus), PinOutcome::MessageNotFound);
    assert!(proxy.list_pinned(chat).unwrap().is_empty());
}

#[test]
fn test_dropping_proxy_loses_nothing() {
    let (store, proxy) = setup();
    let chat = proxy.create_chat([u(1)]).unwrap();
    proxy.send_message(chat, u(1), "persisted in store").unwrap();
    proxy.get_messages(chat).unwrap();
    drop(proxy);

    let fresh = CacheProxy::with_defaults(Arc::clone(&store));
    let messages = fresh.get_messages(chat).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(fresh.stats().misses, 1);
}

#[test]
fn test_proxies_share_one_store() {
    let (store, first) = setup();
    let second = CacheProxy::with_defaults(Arc::clone(&store));

    let chat = first.create_chat([u(1), u(2)]).unwrap();
    second.send_message(chat, u(2), "via second").unwrap();

    assert_eq!(first.get_messages(chat).unwrap().len(), 1);
    assert_eq!(second.get_user_chats(u(1)).len(), 1);
}
