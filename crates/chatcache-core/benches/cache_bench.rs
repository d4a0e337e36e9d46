//! Cache hit vs store read benchmarks for chatcache-core
//!
//! Run with:
//! ```bash
//! cargo bench --bench cache_bench
//! ```

use chatcache_core::{CacheProxy, ChatId, ChatStore, UserId};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

/// Store with `chats` chats of `messages` messages each, users 1..=10 spread across them
fn populated_store(chats: u64, messages: u64) -> (Arc<ChatStore>, Vec<ChatId>) {
    let store = Arc::new(ChatStore::with_defaults());
    let ids: Vec<ChatId> = (0..chats)
        .map(|i| {
            let chat = store
                .create_chat([UserId::new(i % 10 + 1), UserId::new((i + 3) % 10 + 1)])
                .unwrap();
            for m in 0..messages {
                store
                    .send_message(chat, UserId::new(i % 10 + 1), format!("message {}", m))
                    .unwrap();
            }
            chat
        })
        .collect();
    (store, ids)
}

fn bench_get_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_messages");

    for messages in [10u64, 1_000] {
        let (store, ids) = populated_store(16, messages);
        let chat = ids[0];
        let proxy = CacheProxy::with_defaults(Arc::clone(&store));
        proxy.get_messages(chat).unwrap();

        group.bench_with_input(BenchmarkId::new("store", messages), &chat, |b, &chat| {
            b.iter(|| black_box(store.get_messages(chat).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("cache_hit", messages), &chat, |b, &chat| {
            b.iter(|| black_box(proxy.get_messages(chat).unwrap()))
        });
    }

    group.finish();
}

fn bench_get_user_chats(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_user_chats");

    for chats in [100u64, 5_000] {
        let (store, _) = populated_store(chats, 1);
        let proxy = CacheProxy::with_defaults(Arc::clone(&store));
        let user = UserId::new(1);
        proxy.get_user_chats(user);

        group.bench_with_input(BenchmarkId::new("full_scan", chats), &user, |b, &user| {
            b.iter(|| black_box(store.get_user_chats(user)))
        });

        group.bench_with_input(BenchmarkId::new("cache_hit", chats), &user, |b, &user| {
            b.iter(|| black_box(proxy.get_user_chats(user)))
        });
    }

    group.finish();
}

fn bench_send_invalidate_read(c: &mut Criterion) {
    let (store, ids) = populated_store(1, 100);
    let chat = ids[0];
    let proxy = CacheProxy::with_defaults(store);

    c.bench_function("send_then_read", |b| {
        b.iter(|| {
            proxy.send_message(chat, UserId::new(1), "bench").unwrap();
            black_box(proxy.get_messages(chat).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_get_messages,
    bench_get_user_chats,
    bench_send_invalidate_read
);
criterion_main!(benches);
