use futures_util::stream::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stream_decorators::*;
use tokio::runtime::Runtime;

fn counting_release(counter: &Arc<AtomicUsize>) -> Release {
    let counter = counter.clone();
    Release::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_from_emitter_subscribes_lazily() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let subscribed = Arc::new(AtomicBool::new(false));
        let flag = subscribed.clone();
        let stream = from_emitter(move |emitter| {
            flag.store(true, Ordering::SeqCst);
            emitter.push(1);
            emitter.end();
            Release::noop()
        });

        assert!(!subscribed.load(Ordering::SeqCst));
        let result = stream.collect::<Vec<_>>().await;
        assert!(subscribed.load(Ordering::SeqCst));
        assert_eq!(result, vec![Ok(1)]);
    });
}

#[test]
fn test_from_emitter_preserves_push_order() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let stream = from_emitter(|emitter| {
            for i in 0..100 {
                emitter.push(i);
            }
            emitter.end();
            Release::noop()
        });

        let result: Vec<i32> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(result, (0..100).collect::<Vec<_>>());
    });
}

#[test]
fn test_release_runs_once_on_end() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let released = Arc::new(AtomicUsize::new(0));
        let release = counting_release(&released);
        let mut stream = from_emitter(move |emitter| {
            emitter.push("a");
            emitter.end();
            release
        });

        assert_eq!(stream.next().await, Some(Ok("a")));
        assert_eq!(released.load(Ordering::SeqCst), 0);
        assert_eq!(stream.next().await, None);
        assert_eq!(released.load(Ordering::SeqCst), 1);

        // Polling past the end and dropping does not release twice
        assert_eq!(stream.next().await, None);
        drop(stream);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn test_error_is_terminal_and_releases() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let released = Arc::new(AtomicUsize::new(0));
        let release = counting_release(&released);
        let stream = from_emitter(move |emitter| {
            emitter.push(1);
            emitter.push_error(StreamError::failed("broken pipe"));
            // Ignored after the error
            assert!(!emitter.push(2));
            release
        });

        let result = stream.collect::<Vec<_>>().await;
        assert_eq!(
            result,
            vec![Ok(1), Err(StreamError::Failed("broken pipe".to_string()))]
        );
        assert_eq!(released.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn test_release_runs_when_dropped_early() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let released = Arc::new(AtomicUsize::new(0));
        let release = counting_release(&released);
        let held: Arc<Mutex<Option<Emitter<u32>>>> = Arc::new(Mutex::new(None));
        let slot = held.clone();
        let mut stream = from_emitter(move |emitter| {
            *slot.lock().unwrap() = Some(emitter);
            release
        });

        assert!(futures::poll!(stream.next()).is_pending());
        let emitter = held.lock().unwrap().take().unwrap();
        assert!(emitter.push(1));
        assert_eq!(stream.next().await, Some(Ok(1)));

        drop(stream);
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(emitter.is_closed());
        assert!(!emitter.push(2));
    });
}

#[test]
fn test_unpolled_stream_never_subscribes() {
    let subscribed = Arc::new(AtomicBool::new(false));
    let flag = subscribed.clone();
    let stream = from_emitter::<i32, _>(move |_emitter| {
        flag.store(true, Ordering::SeqCst);
        Release::noop()
    });

    drop(stream);
    assert!(!subscribed.load(Ordering::SeqCst));
}

#[test]
fn test_emitter_push_from_other_threads() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let stream = from_emitter(|emitter: Emitter<usize>| {
            let workers: Vec<_> = (0..4)
                .map(|worker| {
                    let emitter = emitter.clone();
                    std::thread::spawn(move || {
                        for i in 0..25 {
                            emitter.push(worker * 100 + i);
                        }
                    })
                })
                .collect();
            std::thread::spawn(move || {
                for worker in workers {
                    worker.join().unwrap();
                }
                emitter.end();
            });
            Release::noop()
        });

        let mut result: Vec<usize> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(result.len(), 100);
        result.sort_unstable();
        result.dedup();
        assert_eq!(result.len(), 100);
    });
}

#[test]
fn test_release_run_is_idempotent() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut release = counting_release(&released);

    assert!(!release.is_spent());
    release.run();
    release.run();
    assert!(release.is_spent());
    drop(release);
    assert_eq!(released.load(Ordering::SeqCst), 1);

    let noop = Release::noop();
    assert!(noop.is_spent());
}
