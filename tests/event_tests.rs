use futures_util::stream::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use stream_decorators::*;

/// Poll once so the listener is attached, like subscribing before emitting
async fn attach<O>(stream: &mut DecoratedStream<O>) {
    assert!(futures::poll!(stream.next()).is_pending());
}

#[tokio::test]
async fn test_event_stream_from_event_source() {
    let hub = EventHub::<String>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut stream = test(());
    attach(&mut stream).await;

    hub.emit_value("data", "3".to_string());
    hub.emit_value("data", "4".to_string());
    hub.emit_value("stop", "5".to_string());

    let values = stream
        .by_ref()
        .take(2)
        .scan(Vec::new(), |acc, item| {
            acc.push(item.unwrap());
            futures::future::ready(Some(acc.clone()))
        })
        .collect::<Vec<_>>()
        .await;
    assert_eq!(values.last(), Some(&vec!["3".to_string(), "4".to_string()]));
}

#[tokio::test]
async fn test_event_stream_transforms_payload() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let double: Transform<i32> = Arc::new(|a| a * 2);
    let test = event(move |_: ()| source.clone(), "data", Some(double));

    let mut stream = test(());
    attach(&mut stream).await;

    hub.emit_value("data", 1);
    hub.emit_value("data", 2);

    assert_eq!(stream.next().await, Some(Ok(2)));
    assert_eq!(stream.next().await, Some(Ok(4)));
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_never_ends_on_its_own() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut stream = test(());
    attach(&mut stream).await;
    hub.emit_value("data", 1);
    assert_eq!(stream.next().await, Some(Ok(1)));

    let waited = tokio::time::timeout(Duration::from_secs(60), stream.next()).await;
    assert!(waited.is_err(), "event stream must stay open until dropped");
}

#[tokio::test]
async fn test_event_listener_removed_when_stream_dropped() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut first = test(());
    let mut second = test(());
    attach(&mut first).await;
    attach(&mut second).await;
    assert_eq!(hub.listener_count("data"), 2);

    drop(first);
    assert_eq!(hub.listener_count("data"), 1);
    assert_eq!(hub.emit_value("data", 9), 1);
    assert_eq!(second.next().await, Some(Ok(9)));

    drop(second);
    assert_eq!(hub.listener_count("data"), 0);
    assert_eq!(hub.emit_value("data", 10), 0);
}

#[tokio::test]
async fn test_event_listener_attached_on_first_poll_only() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut stream = test(());
    assert_eq!(hub.listener_count("data"), 0);
    attach(&mut stream).await;
    assert_eq!(hub.listener_count("data"), 1);
}

#[tokio::test]
async fn test_event_uses_first_payload_argument() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut stream = test(());
    attach(&mut stream).await;

    hub.emit("data", &[]);
    hub.emit("data", &[7, 8, 9]);

    assert_eq!(stream.next().await, Some(Ok(7)));
}

#[tokio::test]
async fn test_event_map_changes_payload_type() {
    let hub = EventHub::<u32>::new();
    let source = hub.clone();
    let test = event_map(move |_: ()| source.clone(), "bytes", |n: u32| format!("{n} bytes"));

    let mut stream = test(());
    attach(&mut stream).await;
    hub.emit_value("bytes", 512);

    assert_eq!(stream.next().await, Some(Ok("512 bytes".to_string())));
}

#[tokio::test]
async fn test_event_emitted_from_another_thread() {
    let hub = EventHub::<i32>::new();
    let source = hub.clone();
    let test = event(move |_: ()| source.clone(), "data", None);

    let mut stream = test(());
    attach(&mut stream).await;

    let producer = hub.clone();
    std::thread::spawn(move || {
        for i in 0..5 {
            producer.emit_value("data", i);
        }
    })
    .join()
    .unwrap();

    let values = stream.take(5).map(|item| item.unwrap()).collect::<Vec<_>>().await;
    assert_eq!(values, vec![0, 1, 2, 3, 4]);
}
