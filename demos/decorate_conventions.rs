use futures_util::stream::StreamExt;
use std::convert::Infallible;
use std::time::Duration;
use stream_decorators::*;
use tokio::runtime::Runtime;

fn main() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        // An error-first lookup, as a file system or database driver would offer it
        let lookup = node_callback(|user: &'static str, done: NodeCallback<u32>| {
            match user {
                "alice" => done.resolve(120),
                "bob" => done.resolve(45),
                other => done.reject(format!("unknown user {}", other)),
            }
        });

        for user in ["alice", "bob", "mallory"] {
            match lookup(user).next().await {
                Some(Ok(seconds)) => println!("{} spent {} seconds", user, seconds),
                Some(Err(e)) => println!("lookup failed: {}", e),
                None => println!("no answer for {}", user),
            }
        }

        // Let auto pick the stream shape from whatever the function returns
        let split = auto(|line: &'static str| line.split(',').map(str::to_owned).collect::<Vec<_>>());
        let fields = split("id,name,score").collect::<Vec<_>>().await;
        println!("Fields: {:?}", fields);

        // Events keep flowing until unsubscribed
        let hub = EventHub::<String>::new();
        let source = hub.clone();
        let messages = event(move |_: ()| source.clone(), "message", None);
        let (tx, mut inbox) = futures::channel::mpsc::unbounded();
        let listening = subscribe(
            messages(()),
            move |message: String| {
                let _ = tx.unbounded_send(message);
            },
            |e| println!("inbox failed: {}", e),
        );
        hub.emit_value("message", "hello".to_string());
        hub.emit_value("message", "world".to_string());
        for _ in 0..2 {
            if let Some(message) = inbox.next().await {
                println!("Received: {}", message);
            }
        }
        listening.unsubscribe();
        listening.closed().await;
        println!("Listeners left after unsubscribe: {}", hub.listener_count("message"));

        // Timed generators
        let countdown = sequentially(Duration::from_millis(100), |from: u32| {
            Ok::<_, Infallible>((1..=from).rev().collect::<Vec<_>>())
        });
        let mut ticks = countdown(3);
        while let Some(Ok(n)) = ticks.next().await {
            println!("T-minus {}", n);
        }

        let heartbeat = interval(Duration::from_millis(50), |name: &'static str| {
            Ok::<_, Infallible>(name)
        });
        let beats = heartbeat("ping").take(3).collect::<Vec<_>>().await;
        println!("Heartbeats: {:?}", beats);

        let delayed = later(Duration::from_millis(20), |x: i32| Ok::<_, Infallible>(x * 10));
        let subscription = subscribe(
            delayed(7),
            |value| println!("Delayed value: {}", value),
            |_| {},
        );
        subscription.unsubscribe();
        subscription.closed().await;
        println!("Unsubscribed before the delayed value fired");
    });
}
