//! Producer/consumer demo for PopBus
//!
//! Producers publish numbered messages on three topics while a consumer
//! listens on two of them, then drops them one after the other. Counts are
//! printed at the end.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clap::Parser;
use popbus::config::load_config;
use popbus::utils::logging;
use popbus::{Broker, BusError, Message};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "popbus", about = "In-process publish/subscribe demo")]
struct Args {
    /// Messages each producer publishes per topic
    #[arg(long, default_value_t = 100)]
    messages: usize,

    /// Milliseconds the consumer stays on each topic before leaving it
    #[arg(long, default_value_t = 50)]
    listen_ms: u64,

    /// Overrides the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return;
        }
    };
    logging::init(args.log_level.as_deref().unwrap_or(&config.logging.level));

    if let Err(e) = run(Broker::from_settings(&config), &args).await {
        error!("Demo failed: {}", e);
    }
}

async fn run(broker: Broker, args: &Args) -> Result<(), BusError> {
    info!("================ start ================");

    let received = Arc::new(AtomicUsize::new(0));
    let consumer = broker.subscriber()?;
    let counter = Arc::clone(&received);
    consumer.set_handler(move |msg: &Message| {
        let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!(topic = %msg.topic_name, content = %msg.content, count, "consumer got message");
    })?;

    let producer = {
        let broker = broker.clone();
        let messages = args.messages;
        tokio::spawn(async move { produce(broker, messages).await })
    };

    consumer.subscribe("test")?;
    consumer.subscribe("d_test")?;
    tokio::time::sleep(Duration::from_millis(args.listen_ms)).await;
    consumer.unsubscribe("test")?;
    tokio::time::sleep(Duration::from_millis(args.listen_ms)).await;
    consumer.unsubscribe("d_test")?;

    let published = match producer.await {
        Ok(result) => result?,
        Err(e) => {
            error!("producer task failed: {e}");
            0
        }
    };

    consumer.shutdown().await;
    info!(
        published,
        received = received.load(Ordering::Relaxed),
        pooled = broker.pool().size(),
        "================ end ================"
    );
    Ok(())
}

/// Publishes `messages` numbered messages on each demo topic from three producers.
async fn produce(broker: Broker, messages: usize) -> Result<usize, BusError> {
    let producers = [
        broker.subscriber()?,
        broker.subscriber()?,
        broker.subscriber()?,
    ];
    let topics = ["test", "d_test", "c_test"];
    let pool = broker.pool();

    let mut published = 0;
    for i in 0..messages {
        for (producer, topic) in producers.iter().zip(topics) {
            let msg = pool.acquire_with(&i.to_string(), topic);
            if producer.publish(msg.clone())? {
                published += 1;
            }
            pool.release(msg);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    Ok(published)
}
