use std::{sync::Arc, time::Duration};

use timer_keeper::{
    state::{Category, TimerEngine},
    storage::{MemoryStore, TimerRepository},
};

async fn engine() -> Arc<TimerEngine> {
    TimerEngine::load(TimerRepository::new(Arc::new(MemoryStore::new()))).await
}

#[tokio::test(start_paused = true)]
async fn scheduler_ticks_once_per_period() {
    let engine = engine().await;
    let id = engine.create("Focus", 5, Category::Study).unwrap().id;
    engine.toggle(&id);

    assert!(engine.start_ticker(Duration::from_secs(1)).await);
    assert!(!engine.start_ticker(Duration::from_secs(1)).await);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.get(&id).unwrap().remaining_seconds, 3);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let timer = engine.get(&id).unwrap();
    assert_eq!(timer.remaining_seconds, 0);
    assert!(!timer.is_running);

    engine.shutdown().await;
    assert_eq!(engine.history().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_ticks_after_shutdown() {
    let engine = engine().await;
    let id = engine.create("Long", 100, Category::Workout).unwrap().id;
    engine.toggle(&id);
    engine.start_ticker(Duration::from_secs(1)).await;

    tokio::time::sleep(Duration::from_millis(3500)).await;
    engine.shutdown().await;
    let remaining = engine.get(&id).unwrap().remaining_seconds;
    assert_eq!(remaining, 97);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.get(&id).unwrap().remaining_seconds, remaining);
    assert!(engine.get(&id).unwrap().is_running);
}

#[tokio::test(start_paused = true)]
async fn ticker_can_restart_after_shutdown() {
    let engine = engine().await;
    let id = engine.create("Nap", 20, Category::Break).unwrap().id;
    engine.toggle(&id);

    engine.start_ticker(Duration::from_secs(1)).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    engine.shutdown().await;

    assert!(engine.start_ticker(Duration::from_secs(1)).await);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    engine.shutdown().await;

    assert_eq!(engine.get(&id).unwrap().remaining_seconds, 17);
}
