#[cfg(test)]
mod tests {
    use fifo_pool::{PoolError, WorkerPool};
    use futures::future;
    use std::{
        future::Future,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::{Duration, Instant},
    };

    async fn measure<F, Fut, T>(name: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let start = Instant::now();
        let result = f().await;
        println!("✓ {}: {:?}", name, start.elapsed());
        result
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn load_test_1_sleepers_run_in_parallel() {
        println!("\n=== LOAD TEST 1: 8 x 100ms on 4 workers ===");
        let pool = WorkerPool::new(4);

        let start = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                pool.submit(move || {
                    std::thread::sleep(Duration::from_millis(100));
                    i
                })
                .expect("pool is open")
            })
            .collect();
        let results = future::join_all(handles).await;
        let elapsed = start.elapsed();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.is_ok()));
        // Two waves of four sleepers; a single lane would need 800ms.
        assert!(elapsed >= Duration::from_millis(195), "took {elapsed:?}");
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");

        pool.shutdown().await;
        println!("  elapsed: {elapsed:?}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn load_test_2_ten_thousand_small_tasks() {
        println!("\n=== LOAD TEST 2: 10k small tasks ===");
        let pool = WorkerPool::new(4);

        let handles = measure("submit 10k", || async {
            (0..10_000u64)
                .map(|i| pool.submit(move || i * 2).expect("pool is open"))
                .collect::<Vec<_>>()
        })
        .await;

        let results = measure("collect 10k", || future::join_all(handles)).await;

        assert_eq!(results.len(), 10_000);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result, Ok(i as u64 * 2));
        }

        let metrics = pool.metrics();
        println!("  completed: {}", metrics.completed_tasks);
        assert_eq!(metrics.completed_tasks, 10_000);
        pool.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn load_test_3_order_holds_under_backlog() {
        println!("\n=== LOAD TEST 3: 2k tasks, one worker, strict order ===");
        let pool = WorkerPool::new(1);
        let order = Arc::new(Mutex::new(Vec::with_capacity(2_000)));

        let handles: Vec<_> = (0..2_000u32)
            .map(|i| {
                let order = Arc::clone(&order);
                pool.submit(move || order.lock().unwrap().push(i))
                    .expect("pool is open")
            })
            .collect();

        measure("drain 2k through one worker", || future::join_all(handles)).await;

        let seen = order.lock().unwrap();
        assert_eq!(seen.len(), 2_000);
        assert!(
            seen.windows(2).all(|pair| pair[0] < pair[1]),
            "pickup must follow submission order"
        );
        drop(seen);
        pool.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn load_test_4_drain_shutdown_under_load() {
        println!("\n=== LOAD TEST 4: shutdown with 1k tasks in flight ===");
        let pool = WorkerPool::new(4);

        let handles: Vec<_> = (0..1_000u32)
            .map(|i| {
                pool.submit(move || {
                    std::thread::sleep(Duration::from_micros(200));
                    i
                })
                .expect("pool is open")
            })
            .collect();

        measure("drain shutdown", || pool.shutdown()).await;

        // Shutdown returned only after the backlog ran dry.
        let metrics = pool.metrics();
        assert_eq!(metrics.queued_tasks, 0);
        assert_eq!(metrics.running_tasks, 0);
        assert_eq!(metrics.completed_tasks, 1_000);

        let results = future::join_all(handles).await;
        assert!(results.into_iter().all(|r| r.is_ok()));
        assert_eq!(pool.submit(|| 0).err(), Some(PoolError::Closed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn load_test_5_panic_storm() {
        println!("\n=== LOAD TEST 5: 1k tasks, every tenth panics ===");
        std::panic::set_hook(Box::new(|_| {}));

        let pool = WorkerPool::new(4);
        let handles: Vec<_> = (0..1_000u32)
            .map(|i| {
                pool.submit(move || {
                    if i % 10 == 0 {
                        panic!("intentional panic at {i}");
                    }
                    i
                })
                .expect("pool is open")
            })
            .collect();

        let results = measure("1k tasks (10% panic)", || future::join_all(handles)).await;

        let successful = results.iter().filter(|r| r.is_ok()).count();
        let panicked = results
            .iter()
            .filter(|r| matches!(r, Err(PoolError::Panicked(_))))
            .count();
        assert_eq!(successful, 900);
        assert_eq!(panicked, 100);

        let metrics = pool.metrics();
        println!("  pool success rate: {:.1}%", metrics.success_rate() * 100.0);
        assert_eq!(metrics.completed_tasks, 900);
        assert_eq!(metrics.panicked_tasks, 100);

        pool.shutdown().await;
        let _ = std::panic::take_hook();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn load_test_6_many_submitters() {
        println!("\n=== LOAD TEST 6: 8 submitters x 500 tasks ===");
        let pool = Arc::new(WorkerPool::new(4));
        let counter = Arc::new(AtomicUsize::new(0));

        let total = measure("8 x 500 interleaved submits", || async {
            let submitters: Vec<_> = (0..8)
                .map(|_| {
                    let pool = Arc::clone(&pool);
                    let counter = Arc::clone(&counter);
                    tokio::spawn(async move {
                        let handles: Vec<_> = (0..500)
                            .map(|_| {
                                let counter = Arc::clone(&counter);
                                pool.submit(move || {
                                    counter.fetch_add(1, Ordering::Relaxed);
                                })
                                .expect("pool is open")
                            })
                            .collect();
                        future::join_all(handles).await.len()
                    })
                })
                .collect();

            let mut total = 0;
            for submitter in submitters {
                total += submitter.await.expect("submitter finished");
            }
            total
        })
        .await;

        assert_eq!(total, 4_000);
        assert_eq!(counter.load(Ordering::Relaxed), 4_000);
        assert_eq!(pool.metrics().completed_tasks, 4_000);
        pool.shutdown().await;
        println!("  throughput verified: 4000/4000");
    }
}
