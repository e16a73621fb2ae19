//! Concurrency tests for `par_timer`.
//!
//! Producers and readers run on many threads at once. Whatever the interleaving, every
//! completed recording must show up exactly once after the final read.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use par_timer::{Record, RemoteTimer, Timer};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn assert_unique_names(rows: &[Record], expected: usize) {
    let names: HashSet<&str> = rows.iter().map(Record::name).collect();

    assert_eq!(rows.len(), expected, "wrong number of rows");
    assert_eq!(names.len(), expected, "duplicate rows");
}

#[test]
fn single_sleeping_call_is_timed() {
    let timer = Timer::new();

    timer.record("a", || thread::sleep(Duration::from_secs(1)));
    timer.synchronize();

    let rows = timer.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name(), "a");
    assert!(rows[0].time_seconds() >= 1.0);
    assert!(rows[0].time_seconds() < 2.0, "scheduler slack exceeded");
    assert!(rows[0].gc_time_seconds() <= rows[0].time_seconds());
}

#[test]
fn panicking_call_adds_no_row() {
    let timer = Timer::new();
    timer.record("before", || ());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        timer.record("panics", || panic!("work failed"));
    }));

    assert!(result.is_err());
    let rows = timer.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name(), "before");
}

#[test]
fn each_thread_records_with_its_own_thread_id() {
    let timer = Timer::new();

    thread::scope(|s| {
        for i in 0..10 {
            let timer = &timer;
            s.spawn(move || timer.record(format!("worker {i}"), || ()));
        }
    });

    let rows = timer.rows();
    assert_unique_names(&rows, 10);

    let thread_ids: HashSet<i64> = rows.iter().map(Record::thread_id).collect();
    assert_eq!(thread_ids.len(), 10);
}

#[test]
fn randomized_producers_and_readers() {
    const SEEDS: u64 = 8;
    const PRODUCERS: u64 = 6;
    const READERS: u64 = 3;

    for seed in 0..SEEDS {
        let timer = Timer::new();
        let mut rng = SmallRng::seed_from_u64(seed);

        let plan: Vec<(u64, u32)> = (0..PRODUCERS)
            .map(|_| (rng.random_range(1..200), rng.random_range(0..4)))
            .collect();
        let expected: u64 = plan.iter().map(|(calls, _)| calls).sum();

        thread::scope(|s| {
            for (producer, (calls, yield_every)) in plan.iter().copied().enumerate() {
                let timer = &timer;
                s.spawn(move || {
                    for call in 0..calls {
                        timer.record(format!("{producer}-{call}"), || {
                            if yield_every != 0 && call % u64::from(yield_every) == 0 {
                                thread::yield_now();
                            }
                        });
                    }
                });
            }

            for reader in 0..READERS {
                let timer = &timer;
                s.spawn(move || {
                    let mut rng = SmallRng::seed_from_u64(seed * 100 + reader);
                    let mut seen = 0;

                    for _ in 0..rng.random_range(10..50) {
                        if rng.random_bool(0.5) {
                            timer.synchronize();
                        } else {
                            let rows = timer.rows();
                            // Reads never go backwards.
                            assert!(rows.len() >= seen);
                            seen = rows.len();
                        }
                        thread::yield_now();
                    }
                });
            }
        });

        assert_unique_names(
            &timer.rows(),
            usize::try_from(expected).expect("test sizes fit into usize"),
        );
    }
}

#[test]
fn remote_producers_on_threads_interleave_with_local_ones() {
    const THREADS: usize = 4;
    const CALLS: usize = 50;

    let timer = Timer::new();
    let handle = timer.remote_handle().unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let timer = &timer;
            s.spawn(move || {
                let remote = RemoteTimer::connect(&handle).unwrap();
                for call in 0..CALLS {
                    remote.record(format!("remote {t}-{call}"), || ()).unwrap();
                    timer.record(format!("local {t}-{call}"), || ());
                }
            });
        }

        let timer = &timer;
        s.spawn(move || {
            for _ in 0..20 {
                timer.synchronize();
                thread::yield_now();
            }
        });
    });

    assert_unique_names(&timer.rows(), THREADS * CALLS * 2);
}

#[test]
fn shared_remote_timer_across_threads() {
    const THREADS: usize = 4;
    const CALLS: usize = 25;

    let timer = Timer::new();
    let remote = RemoteTimer::connect(&timer.remote_handle().unwrap()).unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let remote = &remote;
            s.spawn(move || {
                for call in 0..CALLS {
                    remote.record(format!("{t}-{call}"), || ()).unwrap();
                }
            });
        }
    });

    assert_unique_names(&timer.rows(), THREADS * CALLS);
}
