//! Concurrency tests: many threads adding and removing bindings on shared
//! paths must never leave more than one active binding per path, and every
//! handler that was set up must be torn down exactly once by the end.

mod common;

use common::{HandlerLog, binding};
use route_arbiter::{RegistrationId, Registry, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const PATHS: [&str; 3] = ["/shared", "/alt", "/third"];
const THREADS: u64 = 8;
const ROUNDS: u64 = 50;

fn assert_at_most_one_active(registry: &Registry<()>) {
    let snapshot = registry.snapshot_status();
    let mut active_per_path: HashMap<&str, usize> = HashMap::new();
    for (_, entry) in snapshot.iter() {
        for (path, code) in &entry.path_to_status {
            if *code == StatusCode::Active {
                *active_per_path.entry(path.as_str()).or_default() += 1;
            }
        }
    }
    for (path, count) in active_per_path {
        assert!(count <= 1, "{count} active bindings on {path}");
    }
}

#[test]
fn test_concurrent_churn_keeps_single_winner() {
    let registry = Registry::new();
    let done = AtomicBool::new(false);

    let logs: Vec<Arc<HandlerLog>> = std::thread::scope(|s| {
        // observer checks the invariant while writers churn
        s.spawn(|| {
            while !done.load(Ordering::SeqCst) {
                assert_at_most_one_active(&registry);
                std::thread::yield_now();
            }
        });

        let writers: Vec<_> = (0..THREADS)
            .map(|t| {
                let registry = &registry;
                s.spawn(move || {
                    let mut logs = Vec::new();
                    for round in 0..ROUNDS {
                        let id = t * 1_000 + round;
                        let ranking = ((id * 7) % 5) as i32;
                        let paths = [PATHS[(id % 3) as usize], PATHS[((id + 1) % 3) as usize]];
                        let (b, p) = binding(id, ranking, &paths);
                        registry.add(b).expect("handlers never fail here");
                        logs.push(p);
                        if round % 2 == 1 {
                            registry.remove(RegistrationId(id - 1), true);
                        }
                    }
                    logs
                })
            })
            .collect();

        let logs = writers
            .into_iter()
            .flat_map(|w| w.join().expect("writer panicked"))
            .collect();
        done.store(true, Ordering::SeqCst);
        logs
    });

    assert_at_most_one_active(&registry);

    // each path has exactly one winner while anything claims it
    for report in registry.path_report() {
        assert_eq!(
            report.candidates.iter().filter(|c| c.status.is_active()).count(),
            1,
            "path {}",
            report.path
        );
        assert!(report.candidates[0].status.is_active());
    }

    registry.clear(true);
    for log in &logs {
        assert_eq!(log.running(), 0);
    }
    assert!(registry.snapshot_status().is_empty());
}

#[test]
fn test_concurrent_adds_pick_highest_ranking() {
    let registry = Registry::new();

    let logs: Vec<(u64, Arc<HandlerLog>)> = std::thread::scope(|s| {
        let handles: Vec<_> = (1..=16u64)
            .map(|id| {
                let registry = &registry;
                s.spawn(move || {
                    let (b, p) = binding(id, (id % 4) as i32, &["/race"]);
                    registry.add(b).unwrap();
                    (id, p)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // ranking 3 is the maximum; lowest id with ranking 3 is 3
    assert_eq!(
        registry.active_registration(Default::default(), "/race"),
        Some(RegistrationId(3))
    );
    for (id, log) in &logs {
        let expected = if *id == 3 { 1 } else { 0 };
        assert_eq!(log.running(), expected, "registration {id}");
    }
}
