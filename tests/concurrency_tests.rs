use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use meshpool::{PoolRegistry, RootConfig};

#[test]
fn concurrent_allocations_are_disjoint() {
    let reg = Arc::new(PoolRegistry::new());
    let root = reg
        .create_root(
            RootConfig::new("10.0.0.0/16".parse().unwrap()).prefix_bounds(24, 28, 28),
        )
        .unwrap();

    let threads = num_cpus::get().clamp(2, 8);
    let per_thread = 16;
    let held = Arc::new(Mutex::new(Vec::new()));

    let mut joins = vec![];
    for _ in 0..threads {
        let reg = Arc::clone(&reg);
        let held = Arc::clone(&held);
        joins.push(thread::spawn(move || {
            for _ in 0..per_thread {
                let h = reg
                    .allocate(root, Some(28), None)
                    .expect("pool should not exhaust");
                held.lock().unwrap().push(h);
            }
        }));
    }
    for j in joins {
        j.join().expect("thread failed");
    }

    let held = held.lock().unwrap();
    let networks: HashSet<_> = held.iter().map(|h| h.network).collect();
    assert_eq!(networks.len(), threads * per_thread);
    reg.verify(root).unwrap();

    for h in held.iter() {
        reg.free(h).unwrap();
    }
    assert!(reg.get(root).unwrap().is_leaf());
}

#[test]
fn allocate_free_churn_yields_unique_survivors() {
    let reg = Arc::new(PoolRegistry::new());
    let root = reg
        .create_root(
            RootConfig::new("10.10.0.0/16".parse().unwrap()).prefix_bounds(24, 27, 28),
        )
        .unwrap();

    let workers = num_cpus::get().clamp(2, 10);
    let mut joins = vec![];
    for _ in 0..workers {
        let reg = Arc::clone(&reg);
        joins.push(thread::spawn(move || {
            let first = reg.allocate(root, Some(27), None).expect("allocate");
            reg.free(&first).expect("free");
            reg.allocate(root, Some(27), None).expect("reallocate")
        }));
    }

    let survivors: Vec<_> = joins
        .into_iter()
        .map(|j| j.join().expect("thread failed"))
        .collect();
    let networks: HashSet<_> = survivors.iter().map(|h| h.network).collect();
    assert_eq!(networks.len(), workers);
    reg.verify(root).unwrap();
}

#[test]
fn disjoint_roots_proceed_independently() {
    let reg = Arc::new(PoolRegistry::new());
    let roots = [
        reg.create_root(
            RootConfig::new("10.1.0.0/16".parse().unwrap()).prefix_bounds(24, 27, 28),
        )
        .unwrap(),
        reg.create_root(
            RootConfig::new("10.2.0.0/16".parse().unwrap()).prefix_bounds(24, 27, 28),
        )
        .unwrap(),
    ];

    let mut joins = vec![];
    for (i, root) in roots.iter().copied().enumerate() {
        let reg = Arc::clone(&reg);
        joins.push(thread::spawn(move || {
            let mut held = vec![];
            for _ in 0..32 {
                held.push(reg.allocate(root, None, None).expect("allocate"));
            }
            if i == 0 {
                for h in &held {
                    reg.free(h).expect("free");
                }
            }
            held.len()
        }));
    }
    for j in joins {
        assert_eq!(j.join().expect("thread failed"), 32);
    }

    reg.verify(roots[0]).unwrap();
    reg.verify(roots[1]).unwrap();
    assert!(reg.get(roots[0]).unwrap().is_leaf());
    assert!(!reg.get(roots[1]).unwrap().is_leaf());
}
