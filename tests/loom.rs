#![allow(missing_docs)]
#![cfg(feature = "loom")]

use loom::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use taskpool::{
    manager::{Manager, Phase},
    task::Task,
};

fn model(f: impl Fn() + Sync + Send + 'static) {
    let mut builder = loom::model::Builder::new();
    builder.preemption_bound = Some(2);
    builder.check(f);
}

#[derive(Clone)]
struct Runs(Arc<Vec<AtomicUsize>>);

impl Runs {
    fn new(capacity: usize) -> Self {
        Self(Arc::new((0..capacity).map(|_| AtomicUsize::new(0)).collect()))
    }

    fn hit(&self, idx: usize) {
        self.0[idx].fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self, idx: usize) -> usize {
        self.0[idx].load(Ordering::Relaxed)
    }
}

#[test]
fn loom_diamond_runs_each_task_once_and_in_order() {
    model(|| {
        // Graph:
        //   A     B
        //    \   /
        //      C
        //      |
        //      D
        let runs = Runs::new(4);
        let manager = Manager::with_workers(2);

        let a = Task::make({
            let runs = runs.clone();
            move || runs.hit(0)
        });
        let b = Task::make({
            let runs = runs.clone();
            move || runs.hit(1)
        });
        let c = Task::make_after(
            {
                let runs = runs.clone();
                move || {
                    // Both parents must be fully visible here.
                    assert_eq!(runs.get(0), 1);
                    assert_eq!(runs.get(1), 1);
                    runs.hit(2);
                }
            },
            &manager,
            [a.task(), b.task()],
        );
        let d = Task::make_after(
            {
                let runs = runs.clone();
                move || {
                    assert_eq!(runs.get(2), 1);
                    runs.hit(3);
                    1111
                }
            },
            &manager,
            [c.task()],
        );

        manager.push((&a, &b));
        assert_eq!(d.result().unwrap(), 1111);
        manager.join();

        for idx in 0..4 {
            assert_eq!(runs.get(idx), 1);
        }
    });
}

#[test]
fn loom_direct_push_racing_resolution_runs_once() {
    model(|| {
        let runs = Runs::new(2);
        let manager = Manager::with_workers(1);

        let a = Task::make({
            let runs = runs.clone();
            move || runs.hit(0)
        });
        let c = Task::make_after(
            {
                let runs = runs.clone();
                move || runs.hit(1)
            },
            &manager,
            [a.task()],
        );

        manager.push(&a);
        // Either ignored (still pending) or a duplicate that is skipped.
        manager.push(&c);
        c.result().unwrap();
        manager.join();

        assert_eq!(runs.get(0), 1);
        assert_eq!(runs.get(1), 1);
    });
}

#[test]
fn loom_join_waits_for_dependents_enqueued_while_joining() {
    model(|| {
        let runs = Runs::new(2);
        let manager = Manager::with_workers(2);

        let a = Task::make({
            let runs = runs.clone();
            move || runs.hit(0)
        });
        let (_, b) = Task::make_after(
            {
                let runs = runs.clone();
                move || runs.hit(1)
            },
            &manager,
            [a.task()],
        )
        .into_parts();

        manager.push(a);
        manager.join();

        assert_eq!(manager.phase(), Phase::Ended);
        assert_eq!(runs.get(0), 1);
        assert_eq!(runs.get(1), 1);
        assert!(b.is_ready());
    });
}
