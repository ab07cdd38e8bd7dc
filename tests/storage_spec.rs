use std::panic::{self, AssertUnwindSafe};

use speculate2::speculate;
use taskman::models::{IdGenerator, Process, ProcessPriority, SequentialIds};
use taskman::storage::*;

fn process(ids: &SequentialIds, command: &str, priority: ProcessPriority) -> Process {
    Process::detached(ids.generate(), command, priority)
}

fn commands(storage: &dyn ProcessStorage) -> Vec<String> {
    storage
        .processes()
        .iter()
        .map(|p| p.command().to_string())
        .collect()
}

/// Behavior every variant shares when no capacity is set.
fn check_unbounded_contract(mut storage: Box<dyn ProcessStorage>) {
    let ids = SequentialIds::new(7);
    let build = process(&ids, "build", ProcessPriority::High);
    let test = process(&ids, "test", ProcessPriority::Low);
    let lint = process(&ids, "lint", ProcessPriority::High);

    for p in [build.clone(), test.clone(), lint.clone()] {
        assert!(matches!(storage.insert(p), Ok(Admission::Stored)));
    }
    assert_eq!(storage.len(), 3);
    assert_eq!(storage.capacity(), None);
    assert_eq!(commands(storage.as_ref()), vec!["build", "test", "lint"]);
    assert_eq!(storage.get(&test.id()).map(|p| p.command()), Some("test"));

    assert_eq!(storage.remove_priority(ProcessPriority::High), 2);
    assert_eq!(commands(storage.as_ref()), vec!["test"]);
    assert_eq!(storage.remove_priority(ProcessPriority::High), 0);

    assert!(storage.remove(&test.id()));
    assert!(!storage.remove(&test.id()));
    assert!(!storage.remove(&build.id()));
    assert!(storage.is_empty());

    storage
        .insert(process(&ids, "again", ProcessPriority::Medium))
        .expect("insert after removals");
    assert_eq!(storage.clear(), 1);
    assert_eq!(storage.clear(), 0);
    assert!(storage.processes().is_empty());
}

speculate! {
    before {
        let ids = SequentialIds::new(1);
    }

    describe "every storage variant" {
        it "honors the unbounded contract for the hash storage" {
            check_unbounded_contract(Box::new(HashProcessStorage::new()));
        }

        it "honors the unbounded contract for the fifo storage" {
            check_unbounded_contract(Box::new(FifoProcessStorage::new()));
        }

        it "honors the unbounded contract for the priority storage" {
            check_unbounded_contract(Box::new(PriorityProcessStorage::new()));
        }
    }

    describe "hash storage" {
        it "rejects new processes when full" {
            let mut storage = HashProcessStorage::with_capacity_limit(2);
            storage.insert(process(&ids, "a", ProcessPriority::Low)).expect("insert");
            storage.insert(process(&ids, "b", ProcessPriority::Low)).expect("insert");

            let result = storage.insert(process(&ids, "c", ProcessPriority::High));
            assert_eq!(result.unwrap_err(), Rejection::Full { capacity: 2 });
            assert_eq!(commands(&storage), vec!["a", "b"]);
        }

        it "admits again once room is freed" {
            let mut storage = HashProcessStorage::with_capacity_limit(1);
            let a = process(&ids, "a", ProcessPriority::Low);
            storage.insert(a.clone()).expect("insert");
            assert!(storage.remove(&a.id()));

            storage.insert(process(&ids, "b", ProcessPriority::Low)).expect("insert");
            assert_eq!(commands(&storage), vec!["b"]);
        }

        it "keeps admission order after removals in the middle" {
            let mut storage = HashProcessStorage::new();
            let procs: Vec<Process> = (0..6)
                .map(|i| process(&ids, &format!("cmd_{}", i), ProcessPriority::Medium))
                .collect();
            for p in &procs {
                storage.insert(p.clone()).expect("insert");
            }
            storage.remove(&procs[1].id());
            storage.remove(&procs[4].id());

            assert_eq!(commands(&storage), vec!["cmd_0", "cmd_2", "cmd_3", "cmd_5"]);
        }

        it "keeps admission order after sweeping removed ids" {
            let mut storage = HashProcessStorage::new();
            let procs: Vec<Process> = (0..100)
                .map(|i| process(&ids, &format!("cmd_{}", i), ProcessPriority::Low))
                .collect();
            for p in &procs {
                storage.insert(p.clone()).expect("insert");
            }
            for p in procs.iter().filter(|p| !["cmd_3", "cmd_50", "cmd_97"].contains(&p.command())) {
                assert!(storage.remove(&p.id()));
            }
            storage.insert(process(&ids, "late", ProcessPriority::High)).expect("insert");

            assert_eq!(commands(&storage), vec!["cmd_3", "cmd_50", "cmd_97", "late"]);
            assert_eq!(storage.len(), 4);
        }

        it "does not let a detached descriptor kill itself" {
            let mut storage = HashProcessStorage::new();
            let p = process(&ids, "loose", ProcessPriority::Low);
            storage.insert(p.clone()).expect("insert");

            assert!(!p.kill());
            assert_eq!(storage.len(), 1);
        }

        it "rejects everything with a zero capacity" {
            let mut storage = HashProcessStorage::with_capacity_limit(0);
            let result = storage.insert(process(&ids, "a", ProcessPriority::High));
            assert_eq!(result.unwrap_err(), Rejection::Full { capacity: 0 });
        }
    }

    describe "fifo storage" {
        it "evicts the oldest process when full" {
            let mut storage = FifoProcessStorage::with_capacity_limit(3);
            for name in ["cmd_1", "cmd_2", "cmd_3"] {
                storage.insert(process(&ids, name, ProcessPriority::Low)).expect("insert");
            }

            let admission = storage
                .insert(process(&ids, "cmd_4", ProcessPriority::Low))
                .expect("fifo always admits");

            match admission {
                Admission::EvictedOldest(oldest) => assert_eq!(oldest.command(), "cmd_1"),
                other => panic!("expected eviction, got {:?}", other),
            }
            assert_eq!(commands(&storage), vec!["cmd_2", "cmd_3", "cmd_4"]);
        }

        it "skips removed processes when picking the oldest" {
            let mut storage = FifoProcessStorage::with_capacity_limit(2);
            let first = process(&ids, "first", ProcessPriority::Low);
            storage.insert(first.clone()).expect("insert");
            storage.insert(process(&ids, "second", ProcessPriority::Low)).expect("insert");
            storage.remove(&first.id());
            storage.insert(process(&ids, "third", ProcessPriority::Low)).expect("insert");

            let admission = storage
                .insert(process(&ids, "fourth", ProcessPriority::Low))
                .expect("insert");

            assert_eq!(admission.evicted().map(|p| p.command()), Some("second"));
            assert_eq!(commands(&storage), vec!["third", "fourth"]);
        }

        it "stays consistent through many removals" {
            let mut storage = FifoProcessStorage::new();
            let procs: Vec<Process> = (0..100)
                .map(|i| process(&ids, &format!("cmd_{}", i), ProcessPriority::Low))
                .collect();
            for p in &procs {
                storage.insert(p.clone()).expect("insert");
            }
            for p in procs.iter().filter(|p| p.command() != "cmd_42" && p.command() != "cmd_99") {
                assert!(storage.remove(&p.id()));
            }

            assert_eq!(commands(&storage), vec!["cmd_42", "cmd_99"]);
            assert_eq!(storage.len(), 2);
        }

        it "rejects when there is nothing to evict" {
            let mut storage = FifoProcessStorage::with_capacity_limit(0);
            let result = storage.insert(process(&ids, "a", ProcessPriority::Low));
            assert_eq!(result.unwrap_err(), Rejection::Full { capacity: 0 });
        }
    }

    describe "priority storage" {
        it "refuses a newcomer that does not outrank the lowest priority" {
            let mut storage = PriorityProcessStorage::with_capacity_limit(2);
            storage.insert(process(&ids, "a", ProcessPriority::High)).expect("insert");
            storage.insert(process(&ids, "b", ProcessPriority::High)).expect("insert");

            let result = storage.insert(process(&ids, "c", ProcessPriority::High));
            assert_eq!(
                result.unwrap_err(),
                Rejection::Outranked {
                    priority: ProcessPriority::High,
                    lowest: ProcessPriority::High,
                }
            );
        }

        it "evicts the oldest process of the lowest priority" {
            let mut storage = PriorityProcessStorage::with_capacity_limit(3);
            storage.insert(process(&ids, "high", ProcessPriority::High)).expect("insert");
            storage.insert(process(&ids, "low_old", ProcessPriority::Low)).expect("insert");
            storage.insert(process(&ids, "low_new", ProcessPriority::Low)).expect("insert");

            let admission = storage
                .insert(process(&ids, "medium", ProcessPriority::Medium))
                .expect("medium outranks low");

            match admission {
                Admission::EvictedLowest(victim) => assert_eq!(victim.command(), "low_old"),
                other => panic!("expected eviction, got {:?}", other),
            }
            assert_eq!(commands(&storage), vec!["high", "low_new", "medium"]);
        }

        it "drops a whole priority group without touching others" {
            let mut storage = PriorityProcessStorage::new();
            for (name, priority) in [
                ("a", ProcessPriority::Low),
                ("b", ProcessPriority::Medium),
                ("c", ProcessPriority::Low),
                ("d", ProcessPriority::High),
            ] {
                storage.insert(process(&ids, name, priority)).expect("insert");
            }

            assert_eq!(storage.remove_priority(ProcessPriority::Low), 2);
            assert_eq!(storage.len(), 2);
            assert_eq!(commands(&storage), vec!["b", "d"]);
        }
    }

    describe "sort_processes" {
        it "sorts by priority and keeps admission order for ties" {
            let mut procs = vec![
                process(&ids, "low_1", ProcessPriority::Low),
                process(&ids, "high", ProcessPriority::High),
                process(&ids, "low_2", ProcessPriority::Low),
                process(&ids, "medium", ProcessPriority::Medium),
            ];

            sort_processes(&mut procs, SortCriteria::Priority, SortOrder::Desc);
            let names: Vec<&str> = procs.iter().map(|p| p.command()).collect();
            assert_eq!(names, vec!["high", "medium", "low_1", "low_2"]);

            sort_processes(&mut procs, SortCriteria::Priority, SortOrder::Asc);
            let names: Vec<&str> = procs.iter().map(|p| p.command()).collect();
            assert_eq!(names, vec!["low_1", "low_2", "medium", "high"]);
        }

        it "sorts by time in strict creation order" {
            let first = process(&ids, "first", ProcessPriority::Low);
            let second = process(&ids, "second", ProcessPriority::Low);
            let third = process(&ids, "third", ProcessPriority::Low);
            assert!(first.sequence() < second.sequence());
            assert!(second.sequence() < third.sequence());

            let mut procs = vec![second.clone(), third.clone(), first.clone()];
            sort_processes(&mut procs, SortCriteria::Time, SortOrder::Asc);
            assert_eq!(procs, vec![first.clone(), second.clone(), third.clone()]);

            // Timestamps taken this close together usually tie; the order still flips.
            sort_processes(&mut procs, SortCriteria::Time, SortOrder::Desc);
            assert_eq!(procs, vec![third, second, first]);
        }

        it "sorts by id" {
            let a = process(&ids, "a", ProcessPriority::Low);
            let b = process(&ids, "b", ProcessPriority::Low);
            let mut procs = vec![b.clone(), a.clone()];

            sort_processes(&mut procs, SortCriteria::Id, SortOrder::Asc);
            assert_eq!(procs, vec![a.clone(), b.clone()]);

            sort_processes(&mut procs, SortCriteria::Id, SortOrder::Desc);
            assert_eq!(procs, vec![b, a]);
        }
    }
}

#[test]
#[should_panic(expected = "already stored")]
fn hash_storage_panics_on_duplicate_id() {
    let ids = SequentialIds::new(9);
    let p = process(&ids, "dup", ProcessPriority::Low);
    let mut storage = HashProcessStorage::new();
    storage.insert(p.clone()).expect("first insert");
    let _ = storage.insert(p);
}

#[test]
#[should_panic(expected = "already stored")]
fn fifo_storage_panics_on_duplicate_id() {
    let ids = SequentialIds::new(9);
    let p = process(&ids, "dup", ProcessPriority::Low);
    let mut storage = FifoProcessStorage::new();
    storage.insert(p.clone()).expect("first insert");
    let _ = storage.insert(p);
}

#[test]
fn full_fifo_storage_does_not_evict_for_a_duplicate_id() {
    let ids = SequentialIds::new(9);
    let first = process(&ids, "first", ProcessPriority::Low);
    let second = process(&ids, "second", ProcessPriority::Low);
    let mut storage = FifoProcessStorage::with_capacity_limit(2);
    storage.insert(first).expect("insert");
    storage.insert(second.clone()).expect("insert");

    let result = panic::catch_unwind(AssertUnwindSafe(|| storage.insert(second)));
    assert!(result.is_err());
    assert_eq!(commands(&storage), vec!["first", "second"]);
}

#[test]
#[should_panic(expected = "already stored")]
fn priority_storage_panics_on_duplicate_id() {
    let ids = SequentialIds::new(9);
    let p = process(&ids, "dup", ProcessPriority::Low);
    let mut storage = PriorityProcessStorage::new();
    storage.insert(p.clone()).expect("first insert");
    let _ = storage.insert(p);
}
