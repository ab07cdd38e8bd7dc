use std::fs;

use speculate2::speculate;
use taskman::config::{StorageKind, TaskmanConfig, DEFAULT_CAPACITY};
use taskman::models::ProcessPriority;
use taskman::TaskManagerError;

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
    }

    describe "load_from" {
        it "returns defaults when the file does not exist" {
            let config = TaskmanConfig::load_from(&path).expect("Failed to load");
            assert_eq!(config, TaskmanConfig::default());
            assert_eq!(config.capacity, Some(DEFAULT_CAPACITY));
        }

        it "reads every field" {
            fs::write(&path, r#"{"capacity": 3, "storage": "fifo", "startup_delay_ms": 10}"#)
                .expect("Failed to write");

            let config = TaskmanConfig::load_from(&path).expect("Failed to load");
            assert_eq!(config.capacity, Some(3));
            assert_eq!(config.storage, StorageKind::Fifo);
            assert_eq!(config.startup_delay_ms, 10);
        }

        it "fills missing fields with defaults" {
            fs::write(&path, r#"{"storage": "priority"}"#).expect("Failed to write");

            let config = TaskmanConfig::load_from(&path).expect("Failed to load");
            assert_eq!(config.storage, StorageKind::Priority);
            assert_eq!(config.capacity, Some(DEFAULT_CAPACITY));
        }

        it "accepts null capacity as unbounded" {
            fs::write(&path, r#"{"capacity": null}"#).expect("Failed to write");

            let config = TaskmanConfig::load_from(&path).expect("Failed to load");
            assert_eq!(config.capacity, None);
        }

        it "fails on malformed json" {
            fs::write(&path, "{not json").expect("Failed to write");
            assert!(TaskmanConfig::load_from(&path).is_err());
        }
    }

    describe "build_manager" {
        it "applies the configured capacity" {
            let config = TaskmanConfig {
                capacity: Some(2),
                storage: StorageKind::Hash,
                startup_delay_ms: 0,
            };
            let manager = config.build_manager();
            manager.add("a", ProcessPriority::Low).expect("Failed to add");
            manager.add("b", ProcessPriority::Low).expect("Failed to add");

            let err = manager.add("c", ProcessPriority::Low).unwrap_err();
            assert_eq!(err, TaskManagerError::CapacityReached { capacity: 2 });
        }

        it "builds the fifo variant" {
            let config = TaskmanConfig {
                capacity: Some(1),
                storage: StorageKind::Fifo,
                startup_delay_ms: 0,
            };
            let manager = config.build_manager();
            manager.add("a", ProcessPriority::Low).expect("Failed to add");
            let b = manager.add("b", ProcessPriority::Low).expect("fifo evicts");
            assert_eq!(manager.list(), vec![b]);
        }

        it "builds an unbounded manager" {
            let config = TaskmanConfig {
                capacity: None,
                storage: StorageKind::Priority,
                startup_delay_ms: 0,
            };
            let manager = config.build_manager();
            for i in 0..20 {
                manager.add(format!("cmd_{}", i), ProcessPriority::Low).expect("Failed to add");
            }
            assert_eq!(manager.capacity(), None);
            assert_eq!(manager.len(), 20);
        }
    }

    describe "StorageKind::parse" {
        it "is case insensitive" {
            assert_eq!(StorageKind::parse(" FIFO ").expect("valid"), StorageKind::Fifo);
        }

        it "rejects unknown names" {
            let err = StorageKind::parse("btree").unwrap_err();
            assert_eq!(err, TaskManagerError::UnknownStorage("btree".to_string()));
        }
    }

    describe "ProcessPriority::parse" {
        it "accepts any casing" {
            assert_eq!(ProcessPriority::parse("High").expect("valid"), ProcessPriority::High);
            assert_eq!(ProcessPriority::parse("low").expect("valid"), ProcessPriority::Low);
        }

        it "rejects unknown categories as a validation error" {
            let err = ProcessPriority::parse("urgent").unwrap_err();
            assert_eq!(err, TaskManagerError::UnknownPriority("urgent".to_string()));
            assert!(err.is_validation());
        }
    }
}
