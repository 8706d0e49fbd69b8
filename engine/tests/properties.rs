//! Property-based tests for session invariants.

use fieldcheck_engine::{
    Inspection, InspectionStatus, LeakLevel, MemoryStorage, Persistence, RecordId, Session,
    SessionConfig, Snapshot, STORAGE_KEY,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

const T0: u64 = 1_763_546_400_000;

#[derive(Debug, Clone)]
enum Step {
    Save(RecordId),
    Toggle,
    Sync,
    Wait(u64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (1u64..16).prop_map(Step::Save),
        2 => Just(Step::Toggle),
        2 => Just(Step::Sync),
        2 => (0u64..3000).prop_map(Step::Wait),
    ]
}

fn arb_status() -> impl Strategy<Value = InspectionStatus> {
    prop_oneof![
        Just(InspectionStatus::Pending),
        Just(InspectionStatus::InProgress),
        Just(InspectionStatus::Completed),
    ]
}

fn arb_leaks() -> impl Strategy<Value = LeakLevel> {
    prop_oneof![
        Just(LeakLevel::None),
        Just(LeakLevel::Minor),
        Just(LeakLevel::Major),
        Just(LeakLevel::Critical),
    ]
}

// Quarter steps are exact in binary, so JSON text reproduces them
fn arb_reading() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((-4000i32..40_000).prop_map(|q| f64::from(q) / 4.0))
}

fn arb_inspection() -> impl Strategy<Value = Inspection> {
    (
        any::<u64>(),
        "\\PC{0,24}",
        "[A-Za-z ]{0,16}",
        arb_status(),
        arb_reading(),
        arb_reading(),
        arb_leaks(),
        "\\PC{0,40}",
        any::<bool>(),
    )
        .prop_map(
            |(id, site, inspector, status, pressure, temperature, leaks, notes, synced)| {
                Inspection::new(id, site, inspector, "2025-11-19", status)
                    .with_readings(pressure, temperature)
                    .with_leaks(leaks)
                    .with_notes(notes)
                    .with_synced(synced)
            },
        )
}

fn empty_session() -> Session<MemoryStorage> {
    let empty = Snapshot::new(vec![], vec![], None);
    let storage = MemoryStorage::with_entry(STORAGE_KEY, empty.to_json().unwrap());
    let config = SessionConfig {
        event_interval_ms: 0,
        ..SessionConfig::default()
    };
    Session::open(storage, config, T0).unwrap()
}

fn record(id: RecordId, now: u64) -> Inspection {
    Inspection::new(id, format!("site {now}"), "Current User", "2025-11-19", InspectionStatus::Pending)
}

proptest! {
    #[test]
    fn prop_ids_unique_and_pending_unsynced(steps in prop::collection::vec(arb_step(), 0..60)) {
        let mut session = empty_session();
        let mut rng = StdRng::seed_from_u64(0);
        let mut saved = BTreeSet::new();
        let mut now = T0;

        for step in steps {
            now += 1;
            match step {
                Step::Save(id) => {
                    let online = session.is_online();
                    session.save_inspection(record(id, now), now);
                    saved.insert(id);
                    prop_assert_eq!(session.is_pending(id), !online);
                    prop_assert_eq!(session.get(id).unwrap().synced, online);
                }
                Step::Toggle => {
                    session.toggle_online(now);
                }
                Step::Sync => {
                    let _ = session.request_sync(now);
                }
                Step::Wait(ms) => {
                    now += ms;
                    session.advance(now, &mut rng);
                }
            }

            let ids: BTreeSet<_> = session.inspections().iter().map(|r| r.id).collect();
            prop_assert_eq!(ids.len(), session.inspections().len());
            prop_assert_eq!(&ids, &saved);
            for id in session.pending_ids() {
                prop_assert!(!session.get(id).unwrap().synced);
            }
        }
    }

    #[test]
    fn prop_offline_sync_is_rejected_without_change(ids in prop::collection::vec(1u64..50, 0..20)) {
        let mut session = empty_session();
        session.set_online(false, T0);
        for id in ids {
            session.save_inspection(record(id, T0), T0);
        }
        let before = session.snapshot();

        prop_assert!(session.request_sync(T0 + 1).is_err());
        prop_assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn prop_completed_sync_clears_captured_ids(ids in prop::collection::btree_set(1u64..50, 1..20)) {
        let mut session = empty_session();
        session.set_online(false, T0);
        for &id in &ids {
            session.save_inspection(record(id, T0), T0);
        }
        session.set_online(true, T0);
        session.request_sync(T0).unwrap();
        let advance = session.advance(T0 + 1500, &mut StdRng::seed_from_u64(0));

        prop_assert_eq!(advance.completed_syncs.len(), 1);
        prop_assert!(session.pending_ids().is_empty());
        for id in ids {
            prop_assert!(session.get(id).unwrap().synced);
        }
    }

    #[test]
    fn prop_snapshot_round_trip(
        records in prop::collection::vec(arb_inspection(), 0..12),
        pending in prop::collection::vec(any::<u64>(), 0..12),
        last_sync in 0u64..4_102_444_800_000,
    ) {
        let snapshot = Snapshot::new(
            records,
            pending,
            Some(fieldcheck_engine::clock::to_datetime(last_sync)),
        );
        let mut persistence = Persistence::new(MemoryStorage::new());
        persistence.save(&snapshot).unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        prop_assert_eq!(loaded, snapshot);
    }
}
