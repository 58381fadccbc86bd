//! End-to-end spin flow: edit, spin, score, persist, restore

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::bounded;
use rf_core::{ColorToken, Partition, default_partitions};
use rf_wheel::{
    ClipKind, FileStore, HeadlessWheel, PartitionEditor, PartitionSource, RenderSync, Scoreboard,
    SpinConfig, SpinMachine, SpinOutcome, SpinScheduler, SpinTarget, ThreadTimer, TickConfig,
    TickCurve, TickEvent, TickSink, Timer, WheelConfig, WheelStore, pointer_degrees, resolve,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn abcd() -> Vec<Partition> {
    ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(i, label)| Partition::new(*label, *label, ColorToken::cycled(i)))
        .collect()
}

#[test]
fn test_scenario_from_rest() {
    init_logging();
    let mut wheel = HeadlessWheel::new(WheelConfig::normal().with_seed(1), abcd());

    let target = wheel.spin_with_offset(30.0).unwrap().unwrap();
    assert_eq!(target.target_rotation_degrees, 1830.0);
    assert_eq!(pointer_degrees(1830.0), 330.0);

    let outcome = wheel.run_to_completion().unwrap();
    assert_eq!(outcome.winner().unwrap().label, "D");
    assert!(!wheel.session().is_spinning);
    assert_eq!(wheel.session().winner.as_ref().unwrap().label, "D");
}

#[test]
fn test_winner_matches_resting_rotation() {
    init_logging();
    let mut wheel = HeadlessWheel::new(WheelConfig::turbo().with_seed(2024), default_partitions());

    for _ in 0..25 {
        let before = wheel.session().rotation_degrees;
        let outcome = wheel.spin_once().unwrap();
        let rotation = wheel.session().rotation_degrees;
        assert!(rotation - before >= 1800.0);
        assert_eq!(wheel.displayed_rotation(), rotation);
        assert_eq!(outcome.winner(), resolve(rotation, wheel.partitions()));
    }
    assert_eq!(wheel.history().len(), 25);
}

#[test]
fn test_every_partition_reachable() {
    let partitions = default_partitions();
    let mut hits = vec![0u32; partitions.len()];
    let mut machine = SpinMachine::new(SpinConfig {
        seed: Some(77),
        ..SpinConfig::default()
    });

    struct Instant;
    impl RenderSync for Instant {
        fn animate_to(&mut self, _target: &SpinTarget) {}
    }

    for _ in 0..600 {
        machine.request_spin(&partitions, &mut Instant);
        if let Some(SpinOutcome::Winner(p)) = machine.on_animation_complete(&partitions) {
            let index = partitions.iter().position(|q| q.id == p.id).unwrap();
            hits[index] += 1;
        }
    }
    assert_eq!(hits.iter().sum::<u32>(), 600);
    // Roughly uniform: 100 expected per slice
    assert!(hits.iter().all(|&h| (50..=150).contains(&h)), "{hits:?}");
}

#[test]
fn test_edit_score_persist_restore() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = WheelStore::new(FileStore::new(dir.path()));

    // Edit the wheel
    let mut editor = PartitionEditor::new(&store.load_partitions());
    editor.set_label("1", "Draw Two").unwrap();
    let added = editor.add().id.clone();
    let partitions = editor.commit();
    store.save_partitions(&partitions).unwrap();

    // Spin onto the new partition and score it
    let mut wheel = HeadlessWheel::new(WheelConfig::normal().with_seed(9), store.load_partitions());
    wheel.spin_to(&added).unwrap().unwrap();
    let winner = wheel.run_to_completion().unwrap().winner().cloned().unwrap();
    assert_eq!(winner.id, added);

    let mut board = Scoreboard::new();
    let ana = board.add_player("Ana").unwrap().id.clone();
    board.add_player("Bo").unwrap();
    board.adjust_score(&ana, 2).unwrap();
    store.save_players(board.players()).unwrap();
    store.save_session(wheel.session()).unwrap();

    // Restore into a fresh wheel
    let reopened = WheelStore::new(FileStore::new(dir.path()));
    let partitions = reopened.load_partitions();
    assert_eq!(partitions.len(), 7);
    assert_eq!(partitions[0].label, "Draw Two");

    let board = Scoreboard::from_players(reopened.load_players());
    assert!(board.is_leader(&ana));
    assert_eq!(board.leader().unwrap().name, "Ana");

    let session = reopened.load_session();
    let mut restored = HeadlessWheel::with_session(WheelConfig::normal(), partitions, session);
    assert_eq!(restored.session().winner.as_ref().unwrap().id, added);
    assert_eq!(restored.displayed_rotation(), wheel.session().rotation_degrees);

    let next = restored.spin().unwrap();
    assert!(next.target_rotation_degrees >= wheel.session().rotation_degrees + 1800.0);
}

#[test]
fn test_live_source_sees_mid_spin_edit() {
    let mut config = WheelConfig::normal();
    config.spin.partition_source = PartitionSource::Live;
    let mut wheel = HeadlessWheel::new(config, abcd());

    wheel.spin_with_offset(30.0).unwrap().unwrap();
    wheel.advance(2000.0);
    wheel.set_partitions(Vec::new());
    assert_eq!(wheel.run_to_completion(), Some(SpinOutcome::NoWinner));
}

#[test]
fn test_audio_bounce() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spin.wav");
    let config = WheelConfig::turbo().with_seed(3);
    let mut wheel = HeadlessWheel::new(config.clone(), default_partitions());
    wheel.spin_once().unwrap();

    let clicks = TickCurve::from_config(&config.ticks).plan(2000.0, 150.0).len();
    assert_eq!(wheel.recorder().count(ClipKind::Click), clicks);
    assert_eq!(wheel.recorder().count(ClipKind::WinChime), 1);

    wheel.recorder().write_wav(&path).unwrap();
    let reader = hound::WavReader::open(&path).unwrap();
    // Chime starts at 2000 ms and lasts 1040 ms
    let seconds = reader.duration() as f64 / f64::from(reader.spec().sample_rate);
    assert!((seconds - 3.04).abs() < 0.01, "{seconds}");
}

#[test]
fn test_wall_clock_scheduler() {
    init_logging();
    let (tx, rx) = bounded::<TickEvent>(256);
    let sink = move |tick: &TickEvent| {
        let _ = tx.try_send(*tick);
    };
    let config = TickConfig::default();
    let scheduler = SpinScheduler::new(
        Arc::new(ThreadTimer::new()) as Arc<dyn Timer>,
        Arc::new(sink) as Arc<dyn TickSink>,
        &config,
        Some(11),
    );

    scheduler.start(300.0);
    let expected = TickCurve::from_config(&config).plan(300.0, 150.0).len();
    let mut received = Vec::new();
    while received.len() < expected {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(tick) => received.push(tick),
            Err(e) => panic!("tick {} missing: {e}", received.len()),
        }
    }
    assert!(received.windows(2).all(|w| w[1].index == w[0].index + 1));

    // Stopping mid-sequence silences it
    scheduler.start(10_000.0);
    scheduler.stop();
    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(150));
    assert!(rx.try_recv().is_err());
    assert!(!scheduler.is_active());
}
