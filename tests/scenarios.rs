use std::f64::consts::E;

use aloha_sim::{run, Contention, Mode, Outcome, SimConfig, Strategy};

fn relative_gap(a: f64, b: f64) -> f64 {
    (a - b).abs() / b
}

#[test]
fn lone_station_never_collides() {
    for mode in [Mode::Pure, Mode::Slotted] {
        for strategy in [Strategy::TimeDriven, Strategy::EventDriven] {
            let config = SimConfig::builder()
                .mode(mode)
                .strategy(strategy)
                .offered_load(0.05)
                .num_stations(1)
                .frame_duration(1.0)
                .horizon(1_000.0)
                .seed(1)
                .build()
                .unwrap();
            let stats = run(&config).unwrap();
            let result = stats.analyze();

            assert_eq!(stats.collisions, 0, "{mode} {strategy}");
            assert!(stats.attempts - stats.successes <= 1);
            assert!((result.simulated_throughput - stats.successes as f64 / 1_000.0).abs() < 1e-12);
            assert!(
                result.simulated_throughput > 0.02 && result.simulated_throughput < 0.09,
                "{mode} {strategy}: {}",
                result.simulated_throughput
            );
        }
    }
}

#[test]
fn forced_collisions_grow_backoff() {
    for (max_backoff, expected) in [(15, 5), (3, 3)] {
        let config = SimConfig::builder()
            .num_stations(2)
            .frame_duration(1.0)
            .max_backoff(max_backoff)
            .build()
            .unwrap();
        let mut contention = Contention::new(&config).unwrap();
        let mut now: f64 = 0.0;
        for id in 0..2 {
            let station = contention.station_mut(id);
            let due = station.next_arrival_time();
            station.advance_arrival(due);
            now = now.max(due);
        }

        let before = contention.stats();
        for _ in 0..5 {
            contention.offer(0, now);
            contention.offer(1, now);
            now += 1.0;
            assert!(contention.window_closed(now));
            assert_eq!(contention.resolve(now), Outcome::Collision(vec![0, 1]));
        }
        let after = contention.stats();

        assert_eq!(after.collisions - before.collisions, 5);
        assert_eq!(after.successes, before.successes);
        assert_eq!(after.attempts - before.attempts, 10);
        for station in contention.stations() {
            assert_eq!(station.backoff_counter(), expected);
            assert!(station.has_packet());
        }
    }
}

#[test]
fn slotted_throughput_near_one_over_e() {
    let config = SimConfig::builder()
        .mode(Mode::Slotted)
        .strategy(Strategy::EventDriven)
        .offered_load(1.0)
        .num_stations(50)
        .frame_duration(0.001)
        .horizon(100.0)
        .seed(2024)
        .build()
        .unwrap();
    let result = run(&config).unwrap().analyze();

    assert!((result.theoretical_throughput - 1.0 / E).abs() < 1e-12);
    assert!(
        relative_gap(result.simulated_throughput, 1.0 / E) < 0.10,
        "simulated {} vs theory {}",
        result.simulated_throughput,
        1.0 / E
    );
}

#[test]
fn strategies_agree_on_success_counts() {
    for mode in [Mode::Pure, Mode::Slotted] {
        let build = |strategy| {
            SimConfig::builder()
                .mode(mode)
                .strategy(strategy)
                .offered_load(1.0)
                .num_stations(10)
                .frame_duration(0.001)
                .time_step(0.0001)
                .horizon(20.0)
                .seed(9)
                .build()
                .unwrap()
        };
        let events = run(&build(Strategy::EventDriven)).unwrap();
        let steps = run(&build(Strategy::TimeDriven)).unwrap();

        let gap = relative_gap(steps.successes as f64, events.successes as f64);
        assert!(
            gap < 0.15,
            "{mode}: event-driven {} vs time-driven {}",
            events.successes,
            steps.successes
        );
    }
}

#[test]
fn slotting_beats_pure_at_unit_load() {
    let build = |mode| {
        SimConfig::builder()
            .mode(mode)
            .strategy(Strategy::EventDriven)
            .offered_load(1.0)
            .num_stations(10)
            .frame_duration(0.001)
            .horizon(20.0)
            .seed(4)
            .build()
            .unwrap()
    };
    let pure = run(&build(Mode::Pure)).unwrap();
    let slotted = run(&build(Mode::Slotted)).unwrap();
    assert!(slotted.successes > pure.successes);
}
