use assert_matches::assert_matches;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use startype::difficulty::Difficulty;
use startype::scores::ScoreDb;
use startype::session::{Phase, SessionController};
use startype::words::FixedWordSource;

// Headless integration: drive a full session through the public
// controller surface, with the loop thread running for real.

fn word_bank() -> Vec<&'static str> {
    vec![
        "star", "orbit", "comet", "nova", "pulsar", "quasar", "nebula", "meteor", "galaxy",
        "planet", "lunar", "solar",
    ]
}

fn new_controller() -> SessionController {
    SessionController::new(
        Arc::new(FixedWordSource::new(word_bank())),
        Arc::new(ScoreDb::open_in_memory().unwrap()),
    )
}

#[test]
fn full_session_hit_pause_resume_stop() {
    let ctl = new_controller();
    ctl.set_orbit_center(300, 300);
    ctl.set_collision_radius(10.0);

    let (frame_tx, frames) = mpsc::channel();
    ctl.start_game(Difficulty::Normal, move || {
        let _ = frame_tx.send(());
    });
    assert_matches!(ctl.phase(), Phase::Running);
    assert_eq!(ctl.target_count(), 7);

    // Frames keep arriving while running.
    frames
        .recv_timeout(Duration::from_secs(1))
        .expect("loop should render frames");

    // Hit two live words.
    for _ in 0..2 {
        let victim = ctl.snapshot()[0].text().to_string();
        ctl.submit_input(&victim);
    }
    assert_eq!(ctl.score(), 40);
    assert_eq!(ctl.target_count(), 7);

    // Pause, then resume; the phase round-trips.
    ctl.toggle_pause();
    assert_matches!(ctl.phase(), Phase::Paused);
    ctl.toggle_pause();
    assert_matches!(ctl.phase(), Phase::Running);

    ctl.stop_game();
    assert_matches!(ctl.phase(), Phase::Idle);
}

#[test]
fn pause_halts_target_advancement() {
    let ctl = new_controller();
    ctl.set_orbit_center(300, 300);

    let (frame_tx, frames) = mpsc::channel();
    ctl.start_game(Difficulty::Easy, move || {
        let _ = frame_tx.send(());
    });

    ctl.toggle_pause();
    // Let in-flight ticks drain; once parked, frames stop.
    while frames.recv_timeout(Duration::from_millis(150)).is_ok() {}

    let before = ctl.snapshot();
    assert!(
        frames.recv_timeout(Duration::from_millis(150)).is_err(),
        "a parked loop must not render"
    );
    let after = ctl.snapshot();

    let radii = |targets: &[startype::target::Target]| {
        targets.iter().map(|t| t.radius()).collect::<Vec<_>>()
    };
    assert_eq!(radii(&before), radii(&after), "no advancement while paused");

    // Resume: frames and decay come back.
    ctl.toggle_pause();
    frames
        .recv_timeout(Duration::from_secs(1))
        .expect("resume should wake the loop");

    ctl.stop_game();
}

#[test]
fn game_over_reports_once_and_score_survives() {
    let ctl = new_controller();
    let (over_tx, over_rx) = mpsc::channel();
    ctl.on_game_over(move || {
        over_tx.send(()).unwrap();
    });

    ctl.set_orbit_center(300, 300);
    ctl.set_collision_radius(1_000.0); // everything collides on tick one
    ctl.start_game(Difficulty::Easy, || {});

    over_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("terminal listener should fire");
    assert_matches!(ctl.phase(), Phase::GameOver);
    assert!(
        over_rx.recv_timeout(Duration::from_millis(100)).is_err(),
        "listener must fire exactly once"
    );

    // Score survives into the game-over state and can be persisted.
    ctl.save_score("ann").unwrap(); // zero score: not recorded
    assert!(ctl.top_scores(5).unwrap().is_empty());
}

#[test]
fn restart_after_game_over_starts_fresh() {
    let ctl = new_controller();
    let (over_tx, over_rx) = mpsc::channel();
    ctl.on_game_over(move || {
        over_tx.send(()).unwrap();
    });

    ctl.set_orbit_center(300, 300);
    ctl.set_collision_radius(1_000.0);
    ctl.start_game(Difficulty::Easy, || {});
    over_rx.recv_timeout(Duration::from_secs(2)).unwrap();

    // New session: collision threshold back to sane, fresh targets.
    ctl.set_collision_radius(10.0);
    ctl.start_game(Difficulty::Hard, || {});
    assert_matches!(ctl.phase(), Phase::Running);
    assert_eq!(ctl.target_count(), 8);
    assert_eq!(ctl.score(), 0);

    ctl.stop_game();
}

#[test]
fn stop_while_paused_does_not_leak_the_loop() {
    let ctl = new_controller();
    ctl.set_orbit_center(300, 300);
    ctl.start_game(Difficulty::Easy, || {});
    ctl.toggle_pause();

    ctl.stop_game();
    assert_matches!(ctl.phase(), Phase::Idle);

    // The next start joins the previous loop thread; a leaked parked
    // loop would deadlock this call.
    ctl.start_game(Difficulty::Easy, || {});
    assert_matches!(ctl.phase(), Phase::Running);
    ctl.stop_game();
}

#[test]
fn uniqueness_holds_through_many_hits() {
    let ctl = new_controller();
    ctl.set_orbit_center(300, 300);
    ctl.start_game(Difficulty::Easy, || {});

    for _ in 0..10 {
        let victim = ctl.snapshot()[0].text().to_string();
        ctl.submit_input(&victim);

        let mut texts: Vec<String> = ctl
            .snapshot()
            .iter()
            .map(|t| t.text().to_string())
            .collect();
        texts.sort();
        let len_before = texts.len();
        texts.dedup();
        assert_eq!(texts.len(), len_before, "duplicate live target text");
    }

    ctl.stop_game();
}
