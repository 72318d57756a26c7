use pokesim::{run, RunnerOptions};

#[test]
fn parallel_batch_is_deterministic() {
    let options = RunnerOptions {
        battles: 6,
        base_seed: 100,
        max_turns: 50,
        doubles: false,
        verify_replays: true,
    };
    let a = run(&options).unwrap();
    let b = run(&options).unwrap();
    assert_eq!(a.replay_mismatches, 0);
    assert_eq!(b.replay_mismatches, 0);
    assert_eq!(a.side_a_wins, b.side_a_wins);
    assert_eq!(a.side_b_wins, b.side_b_wins);
    assert_eq!(a.draws, b.draws);
    assert_eq!(a.total_turns, b.total_turns);
}

#[test]
fn doubles_batch_runs_clean() {
    let summary = run(&RunnerOptions {
        battles: 3,
        base_seed: 7,
        max_turns: 40,
        doubles: true,
        verify_replays: true,
    })
    .unwrap();
    assert_eq!(summary.battles, 3);
    assert_eq!(summary.replay_mismatches, 0);
}
