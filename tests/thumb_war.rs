//! End-to-end scenarios: a thumb-war game whose `get_winner` dependency is
//! replaced three ways, mirroring the classic mocking progression from
//! monkey-patching through spies to full-module mocks.

use std::sync::Arc;

use testkit_mock::prelude::*;

type WinnerFn = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// The real `utils` surface. The real `get_winner` stands in for something
/// nondeterministic; tests never depend on its outcome, only on its identity.
fn real_utils() -> BindingTable<WinnerFn> {
    let utils: BindingTable<WinnerFn> = BindingTable::new();
    utils.set("get_winner", Arc::new(|p1: &str, _p2: &str| p1.to_string()) as WinnerFn);
    utils
}

/// The system under test. Plays rounds until one player has two wins,
/// fetching `get_winner` through its normal reference each round.
fn thumb_war(utils: &BindingTable<WinnerFn>, player1: &str, player2: &str) -> String {
    let number_to_win = 2;
    let mut player1_wins = 0;
    let mut player2_wins = 0;
    while player1_wins < number_to_win && player2_wins < number_to_win {
        let get_winner = utils.binding("get_winner").expect("get_winner is bound");
        let winner = get_winner(player1, player2);
        if winner == player1 {
            player1_wins += 1;
        } else if winner == player2 {
            player2_wins += 1;
        }
    }
    if player1_wins >= number_to_win {
        player1.to_string()
    } else {
        player2.to_string()
    }
}

/// A substitute whose implementation always picks player one, plus a callable
/// wrapper in the shape `thumb_war` expects.
fn player_one_wins() -> (Substitute<(String, String), String>, WinnerFn) {
    let substitute: Substitute<(String, String), String> =
        Substitute::with_implementation(|(p1, _p2)| Ok(p1));
    let handle = substitute.clone();
    let callable: WinnerFn = Arc::new(move |p1: &str, p2: &str| {
        handle
            .call((p1.to_string(), p2.to_string()))
            .unwrap()
            .unwrap_or_default()
    });
    (substitute, callable)
}

#[test]
fn patched_get_winner_records_both_calls() {
    let utils = real_utils();
    let (substitute, callable) = player_one_wins();

    let patcher = Patcher::new(utils.clone(), "get_winner");
    patcher.install(callable).unwrap();

    let winner = thumb_war(&utils, "Kent C. Dodds", "Ken Wheeler");

    assert_eq!(winner, "Kent C. Dodds");
    assert_eq!(substitute.call_count(), 2);
    assert_eq!(
        substitute.nth_call(1).unwrap().args,
        ("Kent C. Dodds".to_string(), "Ken Wheeler".to_string())
    );
    assert_eq!(
        substitute.nth_call(2).unwrap().args,
        ("Kent C. Dodds".to_string(), "Ken Wheeler".to_string())
    );

    patcher.restore().unwrap();
}

#[test]
fn restore_returns_the_identical_original() {
    let utils = real_utils();
    let original = utils.binding("get_winner").unwrap();
    let (_substitute, callable) = player_one_wins();

    let patcher = Patcher::new(utils.clone(), "get_winner");
    patcher.install(callable).unwrap();
    assert!(!Arc::ptr_eq(&utils.binding("get_winner").unwrap(), &original));

    patcher.restore().unwrap();

    assert!(Arc::ptr_eq(&utils.binding("get_winner").unwrap(), &original));
}

#[test]
fn double_restore_fails_both_times() {
    let utils = real_utils();
    let (_substitute, callable) = player_one_wins();

    let patcher = Patcher::new(utils, "get_winner");
    patcher.install(callable).unwrap();
    patcher.restore().unwrap();

    let first = patcher.restore();
    let second = patcher.restore();
    assert_eq!(first, Err(Error::not_installed("get_winner")));
    assert_eq!(second, first);
}

#[test]
fn spy_tracks_calls_without_changing_behavior() {
    let utils = real_utils();
    let original = utils.binding("get_winner").unwrap();

    let spy: Substitute<(String, String), String> =
        Substitute::passthrough(move |(p1, p2): (String, String)| original(&p1, &p2));
    let handle = spy.clone();
    let callable: WinnerFn = Arc::new(move |p1: &str, p2: &str| {
        handle
            .call((p1.to_string(), p2.to_string()))
            .unwrap()
            .unwrap_or_default()
    });

    let patcher = Patcher::new(utils.clone(), "get_winner");
    patcher.install(callable).unwrap();

    // the stand-in real implementation always picks player one
    let winner = thumb_war(&utils, "Kent C. Dodds", "Ken Wheeler");

    assert_eq!(winner, "Kent C. Dodds");
    assert_eq!(spy.call_count(), 2);
    assert_eq!(
        spy.nth_call(1).unwrap().outcome.returned(),
        Some(&"Kent C. Dodds".to_string())
    );

    patcher.restore().unwrap();
}

#[test]
fn module_mock_replaces_the_whole_surface() {
    let real = real_utils();
    let real_get_winner = real.binding("get_winner").unwrap();

    let mocks: ModuleMocks<BindingTable<WinnerFn>> = ModuleMocks::new();
    let resolver = {
        let real = real.clone();
        move |_identifier: &str| real.clone()
    };

    let (substitute, callable) = player_one_wins();
    mocks
        .register("utils", move || {
            let surface: BindingTable<WinnerFn> = BindingTable::new();
            surface.set("get_winner", callable);
            surface
        })
        .unwrap();

    // the consumer resolves `utils` through its normal mechanism
    let utils = mocks.resolve("utils", &resolver);
    let winner = thumb_war(&utils, "Kent C. Dodds", "Ken Wheeler");

    assert_eq!(winner, "Kent C. Dodds");
    assert_eq!(substitute.call_count(), 2);
    assert_eq!(
        substitute
            .calls_with(eq(("Kent C. Dodds".to_string(), "Ken Wheeler".to_string())))
            .count(),
        2
    );

    // the mocked surface is distinct and memoized; the real module was never mutated
    assert!(!utils.same_table(&real));
    assert!(mocks.resolve("utils", &resolver).same_table(&utils));
    assert!(Arc::ptr_eq(&real.binding("get_winner").unwrap(), &real_get_winner));
}

#[test]
fn unregister_all_restores_real_resolution() {
    let real = real_utils();
    let mocks: ModuleMocks<BindingTable<WinnerFn>> = ModuleMocks::new();
    let resolver = {
        let real = real.clone();
        move |_identifier: &str| real.clone()
    };

    let (_substitute, callable) = player_one_wins();
    mocks
        .register("utils", move || {
            let surface: BindingTable<WinnerFn> = BindingTable::new();
            surface.set("get_winner", callable);
            surface
        })
        .unwrap();
    assert!(!mocks.resolve("utils", &resolver).same_table(&real));

    mocks.unregister_all();

    assert!(mocks.resolve("utils", &resolver).same_table(&real));
}

#[test]
fn patch_set_cleans_up_after_a_test_body() {
    let utils = real_utils();
    let original = utils.binding("get_winner").unwrap();
    let patches = PatchSet::new();

    // a test body that opens a patcher and never restores it
    {
        let (_substitute, callable) = player_one_wins();
        let patcher = patches.patcher(utils.clone(), "get_winner");
        patcher.install(callable).unwrap();
        assert_eq!(patches.open_patchers(), vec!["get_winner".to_string()]);
    }

    // the harness hook runs regardless of how the body ended
    assert_eq!(patches.restore_all(), 1);
    assert!(patches.open_patchers().is_empty());
    assert!(Arc::ptr_eq(&utils.binding("get_winner").unwrap(), &original));
}
