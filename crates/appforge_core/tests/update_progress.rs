use appforge_core::{update, AppState, Msg, Stage};

fn started() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::UrlChanged("https://example.com".to_string()),
    );
    let (state, _) = update(state, Msg::SubmitClicked);
    state
}

#[test]
fn progress_for_in_flight_request_updates_stage() {
    let mut state = started();
    assert!(state.consume_dirty());

    let (mut state, effects) = update(
        state,
        Msg::ConversionProgress {
            request_id: 1,
            stage: Stage::Scaffolding,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().stage, Some(Stage::Scaffolding));
    assert!(state.consume_dirty());

    // Repeating the same stage does not request a re-render.
    let (mut state, _) = update(
        state,
        Msg::ConversionProgress {
            request_id: 1,
            stage: Stage::Scaffolding,
        },
    );
    assert!(!state.consume_dirty());
}

#[test]
fn progress_for_unknown_request_is_ignored() {
    let mut state = started();
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::ConversionProgress {
            request_id: 42,
            stage: Stage::Bundling,
        },
    );
    assert_eq!(state.view().stage, None);
    assert!(!state.consume_dirty());
}

#[test]
fn stage_is_cleared_on_completion() {
    let state = started();
    let (state, _) = update(
        state,
        Msg::ConversionProgress {
            request_id: 1,
            stage: Stage::Bundling,
        },
    );
    let (state, _) = update(
        state,
        Msg::ConversionFinished {
            request_id: 1,
            result: Ok("done".to_string()),
        },
    );
    assert_eq!(state.view().stage, None);
}
