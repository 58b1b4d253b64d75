use crate::{is_submittable_url, AppState, Effect, Msg};

pub const IN_PROGRESS_MESSAGE: &str = "Converting webpage to app...";

const EMPTY_URL_HINT: &str = "Please enter a URL.";
const INVALID_URL_HINT: &str = "Please enter a valid URL.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(text) => {
            // The input is disabled while converting.
            if !state.is_converting() {
                state.set_url(text);
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.is_converting() {
                return (state, Vec::new());
            }
            let url = state.url().trim().to_string();
            if url.is_empty() {
                state.reject_submission(EMPTY_URL_HINT);
                return (state, Vec::new());
            }
            if !is_submittable_url(&url) {
                state.reject_submission(INVALID_URL_HINT);
                return (state, Vec::new());
            }
            let request_id = state.begin_conversion(IN_PROGRESS_MESSAGE);
            vec![Effect::InvokeConversion { request_id, url }]
        }
        Msg::ConversionProgress { request_id, stage } => {
            state.apply_progress(request_id, stage);
            Vec::new()
        }
        Msg::ConversionFinished { request_id, result } => {
            state.apply_finished(request_id, result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
