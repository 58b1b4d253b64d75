//! Appforge core: pure state machine for the conversion request form.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{is_submittable_url, AppState, RequestId, Stage};
pub use update::{update, IN_PROGRESS_MESSAGE};
pub use view_model::{FormView, SUBMIT_LABEL, SUBMIT_LABEL_BUSY};
