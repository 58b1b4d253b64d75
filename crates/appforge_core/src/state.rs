use url::Url;

use crate::view_model::{FormView, SUBMIT_LABEL, SUBMIT_LABEL_BUSY};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Probing,
    Scaffolding,
    Bundling,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    url: String,
    message: String,
    error: String,
    validation: Option<String>,
    is_converting: bool,
    in_flight: Option<RequestId>,
    next_request_id: RequestId,
    stage: Option<Stage>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            url: String::new(),
            message: String::new(),
            error: String::new(),
            validation: None,
            is_converting: false,
            in_flight: None,
            next_request_id: 1,
            stage: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> FormView {
        FormView {
            url: self.url.clone(),
            message: self.message.clone(),
            error: self.error.clone(),
            validation: self.validation.clone(),
            is_converting: self.is_converting,
            stage: self.stage,
            input_enabled: !self.is_converting,
            submit_enabled: !self.is_converting,
            submit_label: if self.is_converting {
                SUBMIT_LABEL_BUSY
            } else {
                SUBMIT_LABEL
            },
        }
    }

    pub fn is_converting(&self) -> bool {
        self.is_converting
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
        self.validation = None;
        self.mark_dirty();
    }

    pub(crate) fn reject_submission(&mut self, hint: &str) {
        self.validation = Some(hint.to_string());
        self.mark_dirty();
    }

    /// Flips into the converting state and allocates the request id.
    pub(crate) fn begin_conversion(&mut self, in_progress: &str) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);
        self.is_converting = true;
        self.error.clear();
        self.validation = None;
        self.message = in_progress.to_string();
        self.stage = None;
        self.mark_dirty();
        request_id
    }

    pub(crate) fn apply_progress(&mut self, request_id: RequestId, stage: Stage) {
        if self.in_flight != Some(request_id) {
            return;
        }
        if self.stage != Some(stage) {
            self.stage = Some(stage);
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_finished(&mut self, request_id: RequestId, result: Result<String, String>) {
        if self.in_flight != Some(request_id) {
            return;
        }
        match result {
            Ok(text) => {
                self.message = text;
                self.error.clear();
                self.url.clear();
            }
            Err(text) => {
                self.error = text;
                self.message.clear();
            }
        }
        self.in_flight = None;
        self.is_converting = false;
        self.stage = None;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Mirrors browser `type=url` + `required` validation: non-blank and absolute.
pub fn is_submittable_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && Url::parse(trimmed).is_ok()
}
