use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use appforge_core::{Effect, Msg, RequestId, Stage};
use appforge_engine::{ConversionOutcome, ConvertError, EngineConfig, EngineEvent, EngineHandle};
use chrono::Utc;
use engine_logging::{engine_error, engine_info, engine_warn};

use super::history::{append_history, HistoryEntry};

const ENGINE_STOPPED: &str = "internal error: conversion engine stopped";

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    history_dir: PathBuf,
    pending: HashMap<RequestId, String>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> std::io::Result<Self> {
        let history_dir = config.output_root.clone();
        let engine = EngineHandle::new(config)?;
        Ok(Self {
            engine,
            history_dir,
            pending: HashMap::new(),
        })
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::InvokeConversion { request_id, url } => {
                    engine_info!("InvokeConversion request_id={} url={}", request_id, url);
                    self.pending.insert(request_id, url.clone());
                    self.engine.convert(request_id, url);
                }
            }
        }
    }

    /// Waits up to `timeout` for the first engine event, then drains the rest.
    pub fn poll(&mut self, timeout: Duration) -> Vec<Msg> {
        let first = match self.engine.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return Vec::new(),
            Err(RecvTimeoutError::Disconnected) => return self.fail_pending(),
        };
        let mut msgs = vec![self.map_event(first)];
        while let Some(event) = self.engine.try_recv() {
            msgs.push(self.map_event(event));
        }
        msgs
    }

    /// Resolves every outstanding request once the engine can no longer answer.
    fn fail_pending(&mut self) -> Vec<Msg> {
        let pending: Vec<_> = self.pending.drain().collect();
        pending
            .into_iter()
            .map(|(request_id, url)| {
                engine_error!("Engine stopped before finishing request {}", request_id);
                let text = ENGINE_STOPPED.to_string();
                append_history(
                    &self.history_dir,
                    HistoryEntry {
                        url,
                        succeeded: false,
                        text: text.clone(),
                        installer_path: None,
                        finished_utc: Utc::now().to_rfc3339(),
                    },
                );
                Msg::ConversionFinished {
                    request_id,
                    result: Err(text),
                }
            })
            .collect()
    }

    fn map_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Progress { request_id, stage } => Msg::ConversionProgress {
                request_id,
                stage: map_stage(stage),
            },
            EngineEvent::Completed { request_id, result } => {
                self.record(request_id, &result);
                Msg::ConversionFinished {
                    request_id,
                    result: result
                        .map(|outcome| outcome.message)
                        .map_err(|err| err.to_string()),
                }
            }
        }
    }

    fn record(&mut self, request_id: RequestId, result: &Result<ConversionOutcome, ConvertError>) {
        let url = self.pending.remove(&request_id).unwrap_or_default();
        let entry = match result {
            Ok(outcome) => HistoryEntry {
                url,
                succeeded: true,
                text: outcome.message.clone(),
                installer_path: outcome
                    .installer_path
                    .as_ref()
                    .map(|p| p.display().to_string()),
                finished_utc: Utc::now().to_rfc3339(),
            },
            Err(err) => {
                engine_warn!("Conversion {} failed: {}", request_id, err);
                HistoryEntry {
                    url,
                    succeeded: false,
                    text: err.to_string(),
                    installer_path: None,
                    finished_utc: Utc::now().to_rfc3339(),
                }
            }
        };
        append_history(&self.history_dir, entry);
    }
}

fn map_stage(stage: appforge_engine::Stage) -> Stage {
    match stage {
        appforge_engine::Stage::Validating => Stage::Validating,
        appforge_engine::Stage::Probing => Stage::Probing,
        appforge_engine::Stage::Scaffolding => Stage::Scaffolding,
        appforge_engine::Stage::Bundling => Stage::Bundling,
        appforge_engine::Stage::Done => Stage::Done,
    }
}
