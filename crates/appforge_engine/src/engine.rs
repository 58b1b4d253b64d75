use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error};

use crate::convert::{AppConverter, ProgressSink};
use crate::{ConvertError, ConvertRequest, EngineConfig, EngineEvent, FailureKind, RequestId};

/// Forwards progress events onto the engine's event channel.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Convert { request_id: RequestId, url: String },
}

/// Runs conversions on a background tokio runtime and reports events over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> io::Result<Self> {
        Self::with_converter(AppConverter::new(config))
    }

    pub fn with_converter(converter: AppConverter) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let converter = Arc::new(converter);

        thread::Builder::new()
            .name("appforge-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let converter = converter.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(handle_command(converter, command, event_tx));
                }
                engine_debug!("Engine command channel closed");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn convert(&self, request_id: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Convert {
            request_id,
            url: url.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// `Disconnected` means the worker is gone and no further events will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

async fn handle_command(
    converter: Arc<AppConverter>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Convert { request_id, url } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let task = tokio::spawn(async move {
                let request = ConvertRequest::new(url);
                converter.convert(request_id, &request, &sink).await
            });
            // A panicking conversion still has to resolve its request.
            let result = task.await.unwrap_or_else(|join_err| {
                engine_error!("Conversion {} aborted: {}", request_id, join_err);
                Err(ConvertError::new(
                    FailureKind::Internal,
                    "conversion task stopped unexpectedly",
                ))
            });
            let _ = event_tx.send(EngineEvent::Completed { request_id, result });
        }
    }
}
