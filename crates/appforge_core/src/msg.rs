#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    UrlChanged(String),
    /// User submitted the form.
    SubmitClicked,
    /// Engine reached a new stage for a request.
    ConversionProgress {
        request_id: crate::RequestId,
        stage: crate::Stage,
    },
    /// Engine finished a request. The error side is already stringified.
    ConversionFinished {
        request_id: crate::RequestId,
        result: Result<String, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
