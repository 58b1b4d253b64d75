#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the conversion operation for `url`; the result comes back as
    /// `Msg::ConversionFinished` carrying the same `request_id`.
    InvokeConversion {
        request_id: crate::RequestId,
        url: String,
    },
}
