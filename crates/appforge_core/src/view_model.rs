use crate::Stage;

pub const SUBMIT_LABEL: &str = "Convert to App";
pub const SUBMIT_LABEL_BUSY: &str = "Converting...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub url: String,
    pub message: String,
    pub error: String,
    pub validation: Option<String>,
    pub is_converting: bool,
    pub stage: Option<Stage>,
    pub input_enabled: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}
