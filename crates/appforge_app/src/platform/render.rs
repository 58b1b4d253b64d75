use appforge_core::{FormView, Stage};

pub const PROMPT: &str = "URL> ";

/// Terminal lines for one form redraw.
pub fn render(view: &FormView) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(hint) = &view.validation {
        lines.push(format!("! {hint}"));
    }

    if view.is_converting {
        let stage = view
            .stage
            .map(|s| format!(" ({})", stage_label(s)))
            .unwrap_or_default();
        lines.push(format!("[{}] {}{}", view.submit_label, view.message, stage));
    } else if !view.message.is_empty() {
        lines.push(view.message.clone());
    }

    if !view.error.is_empty() {
        lines.push(format!("Error: {}", view.error));
    }

    lines
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Validating => "validating URL",
        Stage::Probing => "fetching page",
        Stage::Scaffolding => "writing project",
        Stage::Bundling => "building installer",
        Stage::Done => "finishing",
    }
}
