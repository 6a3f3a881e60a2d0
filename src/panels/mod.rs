mod central_panel;
mod history_panel;
mod prompt_panel;
mod tools_panel;

pub use central_panel::{central_panel, fit_rect};
pub use history_panel::history_panel;
pub use prompt_panel::prompt_panel;
pub use tools_panel::{STYLE_PRESETS, tools_panel};
