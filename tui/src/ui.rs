mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_focus_overlay,
    render_header,
    render_help_screen,
    render_outline,
    render_prompt_overlay,
    render_stash_panel,
    render_stash_picker,
    render_status_bar,
};
