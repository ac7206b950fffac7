mod line;
mod marker;

pub use line::Line;
pub use marker::{
    classify_edit, looks_like_header, marker_for, strip_header_marker, DETAIL_MARKER,
    HEADER_MARKER,
};

/// The document every new session starts from: one header with two children
pub fn seed_lines() -> Vec<Line> {
    vec![
        Line::new_header("Project Alpha".to_string(), 0),
        Line::new("setup repo".to_string(), 1),
        Line::new("install dependencies".to_string(), 1),
    ]
}
