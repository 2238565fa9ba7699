use serde::{Deserialize, Serialize};

/// Fonts and sizes for exported reports. Sizes are in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    pub body_font: String,
    pub heading_font: String,
    pub body_size: usize,
    pub heading1_size: usize,
    pub heading2_size: usize,
    /// Size of the text inside the score table.
    pub table_size: usize,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Arial".to_string(),
            body_size: 11,
            heading1_size: 16,
            heading2_size: 13,
            table_size: 10,
        }
    }
}
