// Renderers that turn a `QueryResult` into report text.
//
// - `text`: the framed plain-text report written to the results directory.
// - `html` / `json`: the two export formats.
// - `decoration`: the decorative status picker shared by all three.
//
// Renderers only build strings; writing them is the file store's job.

pub mod decoration;
pub mod html;
pub mod json;
pub mod text;

use chrono::NaiveDateTime;

use crate::model::QueryResult;
use decoration::Decoration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Json => "JSON",
        }
    }

    pub fn render(
        &self,
        result: &QueryResult,
        generated: NaiveDateTime,
        deco: &mut dyn Decoration,
    ) -> Result<String, serde_json::Error> {
        match self {
            ExportFormat::Html => Ok(html::render(result, generated, deco)),
            ExportFormat::Json => json::render(result, generated, deco),
        }
    }
}
