use tera::{Context, Tera};

use crate::error::ExportError;
use crate::report::ReportView;

const REPORT_TEMPLATE_NAME: &str = "report.md";
const REPORT_TEMPLATE: &str = include_str!("../templates/report.md");

/// Render a report with the built-in template.
///
/// Output is the Markdown subset understood by [`crate::docx::generate_docx`].
pub fn render_report(view: &ReportView) -> Result<String, ExportError> {
    render_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE, view)
}

/// Render a report with a caller-supplied Tera template.
///
/// The serialized [`ReportView`] fields are the template context. Names
/// ending in `.html` get Tera's autoescaping.
pub fn render_template(
    template_name: &str,
    template_content: &str,
    view: &ReportView,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(view)?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(template_name, &context)?;
    tracing::debug!(
        screening_id = %view.screening_id,
        template = template_name,
        bytes = rendered.len(),
        "report rendered"
    );
    Ok(rendered)
}
