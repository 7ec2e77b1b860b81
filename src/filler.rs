//! The per-field auto-fill loop.

use tracing::{error, warn};

use crate::answer::{self, Resolution};
use crate::config::AutomationConfig;
use crate::fields::FormField;
use crate::llm::LlmClient;
use crate::page::Page;
use crate::panel;
use crate::resume::ResumeDocument;

/// Summary of one auto-fill pass over a selected form area.
#[derive(Debug, Clone)]
pub struct FillReport {
    pub total_fields: usize,
    pub filled_fields: usize,
    pub errors: Vec<String>,
    pub success: bool,
}

/// Drives value resolution and filling for every field in a selected area.
pub struct FormFiller<'a> {
    page: &'a Page,
    resume: &'a ResumeDocument,
    llm: &'a LlmClient,
    automation: &'a AutomationConfig,
}

impl<'a> FormFiller<'a> {
    pub fn new(
        page: &'a Page,
        resume: &'a ResumeDocument,
        llm: &'a LlmClient,
        automation: &'a AutomationConfig,
    ) -> Self {
        Self {
            page,
            resume,
            llm,
            automation,
        }
    }

    /// Fill every visible field inside the selected area, in detection
    /// order. A per-field failure is recorded and the loop continues; only
    /// a failure of discovery itself marks the report unsuccessful.
    pub async fn fill_area(&self, area_selector: &str) -> FillReport {
        let mut report = FillReport {
            total_fields: 0,
            filled_fields: 0,
            errors: Vec::new(),
            success: true,
        };

        panel::update_status(self.page, "Analyzing form fields...").await;

        let fields = match self.page.form_fields(area_selector).await {
            Ok(fields) => fields,
            Err(e) => {
                error!("form discovery failed: {e}");
                report.errors.push(format!("Form filling failed: {e}"));
                report.success = false;
                return report;
            }
        };
        report.total_fields = fields.len();

        panel::update_status(
            self.page,
            &format!("Found {} fields. Starting auto-fill...", fields.len()),
        )
        .await;

        for field in &fields {
            if !field.visible {
                continue;
            }

            let question = field.question();
            let value = self.resolve_value(&question, field).await;
            if value.is_empty() {
                warn!("no value for {}", field.selector);
                continue;
            }

            match self.page.fill_field(field, &value, self.automation).await {
                Ok(()) => {
                    report.filled_fields += 1;
                    panel::update_status(
                        self.page,
                        &format!(
                            "Filled {}/{} fields",
                            report.filled_fields, report.total_fields
                        ),
                    )
                    .await;
                }
                Err(e) => {
                    let msg = format!("Failed to fill {}: {e}", field.selector);
                    warn!("{msg}");
                    report.errors.push(msg);
                }
            }
        }

        panel::update_status(
            self.page,
            &format!(
                "Completed! Filled {}/{} fields",
                report.filled_fields, report.total_fields
            ),
        )
        .await;

        report
    }

    /// Resolve one field's value: direct fact, generated answer, or type
    /// default. Empty means "skip this field".
    async fn resolve_value(&self, question: &str, field: &FormField) -> String {
        match answer::classify(question, &field.r#type, self.resume) {
            Resolution::Direct(value) => value,
            Resolution::Abstract => self.llm.generate_answer(question, self.resume, "").await,
            Resolution::Default => answer::default_value(field, self.resume),
        }
    }
}
