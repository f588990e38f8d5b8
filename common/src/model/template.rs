use crate::model::placeholder::PlaceholderSpec;
use serde::{Deserialize, Serialize};

/// The kind of document a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    OfferLetter,
    AppointmentLetter,
    ExperienceCertificate,
    RelievingLetter,
    SalarySlip,
    Other,
}

impl TemplateCategory {
    /// Stable string form used for persistence and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::OfferLetter => "offer_letter",
            TemplateCategory::AppointmentLetter => "appointment_letter",
            TemplateCategory::ExperienceCertificate => "experience_certificate",
            TemplateCategory::RelievingLetter => "relieving_letter",
            TemplateCategory::SalarySlip => "salary_slip",
            TemplateCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "offer_letter" => Some(TemplateCategory::OfferLetter),
            "appointment_letter" => Some(TemplateCategory::AppointmentLetter),
            "experience_certificate" => Some(TemplateCategory::ExperienceCertificate),
            "relieving_letter" => Some(TemplateCategory::RelievingLetter),
            "salary_slip" => Some(TemplateCategory::SalarySlip),
            "other" => Some(TemplateCategory::Other),
            _ => None,
        }
    }
}

/// A named template: raw body text containing `{{key}}` tokens plus the
/// placeholder schema reconciled against that body.
///
/// Templates are never deleted while generated documents reference them;
/// `is_active` is flipped off instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub body: String,
    pub placeholders: Vec<PlaceholderSpec>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub usage_count: u64,
}

fn default_active() -> bool {
    true
}
