use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ordered steps of the hazard wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PickCategory,
    PickSubcategory,
    Description,
    Media,
    Review,
    Confirmation,
}

impl WizardStep {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short label for the step indicator
    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::PickCategory => "Hazard",
            WizardStep::PickSubcategory => "Type",
            WizardStep::Description => "Description",
            WizardStep::Media => "Media",
            WizardStep::Review => "Review",
            WizardStep::Confirmation => "Confirmation",
        }
    }

    /// Heading shown for the step; the subcategory step names the category
    pub fn title(&self, category: Option<&str>) -> String {
        match self {
            WizardStep::PickCategory => "What Hazard Did You See?".to_string(),
            WizardStep::PickSubcategory => {
                format!("What Type of \"{}\" Hazard?", category.unwrap_or_default())
            }
            WizardStep::Description => "Please Describe the Hazard (Optional)".to_string(),
            WizardStep::Media => "Add Media (Optional)".to_string(),
            WizardStep::Review => "Review Your Hazard Report".to_string(),
            WizardStep::Confirmation => "Submission Completed (Thank You!)".to_string(),
        }
    }

    pub(crate) fn following(&self) -> Option<WizardStep> {
        match self {
            WizardStep::PickCategory => Some(WizardStep::PickSubcategory),
            WizardStep::PickSubcategory => Some(WizardStep::Description),
            WizardStep::Description => Some(WizardStep::Media),
            WizardStep::Media => Some(WizardStep::Review),
            WizardStep::Review => Some(WizardStep::Confirmation),
            WizardStep::Confirmation => None,
        }
    }

    pub(crate) fn preceding(&self) -> Option<WizardStep> {
        match self {
            WizardStep::PickCategory => None,
            WizardStep::PickSubcategory => Some(WizardStep::PickCategory),
            WizardStep::Description => Some(WizardStep::PickSubcategory),
            WizardStep::Media => Some(WizardStep::Description),
            WizardStep::Review => Some(WizardStep::Media),
            WizardStep::Confirmation => Some(WizardStep::Review),
        }
    }
}
