mod media;
mod preview;
mod report;
mod step;

pub use media::{IncomingFile, MediaFile, MediaSummary};
pub use preview::{PreviewContent, PreviewRegistry};
pub use report::{CompletedReport, HazardAttributes, HazardFeature};
pub use step::WizardStep;
