use chrono::{DateTime, Utc};

use crate::features::hazards::dtos::WizardSnapshotDto;
use crate::features::hazards::errors::WizardError;
use crate::features::hazards::events::{EventBus, HazardEvent};
use crate::features::hazards::models::{
    CompletedReport, IncomingFile, MediaFile, PreviewRegistry, WizardStep,
};
use crate::features::map::models::{LayerDescriptor, SubcategoryOption};
use crate::shared::constants::{MAX_DESCRIPTION_CHARS, MAX_MEDIA_FILE_SIZE};

/// Result of adding one selection of files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBatchOutcome {
    pub accepted: usize,
    pub rejected: Vec<String>,
    pub message: Option<String>,
}

/// The hazard submission wizard.
///
/// A six-step state machine over a single draft report. Category and
/// subcategory can only be set by selection (which auto-advances), so no step
/// after `PickSubcategory` is reachable without both.
pub struct HazardWizard {
    open: bool,
    step: WizardStep,
    category: Option<LayerDescriptor>,
    subcategory_options: Vec<SubcategoryOption>,
    subcategory: Option<String>,
    description: String,
    occurred_at: DateTime<Utc>,
    media: Vec<MediaFile>,
    media_error: Option<String>,
    previews: PreviewRegistry,
    bus: EventBus,
}

impl HazardWizard {
    pub fn new(previews: PreviewRegistry, bus: EventBus) -> Self {
        Self {
            open: false,
            step: WizardStep::PickCategory,
            category: None,
            subcategory_options: Vec::new(),
            subcategory: None,
            description: String::new(),
            occurred_at: Utc::now(),
            media: Vec::new(),
            media_error: None,
            previews,
            bus,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn title(&self) -> String {
        self.step
            .title(self.category.as_ref().map(|c| c.name.as_str()))
    }

    pub fn category(&self) -> Option<&LayerDescriptor> {
        self.category.as_ref()
    }

    pub fn subcategory_options(&self) -> &[SubcategoryOption] {
        &self.subcategory_options
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn media(&self) -> &[MediaFile] {
        &self.media
    }

    pub fn media_error(&self) -> Option<&str> {
        self.media_error.as_deref()
    }

    /// Display name of a subcategory code, falling back to the code itself
    pub fn subcategory_name(&self, code: &str) -> String {
        self.subcategory_options
            .iter()
            .find(|option| option.code == code)
            .map(|option| option.name.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Open on the first step with an empty draft.
    ///
    /// Re-opening keeps an unfinished draft. A wizard left on the confirmation
    /// step starts over.
    pub fn open(&mut self) {
        if self.open && self.step != WizardStep::Confirmation {
            return;
        }
        self.reset_draft();
        self.open = true;
        self.step = WizardStep::PickCategory;
        self.bus.publish(HazardEvent::WizardOpened);
        self.publish_step();
    }

    /// Close and discard the draft, releasing every preview
    pub fn close(&mut self) {
        let was_open = self.open;
        self.reset_draft();
        self.open = false;
        self.step = WizardStep::PickCategory;
        if was_open {
            self.bus.publish(HazardEvent::WizardClosed);
        }
    }

    /// Fail unless the wizard is open on one of `allowed`
    pub fn ensure_step(&self, allowed: &[WizardStep]) -> Result<(), WizardError> {
        if !self.open {
            return Err(WizardError::NotOpen);
        }
        if !allowed.contains(&self.step) {
            return Err(WizardError::WrongStep(self.step));
        }
        Ok(())
    }

    pub fn select_category(
        &mut self,
        layer: LayerDescriptor,
        options: Vec<SubcategoryOption>,
    ) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::PickCategory])?;

        tracing::debug!(
            "Category selected: {} ({} subcategories)",
            layer.name,
            options.len()
        );

        if self.category.as_ref() != Some(&layer) {
            self.subcategory = None;
        }
        self.category = Some(layer);
        self.subcategory_options = options;
        self.bus.publish(HazardEvent::DraftUpdated);
        self.advance(WizardStep::PickSubcategory);
        Ok(())
    }

    pub fn select_subcategory(&mut self, code: &str) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::PickSubcategory])?;

        if !self.subcategory_options.iter().any(|o| o.code == code) {
            return Err(WizardError::UnknownSubcategory(code.to_string()));
        }

        self.subcategory = Some(code.to_string());
        self.bus.publish(HazardEvent::DraftUpdated);
        self.advance(WizardStep::Description);
        Ok(())
    }

    /// Replace the description. Input longer than the cap is rejected whole.
    pub fn set_description(&mut self, text: &str) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::Description, WizardStep::Review])?;

        if text.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(WizardError::DescriptionTooLong);
        }

        self.description = text.to_string();
        self.bus.publish(HazardEvent::DraftUpdated);
        Ok(())
    }

    pub fn remaining_description_chars(&self) -> usize {
        MAX_DESCRIPTION_CHARS.saturating_sub(self.description.chars().count())
    }

    /// Append a selection of files.
    ///
    /// Files at or above the size limit and anything that is not an image or a
    /// video are left out and named in one dismissible message. A selection
    /// with no rejections clears the previous message.
    pub fn add_media(&mut self, files: Vec<IncomingFile>) -> Result<MediaBatchOutcome, WizardError> {
        self.ensure_step(&[WizardStep::Media, WizardStep::Review])?;

        let mut oversized = Vec::new();
        let mut unsupported = Vec::new();
        let mut accepted = 0;

        for file in files {
            if file.size() >= MAX_MEDIA_FILE_SIZE {
                oversized.push(file.file_name);
            } else if !file.is_image_or_video() {
                unsupported.push(file.file_name);
            } else {
                let preview = self.previews.register(&file.content_type, file.bytes.clone());
                self.media.push(MediaFile::new(file, preview));
                accepted += 1;
            }
        }

        let mut sentences = Vec::new();
        if !oversized.is_empty() {
            sentences.push(format!(
                "The following files exceed 10 MB and were not added: {}",
                oversized.join(", ")
            ));
        }
        if !unsupported.is_empty() {
            sentences.push(format!(
                "The following files are not images or videos and were not added: {}",
                unsupported.join(", ")
            ));
        }

        let rejected: Vec<String> = oversized.into_iter().chain(unsupported).collect();
        let message = if sentences.is_empty() {
            None
        } else {
            Some(sentences.join(" "))
        };

        self.media_error = message.clone();

        if let Some(message) = &message {
            tracing::info!("Rejected {} media file(s)", rejected.len());
            self.bus.publish(HazardEvent::MediaRejected {
                message: message.clone(),
                file_names: rejected.clone(),
            });
        }
        if accepted > 0 {
            self.bus.publish(HazardEvent::DraftUpdated);
        }

        Ok(MediaBatchOutcome {
            accepted,
            rejected,
            message,
        })
    }

    /// Remove the file at `index` together with its preview
    pub fn remove_media(&mut self, index: usize) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::Media, WizardStep::Review])?;

        if index >= self.media.len() {
            return Err(WizardError::MediaIndexOutOfRange(index));
        }

        let removed = self.media.remove(index);
        tracing::debug!("Removed media file {}", removed.file_name);
        drop(removed);

        self.bus.publish(HazardEvent::DraftUpdated);
        Ok(())
    }

    pub fn dismiss_media_error(&mut self) {
        if self.media_error.take().is_some() {
            self.bus.publish(HazardEvent::DraftUpdated);
        }
    }

    /// Generic "Next". Selection steps advance only by selecting; Review advances only by submitting.
    pub fn next(&mut self) -> Result<(), WizardError> {
        if !self.open {
            return Err(WizardError::NotOpen);
        }
        match self.step {
            WizardStep::PickCategory | WizardStep::PickSubcategory => {
                Err(WizardError::SelectionRequired)
            }
            WizardStep::Description | WizardStep::Media => {
                if let Some(next) = self.step.following() {
                    self.advance(next);
                }
                Ok(())
            }
            WizardStep::Review | WizardStep::Confirmation => Err(WizardError::WrongStep(self.step)),
        }
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        if !self.open {
            return Err(WizardError::NotOpen);
        }
        if self.step == WizardStep::Confirmation {
            return Err(WizardError::CannotGoBack);
        }
        let previous = self.step.preceding().ok_or(WizardError::CannotGoBack)?;
        self.advance(previous);
        Ok(())
    }

    /// Check that `submit` would succeed, without changing anything
    pub fn ensure_ready_to_submit(&self) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::Review])?;
        if self.category.is_none() || self.subcategory.is_none() {
            return Err(WizardError::Incomplete);
        }
        Ok(())
    }

    /// Hand off the completed report, reset the draft and show the confirmation step
    pub fn submit(&mut self) -> Result<CompletedReport, WizardError> {
        self.ensure_ready_to_submit()?;

        let category = self.category.take().ok_or(WizardError::Incomplete)?;
        let subcategory = self.subcategory.take().ok_or(WizardError::Incomplete)?;

        let report = CompletedReport {
            category: category.name,
            subcategory,
            description: std::mem::take(&mut self.description),
            occurred_at: self.occurred_at,
            media: std::mem::take(&mut self.media),
        };

        self.reset_draft();
        self.advance(WizardStep::Confirmation);
        Ok(report)
    }

    pub fn snapshot(&self) -> WizardSnapshotDto {
        let step = self.step();
        WizardSnapshotDto {
            open: self.is_open(),
            step,
            step_index: step.index(),
            step_label: step.label().to_string(),
            title: self.title(),
            category: self.category().cloned(),
            subcategory_options: self.subcategory_options().to_vec(),
            subcategory: self.subcategory.as_ref().map(|code| SubcategoryOption {
                name: self.subcategory_name(code),
                code: code.clone(),
            }),
            description: self.description().to_string(),
            remaining_description_chars: self.remaining_description_chars(),
            occurred_at: self.occurred_at,
            media: self
                .media()
                .iter()
                .enumerate()
                .map(|(index, file)| file.summary(index))
                .collect(),
            media_error: self.media_error().map(str::to_string),
            can_go_back: self.open
                && !matches!(step, WizardStep::PickCategory | WizardStep::Confirmation),
            can_go_next: self.open && matches!(step, WizardStep::Description | WizardStep::Media),
            can_submit: self.ensure_ready_to_submit().is_ok(),
        }
    }

    fn advance(&mut self, step: WizardStep) {
        self.step = step;
        self.publish_step();
    }

    fn publish_step(&self) {
        self.bus.publish(HazardEvent::StepChanged {
            step: self.step,
            title: self.title(),
        });
    }

    fn reset_draft(&mut self) {
        self.category = None;
        self.subcategory_options.clear();
        self.subcategory = None;
        self.description.clear();
        self.occurred_at = Utc::now();
        // Dropping the files releases their previews
        self.media.clear();
        self.media_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    const MB: usize = 1024 * 1024;

    fn traffic() -> LayerDescriptor {
        LayerDescriptor {
            id: 2,
            name: "Traffic".to_string(),
            endpoint: "https://features.test/FeatureServer/2".to_string(),
        }
    }

    fn traffic_options() -> Vec<SubcategoryOption> {
        vec![
            SubcategoryOption {
                name: "Accident".to_string(),
                code: "1".to_string(),
            },
            SubcategoryOption {
                name: "Road Closure".to_string(),
                code: "2".to_string(),
            },
        ]
    }

    fn file(name: &str, content_type: &str, size: usize) -> IncomingFile {
        IncomingFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    fn wizard() -> (HazardWizard, PreviewRegistry) {
        let previews = PreviewRegistry::new();
        let wizard = HazardWizard::new(previews.clone(), EventBus::new(64));
        (wizard, previews)
    }

    fn wizard_at_media() -> (HazardWizard, PreviewRegistry) {
        let (mut wizard, previews) = wizard();
        wizard.open();
        wizard.select_category(traffic(), traffic_options()).unwrap();
        wizard.select_subcategory("2").unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.step(), WizardStep::Media);
        (wizard, previews)
    }

    #[test]
    fn test_selection_auto_advances() {
        let (mut wizard, _) = wizard();
        wizard.open();
        assert_eq!(wizard.step(), WizardStep::PickCategory);
        assert_eq!(wizard.title(), "What Hazard Did You See?");

        wizard.select_category(traffic(), traffic_options()).unwrap();
        assert_eq!(wizard.step(), WizardStep::PickSubcategory);
        assert_eq!(wizard.title(), "What Type of \"Traffic\" Hazard?");

        wizard.select_subcategory("2").unwrap();
        assert_eq!(wizard.step(), WizardStep::Description);
        assert_eq!(wizard.subcategory_name("2"), "Road Closure");
        assert_eq!(wizard.subcategory_name("9"), "9");
    }

    #[test]
    fn test_no_skip_past_selection() {
        let (mut wizard, _) = wizard();
        wizard.open();
        assert_eq!(wizard.next(), Err(WizardError::SelectionRequired));
        assert_eq!(
            wizard.set_description("hello"),
            Err(WizardError::WrongStep(WizardStep::PickCategory))
        );

        wizard.select_category(traffic(), traffic_options()).unwrap();
        assert_eq!(wizard.next(), Err(WizardError::SelectionRequired));
        assert_eq!(
            wizard.select_subcategory("7"),
            Err(WizardError::UnknownSubcategory("7".to_string()))
        );
        assert_eq!(wizard.step(), WizardStep::PickSubcategory);
    }

    #[test]
    fn test_back_navigation_bounds() {
        let (mut wizard, _) = wizard();
        wizard.open();
        assert_eq!(wizard.back(), Err(WizardError::CannotGoBack));

        wizard.select_category(traffic(), traffic_options()).unwrap();
        wizard.back().unwrap();
        assert_eq!(wizard.step(), WizardStep::PickCategory);
    }

    #[test]
    fn test_description_cap_rejects_at_input() {
        let (mut wizard, _) = wizard_at_media();
        wizard.back().unwrap();

        let exact: String = "é".repeat(250);
        wizard.set_description(&exact).unwrap();
        assert_eq!(wizard.description().chars().count(), 250);
        assert_eq!(wizard.remaining_description_chars(), 0);

        let too_long = "a".repeat(251);
        assert_eq!(
            wizard.set_description(&too_long),
            Err(WizardError::DescriptionTooLong)
        );
        assert_eq!(wizard.description(), exact);
    }

    #[test]
    fn test_media_threshold_and_order() {
        let (mut wizard, previews) = wizard_at_media();

        let outcome = wizard
            .add_media(vec![
                file("a.jpg", "image/jpeg", 3 * MB),
                file("big.mp4", "video/mp4", 12 * MB),
                file("edge.png", "image/png", 10 * MB),
                file("b.mov", "video/quicktime", 10 * MB - 1),
            ])
            .unwrap();

        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.rejected, vec!["big.mp4", "edge.png"]);
        assert_eq!(
            outcome.message.as_deref(),
            Some("The following files exceed 10 MB and were not added: big.mp4, edge.png")
        );
        let names: Vec<&str> = wizard.media().iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.mov"]);
        assert_eq!(previews.len(), 2);

        wizard
            .add_media(vec![file("c.jpg", "image/jpeg", MB)])
            .unwrap();
        assert!(wizard.media_error().is_none());
    }

    #[test]
    fn test_unsupported_media_named_in_message() {
        let (mut wizard, _) = wizard_at_media();
        let outcome = wizard
            .add_media(vec![file("notes.pdf", "application/pdf", MB)])
            .unwrap();
        assert_eq!(outcome.accepted, 0);
        assert_eq!(
            wizard.media_error(),
            Some("The following files are not images or videos and were not added: notes.pdf")
        );
        wizard.dismiss_media_error();
        assert!(wizard.media_error().is_none());
    }

    #[test]
    fn test_remove_media_releases_paired_preview() {
        let (mut wizard, previews) = wizard_at_media();
        wizard
            .add_media(vec![
                file("a.jpg", "image/jpeg", MB),
                file("b.jpg", "image/jpeg", MB),
                file("c.jpg", "image/jpeg", MB),
            ])
            .unwrap();
        let removed_preview = wizard.media()[1].preview_id();

        wizard.remove_media(1).unwrap();

        let names: Vec<&str> = wizard.media().iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert_eq!(previews.len(), 2);
        assert!(previews.get(&removed_preview).is_none());
        assert_eq!(
            wizard.remove_media(5),
            Err(WizardError::MediaIndexOutOfRange(5))
        );
    }

    #[test]
    fn test_close_releases_all_previews() {
        let (mut wizard, previews) = wizard_at_media();
        wizard
            .add_media(vec![file("a.jpg", "image/jpeg", MB)])
            .unwrap();
        wizard.close();
        assert!(previews.is_empty());
        assert!(!wizard.is_open());
        assert_eq!(wizard.step(), WizardStep::PickCategory);
    }

    #[test]
    fn test_submit_hands_off_and_resets() {
        let (mut wizard, previews) = wizard_at_media();
        wizard
            .add_media(vec![file("a.jpg", "image/jpeg", MB)])
            .unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        wizard.set_description("Lane shut").unwrap();

        let report = wizard.submit().unwrap();
        assert_eq!(report.category, "Traffic");
        assert_eq!(report.subcategory, "2");
        assert_eq!(report.description, "Lane shut");
        assert_eq!(report.media.len(), 1);

        assert_eq!(wizard.step(), WizardStep::Confirmation);
        assert!(wizard.description().is_empty());
        assert!(wizard.media().is_empty());
        assert_eq!(wizard.back(), Err(WizardError::CannotGoBack));
        assert_eq!(
            wizard.next(),
            Err(WizardError::WrongStep(WizardStep::Confirmation))
        );

        // Previews live as long as the report's files
        assert_eq!(previews.len(), 1);
        drop(report);
        assert!(previews.is_empty());

        wizard.close();
        wizard.open();
        assert_eq!(wizard.step(), WizardStep::PickCategory);
    }

    #[test]
    fn test_reopen_keeps_unfinished_draft() {
        let (mut wizard, _) = wizard_at_media();
        wizard.open();
        assert_eq!(wizard.step(), WizardStep::Media);
        assert_eq!(wizard.category().map(|c| c.id), Some(2));
    }

    #[test]
    fn test_reopen_after_confirmation_starts_over() {
        let (mut wizard, _) = wizard_at_media();
        wizard.next().unwrap();
        wizard.submit().unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirmation);

        wizard.open();
        assert!(wizard.is_open());
        assert_eq!(wizard.step(), WizardStep::PickCategory);
        wizard.select_category(traffic(), traffic_options()).unwrap();
        assert_eq!(wizard.step(), WizardStep::PickSubcategory);
    }
}
