use log::{error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::display::{format_for_display, ProbabilityRow};
use super::vocabulary::display_label;
use super::{LocationCode, PatientInput, PredictionResult};
use crate::model::reporter::ReportRequest;
use crate::model::ModelManager;

/// Everything shown to the user after one submission.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub location: LocationCode,
    pub location_warning: Option<String>,
    pub prediction: PredictionResult,
    pub top_label: Option<String>,
    pub prediction_error: Option<String>,
    pub probabilities: Vec<ProbabilityRow>,
    pub report: Option<String>,
    pub report_error: Option<String>,
}

/// Run one interaction: normalize, classify, then explain.
///
/// Remote failures never escape; they are recorded on the outcome. A failed
/// prediction stops the scan before any report is requested.
pub async fn run_scan(models: &ModelManager, input: &PatientInput) -> ScanOutcome {
    let scan_id = Uuid::new_v4();
    let location = input.location();

    let location_warning = location.is_unknown().then(|| {
        warn!(
            "Scan {}: body location {:?} is not mapped, sending \"unknown\"",
            scan_id, input.body_location
        );
        format!(
            "Location \"{}\" is not recognised; the prediction may be less accurate.",
            input.body_location
        )
    });

    let mut outcome = ScanOutcome {
        scan_id,
        location,
        location_warning,
        prediction: PredictionResult::unknown(),
        top_label: None,
        prediction_error: None,
        probabilities: Vec::new(),
        report: None,
        report_error: None,
    };

    match models
        .classifier
        .predict(&input.image, input.age, input.sex, location)
        .await
    {
        Ok(prediction) => outcome.prediction = prediction,
        Err(e) => {
            error!("Scan {}: prediction failed: {}", scan_id, e);
            outcome.prediction_error = Some(e.to_string());
            return outcome;
        }
    }

    let top_class = outcome.prediction.top_class.clone();
    info!(
        "Scan {}: top prediction {} of {} classes",
        scan_id,
        top_class,
        outcome.prediction.probabilities.len()
    );
    outcome.top_label = Some(display_label(&top_class).to_string());
    outcome.probabilities = format_for_display(&outcome.prediction.probabilities);

    let request = ReportRequest {
        top_class: &top_class,
        age: input.age,
        sex: input.sex,
        location,
        lifestyle_work: &input.lifestyle_work,
    };
    match models.reporter.compose(&request, models.max_tokens).await {
        Ok(report) => outcome.report = Some(report),
        Err(e) => {
            error!("Scan {}: report generation failed: {}", scan_id, e);
            outcome.report_error = Some(e.to_string());
        }
    }

    outcome
}
