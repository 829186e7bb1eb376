//! Consequence labels: an ordered registry of independent predicates.
//!
//! Each predicate inspects a few fields of a normalized record and either
//! yields its label or nothing. Labels come out in registration order.

use crate::model::AccidentRecord;
use crate::rules::range::{expand_range, split_range};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Injury-description code for amputation or enucleation.
const INJURY_AMPUTATION: &str = "702070000";
/// Injury-description code for fracture.
const INJURY_FRACTURE: &str = "702035000";
/// Body-part codes for fingers.
const FINGER_BODY_PARTS: &[&str] = &["755070000"];

const AMPUTATION_EXCEPT_FINGER_CODES: &[&str] = &[
    "S080-S089", "S18", "S280-S281", "S380-S383", "S480-S489", "S580-S589", "S682-S689",
    "S780-S789", "S880-S889", "S980", "S983-S984", "T050-T059", "T116", "T136", "T147",
];
const AMPUTATION_FINGER_CODES: &[&str] = &["S680-S681", "S981-S982"];
const FRACTURE_EXCEPT_FINGER_CODES: &[&str] = &[
    "S020-S029", "S120-S129", "S220-S229", "S320-S328", "S420-S429", "S520-S529", "S620-S624",
    "S628", "S720-S729", "S820-S829", "S920-S923", "S927-S929", "T020-T029", "T08", "T100",
    "T101", "T120", "T121", "T142",
];
const FRACTURE_FINGER_CODES: &[&str] = &["S625-S627", "S924-S925"];
const VISION_LOSS_CODES: &[&str] = &["H540-H547", "H549"];
const HEARING_LOSS_CODES: &[&str] = &["H833", "H900-H908", "H910-H919"];

static AMPUTATION_EXCEPT_FINGER: LazyLock<HashSet<String>> =
    LazyLock::new(|| code_set(AMPUTATION_EXCEPT_FINGER_CODES));
static AMPUTATION_FINGER: LazyLock<HashSet<String>> =
    LazyLock::new(|| code_set(AMPUTATION_FINGER_CODES));
static FRACTURE_EXCEPT_FINGER: LazyLock<HashSet<String>> =
    LazyLock::new(|| code_set(FRACTURE_EXCEPT_FINGER_CODES));
static FRACTURE_FINGER: LazyLock<HashSet<String>> =
    LazyLock::new(|| code_set(FRACTURE_FINGER_CODES));
static VISION_LOSS: LazyLock<HashSet<String>> = LazyLock::new(|| code_set(VISION_LOSS_CODES));
static HEARING_LOSS: LazyLock<HashSet<String>> = LazyLock::new(|| code_set(HEARING_LOSS_CODES));

/// Expand a list of literal codes and ranges into a lookup set.
fn code_set(entries: &[&str]) -> HashSet<String> {
    entries
        .iter()
        .flat_map(|entry| match split_range(entry) {
            Some((start, end)) => {
                expand_range(start, end).expect("embedded diagnosis range is well-formed")
            }
            None => vec![entry.to_string()],
        })
        .collect()
}

/// A named test that maps a record to a consequence label.
pub trait ConsequencePredicate: Send + Sync {
    /// Stable identifier, used in logs.
    fn name(&self) -> &str;
    /// Label emitted when the predicate matches.
    fn label(&self) -> &str;
    fn matches(&self, record: &AccidentRecord) -> bool;
}

/// The built-in consequence categories, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consequence {
    Death,
    Hospitalization,
    AmputationExceptFinger,
    FingerAmputation,
    FractureExceptFinger,
    FingerFracture,
    VisionLoss,
    HearingLoss,
    Treatment16To30Days,
    TreatmentOver30Days,
}

impl Consequence {
    pub const ALL: [Consequence; 10] = [
        Consequence::Death,
        Consequence::Hospitalization,
        Consequence::AmputationExceptFinger,
        Consequence::FingerAmputation,
        Consequence::FractureExceptFinger,
        Consequence::FingerFracture,
        Consequence::VisionLoss,
        Consequence::HearingLoss,
        Consequence::Treatment16To30Days,
        Consequence::TreatmentOver30Days,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Consequence::Death => "Death",
            Consequence::Hospitalization => "Hospitalization",
            Consequence::AmputationExceptFinger => "Amputation (except finger)",
            Consequence::FingerAmputation => "Finger amputation",
            Consequence::FractureExceptFinger => "Fracture (except finger)",
            Consequence::FingerFracture => "Finger fracture",
            Consequence::VisionLoss => "Vision loss",
            Consequence::HearingLoss => "Hearing loss",
            Consequence::Treatment16To30Days => "Treatment duration 16 to 30 days",
            Consequence::TreatmentOver30Days => "Treatment duration over 30 days",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Consequence::Death => "death",
            Consequence::Hospitalization => "hospitalization",
            Consequence::AmputationExceptFinger => "amputation_except_finger",
            Consequence::FingerAmputation => "finger_amputation",
            Consequence::FractureExceptFinger => "fracture_except_finger",
            Consequence::FingerFracture => "finger_fracture",
            Consequence::VisionLoss => "vision_loss",
            Consequence::HearingLoss => "hearing_loss",
            Consequence::Treatment16To30Days => "treatment_16_to_30_days",
            Consequence::TreatmentOver30Days => "treatment_over_30_days",
        }
    }

    /// Within the amputation pair and the fracture pair at most one variant
    /// matches: a matching injury code is decided by the body part alone,
    /// otherwise the diagnosis sets decide.
    pub fn matches(self, record: &AccidentRecord) -> bool {
        let injury = record.injury_description.as_deref();
        let diagnosis = record.diagnosis_code.as_deref();
        let finger = record
            .body_part
            .as_deref()
            .is_some_and(|part| FINGER_BODY_PARTS.contains(&part));
        let diagnosis_in = |set: &HashSet<String>| diagnosis.is_some_and(|code| set.contains(code));

        match self {
            Consequence::Death => record.death,
            Consequence::Hospitalization => record.hospitalization,
            Consequence::AmputationExceptFinger => {
                if injury == Some(INJURY_AMPUTATION) {
                    !finger
                } else {
                    diagnosis_in(&AMPUTATION_EXCEPT_FINGER)
                }
            }
            Consequence::FingerAmputation => {
                if injury == Some(INJURY_AMPUTATION) {
                    finger
                } else {
                    diagnosis_in(&AMPUTATION_FINGER)
                }
            }
            Consequence::FractureExceptFinger => {
                if injury == Some(INJURY_FRACTURE) {
                    !finger
                } else {
                    diagnosis_in(&FRACTURE_EXCEPT_FINGER)
                }
            }
            Consequence::FingerFracture => {
                if injury == Some(INJURY_FRACTURE) {
                    finger
                } else {
                    diagnosis_in(&FRACTURE_FINGER)
                }
            }
            Consequence::VisionLoss => diagnosis_in(&VISION_LOSS),
            Consequence::HearingLoss => diagnosis_in(&HEARING_LOSS),
            Consequence::Treatment16To30Days => (16..=30).contains(&record.treatment_days),
            Consequence::TreatmentOver30Days => record.treatment_days > 30,
        }
    }
}

impl fmt::Display for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ConsequencePredicate for Consequence {
    fn name(&self) -> &str {
        self.key()
    }

    fn label(&self) -> &str {
        Consequence::label(*self)
    }

    fn matches(&self, record: &AccidentRecord) -> bool {
        Consequence::matches(*self, record)
    }
}

/// A predicate built from a closure, for categories outside the built-in set.
pub struct FnPredicate<F> {
    name: String,
    label: String,
    test: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&AccidentRecord) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, label: impl Into<String>, test: F) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            test,
        }
    }
}

impl<F> ConsequencePredicate for FnPredicate<F>
where
    F: Fn(&AccidentRecord) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn matches(&self, record: &AccidentRecord) -> bool {
        (self.test)(record)
    }
}

/// Evaluates registered predicates in order and collects matching labels.
pub struct ConsequenceClassifier {
    predicates: Vec<Box<dyn ConsequencePredicate>>,
}

impl ConsequenceClassifier {
    /// A classifier with no predicates.
    pub fn empty() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Append a predicate; it is evaluated after all earlier registrations.
    pub fn register(&mut self, predicate: impl ConsequencePredicate + 'static) -> &mut Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn predicates(&self) -> impl Iterator<Item = &dyn ConsequencePredicate> {
        self.predicates.iter().map(|p| p.as_ref())
    }

    pub fn classify(&self, record: &AccidentRecord) -> Vec<String> {
        self.predicates
            .iter()
            .filter(|p| p.matches(record))
            .map(|p| {
                tracing::trace!(receipt = %record.receipt_id, predicate = p.name(), "consequence matched");
                p.label().to_string()
            })
            .collect()
    }

    pub fn annotate(&self, record: &mut AccidentRecord) {
        record.consequence_labels = self.classify(record);
    }
}

impl Default for ConsequenceClassifier {
    fn default() -> Self {
        let mut classifier = Self::empty();
        for consequence in Consequence::ALL {
            classifier.register(consequence);
        }
        classifier
    }
}
