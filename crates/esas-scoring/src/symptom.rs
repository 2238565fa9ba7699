use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The nine ESAS symptoms, in questionnaire order.
///
/// Declaration order is significant: the discriminant plus one is the
/// question identifier, and it is also the tie-break priority when two
/// symptoms share the highest score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Symptom {
    Pain,
    Fatigue,
    Drowsiness,
    Nausea,
    AppetiteLoss,
    Breathlessness,
    Depression,
    Anxiety,
    Wellbeing,
}

impl Symptom {
    pub const ALL: [Symptom; 9] = [
        Symptom::Pain,
        Symptom::Fatigue,
        Symptom::Drowsiness,
        Symptom::Nausea,
        Symptom::AppetiteLoss,
        Symptom::Breathlessness,
        Symptom::Depression,
        Symptom::Anxiety,
        Symptom::Wellbeing,
    ];

    /// Question identifier (1..=9) this symptom is bound to.
    pub fn question_id(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_question_id(id: u8) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|idx| Self::ALL.get(usize::from(idx)).copied())
    }

    /// Stable machine name, matching the serde representation.
    pub fn slug(self) -> &'static str {
        match self {
            Symptom::Pain => "pain",
            Symptom::Fatigue => "fatigue",
            Symptom::Drowsiness => "drowsiness",
            Symptom::Nausea => "nausea",
            Symptom::AppetiteLoss => "appetite_loss",
            Symptom::Breathlessness => "breathlessness",
            Symptom::Depression => "depression",
            Symptom::Anxiety => "anxiety",
            Symptom::Wellbeing => "wellbeing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Symptom::Pain => "Pain",
            Symptom::Fatigue => "Tiredness",
            Symptom::Drowsiness => "Drowsiness",
            Symptom::Nausea => "Nausea",
            Symptom::AppetiteLoss => "Lack of Appetite",
            Symptom::Breathlessness => "Shortness of Breath",
            Symptom::Depression => "Depression",
            Symptom::Anxiety => "Anxiety",
            Symptom::Wellbeing => "Wellbeing",
        }
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One item of the ESAS questionnaire as presented to the respondent.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: u8,
    pub symptom: Symptom,
    pub label: String,
    /// Meaning of a score of 0.
    pub low_anchor: String,
    /// Meaning of a score of 10.
    pub high_anchor: String,
}

/// The fixed ESAS question list, ordered by question id.
pub fn questionnaire() -> [Question; 9] {
    Symptom::ALL.map(|symptom| {
        let (low_anchor, high_anchor) = anchors(symptom);
        Question {
            id: symptom.question_id(),
            symptom,
            label: symptom.label().to_string(),
            low_anchor: low_anchor.to_string(),
            high_anchor: high_anchor.to_string(),
        }
    })
}

fn anchors(symptom: Symptom) -> (&'static str, &'static str) {
    match symptom {
        Symptom::Pain => ("No pain", "Worst possible pain"),
        Symptom::Fatigue => ("No tiredness", "Worst possible tiredness"),
        Symptom::Drowsiness => ("No drowsiness", "Worst possible drowsiness"),
        Symptom::Nausea => ("No nausea", "Worst possible nausea"),
        Symptom::AppetiteLoss => ("No lack of appetite", "Worst possible lack of appetite"),
        Symptom::Breathlessness => (
            "No shortness of breath",
            "Worst possible shortness of breath",
        ),
        Symptom::Depression => ("No depression", "Worst possible depression"),
        Symptom::Anxiety => ("No anxiety", "Worst possible anxiety"),
        Symptom::Wellbeing => ("Best wellbeing", "Worst possible wellbeing"),
    }
}
