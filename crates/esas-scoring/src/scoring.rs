use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::symptom::Symptom;

/// Number of ESAS questions.
pub const QUESTION_COUNT: usize = 9;

/// Highest score a single question accepts.
pub const MAX_SCORE: u8 = 10;

/// A complete, validated set of ESAS scores.
///
/// Only [`validate`] builds one, so every instance holds exactly nine scores
/// in `0..=10`. Serializes as `{"1": 7, ..., "9": 4}`; deserializing goes
/// back through [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreSet {
    scores: [u8; QUESTION_COUNT],
}

impl ScoreSet {
    pub fn get(&self, symptom: Symptom) -> u8 {
        self.scores[usize::from(symptom.question_id() - 1)]
    }

    /// Score for a question id, `None` outside 1..=9.
    pub fn score(&self, question_id: u8) -> Option<u8> {
        Symptom::from_question_id(question_id).map(|s| self.get(s))
    }

    /// Scores paired with their symptom, in question order.
    pub fn iter(&self) -> impl Iterator<Item = (Symptom, u8)> + '_ {
        Symptom::ALL.iter().map(|s| (*s, self.get(*s)))
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.iter()
            .map(|(s, v)| (s.question_id().to_string(), Value::from(v)))
            .collect()
    }
}

impl Serialize for ScoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ordered: BTreeMap<u8, u8> = self.iter().map(|(s, v)| (s.question_id(), v)).collect();
        ordered.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScoreSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        validate(&raw).map_err(D::Error::custom)
    }
}

/// Validate a raw `scores` mapping from a form submission.
///
/// Checks run in a fixed order and the first failure is returned:
/// all nine question ids present, no unknown keys, then every value an
/// integer in `0..=10` (JSON integers, whole-valued floats, or strings
/// holding a decimal integer).
pub fn validate(raw: &Map<String, Value>) -> Result<ScoreSet, ValidationError> {
    let mut present: [Option<&Value>; QUESTION_COUNT] = [None; QUESTION_COUNT];
    let mut unknown = Vec::new();

    for (key, value) in raw {
        match parse_question_id(key) {
            Some(id) => present[usize::from(id - 1)] = Some(value),
            None => unknown.push(key),
        }
    }

    let missing: Vec<u8> = present
        .iter()
        .zip(1u8..)
        .filter(|(slot, _)| slot.is_none())
        .map(|(_, id)| id)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteScoreSet { missing });
    }

    if let Some(key) = unknown.first() {
        return Err(ValidationError::InvalidQuestionId {
            key: (*key).clone(),
        });
    }

    let mut scores = [0u8; QUESTION_COUNT];
    for ((slot, value), question_id) in scores.iter_mut().zip(present).zip(1u8..) {
        let value = value.unwrap_or(&Value::Null);
        *slot = parse_score(value).ok_or_else(|| ValidationError::ScoreOutOfRange {
            question_id,
            value: value.to_string(),
        })?;
    }

    Ok(ScoreSet { scores })
}

/// Canonical decimal keys "1" through "9" only.
fn parse_question_id(key: &str) -> Option<u8> {
    match key.as_bytes() {
        [digit @ b'1'..=b'9'] => Some(digit - b'0'),
        _ => None,
    }
}

fn parse_score(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_u64().or_else(|| whole_number(n.as_f64()?))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u8::try_from(n).ok().filter(|v| *v <= MAX_SCORE)
}

/// `5.0` from a JavaScript client is the integer 5.
fn whole_number(f: f64) -> Option<u64> {
    (f.fract() == 0.0 && (0.0..=f64::from(MAX_SCORE)).contains(&f)).then_some(f as u64)
}
