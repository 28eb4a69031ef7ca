//! (De)serialization of persisted entities.
//!
//! Every entity is encoded to a JSON [`Record`] carrying a `schema_version`
//! byte (§3's "one codec per entity with a schema version byte"); decoding
//! an unrecognized version is rejected rather than guessed at. Fractional
//! aggregates that must avoid binary float rounding (`UserDifficulty`'s
//! `target_difficulty`) are encoded through [`rust_decimal::Decimal`]
//! instead of a bare JSON number.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use quiz_domain::{DecodeError, Progress, Question, Session, UserDifficulty, WrongEntry};

/// A persisted record: a JSON object carrying a `schema_version` field
/// alongside the entity's serialized body.
pub type Record = Value;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Encodes a domain entity into a persistable [`Record`].
pub trait Encode {
    fn encode(&self) -> Record;
}

/// Decodes a domain entity back out of a [`Record`].
pub trait Decode: Sized {
    /// # Errors
    /// Returns [`DecodeError`] if the record is missing fields, malformed,
    /// or carries an unrecognized schema version.
    fn decode(record: &Record) -> Result<Self, DecodeError>;
}

fn encode_serde<T: Serialize>(entity: &T, entity_name: &'static str) -> Record {
    let mut body = serde_json::to_value(entity).unwrap_or_else(|err| {
        panic!("{entity_name} is always serializable: {err}")
    });
    if let Value::Object(map) = &mut body {
        map.insert(
            "schema_version".to_string(),
            Value::Number(CURRENT_SCHEMA_VERSION.into()),
        );
    }
    body
}

fn decode_serde<T: DeserializeOwned>(
    record: &Record,
    entity_name: &'static str,
) -> Result<T, DecodeError> {
    let version = record
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| DecodeError::MissingField {
            field_path: format!("{entity_name}.schema_version"),
        })?;
    let version = u8::try_from(version).map_err(|_| DecodeError::UnknownSchemaVersion {
        entity: entity_name,
        version: u8::MAX,
    })?;
    if version != CURRENT_SCHEMA_VERSION {
        return Err(DecodeError::UnknownSchemaVersion {
            entity: entity_name,
            version,
        });
    }
    serde_json::from_value(record.clone()).map_err(|err| DecodeError::MalformedField {
        field_path: entity_name.to_string(),
        reason: err.to_string(),
    })
}

impl Encode for Question {
    fn encode(&self) -> Record {
        encode_serde(self, "question")
    }
}

impl Decode for Question {
    fn decode(record: &Record) -> Result<Self, DecodeError> {
        decode_serde(record, "question")
    }
}

impl Encode for Session {
    fn encode(&self) -> Record {
        encode_serde(self, "session")
    }
}

impl Decode for Session {
    fn decode(record: &Record) -> Result<Self, DecodeError> {
        decode_serde(record, "session")
    }
}

impl Encode for WrongEntry {
    fn encode(&self) -> Record {
        encode_serde(self, "wrong_entry")
    }
}

impl Decode for WrongEntry {
    fn decode(record: &Record) -> Result<Self, DecodeError> {
        decode_serde(record, "wrong_entry")
    }
}

impl Encode for Progress {
    fn encode(&self) -> Record {
        encode_serde(self, "progress")
    }
}

impl Decode for Progress {
    fn decode(record: &Record) -> Result<Self, DecodeError> {
        decode_serde(record, "progress")
    }
}

impl Encode for UserDifficulty {
    fn encode(&self) -> Record {
        let decimal = Decimal::from_f64_retain(self.target_difficulty).unwrap_or_default();
        serde_json::json!({
            "schema_version": CURRENT_SCHEMA_VERSION,
            "user_id": self.user_id.as_str(),
            "target_difficulty": decimal.to_string(),
            "recent_outcomes": self.recent_outcomes,
        })
    }
}

impl Decode for UserDifficulty {
    fn decode(record: &Record) -> Result<Self, DecodeError> {
        let version = record
            .get("schema_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| DecodeError::MissingField {
                field_path: "user_difficulty.schema_version".into(),
            })?;
        if version != u64::from(CURRENT_SCHEMA_VERSION) {
            return Err(DecodeError::UnknownSchemaVersion {
                entity: "user_difficulty",
                version: version.try_into().unwrap_or(u8::MAX),
            });
        }
        let user_id = record
            .get("user_id")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField {
                field_path: "user_difficulty.user_id".into(),
            })?;
        let raw = record
            .get("target_difficulty")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MissingField {
                field_path: "user_difficulty.target_difficulty".into(),
            })?;
        let decimal: Decimal = raw.parse().map_err(|_| DecodeError::MalformedField {
            field_path: "user_difficulty.target_difficulty".into(),
            reason: format!("{raw} is not a valid decimal"),
        })?;
        let target_difficulty = decimal.to_f64().ok_or_else(|| DecodeError::MalformedField {
            field_path: "user_difficulty.target_difficulty".into(),
            reason: "decimal out of f64 range".into(),
        })?;
        let recent_outcomes = record
            .get("recent_outcomes")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_bool).collect())
            .unwrap_or_default();
        Ok(UserDifficulty {
            user_id: user_id.into(),
            target_difficulty,
            recent_outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_domain::{Choice, ChoiceId, DeclaredDifficulty, QuestionId, QuestionKind, QuestionStatus};

    fn sample_question() -> Question {
        Question {
            question_id: QuestionId::from("q1"),
            category: "networking".into(),
            provider: "acme".into(),
            certificate: "acme-101".into(),
            language: "en".into(),
            prompt: "Pick one".into(),
            kind: QuestionKind::SingleChoice,
            choices: vec![
                Choice {
                    choice_id: ChoiceId::from("c1"),
                    text: "a".into(),
                    is_correct: false,
                },
                Choice {
                    choice_id: ChoiceId::from("c2"),
                    text: "b".into(),
                    is_correct: true,
                },
            ],
            declared_difficulty: DeclaredDifficulty::new(3),
            status: QuestionStatus::Active,
        }
    }

    #[test]
    fn question_round_trips_through_encode_decode() {
        let question = sample_question();
        let record = question.encode();
        let decoded = Question::decode(&record).unwrap();
        assert_eq!(decoded, question);
    }

    #[test]
    fn decode_rejects_unknown_schema_version() {
        let mut record = sample_question().encode();
        record["schema_version"] = Value::Number(9.into());
        let err = Question::decode(&record).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownSchemaVersion { version: 9, .. }
        ));
    }

    #[test]
    fn decode_rejects_missing_schema_version() {
        let mut record = sample_question().encode();
        record.as_object_mut().unwrap().remove("schema_version");
        let err = Question::decode(&record).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { .. }));
    }

    #[test]
    fn user_difficulty_round_trips_through_decimal_encoding() {
        let difficulty = UserDifficulty {
            user_id: quiz_domain::UserId::from("u1"),
            target_difficulty: 0.733,
            recent_outcomes: vec![true, false, true],
        };
        let record = difficulty.encode();
        assert_eq!(record["target_difficulty"], Value::String("0.733".into()));
        let decoded = UserDifficulty::decode(&record).unwrap();
        assert!((decoded.target_difficulty - 0.733).abs() < 1e-9);
        assert_eq!(decoded.recent_outcomes, vec![true, false, true]);
    }
}
