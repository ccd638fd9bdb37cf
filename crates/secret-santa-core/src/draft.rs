//! Creation drafts: form state that becomes a validated submission.
//!
//! While the user edits, every field is a string. Numeric setters strip
//! anything that is not an ASCII digit, so the form never holds a sign or a
//! decimal point. Coercion to numbers happens once, in
//! [`CreationDraft::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DraftError;

/// Smallest accepted participant count.
pub const MIN_PARTICIPANTS: u32 = 2;

/// Largest accepted participant count.
pub const MAX_PARTICIPANTS: u32 = 50;

/// How unparsable numeric fields are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPolicy {
    /// Reject unparsable or out-of-range numbers.
    #[default]
    Strict,
    /// Coerce unparsable numbers to zero and skip range checks.
    Lenient,
}

/// A field of a creation draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftField {
    Name,
    GiftValue,
    ParticipantCount,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftField::Name => "name",
            DraftField::GiftValue => "gift value",
            DraftField::ParticipantCount => "participant count",
        };
        f.write_str(s)
    }
}

/// User-editable creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationDraft {
    pub name: String,
    pub gift_value: String,
    pub participant_count: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDraft {
    pub name: String,
    pub gift_value: u64,
    pub participant_count: u32,
    /// Fields that were coerced to zero under [`DraftPolicy::Lenient`].
    pub coerced: Vec<DraftField>,
}

impl CreationDraft {
    /// Build a draft from raw form values.
    pub fn new(name: &str, gift_value: &str, participant_count: &str) -> Self {
        let mut draft = Self {
            name: name.to_string(),
            ..Self::default()
        };
        draft.set_gift_value(gift_value);
        draft.set_participant_count(participant_count);
        draft
    }

    pub fn set_name(&mut self, raw: &str) {
        self.name = raw.to_string();
    }

    pub fn set_gift_value(&mut self, raw: &str) {
        self.gift_value = digits_only(raw);
    }

    pub fn set_participant_count(&mut self, raw: &str) {
        self.participant_count = digits_only(raw);
    }

    /// Reset every field, as after a successful submission.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate and coerce the draft.
    pub fn validate(&self, policy: DraftPolicy) -> Result<ValidatedDraft, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }

        let mut coerced = Vec::new();

        let gift_value = match (self.gift_value.parse::<u64>(), policy) {
            (Ok(v), _) => v,
            (Err(_), DraftPolicy::Lenient) => {
                coerced.push(DraftField::GiftValue);
                0
            }
            (Err(_), DraftPolicy::Strict) => {
                return Err(DraftError::InvalidNumber {
                    field: DraftField::GiftValue,
                    raw: self.gift_value.clone(),
                })
            }
        };

        let participant_count = match (self.participant_count.parse::<u32>(), policy) {
            (Ok(v), _) => v,
            (Err(_), DraftPolicy::Lenient) => {
                coerced.push(DraftField::ParticipantCount);
                0
            }
            (Err(_), DraftPolicy::Strict) => {
                return Err(DraftError::InvalidNumber {
                    field: DraftField::ParticipantCount,
                    raw: self.participant_count.clone(),
                })
            }
        };

        if policy == DraftPolicy::Strict
            && !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&participant_count)
        {
            return Err(DraftError::ParticipantCountOutOfRange(participant_count));
        }

        Ok(ValidatedDraft {
            name: name.to_string(),
            gift_value,
            participant_count,
            coerced,
        })
    }
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
