use crate::error::PollError;
use lumeos_store::{Choice, Poll};
use lumeos_types::{AccountName, Asset, ContentHash, PollId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Answers are addressed by a `u8` index.
pub const MAX_CHOICES: usize = u8::MAX as usize + 1;

const OP: &str = "createpoll";

/// Caller-supplied fields of a new poll.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    pub question: String,
    pub choices: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: Option<Asset>,
    #[serde(default)]
    pub content_hash: Option<ContentHash>,
}

impl PollDraft {
    pub fn new(question: impl Into<String>, choices: &[&str]) -> Self {
        Self {
            question: question.into(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_price(mut self, price: Asset) -> Self {
        self.price = Some(price);
        self
    }

    pub fn validate(&self) -> Result<(), PollError> {
        if self.question.trim().is_empty() {
            return Err(PollError::invalid(OP, "question is empty"));
        }
        if self.choices.is_empty() {
            return Err(PollError::invalid(OP, "a poll needs at least one choice"));
        }
        if self.choices.len() > MAX_CHOICES {
            return Err(PollError::invalid(
                OP,
                format!("{} choices, at most {MAX_CHOICES} allowed", self.choices.len()),
            ));
        }
        if let Some(i) = self.choices.iter().position(|c| c.trim().is_empty()) {
            return Err(PollError::invalid(OP, format!("choice {i} has an empty label")));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(PollError::invalid(OP, "empty tag"));
        }
        if let Some(price) = &self.price {
            validate_price(OP, price)?;
        }
        Ok(())
    }

    /// Build the stored record: zero tallies, no participants.
    pub fn into_poll(self, id: PollId, creator: AccountName) -> Poll {
        Poll {
            id,
            creator,
            question: self.question,
            choices: self.choices.into_iter().map(Choice::new).collect(),
            tags: self.tags.into_iter().collect::<BTreeSet<_>>(),
            participants: BTreeSet::new(),
            price: self.price,
            content_hash: self.content_hash,
        }
    }
}

pub(crate) fn validate_price(operation: &'static str, price: &Asset) -> Result<(), PollError> {
    if !price.is_valid() || !price.is_positive() {
        return Err(PollError::invalid(
            operation,
            format!("price {price} must be a positive amount"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumeos_types::ErrorKind;

    #[test]
    fn rejects_empty_choice_list() {
        let err = PollDraft::new("Color?", &[]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn rejects_blank_labels() {
        assert!(PollDraft::new("  ", &["a"]).validate().is_err());
        assert!(PollDraft::new("Color?", &["red", " "]).validate().is_err());
    }

    #[test]
    fn choice_limit() {
        let labels: Vec<String> = (0..=MAX_CHOICES).map(|i| i.to_string()).collect();
        let mut draft = PollDraft {
            question: "Pick".into(),
            choices: labels,
            ..PollDraft::default()
        };
        assert!(draft.validate().is_err());
        draft.choices.pop();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_price() {
        let draft = PollDraft::new("Color?", &["red"]).with_price(Asset::lume(0));
        assert_eq!(draft.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn duplicate_tags_collapse() {
        let poll = PollDraft::new("Color?", &["red", "blue"])
            .with_tags(&["art", "art", "design"])
            .into_poll(PollId::FIRST, AccountName::new("alice").unwrap());
        assert_eq!(poll.tags.len(), 2);
        assert!(poll.choices.iter().all(|c| c.votes == 0));
        assert!(poll.participants.is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let draft: PollDraft =
            serde_json::from_str(r#"{"question":"Color?","choices":["red","blue"]}"#).unwrap();
        assert!(draft.tags.is_empty());
        assert!(draft.price.is_none());
    }
}
