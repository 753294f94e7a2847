// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use crate::hierarchy::NodeId;
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a stored answer: a node id, or a node name from older forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Id(NodeId),
    Name(String),
}

impl AnswerValue {
    /// Numbers are ids, and so are strings that look like integers ("123").
    pub fn as_id(&self) -> Option<NodeId> {
        match self {
            AnswerValue::Id(id) => Some(*id),
            AnswerValue::Name(s) => s.trim().parse::<NodeId>().ok(),
        }
    }

    /// Only non-numeric strings are matched against node names.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            AnswerValue::Name(s) if self.as_id().is_none() => Some(s.trim()),
            _ => None,
        }
    }
}

impl From<NodeId> for AnswerValue {
    fn from(id: NodeId) -> Self {
        AnswerValue::Id(id)
    }
}

impl From<&str> for AnswerValue {
    fn from(name: &str) -> Self {
        AnswerValue::Name(name.to_string())
    }
}

/// A stored answer, most specific value last.
///
/// Host storage has written this as `null`, a bare number, a bare string, or
/// an array mixing both; all of them deserialize into the same list form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Answer(Vec<AnswerValue>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Many(Vec<AnswerValue>),
    One(AnswerValue),
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawAnswer>::deserialize(deserializer)?;
        Ok(match raw {
            None => Answer::default(),
            Some(RawAnswer::One(value)) => Answer(vec![value]),
            Some(RawAnswer::Many(values)) => Answer(values),
        })
    }
}

impl Answer {
    pub fn new(values: Vec<AnswerValue>) -> Self {
        Self(values)
    }

    pub fn from_ids(ids: &[NodeId]) -> Self {
        Self(ids.iter().copied().map(AnswerValue::Id).collect())
    }

    pub fn values(&self) -> &[AnswerValue] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&AnswerValue> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&AnswerValue> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&AnswerValue> {
        self.0.last()
    }

    /// Every id-coercible entry, in stored order. Name entries are skipped.
    pub fn ids(&self) -> Vec<NodeId> {
        self.0.iter().filter_map(AnswerValue::as_id).collect()
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        self.0.iter().any(|v| v.as_id() == Some(id))
    }
}

impl From<NodeId> for Answer {
    fn from(id: NodeId) -> Self {
        Answer(vec![AnswerValue::Id(id)])
    }
}

impl From<&str> for Answer {
    fn from(name: &str) -> Self {
        Answer(vec![AnswerValue::from(name)])
    }
}

impl From<Vec<AnswerValue>> for Answer {
    fn from(values: Vec<AnswerValue>) -> Self {
        Answer(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_shapes() {
        let null: Answer = serde_json::from_str("null").unwrap();
        assert!(null.is_empty());

        let empty: Answer = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());

        let single: Answer = serde_json::from_str("42").unwrap();
        assert_eq!(single.ids(), vec![42]);

        let legacy: Answer = serde_json::from_str("\"Nairobi\"").unwrap();
        assert_eq!(legacy.first().and_then(|v| v.as_name()), Some("Nairobi"));
        assert!(legacy.ids().is_empty());

        let mixed: Answer = serde_json::from_str("[3, \"Kisumu\", \"17\"]").unwrap();
        assert_eq!(mixed.len(), 3);
        assert_eq!(mixed.ids(), vec![3, 17]);
        assert_eq!(mixed.last(), Some(&AnswerValue::Name("17".to_string())));
    }

    #[test]
    fn test_numeric_string_is_an_id_not_a_name() {
        let value = AnswerValue::from(" 123 ");
        assert_eq!(value.as_id(), Some(123));
        assert_eq!(value.as_name(), None);
    }

    #[test]
    fn test_serializes_as_array() {
        let answer = Answer::from(7);
        assert_eq!(serde_json::to_string(&answer).unwrap(), "[7]");
    }
}
