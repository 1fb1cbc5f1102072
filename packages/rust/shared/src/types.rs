//! Core domain types for copy-target annotation.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::CopymarkError;

// ---------------------------------------------------------------------------
// CopyTargetType / CopyTargetMode
// ---------------------------------------------------------------------------

/// The closed set of constructs that can receive a copy affordance.
///
/// The kebab-case names (`code`, `math-block`, ...) are the wire form used in
/// `data-copy-type` attributes and in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyTargetType {
    /// Fenced or indented code block.
    Code,
    /// Table.
    Table,
    /// Display math.
    MathBlock,
    /// Inline math.
    MathInline,
    /// Inline code span.
    CodeInline,
}

impl CopyTargetType {
    /// Every target type, in built-in definition order.
    pub const ALL: [CopyTargetType; 5] = [
        CopyTargetType::Code,
        CopyTargetType::Table,
        CopyTargetType::MathBlock,
        CopyTargetType::MathInline,
        CopyTargetType::CodeInline,
    ];

    /// Wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Table => "table",
            Self::MathBlock => "math-block",
            Self::MathInline => "math-inline",
            Self::CodeInline => "code-inline",
        }
    }

    /// The decoration mode the built-in definition uses for this type.
    pub fn default_mode(self) -> CopyTargetMode {
        match self {
            Self::Code | Self::Table | Self::MathBlock => CopyTargetMode::Block,
            Self::MathInline | Self::CodeInline => CopyTargetMode::Inline,
        }
    }
}

impl std::fmt::Display for CopyTargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CopyTargetType {
    type Err = CopymarkError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| CopymarkError::validation(format!("unknown copy target type '{s}'")))
    }
}

/// How a decorator treats the matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyTargetMode {
    /// The element is replaced in its parent by a wrapping container.
    Block,
    /// The element is mutated in place.
    Inline,
}

// ---------------------------------------------------------------------------
// CopyTargetId
// ---------------------------------------------------------------------------

const ID_PREFIX: &str = "copy-target-";

/// Sequential identifier issued by one collection pass.
///
/// Rendered as `copy-target-<n>`; `n` starts at 1 for every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CopyTargetId(pub u64);

impl std::fmt::Display for CopyTargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{ID_PREFIX}{}", self.0)
    }
}

impl std::str::FromStr for CopyTargetId {
    type Err = CopymarkError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.strip_prefix(ID_PREFIX)
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| CopymarkError::validation(format!("malformed copy target id '{s}'")))
    }
}

impl From<CopyTargetId> for String {
    fn from(id: CopyTargetId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CopyTargetId {
    type Error = CopymarkError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// CopyTargetMeta
// ---------------------------------------------------------------------------

/// Metadata recorded for one source-tree construct.
///
/// `start`/`end` are character offsets into the original document text. They are
/// opaque to the enhancer and only surface as `data-copy-start`/`data-copy-end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyTargetMeta {
    pub id: CopyTargetId,
    #[serde(rename = "type")]
    pub target_type: CopyTargetType,
    pub mode: CopyTargetMode,
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// CopyTargetBuckets
// ---------------------------------------------------------------------------

/// Per-document FIFO queues of pending targets, one per [`CopyTargetType`].
///
/// Filled by the collector, drained front-first by the enhancer. Every type
/// always has a (possibly empty) queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopyTargetBuckets {
    queues: BTreeMap<CopyTargetType, VecDeque<CopyTargetMeta>>,
}

impl CopyTargetBuckets {
    /// Create a bucket map with an empty queue for every target type.
    pub fn new() -> Self {
        Self {
            queues: CopyTargetType::ALL
                .into_iter()
                .map(|ty| (ty, VecDeque::new()))
                .collect(),
        }
    }

    /// Append a target to the back of its type's queue.
    pub fn push(&mut self, meta: CopyTargetMeta) {
        self.queues.entry(meta.target_type).or_default().push_back(meta);
    }

    /// Remove and return the oldest pending target of the given type.
    pub fn pop_front(&mut self, target_type: CopyTargetType) -> Option<CopyTargetMeta> {
        self.queues.get_mut(&target_type)?.pop_front()
    }

    /// Pending targets of one type, oldest first.
    pub fn queue(&self, target_type: CopyTargetType) -> impl Iterator<Item = &CopyTargetMeta> {
        self.queues.get(&target_type).into_iter().flatten()
    }

    /// Number of pending targets of one type.
    pub fn len(&self, target_type: CopyTargetType) -> usize {
        self.queues.get(&target_type).map_or(0, VecDeque::len)
    }

    /// Number of pending targets across all types.
    pub fn total(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// `true` when no type has a pending target.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All pending targets, ordered by identifier (document order).
    pub fn to_sorted_vec(&self) -> Vec<CopyTargetMeta> {
        let mut all: Vec<CopyTargetMeta> = self.queues.values().flatten().cloned().collect();
        all.sort_by_key(|meta| meta.id);
        all
    }
}

impl Default for CopyTargetBuckets {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u64, target_type: CopyTargetType) -> CopyTargetMeta {
        CopyTargetMeta {
            id: CopyTargetId(id),
            target_type,
            mode: target_type.default_mode(),
            start: 0,
            end: 1,
        }
    }

    #[test]
    fn target_type_wire_names() {
        let names: Vec<&str> = CopyTargetType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["code", "table", "math-block", "math-inline", "code-inline"]);

        let json = serde_json::to_string(&CopyTargetType::MathBlock).unwrap();
        assert_eq!(json, "\"math-block\"");
        assert_eq!("code-inline".parse::<CopyTargetType>().unwrap(), CopyTargetType::CodeInline);
        assert!("chart".parse::<CopyTargetType>().is_err());
    }

    #[test]
    fn target_id_display_and_parse() {
        let id = CopyTargetId(7);
        assert_eq!(id.to_string(), "copy-target-7");
        assert_eq!("copy-target-7".parse::<CopyTargetId>().unwrap(), id);
        assert!("target-7".parse::<CopyTargetId>().is_err());
        assert!("copy-target-x".parse::<CopyTargetId>().is_err());
    }

    #[test]
    fn new_buckets_have_every_queue() {
        let buckets = CopyTargetBuckets::new();
        let json = serde_json::to_value(&buckets).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert!(obj["math-inline"].as_array().unwrap().is_empty());
        assert!(buckets.is_empty());
    }

    #[test]
    fn buckets_are_fifo_per_type() {
        let mut buckets = CopyTargetBuckets::new();
        buckets.push(meta(1, CopyTargetType::Code));
        buckets.push(meta(2, CopyTargetType::Table));
        buckets.push(meta(3, CopyTargetType::Code));

        assert_eq!(buckets.len(CopyTargetType::Code), 2);
        assert_eq!(buckets.total(), 3);
        assert_eq!(buckets.pop_front(CopyTargetType::Code).unwrap().id, CopyTargetId(1));
        assert_eq!(buckets.pop_front(CopyTargetType::Code).unwrap().id, CopyTargetId(3));
        assert!(buckets.pop_front(CopyTargetType::Code).is_none());
        assert_eq!(buckets.len(CopyTargetType::Table), 1);
    }

    #[test]
    fn sorted_vec_follows_ids() {
        let mut buckets = CopyTargetBuckets::new();
        buckets.push(meta(2, CopyTargetType::CodeInline));
        buckets.push(meta(1, CopyTargetType::Table));
        buckets.push(meta(3, CopyTargetType::Code));

        let ids: Vec<u64> = buckets.to_sorted_vec().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn meta_serializes_with_type_key() {
        let json = serde_json::to_value(meta(4, CopyTargetType::MathInline)).unwrap();
        assert_eq!(json["id"], "copy-target-4");
        assert_eq!(json["type"], "math-inline");
        assert_eq!(json["mode"], "inline");
    }
}
