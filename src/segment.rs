use serde::{Deserialize, Serialize};

/// A segment change set as returned by the segment changes endpoint.
///
/// `added` and `removed` list the member keys that changed between `since` and `till`. Absent
/// lists are kept as `None` so they are written back as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub name: String,
    pub added: Option<Vec<String>>,
    pub removed: Option<Vec<String>>,
    pub since: i64,
    pub till: i64,
}
