use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// A feature flag definition as returned by the split changes endpoint.
///
/// The poller and serializer treat a split as an opaque record keyed by [Split::name]; the fields
/// exist so that a definition can be decoded and written back in the exact shape the downstream
/// consumer expects. Field declaration order is the serialized key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Split {
    pub change_number: i64,
    pub traffic_type_name: String,
    pub name: String,
    pub traffic_allocation: i32,
    pub traffic_allocation_seed: i64,
    pub seed: i64,
    pub status: String,
    pub killed: bool,
    pub default_treatment: String,
    pub algo: i32,

    pub conditions: Option<Vec<Condition>>,
    // BTreeMap keeps the serialized keys sorted.
    pub configurations: Option<BTreeMap<String, String>>,
}

impl Split {
    /// Returns the names of every segment referenced by this split's targeting conditions.
    pub fn segment_names(&self) -> BTreeSet<&str> {
        self.conditions
            .iter()
            .flatten()
            .flat_map(Condition::segment_names)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn new_with_segment_match(name: &str, segment_names: Vec<&str>) -> Self {
        use crate::condition::{Matcher, MatcherGroup, Partition};

        Split {
            name: name.to_string(),
            traffic_type_name: "user".to_string(),
            status: "ACTIVE".to_string(),
            default_treatment: "off".to_string(),
            conditions: Some(vec![Condition {
                condition_type: "ROLLOUT".to_string(),
                matcher_group: MatcherGroup {
                    combiner: "AND".to_string(),
                    matchers: Some(
                        segment_names
                            .into_iter()
                            .map(Matcher::new_segment_match)
                            .collect(),
                    ),
                },
                partitions: Some(vec![Partition {
                    treatment: "on".to_string(),
                    size: 100,
                }]),
                label: String::new(),
            }]),
            ..Default::default()
        }
    }
}

/// Collects the names of all segments used by any of `splits`.
///
/// A [crate::SplitFetcher] uses this to decide which segment definitions to retrieve for a set of
/// freshly fetched splits.
pub fn segment_names_for_splits(splits: &HashMap<String, Split>) -> BTreeSet<String> {
    splits
        .values()
        .flat_map(Split::segment_names)
        .map(str::to_string)
        .collect()
}
