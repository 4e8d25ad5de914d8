use serde::{Deserialize, Serialize};

/// Matcher type whose payload names a segment that must be fetched alongside the split.
pub const MATCHER_TYPE_IN_SEGMENT: &str = "IN_SEGMENT";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    pub condition_type: String,
    pub matcher_group: MatcherGroup,
    pub partitions: Option<Vec<Partition>>,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partition {
    pub treatment: String,
    pub size: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherGroup {
    pub combiner: String,
    pub matchers: Option<Vec<Matcher>>,
}

// Payload fields are all optional on the wire and always written back, as null when absent, so
// a definition survives a decode/encode pass unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Matcher {
    pub key_selector: Option<KeySelector>,
    pub matcher_type: String,
    pub negate: bool,
    #[serde(rename = "userDefinedSegmentMatcherData")]
    pub user_defined_segment: Option<UserDefinedSegmentMatcherData>,
    #[serde(rename = "whitelistMatcherData")]
    pub whitelist: Option<WhitelistMatcherData>,
    #[serde(rename = "unaryNumericMatcherData")]
    pub unary_numeric: Option<UnaryNumericMatcherData>,
    #[serde(rename = "betweenMatcherData")]
    pub between: Option<BetweenMatcherData>,
    #[serde(rename = "dependencyMatcherData")]
    pub dependency: Option<DependencyMatcherData>,
    #[serde(rename = "booleanMatcherData")]
    pub boolean: Option<bool>,
    #[serde(rename = "stringMatcherData")]
    pub string: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeySelector {
    pub traffic_type: String,
    pub attribute: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDefinedSegmentMatcherData {
    pub segment_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistMatcherData {
    pub whitelist: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnaryNumericMatcherData {
    pub data_type: String,
    pub value: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BetweenMatcherData {
    pub data_type: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyMatcherData {
    pub split: String,
    pub treatments: Option<Vec<String>>,
}

impl Condition {
    /// Names of the segments this condition's `IN_SEGMENT` matchers refer to.
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.matcher_group
            .matchers
            .iter()
            .flatten()
            .filter_map(Matcher::segment_name)
    }
}

impl Matcher {
    pub fn is_segment_match(&self) -> bool {
        self.matcher_type == MATCHER_TYPE_IN_SEGMENT
    }

    pub fn segment_name(&self) -> Option<&str> {
        if !self.is_segment_match() {
            return None;
        }
        self.user_defined_segment
            .as_ref()
            .map(|data| data.segment_name.as_str())
            .filter(|name| !name.is_empty())
    }

    #[cfg(test)]
    pub(crate) fn new_segment_match(segment_name: &str) -> Self {
        Matcher {
            key_selector: Some(KeySelector {
                traffic_type: "user".to_string(),
                attribute: None,
            }),
            matcher_type: MATCHER_TYPE_IN_SEGMENT.to_string(),
            user_defined_segment: Some(UserDefinedSegmentMatcherData {
                segment_name: segment_name.to_string(),
            }),
            ..Default::default()
        }
    }
}
