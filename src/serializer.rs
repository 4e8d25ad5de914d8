use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::split_data::SplitData;
use crate::store::SplitDataSource;
use crate::util::to_html_safe_string;

/// Script returned in place of the populated template while no polling cycle has succeeded.
pub const EMPTY_CACHE_SCRIPT: &str = "<script>window.__splitCachePreload = {}</script>";

/// Serializer renders the current snapshot of a [SplitDataSource] as a `<script>` element that
/// preloads the browser SDK's cache.
pub struct Serializer {
    source: Arc<dyn SplitDataSource>,
}

impl Serializer {
    pub fn new(source: Arc<dyn SplitDataSource>) -> Self {
        Serializer { source }
    }

    /// Render the source's snapshot as of this call.
    ///
    /// Nothing is cached between calls, so two calls may return different scripts if the source
    /// was refreshed in between.
    pub fn serialized_data(&self) -> Result<String> {
        generate_serialized_data(&self.source.split_data())
    }
}

/// Render `split_data` as a cache preload script.
///
/// Each split and segment is encoded to its own JSON text, and that text is then stored as a JSON
/// string value keyed by name, so the consumer receives string-valued maps rather than nested
/// objects. The empty snapshot renders as [EMPTY_CACHE_SCRIPT].
pub fn generate_serialized_data(split_data: &SplitData) -> Result<String> {
    if split_data.is_empty() {
        return Ok(EMPTY_CACHE_SCRIPT.to_string());
    }

    let splits = encode_definitions(&split_data.splits)?;
    let segments = encode_definitions(&split_data.segments)?;

    Ok(format_script(
        &splits,
        split_data.since,
        &segments,
        split_data.using_segments_count,
    ))
}

fn encode_definitions<T: Serialize>(definitions: &HashMap<String, T>) -> Result<String> {
    let mut encoded = BTreeMap::new();
    for (name, definition) in definitions {
        encoded.insert(name.as_str(), to_html_safe_string(definition)?);
    }

    Ok(to_html_safe_string(&encoded)?)
}

pub(crate) fn format_script(
    splits: &str,
    since: i64,
    segments: &str,
    using_segments_count: usize,
) -> String {
    format!(
        "<script>window.__splitCachePreload = {{ splitsData: {}, since: {}, segmentsData: {}, usingSegmentsCount: {} }}</script>",
        splits, since, segments, using_segments_count
    )
}
