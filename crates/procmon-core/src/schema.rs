//! Schema ID constants for JSON output contracts.
//!
//! JSON documents printed by `procmon --once --json` carry a `schema_id`
//! field so consumers can detect shape changes.
//!
//! ```text
//! https://schemas.procmon.dev/<topic>/<version>/<filename>
//! ```

/// Schema ID for a single sampled cycle (v1.0.0).
///
/// CPU percentages are rates over the sampling interval, normalized by the
/// logical core count.
pub const SAMPLED_SNAPSHOT_V1: &str =
    "https://schemas.procmon.dev/process/v1.0.0/sampled-snapshot.schema.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_ids_are_versioned_urls() {
        assert!(SAMPLED_SNAPSHOT_V1.starts_with("https://schemas.procmon.dev/"));
        assert!(SAMPLED_SNAPSHOT_V1.contains("/v1.0.0/"));
        assert!(SAMPLED_SNAPSHOT_V1.ends_with(".schema.json"));
    }
}
