//! Object layout of the published output

use crate::adapters::storage::join_key;
use crate::config::StorageConfig;
use crate::domain::RunId;

/// File name of the staged data part inside a staging directory
pub const PART_FILE_NAME: &str = "part-00000.csv";

/// Marker written after the part is fully staged
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Where the published file and staging directories live
///
/// ```text
/// {output_prefix}/{published_name}
/// {output_prefix}/{staging_prefix}_{run_id}/part-00000.csv
/// {output_prefix}/{staging_prefix}_{run_id}/_SUCCESS
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishLayout {
    output_prefix: String,
    published_name: String,
    staging_prefix: String,
}

impl PublishLayout {
    /// Create a layout; surrounding slashes on `output_prefix` are ignored
    pub fn new(
        output_prefix: impl Into<String>,
        published_name: impl Into<String>,
        staging_prefix: impl Into<String>,
    ) -> Self {
        Self {
            output_prefix: output_prefix.into().trim_matches('/').to_string(),
            published_name: published_name.into(),
            staging_prefix: staging_prefix.into(),
        }
    }

    /// Layout from the storage section of the configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.output_prefix.as_str(),
            config.published_name.as_str(),
            config.staging_prefix.as_str(),
        )
    }

    /// Prefix that holds the published file, staging directories and ledger
    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    /// Key of the published file
    pub fn published_key(&self) -> String {
        join_key(&[&self.output_prefix, &self.published_name])
    }

    /// Staging directory for a run
    pub fn staging_dir(&self, run_id: &RunId) -> String {
        join_key(&[
            &self.output_prefix,
            &format!("{}_{}", self.staging_prefix, run_id),
        ])
    }

    /// Staging directory containing `key`, if `key` lies in one
    ///
    /// # Examples
    ///
    /// ```
    /// use consolidator::core::publish::PublishLayout;
    ///
    /// let layout = PublishLayout::new("des_file", "final_output.csv", "temp_output");
    /// assert_eq!(
    ///     layout.staging_dir_of("des_file/temp_output_20250101_120000_ab12cd34/_SUCCESS"),
    ///     Some("des_file/temp_output_20250101_120000_ab12cd34".to_string())
    /// );
    /// assert_eq!(layout.staging_dir_of("des_file/final_output.csv"), None);
    /// ```
    pub fn staging_dir_of(&self, key: &str) -> Option<String> {
        let relative = key
            .strip_prefix(self.output_prefix.as_str())?
            .strip_prefix('/')?;
        let (dir, rest) = relative.split_once('/')?;

        let staged_run = dir.strip_prefix(&self.staging_prefix)?.strip_prefix('_')?;
        if staged_run.is_empty() || rest.is_empty() {
            return None;
        }
        Some(join_key(&[&self.output_prefix, dir]))
    }
}
