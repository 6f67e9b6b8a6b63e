//! Result type alias for Consolidator

use super::errors::ConsolidatorError;

/// Result type alias for Consolidator operations
///
/// # Examples
///
/// ```
/// use consolidator::domain::result::Result;
/// use consolidator::domain::errors::ConsolidatorError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ConsolidatorError::NoBaseState)
/// }
/// ```
pub type Result<T> = std::result::Result<T, ConsolidatorError>;
