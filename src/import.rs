//! Import helpers
//!
//! 子资源以 `/` 连接父对象 ID 形成复合 ID（如 `<zone_id>/<recordset_id>`、
//! `<project_id>/<group_id>/<role_id>/<permission_name>`）。导入时解析回
//! 各个属性。

use crate::error::{ProviderError, Result};

/// Split a composite resource ID into its named parts.
///
/// `part_names` documents the expected format and determines the expected
/// segment count; the names appear in the error message on mismatch.
///
/// ```rust
/// use hwc_resource_provider::parse_composite_id;
///
/// let parts = parse_composite_id("zone-1/rs-2", &["zone_id", "recordset_id"]).unwrap();
/// assert_eq!(parts, vec!["zone-1".to_string(), "rs-2".to_string()]);
/// ```
pub fn parse_composite_id(id: &str, part_names: &[&str]) -> Result<Vec<String>> {
    let segments: Vec<&str> = id.split('/').collect();
    if segments.len() != part_names.len() || segments.iter().any(|s| s.is_empty()) {
        return Err(ProviderError::InvalidParameter {
            service: "import".to_string(),
            param: "id".to_string(),
            detail: format!(
                "invalid format specified for ID, must be <{}>",
                part_names.join(">/<")
            ),
        });
    }
    Ok(segments.into_iter().map(str::to_owned).collect())
}

/// Join ID parts into a composite resource ID.
pub fn join_composite_id(parts: &[&str]) -> String {
    parts.join("/")
}
