//! Shared library aliases
//!
//! Non-core bundles resolve these libraries to the copy shipped inside the
//! core bundle instead of bundling their own.

use crate::config::Config;
use std::collections::BTreeMap;

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("axios", "lib.axios"),
    ("lodash", "lib.lodash"),
    ("vue", "lib.vue"),
    ("vue-intl", "lib.vueIntl"),
    ("vue-router", "lib.vueRouter"),
    ("vuex", "lib.vuex"),
];

/// The built-in alias table (library id -> path under the core library)
pub fn default_aliases() -> BTreeMap<String, String> {
    DEFAULT_ALIASES
        .iter()
        .map(|(id, path)| ((*id).to_string(), (*path).to_string()))
        .collect()
}

/// Build the alias map for a core library token.
///
/// Each entry becomes `library id -> "<core_library>.<path>"`.
pub fn resolve_aliases(
    table: &BTreeMap<String, String>,
    core_library: &str,
) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(id, path)| (id.clone(), format!("{}.{}", core_library, path)))
        .collect()
}

impl Config {
    /// Configured alias table, or the built-in one when none is configured
    pub fn alias_table(&self) -> BTreeMap<String, String> {
        if self.aliases.is_empty() {
            default_aliases()
        } else {
            self.aliases.clone()
        }
    }
}
