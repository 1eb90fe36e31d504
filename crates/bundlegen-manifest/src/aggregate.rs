//! Global aggregation of bundle configurations
//!
//! Duplicate detection and core bundle identification need the complete
//! bundle list, so [`BundleAggregator::finish`] only runs once every
//! manifest has been extracted and transformed.

use crate::diagnostics::Diagnostics;
use crate::registry::ExternalsRegistry;
use crate::transform::TransformedBundle;
use crate::types::{BundleConfig, Externals};
use ahash::AHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct BundleAggregator {
    bundles: Vec<BundleConfig>,
    registry: ExternalsRegistry,
}

impl BundleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one transformed bundle, registering its external name if any
    pub fn add(&mut self, bundle: TransformedBundle, diagnostics: &dyn Diagnostics) {
        let TransformedBundle { config, external } = bundle;
        if let Some(name) = external {
            self.registry.register(&name, &config.origin, diagnostics);
        }
        self.bundles.push(config);
    }

    pub fn bundles(&self) -> &[BundleConfig] {
        &self.bundles
    }

    pub fn registry(&self) -> &ExternalsRegistry {
        &self.registry
    }

    /// Check the complete bundle list and attach final externals.
    ///
    /// `resolve_aliases` receives the core bundle's library token and is only
    /// called when a core bundle exists. The core bundle gets the registry as
    /// its externals; every other bundle gets the registry merged with the
    /// alias map, alias entries winning.
    pub fn finish<F>(self, resolve_aliases: F, diagnostics: &dyn Diagnostics) -> Vec<BundleConfig>
    where
        F: Fn(&str) -> Externals,
    {
        let BundleAggregator {
            mut bundles,
            registry,
        } = self;

        report_duplicate_entries(&bundles, diagnostics);

        let core = find_core_bundle(&bundles, diagnostics);
        let aliases = core
            .and_then(|idx| bundles[idx].output.library.as_deref())
            .map(&resolve_aliases)
            .unwrap_or_default();

        debug!(
            "Attaching {} external(s) and {} alias(es) to {} bundle(s)",
            registry.len(),
            aliases.len(),
            bundles.len()
        );

        let mut shared = registry.as_map().clone();
        shared.extend(aliases);

        for (idx, bundle) in bundles.iter_mut().enumerate() {
            bundle.externals = if Some(idx) == core {
                registry.as_map().clone()
            } else {
                shared.clone()
            };
        }

        bundles
    }
}

/// Report every pair of bundles sharing an entry name. Both bundles stay in
/// the list. Returns the number of colliding pairs.
pub fn report_duplicate_entries(bundles: &[BundleConfig], diagnostics: &dyn Diagnostics) -> usize {
    let mut seen: AHashMap<&str, Vec<usize>> = AHashMap::new();
    let mut collisions = 0;

    for (idx, bundle) in bundles.iter().enumerate() {
        let earlier = seen.entry(bundle.name()).or_default();
        for &prev in earlier.iter() {
            diagnostics.error(&format!(
                "Duplicate bundle entry '{}': defined by {} and {}",
                bundle.name(),
                bundles[prev].origin,
                bundle.origin
            ));
            collisions += 1;
        }
        earlier.push(idx);
    }

    collisions
}

/// Locate the core bundle. At most one is expected; if several are flagged
/// an error lists them and the first is used.
pub fn find_core_bundle(bundles: &[BundleConfig], diagnostics: &dyn Diagnostics) -> Option<usize> {
    let flagged: Vec<usize> = bundles
        .iter()
        .enumerate()
        .filter(|(_, bundle)| bundle.is_core)
        .map(|(idx, _)| idx)
        .collect();

    if flagged.len() > 1 {
        let names: Vec<String> = flagged
            .iter()
            .map(|&idx| format!("'{}' ({})", bundles[idx].name(), bundles[idx].origin))
            .collect();
        diagnostics.error(&format!(
            "Multiple core bundles flagged: {}; using the first",
            names.join(", ")
        ));
    }

    flagged.first().copied()
}
