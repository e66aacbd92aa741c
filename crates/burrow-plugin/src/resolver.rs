//! The four-phase dependency/conflict fixpoint resolver.
//!
//! Resolution happens once at startup and produces the process-wide
//! [`ActiveRegistry`]. Nothing here is per-session; sessions snapshot the
//! registry when they instantiate their plugin sets.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::PluginDescriptor;

/// The resolved active plugin set, insertion-ordered.
///
/// Invariants after [`resolve`]: every member's dependencies are members,
/// and no member's conflicts are. The registry is immutable; it is built
/// once in `main` and handed by `Arc` to the router state and the session
/// factory.
#[derive(Debug, Clone, Default)]
pub struct ActiveRegistry {
    plugins: Vec<Arc<PluginDescriptor>>,
}

impl ActiveRegistry {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PluginDescriptor>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PluginDescriptor>> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Names in registry order, as published by the maze wire value.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name.clone()).collect()
    }
}

/// Computes the active set from the discovered candidates.
///
/// 1. Disabled candidates are discarded.
/// 2. Dependency fixpoint: full passes admit any remaining candidate whose
///    dependencies are all present; stops when a pass admits nothing.
///    Candidates left over (missing or cyclic dependencies) are excluded.
/// 3. Conflict cascade: per pass, the member names are snapshotted once and
///    every member whose conflict set intersects the snapshot is removed.
///    A mutually conflicting pair disappears on both sides in one pass.
/// 4. Dependent cascade: per pass, remove any member whose dependencies are
///    no longer all present.
///
/// Phases 3 and 4 run to their own fixpoints. The result is deterministic
/// for a given candidate order. An empty registry is a valid outcome.
pub fn resolve(candidates: &[Arc<PluginDescriptor>]) -> ActiveRegistry {
    let mut pending: Vec<Arc<PluginDescriptor>> = Vec::new();
    for candidate in candidates {
        if candidate.enabled {
            pending.push(Arc::clone(candidate));
        } else {
            debug!(plugin = %candidate.name, "candidate disabled, skipping");
        }
    }

    // Phase 1 + 2: seed with dependency-free candidates, then run full
    // admission passes until one adds nothing.
    let mut active: Vec<Arc<PluginDescriptor>> = Vec::new();
    let mut names: BTreeSet<String> = BTreeSet::new();
    loop {
        let mut admitted = false;
        let mut remaining = Vec::with_capacity(pending.len());
        for candidate in pending {
            if candidate.dependencies.iter().all(|d| names.contains(d)) {
                names.insert(candidate.name.clone());
                active.push(candidate);
                admitted = true;
            } else {
                remaining.push(candidate);
            }
        }
        pending = remaining;
        if !admitted {
            break;
        }
    }
    for excluded in &pending {
        debug!(plugin = %excluded.name, "dependencies unsatisfiable, excluding");
    }

    // Phase 3: conflict cascade against a per-pass snapshot.
    loop {
        let snapshot: BTreeSet<String> = active.iter().map(|p| p.name.clone()).collect();
        let before = active.len();
        active.retain(|p| {
            let keep = p.conflicts.iter().all(|c| !snapshot.contains(c));
            if !keep {
                debug!(plugin = %p.name, "conflicts with an active plugin, unloading");
            }
            keep
        });
        if active.len() == before {
            break;
        }
    }

    // Phase 4: drop members whose dependencies got removed.
    loop {
        let snapshot: BTreeSet<String> = active.iter().map(|p| p.name.clone()).collect();
        let before = active.len();
        active.retain(|p| {
            let keep = p.dependencies.iter().all(|d| snapshot.contains(d));
            if !keep {
                debug!(plugin = %p.name, "dependency no longer active, unloading");
            }
            keep
        });
        if active.len() == before {
            break;
        }
    }

    ActiveRegistry { plugins: active }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::MazePlugin;

    struct Noop(&'static str);

    #[async_trait::async_trait]
    impl MazePlugin for Noop {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn descriptor(
        name: &'static str,
        enabled: bool,
        deps: &[&str],
        conflicts: &[&str],
    ) -> Arc<PluginDescriptor> {
        let mut builder = PluginDescriptor::builder(name, "1.0").enabled(enabled);
        for d in deps {
            builder = builder.dependency(*d);
        }
        for c in conflicts {
            builder = builder.conflict(*c);
        }
        Arc::new(
            builder
                .factory(Arc::new(move |_| Ok(Arc::new(Noop(name)) as Arc<dyn MazePlugin>)))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn disabled_candidates_never_enter() {
        let registry = resolve(&[descriptor("a", false, &[], &[])]);
        assert!(registry.is_empty());
    }

    #[test]
    fn dependency_chain_admitted_across_passes() {
        // c -> b -> a, listed worst-case order so each pass admits one.
        let registry = resolve(&[
            descriptor("c", true, &["b"], &[]),
            descriptor("b", true, &["a"], &[]),
            descriptor("a", true, &[], &[]),
        ]);
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_dependency_excludes_silently() {
        let registry = resolve(&[
            descriptor("a", true, &[], &[]),
            descriptor("b", true, &["ghost"], &[]),
        ]);
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn cyclic_dependencies_excluded() {
        let registry = resolve(&[
            descriptor("a", true, &["b"], &[]),
            descriptor("b", true, &["a"], &[]),
            descriptor("c", true, &[], &[]),
        ]);
        assert_eq!(registry.names(), vec!["c"]);
    }

    #[test]
    fn disabled_dependency_drags_down_dependent() {
        // Scenario: dependency disabled in config, dependent enabled.
        let registry = resolve(&[
            descriptor("base", false, &[], &[]),
            descriptor("tool", true, &["base"], &[]),
        ]);
        assert!(registry.is_empty());
    }

    #[test]
    fn one_directional_conflict_removes_declaring_member_only() {
        let registry = resolve(&[
            descriptor("a", true, &[], &[]),
            descriptor("b", true, &[], &["a"]),
        ]);
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn mutual_conflict_removes_both_sides() {
        let registry = resolve(&[
            descriptor("a", true, &[], &["b"]),
            descriptor("b", true, &[], &["a"]),
            descriptor("c", true, &[], &[]),
        ]);
        assert_eq!(registry.names(), vec!["c"]);
    }

    #[test]
    fn conflict_removal_cascades_to_dependents() {
        // "late" conflicts with "early"; "rider" depends on "late" and must
        // fall in phase 4, and its own dependent falls with it.
        let registry = resolve(&[
            descriptor("early", true, &[], &[]),
            descriptor("late", true, &[], &["early"]),
            descriptor("rider", true, &["late"], &[]),
            descriptor("tail", true, &["rider"], &[]),
        ]);
        assert_eq!(registry.names(), vec!["early"]);
    }

    #[test]
    fn result_is_conflict_free_and_dependency_closed() {
        let registry = resolve(&[
            descriptor("a", true, &[], &[]),
            descriptor("b", true, &["a"], &["z"]),
            descriptor("z", true, &[], &[]),
            descriptor("m", true, &["b"], &[]),
        ]);
        let names: BTreeSet<String> = registry.names().into_iter().collect();
        for plugin in registry.iter() {
            for dep in &plugin.dependencies {
                assert!(names.contains(dep), "{} missing dependency {dep}", plugin.name);
            }
            for conflict in &plugin.conflicts {
                assert!(!names.contains(conflict), "{} kept conflict {conflict}", plugin.name);
            }
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let candidates = [
            descriptor("a", true, &[], &[]),
            descriptor("b", true, &["a"], &[]),
            descriptor("c", true, &[], &["a"]),
        ];
        let first = resolve(&candidates);
        let again: Vec<Arc<PluginDescriptor>> =
            first.iter().map(Arc::clone).collect();
        let second = resolve(&again);
        assert_eq!(first.names(), second.names());
    }

    #[test]
    fn empty_registry_is_valid() {
        assert!(resolve(&[]).is_empty());
    }
}
