//! Deep diff engine for before/after value trees.
//!
//! This module walks a before/after pair together with its sensitivity and
//! unknown overlays and records one [`PropertyChange`] per differing leaf.
//! Mappings are walked key by key; sequences are compared as a single unit.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::PerformanceLimits;
use crate::plan::{Overlay, PathSegment};

use super::types::{
    PropertyAction, PropertyChange, PropertyChangeAnalysis, SENSITIVE_PLACEHOLDER,
    UNKNOWN_PLACEHOLDER, dotted_path,
};

static NULL: Value = Value::Null;

/// Overlays positioned at the node being compared.
#[derive(Debug, Clone, Copy)]
pub struct NodeOverlays<'a> {
    /// Sensitivity of the before side.
    pub before_sensitive: Overlay<'a>,
    /// Sensitivity of the after side.
    pub after_sensitive: Overlay<'a>,
    /// Values only known after apply.
    pub after_unknown: Overlay<'a>,
}

impl<'a> NodeOverlays<'a> {
    /// Positions all three overlays at their roots.
    #[must_use]
    pub const fn new(
        before_sensitive: &'a Value,
        after_sensitive: &'a Value,
        after_unknown: &'a Value,
    ) -> Self {
        Self {
            before_sensitive: Overlay::new(before_sensitive),
            after_sensitive: Overlay::new(after_sensitive),
            after_unknown: Overlay::new(after_unknown),
        }
    }

    fn key(self, key: &str) -> Self {
        Self {
            before_sensitive: self.before_sensitive.key(key),
            after_sensitive: self.after_sensitive.key(key),
            after_unknown: self.after_unknown.key(key),
        }
    }

    const fn sensitive(self) -> bool {
        self.before_sensitive.is_set() || self.after_sensitive.is_set()
    }

    fn sensitive_within(self) -> bool {
        self.before_sensitive.covers_any() || self.after_sensitive.covers_any()
    }

    fn sensitivity_changed(self, value: &Value) -> bool {
        coverage_differs(self.before_sensitive, self.after_sensitive, value)
    }
}

/// Returns true if two overlays flag different leaves of `value`.
fn coverage_differs(before: Overlay<'_>, after: Overlay<'_>, value: &Value) -> bool {
    match (before, after) {
        (Overlay::Absent, Overlay::Absent) | (Overlay::Blanket, Overlay::Blanket) => false,
        _ => match value {
            Value::Object(map) if !map.is_empty() => map
                .iter()
                .any(|(key, child)| coverage_differs(before.key(key), after.key(key), child)),
            Value::Array(items) if !items.is_empty() => {
                items.iter().enumerate().any(|(index, child)| {
                    coverage_differs(before.index(index), after.index(index), child)
                })
            }
            _ => before.covers_any() != after.covers_any(),
        },
    }
}

/// Engine for computing property-level diffs under performance limits.
///
/// One engine serves one analysis pass; the total memory budget is shared by
/// every resource diffed through it.
#[derive(Debug)]
pub struct DiffEngine {
    /// Bounds applied while diffing.
    limits: PerformanceLimits,
    /// Estimated bytes of recorded changes so far.
    memory_used: usize,
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new(limits: PerformanceLimits) -> Self {
        Self {
            limits,
            memory_used: 0,
        }
    }

    /// Returns the estimated bytes recorded so far in this pass.
    #[must_use]
    pub const fn memory_used(&self) -> usize {
        self.memory_used
    }

    /// Diffs a whole resource state.
    ///
    /// A null root facing a mapping is treated as an empty mapping, so creates
    /// and deletes are listed property by property.
    pub fn analyze(
        &mut self,
        before: &Value,
        after: &Value,
        overlays: NodeOverlays<'_>,
    ) -> PropertyChangeAnalysis {
        let mut analysis = PropertyChangeAnalysis::default();
        let mut path = Vec::new();
        let empty = Map::new();

        match (before, after) {
            (Value::Null, Value::Null) if !overlays.after_unknown.covers_any() => {}
            (Value::Object(_) | Value::Null, Value::Object(_) | Value::Null) => {
                let before_map = before.as_object().unwrap_or(&empty);
                let after_map = after.as_object().unwrap_or(&empty);
                self.diff_object(&mut analysis, &mut path, before_map, after_map, overlays, 0);
            }
            _ => self.diff(&mut analysis, &mut path, before, after, overlays, 0),
        }

        Self::finish(&mut analysis);
        analysis
    }

    /// Compares one node, appending any changes to `analysis`.
    pub fn diff(
        &mut self,
        analysis: &mut PropertyChangeAnalysis,
        path: &mut Vec<PathSegment>,
        before: &Value,
        after: &Value,
        overlays: NodeOverlays<'_>,
        depth: usize,
    ) {
        if self.exhausted(analysis) {
            return;
        }

        if overlays.after_unknown.is_set() {
            let action = if before.is_null() {
                PropertyAction::Add
            } else {
                PropertyAction::Update
            };
            let sensitive = overlays.sensitive();
            self.record(analysis, path, action, before, after, sensitive, true);
            return;
        }

        if let (Value::Object(before_map), Value::Object(after_map)) = (before, after)
            && !self.depth_exceeded(depth)
        {
            self.diff_object(analysis, path, before_map, after_map, overlays, depth);
            return;
        }

        if before.is_null() && after.is_null() && overlays.after_unknown.covers_any() {
            let sensitive = overlays.sensitive_within();
            self.record(analysis, path, PropertyAction::Add, before, after, sensitive, true);
            return;
        }

        if matches!((before, after), (Value::Object(_), Value::Object(_))) {
            debug!(path = %dotted_path(path), "Depth limit reached, comparing subtree as a unit");
        }
        self.diff_unit(analysis, path, before, after, overlays);
    }

    /// Compares a value as an opaque unit: scalars, sequences, type changes,
    /// and subtrees beyond the depth limit.
    fn diff_unit(
        &mut self,
        analysis: &mut PropertyChangeAnalysis,
        path: &[PathSegment],
        before: &Value,
        after: &Value,
        overlays: NodeOverlays<'_>,
    ) {
        let sensitive = overlays.sensitive_within();
        let unknown = overlays.after_unknown.covers_any();

        if before == after && !unknown && !overlays.sensitivity_changed(before) {
            return;
        }

        let action = if before.is_null() {
            PropertyAction::Add
        } else if after.is_null() && !unknown {
            PropertyAction::Remove
        } else {
            PropertyAction::Update
        };

        self.record(analysis, path, action, before, after, sensitive, unknown);
    }

    fn diff_object(
        &mut self,
        analysis: &mut PropertyChangeAnalysis,
        path: &mut Vec<PathSegment>,
        before: &Map<String, Value>,
        after: &Map<String, Value>,
        overlays: NodeOverlays<'_>,
        depth: usize,
    ) {
        let mut keys: BTreeSet<&str> = before.keys().map(String::as_str).collect();
        keys.extend(after.keys().map(String::as_str));
        keys.extend(overlays.after_unknown.flagged_keys());

        for key in keys {
            if self.exhausted(analysis) {
                return;
            }
            let before_value = before.get(key).unwrap_or(&NULL);
            let after_value = after.get(key).unwrap_or(&NULL);

            path.push(PathSegment::Key(key.to_string()));
            self.diff(analysis, path, before_value, after_value, overlays.key(key), depth + 1);
            path.pop();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        analysis: &mut PropertyChangeAnalysis,
        path: &[PathSegment],
        action: PropertyAction,
        before: &Value,
        after: &Value,
        sensitive: bool,
        is_unknown: bool,
    ) {
        if self.at_capacity(analysis) {
            debug!(path = %dotted_path(path), "Property cap reached, dropping change");
            analysis.truncated = true;
            return;
        }

        let size = estimate_size(before) + estimate_size(after);
        if exceeds(size, self.limits.max_property_size) {
            warn!(
                path = %dotted_path(path),
                size,
                limit = self.limits.max_property_size,
                "Skipping oversized property change"
            );
            analysis.truncated = true;
            return;
        }
        if exceeds(self.memory_used + size, self.limits.max_total_memory) {
            warn!(
                path = %dotted_path(path),
                used = self.memory_used,
                limit = self.limits.max_total_memory,
                "Memory budget exhausted, skipping property change"
            );
            analysis.truncated = true;
            return;
        }
        self.memory_used += size;

        let masked = || Value::String(String::from(SENSITIVE_PLACEHOLDER));
        let before_display = if sensitive { masked() } else { before.clone() };
        let after_display = if is_unknown {
            Value::String(String::from(UNKNOWN_PLACEHOLDER))
        } else if sensitive {
            masked()
        } else {
            after.clone()
        };

        analysis.changes.push(PropertyChange {
            path: path.to_vec(),
            name: path.last().map(ToString::to_string).unwrap_or_default(),
            action,
            before: before_display,
            after: after_display,
            sensitive,
            is_unknown,
            triggers_replacement: false,
        });
    }

    fn at_capacity(&self, analysis: &PropertyChangeAnalysis) -> bool {
        let limit = self.limits.max_properties_per_resource;
        limit != 0 && analysis.changes.len() >= limit
    }

    /// Full and already known to have dropped a change: nothing left to find.
    fn exhausted(&self, analysis: &PropertyChangeAnalysis) -> bool {
        analysis.truncated && self.at_capacity(analysis)
    }

    const fn depth_exceeded(&self, depth: usize) -> bool {
        self.limits.max_dependency_depth != 0 && depth >= self.limits.max_dependency_depth
    }

    fn finish(analysis: &mut PropertyChangeAnalysis) {
        analysis
            .changes
            .sort_by_cached_key(|change| change.path_string().to_lowercase());
        analysis.count = analysis.changes.len();
        if analysis.truncated {
            debug!(count = analysis.count, "Property list truncated by performance limits");
        }
    }
}

const fn exceeds(size: usize, limit: usize) -> bool {
    limit != 0 && size > limit
}

/// Estimates the in-memory size of a value: string length for strings, a
/// fixed width for other scalars, and the sum over members for containers.
#[must_use]
pub fn estimate_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => s.len(),
        Value::Array(items) => items.iter().map(estimate_size).sum(),
        Value::Object(map) => map.iter().map(|(k, v)| k.len() + estimate_size(v)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(before: &Value, after: &Value) -> PropertyChangeAnalysis {
        run_with(before, after, &Value::Null, &Value::Null, &Value::Null)
    }

    fn run_with(
        before: &Value,
        after: &Value,
        before_sensitive: &Value,
        after_sensitive: &Value,
        after_unknown: &Value,
    ) -> PropertyChangeAnalysis {
        let mut engine = DiffEngine::new(PerformanceLimits::default());
        engine.analyze(
            before,
            after,
            NodeOverlays::new(before_sensitive, after_sensitive, after_unknown),
        )
    }

    #[test]
    fn test_scalar_update() {
        let analysis = run(&json!({"name": "old"}), &json!({"name": "new"}));

        assert_eq!(analysis.count, 1);
        let change = &analysis.changes[0];
        assert_eq!(change.name, "name");
        assert_eq!(change.action, PropertyAction::Update);
        assert_eq!(change.before, json!("old"));
        assert_eq!(change.after, json!("new"));
    }

    #[test]
    fn test_key_removed() {
        let analysis = run(&json!({"a": 1, "b": 2}), &json!({"a": 1}));

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].name, "b");
        assert_eq!(analysis.changes[0].action, PropertyAction::Remove);
    }

    #[test]
    fn test_create_from_null() {
        let analysis = run(&Value::Null, &json!({"name": "new"}));

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].action, PropertyAction::Add);
        assert_eq!(analysis.changes[0].after, json!("new"));
    }

    #[test]
    fn test_nested_added_block_is_single_add() {
        let analysis = run(&json!({}), &json!({"tags": {"env": "prod", "team": "core"}}));

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].path, vec![PathSegment::from("tags")]);
        assert_eq!(analysis.changes[0].action, PropertyAction::Add);
    }

    #[test]
    fn test_nested_mapping_recurses() {
        let analysis = run(
            &json!({"tags": {"env": "dev", "team": "core"}}),
            &json!({"tags": {"env": "prod", "team": "core"}}),
        );

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].path_string(), "tags.env");
        assert_eq!(analysis.changes[0].name, "env");
    }

    #[test]
    fn test_identical_values_produce_nothing() {
        let value = json!({"a": [1, 2, {"b": null}], "c": {"d": true}});
        let analysis = run(&value, &value);
        assert!(analysis.is_empty());
        assert!(!analysis.truncated);
    }

    #[test]
    fn test_sequence_is_opaque_unit() {
        let analysis = run(&json!({"ports": [80, 443]}), &json!({"ports": [80, 443, 8080]}));

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].path_string(), "ports");
        assert_eq!(analysis.changes[0].action, PropertyAction::Update);
        assert_eq!(analysis.changes[0].after, json!([80, 443, 8080]));
    }

    #[test]
    fn test_sequence_order_matters() {
        let analysis = run(&json!({"ports": [80, 443]}), &json!({"ports": [443, 80]}));
        assert_eq!(analysis.count, 1);
    }

    #[test]
    fn test_type_change_is_update() {
        let analysis = run(&json!({"x": "1"}), &json!({"x": {"y": 1}}));
        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].action, PropertyAction::Update);
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let analysis = run(
            &json!({"b": 1, "Zeta": 1, "alpha": 1}),
            &json!({"b": 2, "Zeta": 2, "alpha": 2}),
        );
        let names: Vec<&str> = analysis.changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "b", "Zeta"]);
    }

    #[test]
    fn test_diff_is_idempotent() {
        let before = json!({"a": {"b": 1, "c": [1]}, "d": "x"});
        let after = json!({"a": {"b": 2, "c": [2]}, "e": "y"});
        assert_eq!(run(&before, &after), run(&before, &after));
    }

    #[test]
    fn test_sensitive_values_are_masked() {
        let analysis = run_with(
            &json!({"password": "hunter2"}),
            &json!({"password": "hunter3"}),
            &json!({"password": true}),
            &json!({"password": true}),
            &Value::Null,
        );

        let change = &analysis.changes[0];
        assert!(change.sensitive);
        assert_eq!(change.before, json!(SENSITIVE_PLACEHOLDER));
        assert_eq!(change.after, json!(SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn test_blanket_sensitivity_covers_children() {
        let analysis = run_with(
            &json!({"config": {"token": "a", "mode": "x"}}),
            &json!({"config": {"token": "b", "mode": "y"}}),
            &Value::Null,
            &json!({"config": true}),
            &Value::Null,
        );

        assert_eq!(analysis.count, 2);
        for change in &analysis.changes {
            assert!(change.sensitive);
            assert_eq!(change.before, json!(SENSITIVE_PLACEHOLDER));
            assert_eq!(change.after, json!(SENSITIVE_PLACEHOLDER));
        }
    }

    #[test]
    fn test_sensitivity_change_is_masked_even_when_equal() {
        let analysis = run_with(
            &json!({"secret": "same"}),
            &json!({"secret": "same"}),
            &Value::Null,
            &json!({"secret": true}),
            &Value::Null,
        );

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].before, json!(SENSITIVE_PLACEHOLDER));
        assert_eq!(analysis.changes[0].after, json!(SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn test_sensitivity_change_inside_sequence() {
        let analysis = run_with(
            &json!({"list": ["x"]}),
            &json!({"list": ["x"]}),
            &json!({"list": [false]}),
            &json!({"list": [true]}),
            &Value::Null,
        );

        assert_eq!(analysis.count, 1);
        let change = &analysis.changes[0];
        assert_eq!(change.path_string(), "list");
        assert_eq!(change.action, PropertyAction::Update);
        assert!(change.sensitive);
        assert_eq!(change.after, json!(SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn test_equivalent_sensitivity_shapes_are_unchanged() {
        let analysis = run_with(
            &json!({"list": ["x", "y"]}),
            &json!({"list": ["x", "y"]}),
            &json!({"list": true}),
            &json!({"list": [true, true]}),
            &Value::Null,
        );

        assert!(analysis.is_empty());
    }

    #[test]
    fn test_sensitivity_change_beyond_depth_limit() {
        let limits = PerformanceLimits {
            max_dependency_depth: 1,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let value = json!({"outer": {"inner": {"leaf": 1}}});
        let analysis = engine.analyze(
            &value,
            &value,
            NodeOverlays::new(
                &Value::Null,
                &json!({"outer": {"inner": {"leaf": true}}}),
                &Value::Null,
            ),
        );

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].path_string(), "outer");
        assert!(analysis.changes[0].sensitive);
    }

    #[test]
    fn test_unknown_nested_object_is_single_update() {
        let analysis = run_with(
            &json!({"network": {"ip": "10.0.0.1", "mask": 24}}),
            &json!({"network": null}),
            &Value::Null,
            &Value::Null,
            &json!({"network": true}),
        );

        assert_eq!(analysis.count, 1);
        let change = &analysis.changes[0];
        assert_eq!(change.path_string(), "network");
        assert_eq!(change.action, PropertyAction::Update);
        assert!(change.is_unknown);
        assert!(analysis.changes.iter().all(|c| c.action != PropertyAction::Remove));
    }

    #[test]
    fn test_order_independent_of_key_insertion() {
        let mut forward = Map::new();
        let mut reverse = Map::new();
        let keys = ["zone", "Ami", "count", "tags"];
        for (i, key) in keys.iter().enumerate() {
            forward.insert((*key).to_string(), json!(i));
        }
        for (i, key) in keys.iter().enumerate().rev() {
            reverse.insert((*key).to_string(), json!(i));
        }

        let first = run(&json!({}), &Value::Object(forward));
        let second = run(&json!({}), &Value::Object(reverse));

        let paths = |a: &PropertyChangeAnalysis| {
            a.changes.iter().map(PropertyChange::path_string).collect::<Vec<_>>()
        };
        assert_eq!(paths(&first), vec!["Ami", "count", "tags", "zone"]);
        assert_eq!(paths(&first), paths(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_is_never_removal() {
        let analysis = run_with(
            &json!({"ip": "10.0.0.1", "name": "web"}),
            &json!({"name": "web"}),
            &Value::Null,
            &Value::Null,
            &json!({"ip": true}),
        );

        assert_eq!(analysis.count, 1);
        let change = &analysis.changes[0];
        assert_eq!(change.action, PropertyAction::Update);
        assert!(change.is_unknown);
        assert_eq!(change.after, json!(UNKNOWN_PLACEHOLDER));
    }

    #[test]
    fn test_unknown_only_keys_are_listed_on_create() {
        let analysis = run_with(
            &Value::Null,
            &json!({"ami": "ami-1"}),
            &Value::Null,
            &Value::Null,
            &json!({"id": true, "arn": true}),
        );

        let names: Vec<&str> = analysis.changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ami", "arn", "id"]);
        assert!(analysis.changes[1].is_unknown);
        assert_eq!(analysis.changes[1].action, PropertyAction::Add);
    }

    #[test]
    fn test_partially_unknown_sequence() {
        let analysis = run_with(
            &json!({"ips": ["a"]}),
            &json!({"ips": ["a", null]}),
            &Value::Null,
            &Value::Null,
            &json!({"ips": [false, true]}),
        );

        assert_eq!(analysis.count, 1);
        assert!(analysis.changes[0].is_unknown);
        assert_eq!(analysis.changes[0].action, PropertyAction::Update);
    }

    #[test]
    fn test_property_limit_truncates() {
        let limits = PerformanceLimits {
            max_properties_per_resource: 2,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let analysis = engine.analyze(
            &json!({"a": 1, "b": 1, "c": 1}),
            &json!({"a": 2, "b": 2, "c": 2}),
            NodeOverlays::new(&Value::Null, &Value::Null, &Value::Null),
        );

        assert_eq!(analysis.count, 2);
        assert!(analysis.truncated);
    }

    #[test]
    fn test_cap_equal_to_change_count_is_not_truncated() {
        let limits = PerformanceLimits {
            max_properties_per_resource: 2,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let analysis = engine.analyze(
            &json!({"a": 1, "b": 1, "c": 1}),
            &json!({"a": 2, "b": 2, "c": 1}),
            NodeOverlays::new(&Value::Null, &Value::Null, &Value::Null),
        );

        assert_eq!(analysis.count, 2);
        assert!(!analysis.truncated);
    }

    #[test]
    fn test_oversized_property_is_skipped() {
        let limits = PerformanceLimits {
            max_property_size: 8,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let analysis = engine.analyze(
            &json!({"small": "a", "big": "aaaaaaaaaa"}),
            &json!({"small": "b", "big": "bbbbbbbbbb"}),
            NodeOverlays::new(&Value::Null, &Value::Null, &Value::Null),
        );

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].name, "small");
        assert!(analysis.truncated);
    }

    #[test]
    fn test_memory_budget_is_shared_across_resources() {
        let limits = PerformanceLimits {
            max_total_memory: 4,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let overlays = NodeOverlays::new(&Value::Null, &Value::Null, &Value::Null);

        let first = engine.analyze(&json!({"a": "xy"}), &json!({"a": "zw"}), overlays);
        let second = engine.analyze(&json!({"a": "xy"}), &json!({"a": "zw"}), overlays);

        assert_eq!(first.count, 1);
        assert!(!first.truncated);
        assert_eq!(engine.memory_used(), 4);
        assert!(second.is_empty());
        assert!(second.truncated);
    }

    #[test]
    fn test_depth_limit_compares_subtree_as_unit() {
        let limits = PerformanceLimits {
            max_dependency_depth: 1,
            ..PerformanceLimits::default()
        };
        let mut engine = DiffEngine::new(limits);
        let analysis = engine.analyze(
            &json!({"outer": {"inner": {"leaf": 1}}}),
            &json!({"outer": {"inner": {"leaf": 2}}}),
            NodeOverlays::new(&Value::Null, &Value::Null, &Value::Null),
        );

        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.changes[0].path_string(), "outer");
    }

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_size(&json!(null)), 0);
        assert_eq!(estimate_size(&json!("abcd")), 4);
        assert_eq!(estimate_size(&json!([1, true])), 9);
        assert_eq!(estimate_size(&json!({"ab": "cd"})), 4);
    }
}
