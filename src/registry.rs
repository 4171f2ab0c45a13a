use std::sync::Mutex;

use crate::target::Target;

/// Guarded collection of live targets.
///
/// The single mutex here is the only lock in the game core. The tick
/// loop and the input path both go through it; the full per-tick sweep
/// happens under one acquisition so a renderer snapshot never observes
/// a partially-advanced tick.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Mutex<Vec<Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self {
            targets: Mutex::new(Vec::new()),
        }
    }

    /// Independent copy for rendering while the loop keeps mutating.
    pub fn snapshot(&self) -> Vec<Target> {
        self.targets.lock().unwrap().clone()
    }

    pub fn insert(&self, target: Target) {
        self.targets.lock().unwrap().push(target);
    }

    /// Removes the first target (in insertion order) whose text equals
    /// `text` exactly. Returns the removed target, if any.
    pub fn remove_by_text(&self, text: &str) -> Option<Target> {
        let mut targets = self.targets.lock().unwrap();
        let idx = targets.iter().position(|t| t.text() == text)?;
        Some(targets.remove(idx))
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.targets.lock().unwrap().iter().any(|t| t.text() == text)
    }

    pub fn clear(&self) {
        self.targets.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.targets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances every live target one tick and reports whether any of
    /// them has reached the collision threshold. The whole sweep runs
    /// under one lock acquisition; the collision verdict is taken only
    /// after every target has been advanced.
    pub fn advance_all(
        &self,
        center_x: i32,
        center_y: i32,
        decay: f64,
        collision_radius: f64,
    ) -> bool {
        let mut targets = self.targets.lock().unwrap();
        let mut crashed = false;
        for target in targets.iter_mut() {
            target.advance(center_x, center_y, decay);
            if target.radius() <= collision_radius {
                crashed = true;
            }
        }
        crashed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(text: &str, radius: f64) -> Target {
        Target::new(text.to_string(), radius, 0.0, 0.01)
    }

    #[test]
    fn insert_and_remove_by_exact_text() {
        let registry = TargetRegistry::new();
        registry.insert(target("alpha", 100.0));
        registry.insert(target("beta", 100.0));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains_text("alpha"));

        let removed = registry.remove_by_text("alpha").unwrap();
        assert_eq!(removed.text(), "alpha");
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains_text("alpha"));
    }

    #[test]
    fn remove_misses_on_partial_match() {
        let registry = TargetRegistry::new();
        registry.insert(target("alphabet", 100.0));

        assert!(registry.remove_by_text("alpha").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_takes_first_in_insertion_order() {
        let registry = TargetRegistry::new();
        registry.insert(target("twin", 100.0));
        registry.insert(target("twin", 50.0));

        let removed = registry.remove_by_text("twin").unwrap();
        assert_eq!(removed.radius(), 100.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_independent_of_live_collection() {
        let registry = TargetRegistry::new();
        registry.insert(target("frozen", 100.0));

        let snap = registry.snapshot();
        registry.clear();

        assert_eq!(snap.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn advance_all_moves_every_target() {
        let registry = TargetRegistry::new();
        registry.insert(target("a", 100.0));
        registry.insert(target("b", 200.0));

        let crashed = registry.advance_all(0, 0, 1.0, 10.0);
        assert!(!crashed);

        let snap = registry.snapshot();
        assert_eq!(snap[0].radius(), 99.0);
        assert_eq!(snap[1].radius(), 199.0);
    }

    #[test]
    fn advance_all_reports_collision_at_threshold() {
        let registry = TargetRegistry::new();
        registry.insert(target("far", 100.0));
        registry.insert(target("near", 10.5));

        assert!(registry.advance_all(0, 0, 0.5, 10.0));
    }

    #[test]
    fn advance_all_on_empty_registry_is_quiet() {
        let registry = TargetRegistry::new();
        assert!(!registry.advance_all(0, 0, 1.0, 10.0));
    }
}
