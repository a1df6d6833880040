//! Partial-update context for AJAX round trips.

use crate::foundation::component::ComponentPath;

/// Collects the outcome of one AJAX round trip: which components must be
/// re-rendered on the client and which scripts run after the update.
///
/// A target is created per dispatched listener invocation and discarded when
/// the response has been written; no cross-request state lives here.
#[derive(Debug, Clone, Default)]
pub struct AjaxRequestTarget {
    components: Vec<ComponentPath>,
    scripts: Vec<String>,
}

impl AjaxRequestTarget {
    /// Creates an empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the component at `path` for re-rendering.
    ///
    /// Adding the same path twice is collapsed to a single update.
    pub fn add_component(&mut self, path: ComponentPath) {
        if !self.components.contains(&path) {
            self.components.push(path);
        }
    }

    /// Appends a script to evaluate on the client after the update applies.
    pub fn append_script(&mut self, script: impl Into<String>) {
        self.scripts.push(script.into());
    }

    /// Paths scheduled for re-rendering, in scheduling order.
    pub fn components(&self) -> &[ComponentPath] {
        &self.components
    }

    /// Scripts to evaluate after the update, in order.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Returns `true` when the round trip produced no visible change.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_components_collapse() {
        let mut target = AjaxRequestTarget::new();
        let path: ComponentPath = "form/feedback".parse().unwrap();
        target.add_component(path.clone());
        target.add_component(path);

        assert_eq!(target.components().len(), 1);
    }

    #[test]
    fn test_empty_when_nothing_scheduled() {
        let mut target = AjaxRequestTarget::new();
        assert!(target.is_empty());

        target.append_script("Trellis.focus('field');");
        assert!(!target.is_empty());
    }
}
