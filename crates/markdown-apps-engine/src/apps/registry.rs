use std::collections::HashMap;
use std::sync::OnceLock;

use super::Application;
use super::board::BoardApp;

/// Language tag → application table.
///
/// Built once before any page is processed and only read afterwards.
#[derive(Default)]
pub struct Registry {
    apps: HashMap<&'static str, Box<dyn Application>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in applications.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BoardApp);
        registry
    }

    /// Process-wide registry of the built-in applications.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::builtin)
    }

    /// Register an application under its language tag, replacing any previous one.
    pub fn register(&mut self, app: impl Application + 'static) -> &mut Self {
        let tag = app.language_tag();
        if self.apps.insert(tag, Box::new(app)).is_some() {
            log::warn!("Application `{tag}` registered twice; keeping the latest");
        }
        self
    }

    pub fn get(&self, language_tag: &str) -> Option<&dyn Application> {
        self.apps.get(language_tag).map(|app| app.as_ref())
    }

    pub fn contains(&self, language_tag: &str) -> bool {
        self.apps.contains_key(language_tag)
    }

    /// Registered language tags, sorted.
    pub fn language_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.apps.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("apps", &self.language_tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::board;

    #[test]
    fn builtin_registers_board() {
        let registry = Registry::builtin();
        assert!(registry.contains(board::LANGUAGE_TAG));
        assert_eq!(registry.language_tags(), vec![board::LANGUAGE_TAG]);
    }

    #[test]
    fn unknown_tag_is_absent() {
        let registry = Registry::builtin();
        assert!(registry.get("rust").is_none());
        assert!(!registry.contains(""));
    }

    #[test]
    fn global_registry_is_shared() {
        assert!(std::ptr::eq(Registry::global(), Registry::global()));
        assert!(Registry::global().contains(board::LANGUAGE_TAG));
    }

    #[test]
    fn empty_registry_has_no_tags() {
        assert!(Registry::new().language_tags().is_empty());
    }
}
