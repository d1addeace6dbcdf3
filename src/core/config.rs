//! Scene configuration

/// Scene configuration
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Scene name, written into saved documents
    pub name: String,
    /// Register component fields with the debug inspector on init
    pub install_debug_hooks: bool,
    /// Warn about and skip unknown component types while loading instead of
    /// failing the load
    pub skip_unknown_components: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: String::from("Scene"),
            install_debug_hooks: true,
            skip_unknown_components: false,
        }
    }
}

impl SceneConfig {
    /// Create a new config with a name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable debug hook installation
    #[must_use]
    pub fn with_debug_hooks(mut self, enabled: bool) -> Self {
        self.install_debug_hooks = enabled;
        self
    }

    /// Skip unknown component types while loading
    #[must_use]
    pub fn with_skip_unknown_components(mut self, skip: bool) -> Self {
        self.skip_unknown_components = skip;
        self
    }
}
