pub const APP_NAME: &str = "Cotizador";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// Version string shown by `--version` and sent in HTTP user agents.
/// Prefers the tag baked in by the build script over the manifest version.
pub fn version_label() -> String {
    GIT_TAG
        .map(|tag| tag.trim_start_matches(|ch| ch == 'v' || ch == 'V').to_string())
        .unwrap_or_else(|| APP_VERSION.to_string())
}

pub fn user_agent() -> String {
    format!("{}/{}", APP_NAME.to_lowercase(), version_label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_label_is_never_empty() {
        assert!(!version_label().is_empty());
    }

    #[test]
    fn user_agent_contains_app_name() {
        assert!(user_agent().starts_with("cotizador/"));
    }
}
