//! Structured logging helpers
//!
//! Filter construction for the subscriber plus the field helpers used by
//! pipeline log events.

pub mod fields;

pub use fields::{generate_run_id, truncate_prompt};

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
/// Components are sorted so the result is stable.
///
/// # Examples
///
/// ```
/// use postforge::config::{LogFormat, LoggingConfig};
/// use postforge::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("routing".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
///     enable_content_logging: false,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,postforge::routing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",postforge::{}={}", component, level));
        }
    }

    filter_str
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use std::collections::HashMap;

    #[test]
    fn test_filter_without_components() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter_directives(&config), "debug");
    }

    #[test]
    fn test_filter_with_sorted_components() {
        let mut component_levels = HashMap::new();
        component_levels.insert("routing".to_string(), "trace".to_string());
        component_levels.insert("pipeline".to_string(), "debug".to_string());

        let config = LoggingConfig {
            level: "warn".to_string(),
            component_levels: Some(component_levels),
            ..LoggingConfig::default()
        };

        assert_eq!(
            build_filter_directives(&config),
            "warn,postforge::pipeline=debug,postforge::routing=trace"
        );
    }
}
