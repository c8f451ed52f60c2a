use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::warn;
use unic_langid::LanguageIdentifier;

const MAIN_RESOURCE: &str = include_str!("../locales/fr/main.ftl");

/// Message catalog for every text the bot sends
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    /// Create a new localization manager from the embedded French resource
    pub fn new() -> Self {
        Self::from_source(MAIN_RESOURCE)
    }

    /// Build a manager from Fluent source; broken entries are skipped
    pub fn from_source(source: &str) -> Self {
        let locale: LanguageIdentifier = "fr".parse().unwrap_or_default();
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Plain-text chat messages, no bidi isolation marks around arguments
        bundle.set_use_isolating(false);

        let resource = match FluentResource::try_new(source.to_string()) {
            Ok(resource) => resource,
            Err((resource, errors)) => {
                warn!(errors = ?errors, "Fluent resource contains errors");
                resource
            }
        };
        if let Err(errors) = bundle.add_resource(resource) {
            warn!(errors = ?errors, "Failed to add Fluent resource");
        }

        Self { bundle }
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        let msg = match self.bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(
                args.iter()
                    .map(|(k, v)| (*k, FluentValue::from(v.to_string()))),
            )
        });

        let mut errors = vec![];
        let value = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, errors = ?errors, "Errors while formatting message");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message(key, Some(&args_map))
    }
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref LOCALIZATION_MANAGER: LocalizationManager = LocalizationManager::new();
}

/// Convenience function to get a localized message
pub fn t(key: &str) -> String {
    LOCALIZATION_MANAGER.get_message(key, None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    LOCALIZATION_MANAGER.get_message_with_args(key, args)
}
