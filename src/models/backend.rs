//! Backend models: which services exist, how they are configured, and the
//! typed field sets handed to the providers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::settings::ServiceEntry;
use crate::error::{AppError, AppResult};

// ============================================================================
// BackendKind
// ============================================================================

/// The closed set of supported delivery backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Pushover,
    Email,
}

impl BackendKind {
    /// Every supported backend
    pub const ALL: [BackendKind; 2] = [BackendKind::Email, BackendKind::Pushover];

    /// Canonical backend name, as used in the `title` of a service entry
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Pushover => "pushover",
            BackendKind::Email => "email",
        }
    }

    /// Fields that must be present after merging config and call-time values
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            BackendKind::Pushover => &["app_token", "api_key"],
            BackendKind::Email => &["subject", "to"],
        }
    }

    /// Fields that may be present
    pub fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            BackendKind::Pushover => &["title"],
            BackendKind::Email => &["sender"],
        }
    }

    /// Whether `field` belongs to this backend's field set
    pub fn is_known_field(&self, field: &str) -> bool {
        self.required_fields().contains(&field) || self.optional_fields().contains(&field)
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pushover" => Ok(BackendKind::Pushover),
            "email" => Ok(BackendKind::Email),
            _ => Err(AppError::configuration(
                "services.title",
                format!(
                    "Invalid service '{}'. Valid services are: email, pushover",
                    s
                ),
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Typed delivery fields
// ============================================================================

/// Merged Pushover fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushoverFields {
    pub app_token: String,
    pub api_key: String,
    pub title: Option<String>,
}

/// Merged email fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailFields {
    pub to: String,
    pub subject: String,
    pub sender: Option<String>,
}

/// Backend-specific field set, ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFields {
    Pushover(PushoverFields),
    Email(EmailFields),
}

impl DeliveryFields {
    /// The backend these fields belong to
    pub fn kind(&self) -> BackendKind {
        match self {
            DeliveryFields::Pushover(_) => BackendKind::Pushover,
            DeliveryFields::Email(_) => BackendKind::Email,
        }
    }

    /// Field name/value pairs that shape the delivered notification, sorted
    /// by field name. Absent optional fields are left out.
    pub fn rendered_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = match self {
            DeliveryFields::Pushover(f) => {
                let mut v = vec![("api_key", f.api_key.as_str()), ("app_token", f.app_token.as_str())];
                if let Some(title) = &f.title {
                    v.push(("title", title.as_str()));
                }
                v
            }
            DeliveryFields::Email(f) => {
                let mut v = vec![("subject", f.subject.as_str()), ("to", f.to.as_str())];
                if let Some(sender) = &f.sender {
                    v.push(("sender", sender.as_str()));
                }
                v
            }
        };
        fields.sort_by_key(|(name, _)| *name);
        fields
    }
}

// ============================================================================
// BackendConfig
// ============================================================================

/// Configured settings for one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    kind: BackendKind,
    settings: BTreeMap<String, String>,
}

impl BackendConfig {
    /// Create a backend configuration, rejecting settings the backend does
    /// not know about.
    pub fn new(kind: BackendKind, settings: BTreeMap<String, String>) -> AppResult<Self> {
        if let Some(unknown) = settings.keys().find(|key| !kind.is_known_field(key)) {
            return Err(AppError::configuration(
                format!("services.{}.{}", kind, unknown),
                format!("Unknown setting for {} {}", kind, unknown),
            ));
        }

        Ok(Self { kind, settings })
    }

    /// Build from a `services` entry of the configuration file
    pub fn from_service(entry: &ServiceEntry) -> AppResult<Self> {
        let kind: BackendKind = entry.title.parse()?;
        Self::new(kind, entry.settings.clone())
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }

    /// Merge call-time overrides over the configured defaults.
    ///
    /// Overrides win when non-blank. Override keys outside this backend's
    /// field set are ignored, so one set of overrides can serve a fan-out.
    ///
    /// # Errors
    /// `AppError::Configuration` when a required field is missing or blank
    /// in both sources.
    pub fn merge(&self, overrides: &BTreeMap<String, String>) -> AppResult<DeliveryFields> {
        let lookup = |field: &str| -> Option<String> {
            overrides
                .get(field)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| self.settings.get(field).filter(|v| !v.trim().is_empty()))
                .map(|v| v.trim().to_string())
        };

        let require = |field: &str| -> AppResult<String> {
            lookup(field).ok_or_else(|| {
                AppError::configuration(
                    format!("services.{}.{}", self.kind, field),
                    format!("Missing setting for {} {}", self.kind, field),
                )
            })
        };

        let fields = match self.kind {
            BackendKind::Pushover => DeliveryFields::Pushover(PushoverFields {
                app_token: require("app_token")?,
                api_key: require("api_key")?,
                title: lookup("title"),
            }),
            BackendKind::Email => DeliveryFields::Email(EmailFields {
                subject: require("subject")?,
                to: require("to")?,
                sender: lookup("sender"),
            }),
        };

        Ok(fields)
    }
}

// ============================================================================
// ResolvedConfig
// ============================================================================

/// All configured backends plus the ones enabled for default sends.
///
/// Every enabled backend is guaranteed to have a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    backends: Vec<BackendConfig>,
    enabled: Vec<BackendKind>,
}

impl ResolvedConfig {
    /// Build from in-memory values.
    ///
    /// # Errors
    /// - no backends at all
    /// - the same backend configured twice
    /// - an enabled backend without configuration
    pub fn new(backends: Vec<BackendConfig>, enabled: Vec<BackendKind>) -> AppResult<Self> {
        if backends.is_empty() {
            return Err(AppError::configuration(
                "services",
                "Missing services, at least one is needed",
            ));
        }

        for (i, backend) in backends.iter().enumerate() {
            if backends[..i].iter().any(|b| b.kind == backend.kind) {
                return Err(AppError::configuration(
                    "services",
                    format!("Service {} is configured more than once", backend.kind),
                ));
            }
        }

        if let Some(missing) = enabled
            .iter()
            .find(|kind| !backends.iter().any(|b| b.kind == **kind))
        {
            return Err(AppError::configuration(
                "services",
                format!("Enabled service {} has no settings", missing),
            ));
        }

        Ok(Self { backends, enabled })
    }

    /// Resolve the `services` list of the configuration file. Every entry is
    /// configured; entries with `enabled = true` also join default sends.
    pub fn from_services(services: &[ServiceEntry]) -> AppResult<Self> {
        let backends = services
            .iter()
            .map(BackendConfig::from_service)
            .collect::<AppResult<Vec<_>>>()?;

        let enabled = services
            .iter()
            .zip(&backends)
            .filter(|(entry, _)| entry.enabled)
            .map(|(_, backend)| backend.kind)
            .collect();

        Self::new(backends, enabled)
    }

    /// Look up the configuration of a backend
    pub fn get(&self, kind: BackendKind) -> Option<&BackendConfig> {
        self.backends.iter().find(|b| b.kind == kind)
    }

    /// Backends used when no explicit backend is requested, in config order
    pub fn enabled(&self) -> &[BackendKind] {
        &self.enabled
    }

    pub fn backends(&self) -> &[BackendConfig] {
        &self.backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("pushover".parse::<BackendKind>().unwrap(), BackendKind::Pushover);
        assert_eq!("Email".parse::<BackendKind>().unwrap(), BackendKind::Email);

        let err = "sms".parse::<BackendKind>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Invalid service 'sms'"));
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let err = BackendConfig::new(
            BackendKind::Pushover,
            map(&[("app_token", "A"), ("priority", "2")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown setting for pushover priority"));
    }

    #[test]
    fn test_merge_uses_config_defaults() {
        let config =
            BackendConfig::new(BackendKind::Pushover, map(&[("app_token", "A"), ("api_key", "K")]))
                .unwrap();

        let fields = config.merge(&BTreeMap::new()).unwrap();
        assert_eq!(
            fields,
            DeliveryFields::Pushover(PushoverFields {
                app_token: "A".to_string(),
                api_key: "K".to_string(),
                title: None,
            })
        );
    }

    #[test]
    fn test_merge_call_time_values_win() {
        let config = BackendConfig::new(
            BackendKind::Email,
            map(&[("to", "ops@example.com"), ("subject", "Alert")]),
        )
        .unwrap();

        let fields = config
            .merge(&map(&[("subject", "Disk full"), ("sender", "cron@example.com")]))
            .unwrap();
        assert_eq!(
            fields,
            DeliveryFields::Email(EmailFields {
                to: "ops@example.com".to_string(),
                subject: "Disk full".to_string(),
                sender: Some("cron@example.com".to_string()),
            })
        );
    }

    #[test]
    fn test_merge_blank_override_falls_back() {
        let config =
            BackendConfig::new(BackendKind::Pushover, map(&[("app_token", "A"), ("api_key", "K")]))
                .unwrap();

        let fields = config.merge(&map(&[("api_key", "  ")])).unwrap();
        match fields {
            DeliveryFields::Pushover(f) => assert_eq!(f.api_key, "K"),
            other => panic!("Expected pushover fields, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_ignores_foreign_overrides() {
        let config =
            BackendConfig::new(BackendKind::Pushover, map(&[("app_token", "A"), ("api_key", "K")]))
                .unwrap();

        let fields = config.merge(&map(&[("subject", "ignored")])).unwrap();
        assert_eq!(fields.kind(), BackendKind::Pushover);
    }

    #[test]
    fn test_merge_missing_required_field() {
        let config = BackendConfig::new(BackendKind::Pushover, map(&[("app_token", "A")])).unwrap();

        let err = config.merge(&BTreeMap::new()).unwrap_err();
        match err {
            AppError::Configuration { key, message } => {
                assert_eq!(key, "services.pushover.api_key");
                assert_eq!(message, "Missing setting for pushover api_key");
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_rendered_fields_sorted() {
        let fields = DeliveryFields::Email(EmailFields {
            to: "a@example.com".to_string(),
            subject: "S".to_string(),
            sender: Some("b@example.com".to_string()),
        });
        let names: Vec<_> = fields.rendered_fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["sender", "subject", "to"]);
    }

    #[test]
    fn test_resolved_config_from_services() {
        let services = vec![
            ServiceEntry::new("pushover", map(&[("app_token", "A"), ("api_key", "K")])),
            ServiceEntry {
                enabled: false,
                ..ServiceEntry::new("email", map(&[("to", "a@example.com")]))
            },
        ];

        let resolved = ResolvedConfig::from_services(&services).unwrap();
        assert_eq!(resolved.enabled(), &[BackendKind::Pushover]);
        assert!(resolved.get(BackendKind::Email).is_some());
        assert_eq!(resolved.backends().len(), 2);
    }

    #[test]
    fn test_resolved_config_requires_services() {
        let err = ResolvedConfig::from_services(&[]).unwrap_err();
        assert!(err.to_string().contains("at least one is needed"));
    }

    #[test]
    fn test_resolved_config_unknown_title() {
        let services = vec![ServiceEntry::new("slack", BTreeMap::new())];
        assert!(ResolvedConfig::from_services(&services).is_err());
    }

    #[test]
    fn test_resolved_config_enabled_without_settings() {
        let backends = vec![BackendConfig::new(BackendKind::Email, BTreeMap::new()).unwrap()];
        let err = ResolvedConfig::new(backends, vec![BackendKind::Pushover]).unwrap_err();
        assert!(err.to_string().contains("Enabled service pushover has no settings"));
    }

    #[test]
    fn test_resolved_config_duplicate_service() {
        let services = vec![
            ServiceEntry::new("email", BTreeMap::new()),
            ServiceEntry::new("email", BTreeMap::new()),
        ];
        assert!(ResolvedConfig::from_services(&services).is_err());
    }
}
