//! Operator-supplied service registry (`--services-file`). Same shape as the
//! builtin table, expressed in TOML, so deny-lists and probe sets can be
//! refreshed without a rebuild.

use crate::config::registry::ServiceRegistry;
use crate::domain::model::{
    ClassifierRules, ElementarySignal, EnvelopeRules, Probe, ServiceSpec, StatusAction,
    StatusRule,
};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesFile {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deny_list: Vec<String>,
    #[serde(rename = "probe", default)]
    pub probes: Vec<ProbeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeEntry {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub follow_redirects: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub final_on_available: bool,
    #[serde(default)]
    pub rules: RulesEntry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesEntry {
    #[serde(rename = "status", default)]
    pub status_rules: Vec<StatusEntry>,
    #[serde(default)]
    pub restricted_phrases: Vec<String>,
    #[serde(default)]
    pub challenge_phrases: Vec<String>,
    #[serde(default)]
    pub available_phrases: Vec<String>,
    pub error_envelope: Option<EnvelopeEntry>,
}

/// One status-code mapping. Exactly one of `signal` and `inspect_body` must
/// be given; `fallback` only applies alongside `inspect_body`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub codes: Vec<u16>,
    pub signal: Option<ElementarySignal>,
    #[serde(default)]
    pub inspect_body: bool,
    pub fallback: Option<ElementarySignal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeEntry {
    #[serde(default)]
    pub restricted_codes: Vec<String>,
    #[serde(default)]
    pub restricted_keywords: Vec<String>,
    #[serde(default)]
    pub available_statuses: Vec<String>,
    #[serde(default)]
    pub available_markers: Vec<String>,
    #[serde(default = "default_envelope_fallback")]
    pub fallback: ElementarySignal,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_envelope_fallback() -> ElementarySignal {
    ElementarySignal::Unknown
}

impl ServicesFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ServicesFile = toml::from_str(raw)?;
        Ok(file)
    }

    /// Validates every entry and converts the file into a registry.
    pub fn into_registry(self) -> Result<ServiceRegistry> {
        if self.services.is_empty() {
            return Err(CheckError::ConfigError {
                message: "services file defines no services".to_string(),
            });
        }

        let mut specs = Vec::with_capacity(self.services.len());
        for entry in self.services {
            specs.push(entry.into_spec()?);
        }
        Ok(ServiceRegistry::new(specs))
    }
}

impl ServiceEntry {
    fn into_spec(self) -> Result<ServiceSpec> {
        validate_non_empty_string("service.id", &self.id)?;
        validate_non_empty_string("service.name", &self.name)?;
        if self.probes.is_empty() {
            return Err(CheckError::ConfigError {
                message: format!("service '{}' has no probes", self.id),
            });
        }

        let mut probes = Vec::with_capacity(self.probes.len());
        for probe_entry in self.probes {
            probes.push(probe_entry.into_probe(&self.id)?);
        }

        Ok(ServiceSpec {
            id: self.id,
            name: self.name,
            deny_list: self.deny_list,
            probes,
        })
    }
}

impl ProbeEntry {
    fn into_probe(self, service_id: &str) -> Result<Probe> {
        let field = format!("service '{}' probe '{}' url", service_id, self.label);
        validate_url(&field, &self.url)?;

        let mut status_rules = Vec::with_capacity(self.rules.status_rules.len());
        for status_entry in self.rules.status_rules {
            status_rules.push(status_entry.into_rule(service_id)?);
        }

        Ok(Probe {
            label: self.label,
            url: self.url,
            follow_redirects: self.follow_redirects,
            timeout: Duration::from_secs(self.timeout_secs),
            final_on_available: self.final_on_available,
            rules: ClassifierRules {
                status_rules,
                restricted_phrases: self.rules.restricted_phrases,
                challenge_phrases: self.rules.challenge_phrases,
                available_phrases: self.rules.available_phrases,
                error_envelope: self.rules.error_envelope.map(EnvelopeEntry::into_rules),
            },
        })
    }
}

impl StatusEntry {
    fn into_rule(self, service_id: &str) -> Result<StatusRule> {
        let action = match (self.signal, self.inspect_body) {
            (Some(signal), false) => StatusAction::Signal(signal),
            (None, true) => StatusAction::InspectBody {
                fallback: self.fallback.unwrap_or(ElementarySignal::Unknown),
            },
            _ => {
                return Err(CheckError::ConfigError {
                    message: format!(
                        "service '{}': a status rule needs exactly one of 'signal' or 'inspect_body'",
                        service_id
                    ),
                })
            }
        };
        Ok(StatusRule {
            codes: self.codes,
            action,
        })
    }
}

impl EnvelopeEntry {
    fn into_rules(self) -> EnvelopeRules {
        EnvelopeRules {
            restricted_codes: self.restricted_codes,
            restricted_keywords: self.restricted_keywords,
            available_statuses: self.available_statuses,
            available_markers: self.available_markers,
            fallback: self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[service]]
        id = "example"
        name = "Example"
        deny_list = ["CN", "RU"]

        [[service.probe]]
        label = "api"
        url = "https://api.example.com/v1/ping"
        final_on_available = true

        [[service.probe.rules.status]]
        codes = [401, 400]
        signal = "available"

        [[service.probe.rules.status]]
        codes = [403]
        inspect_body = true
        fallback = "region-restricted"

        [service.probe.rules.error_envelope]
        restricted_codes = ["unsupported_country_region_territory"]
        fallback = "access-denied"

        [[service.probe]]
        label = "web"
        url = "https://www.example.com/"
        follow_redirects = true
        timeout_secs = 5

        [[service.probe.rules.status]]
        codes = [200]
        inspect_body = true

        [service.probe.rules]
        restricted_phrases = ["not available in your country"]
        available_phrases = ["example"]
    "#;

    #[test]
    fn parses_and_converts_a_full_service() {
        let registry = ServicesFile::from_toml_str(SAMPLE)
            .unwrap()
            .into_registry()
            .unwrap();

        let service = registry.get("example").unwrap();
        assert_eq!(service.name, "Example");
        assert_eq!(service.deny_list, vec!["CN", "RU"]);
        assert_eq!(service.probes.len(), 2);

        let api = &service.probes[0];
        assert!(api.final_on_available);
        assert!(!api.follow_redirects);
        assert_eq!(api.timeout, Duration::from_secs(10));
        assert_eq!(
            api.rules.status_rules[0].action,
            StatusAction::Signal(ElementarySignal::Available)
        );
        assert_eq!(
            api.rules.status_rules[1].action,
            StatusAction::InspectBody {
                fallback: ElementarySignal::RegionRestricted
            }
        );
        let envelope = api.rules.error_envelope.as_ref().unwrap();
        assert_eq!(envelope.fallback, ElementarySignal::AccessDenied);

        let web = &service.probes[1];
        assert!(web.follow_redirects);
        assert_eq!(web.timeout, Duration::from_secs(5));
        assert_eq!(web.rules.available_phrases, vec!["example"]);
    }

    #[test]
    fn rejects_empty_file() {
        let err = ServicesFile::from_toml_str("")
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert!(matches!(err, CheckError::ConfigError { .. }));
    }

    #[test]
    fn rejects_service_without_probes() {
        let raw = r#"
            [[service]]
            id = "empty"
            name = "Empty"
        "#;
        let err = ServicesFile::from_toml_str(raw)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert!(matches!(err, CheckError::ConfigError { .. }));
    }

    #[test]
    fn rejects_invalid_probe_url() {
        let raw = r#"
            [[service]]
            id = "bad"
            name = "Bad"

            [[service.probe]]
            label = "web"
            url = "ftp://example.com/"
        "#;
        let err = ServicesFile::from_toml_str(raw)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn rejects_status_rule_with_both_actions() {
        let raw = r#"
            [[service]]
            id = "bad"
            name = "Bad"

            [[service.probe]]
            label = "web"
            url = "https://example.com/"

            [[service.probe.rules.status]]
            codes = [200]
            signal = "available"
            inspect_body = true
        "#;
        let err = ServicesFile::from_toml_str(raw)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert!(matches!(err, CheckError::ConfigError { .. }));
    }

    #[test]
    fn rejects_unknown_signal_name() {
        let raw = r#"
            [[service]]
            id = "bad"
            name = "Bad"

            [[service.probe]]
            label = "web"
            url = "https://example.com/"

            [[service.probe.rules.status]]
            codes = [200]
            signal = "definitely-fine"
        "#;
        assert!(ServicesFile::from_toml_str(raw).is_err());
    }
}
