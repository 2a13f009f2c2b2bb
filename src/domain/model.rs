use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Final availability status for one service. Closed set; the formatter and
/// the exit-code policy match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Partial,
    Failed,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Partial => "partial",
            Status::Failed => "failed",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to a verdict. Rendered as-is in the report; never
/// parsed anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    NormalAccess,
    /// Reachable via the API while the web front serves a bot-check.
    NormalAccessChallenged,
    RegionRestricted,
    AccessDenied,
    /// Only a challenge page was seen; a human browser may still get through.
    ScriptBlocked,
    DetectionFailed,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NormalAccess => "Normal Access",
            Reason::NormalAccessChallenged => "Normal Access (CF Check)",
            Reason::RegionRestricted => "Region Restricted",
            Reason::AccessDenied => "Access Denied",
            Reason::ScriptBlocked => "Script Blocked (Browser OK)",
            Reason::DetectionFailed => "Detection Failed",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-facing result for one service after all its probes are folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceVerdict {
    pub service_id: String,
    pub service_name: String,
    pub status: Status,
    /// ISO-3166 alpha-2 code, "Unknown", or "N/A" for failed/error verdicts.
    pub region: String,
    pub reason: Reason,
}

/// Classification derived from a single probe's outcome, before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementarySignal {
    RegionRestricted,
    AccessDenied,
    Available,
    ChallengeDetected,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Other,
}

/// Result of executing one probe. Transport failures are captured as data;
/// nothing below the aggregator raises past this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Response {
        status_code: u16,
        body_text: String,
        final_url: String,
    },
    Failure(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpKind {
    Residential,
    Mobile,
    DatacenterHosting,
    Unknown,
}

impl IpKind {
    pub fn label(&self) -> &'static str {
        match self {
            IpKind::Residential => "Residential",
            IpKind::Mobile => "Mobile Network",
            IpKind::DatacenterHosting => "Datacenter/Hosting",
            IpKind::Unknown => "Unknown",
        }
    }
}

/// Network identity of the caller, resolved once per run and read-only
/// afterwards. Every field except `country_code` is best-effort.
#[derive(Debug, Clone)]
pub struct IpProfile {
    pub ip: String,
    /// ISO-3166 alpha-2; "Unknown" when geolocation was unavailable.
    pub country_code: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub isp: String,
    pub asn: String,
    pub ip_kind: IpKind,
    /// Country the IP block is registered in, inferred from the ASN.
    pub registration_location: Option<String>,
    /// Country the IP is actually used in.
    pub usage_location: Option<String>,
}

impl IpProfile {
    /// Degraded profile used when every geolocation source failed. The gate
    /// treats it as inconclusive and the run falls through to probe-only mode.
    pub fn unknown() -> Self {
        Self {
            ip: "N/A".to_string(),
            country_code: "Unknown".to_string(),
            country: "N/A".to_string(),
            region: "N/A".to_string(),
            city: "N/A".to_string(),
            isp: "N/A".to_string(),
            asn: "N/A".to_string(),
            ip_kind: IpKind::Unknown,
            registration_location: None,
            usage_location: None,
        }
    }

    pub fn has_known_country(&self) -> bool {
        !self.country_code.is_empty() && self.country_code != "Unknown"
    }

    pub fn country_code_or_unknown(&self) -> &str {
        if self.has_known_country() {
            &self.country_code
        } else {
            "Unknown"
        }
    }
}

impl Default for IpProfile {
    fn default() -> Self {
        Self::unknown()
    }
}

/// What to do with a response carrying a mapped status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    Signal(ElementarySignal),
    /// The status alone is ambiguous; scan the body, and classify as
    /// `fallback` when the body matches nothing either.
    InspectBody { fallback: ElementarySignal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    pub codes: Vec<u16>,
    pub action: StatusAction,
}

/// Rules for machine-readable error envelopes (`{"error": {...}}` bodies).
/// Checked before raw keyword search; a `code`/`status` field is more
/// reliable evidence than free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRules {
    /// Exact `error.code` / `error.status` values meaning a region block.
    pub restricted_codes: Vec<String>,
    /// Substrings of `error.message` meaning a region block.
    pub restricted_keywords: Vec<String>,
    /// `error.status` values that mean "reachable" when the message also
    /// contains one of `available_markers` (e.g. a missing-API-key rejection).
    pub available_statuses: Vec<String>,
    pub available_markers: Vec<String>,
    /// Signal for an envelope that parsed but matched none of the above.
    pub fallback: ElementarySignal,
}

/// Per-probe classification configuration. All phrase matching is done on
/// the lowercased body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierRules {
    pub status_rules: Vec<StatusRule>,
    pub restricted_phrases: Vec<String>,
    pub challenge_phrases: Vec<String>,
    pub available_phrases: Vec<String>,
    pub error_envelope: Option<EnvelopeRules>,
}

/// One configured network check. Probes for a service form an ordered
/// sequence; later probes disambiguate what earlier ones leave as Unknown.
#[derive(Debug, Clone)]
pub struct Probe {
    pub label: String,
    pub url: String,
    pub follow_redirects: bool,
    pub timeout: Duration,
    /// When true, an Available classification from this probe ends the
    /// sequence; when false the aggregator keeps accumulating evidence.
    pub final_on_available: bool,
    pub rules: ClassifierRules,
}

/// Declarative description of one service: deny-list plus probe sequence.
/// Data configuration, not logic; the aggregator is the only control flow.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub id: String,
    pub name: String,
    /// Country codes the vendor documents as unsupported.
    pub deny_list: Vec<String>,
    pub probes: Vec<Probe>,
}
