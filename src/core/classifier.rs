use crate::domain::model::{
    ClassifierRules, ElementarySignal, EnvelopeRules, ProbeOutcome, StatusAction,
};

/// Maps a single probe outcome to an elementary signal. Pure; all context
/// comes in through `rules`.
///
/// Policy, in order:
/// - transport failures are never evidence of a region block: `Unknown`;
/// - an explicit status-code mapping wins over everything else;
/// - body inspection tries the structured error envelope before raw keyword
///   search, and restriction phrases beat challenge phrases beat
///   availability phrases;
/// - a 2xx whose body matches nothing is `Unknown`, not `Available` (a
///   redirect to an unrelated landing page proves nothing);
/// - an unmapped non-2xx status is `Unknown`.
pub fn classify(outcome: &ProbeOutcome, rules: &ClassifierRules) -> ElementarySignal {
    match outcome {
        ProbeOutcome::Failure(kind) => {
            tracing::debug!(?kind, "transport failure, classifying as inconclusive");
            ElementarySignal::Unknown
        }
        ProbeOutcome::Response {
            status_code,
            body_text,
            ..
        } => {
            for rule in &rules.status_rules {
                if rule.codes.contains(status_code) {
                    return match &rule.action {
                        StatusAction::Signal(signal) => *signal,
                        StatusAction::InspectBody { fallback } => {
                            inspect_body(body_text, rules).unwrap_or(*fallback)
                        }
                    };
                }
            }
            if (200..300).contains(status_code) {
                inspect_body(body_text, rules).unwrap_or(ElementarySignal::Unknown)
            } else {
                ElementarySignal::Unknown
            }
        }
    }
}

fn inspect_body(body: &str, rules: &ClassifierRules) -> Option<ElementarySignal> {
    if let Some(envelope) = &rules.error_envelope {
        if let Some(signal) = envelope_signal(body, envelope) {
            return Some(signal);
        }
    }

    let lower = body.to_lowercase();
    if matches_any(&lower, &rules.restricted_phrases) {
        return Some(ElementarySignal::RegionRestricted);
    }
    if matches_any(&lower, &rules.challenge_phrases) {
        return Some(ElementarySignal::ChallengeDetected);
    }
    if matches_any(&lower, &rules.available_phrases) {
        return Some(ElementarySignal::Available);
    }
    None
}

fn matches_any(lower_body: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|phrase| lower_body.contains(&phrase.to_lowercase()))
}

/// Classifies a machine-readable error envelope (`{"error": {...}}`). A
/// non-JSON body or one without an `error` member yields `None` and the
/// caller falls back to raw keyword search.
fn envelope_signal(body: &str, rules: &EnvelopeRules) -> Option<ElementarySignal> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;

    let code = field_as_string(error, "code");
    let status = field_as_string(error, "status");
    let message = error
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_lowercase();

    if rules
        .restricted_codes
        .iter()
        .any(|c| c == &code || c == &status)
    {
        return Some(ElementarySignal::RegionRestricted);
    }

    // An unauthenticated-caller rejection means the service is reachable
    // from here; the request failed for lack of credentials, not location.
    if rules
        .available_statuses
        .iter()
        .any(|s| s == &status || s == &code)
        && rules
            .available_markers
            .iter()
            .any(|marker| message.contains(&marker.to_lowercase()))
    {
        return Some(ElementarySignal::Available);
    }

    if rules
        .restricted_keywords
        .iter()
        .any(|keyword| message.contains(&keyword.to_lowercase()))
    {
        return Some(ElementarySignal::RegionRestricted);
    }

    Some(rules.fallback)
}

fn field_as_string(error: &serde_json::Value, field: &str) -> String {
    match error.get(field) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FailureKind, StatusRule};

    fn response(status_code: u16, body: &str) -> ProbeOutcome {
        ProbeOutcome::Response {
            status_code,
            body_text: body.to_string(),
            final_url: "https://example.com/".to_string(),
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn web_rules() -> ClassifierRules {
        ClassifierRules {
            status_rules: vec![
                StatusRule {
                    codes: vec![451],
                    action: StatusAction::Signal(ElementarySignal::RegionRestricted),
                },
                StatusRule {
                    codes: vec![403],
                    action: StatusAction::InspectBody {
                        fallback: ElementarySignal::AccessDenied,
                    },
                },
            ],
            restricted_phrases: strings(&["not available in your country"]),
            challenge_phrases: strings(&["just a moment", "checking your browser"]),
            available_phrases: strings(&["sign in"]),
            error_envelope: None,
        }
    }

    #[test]
    fn transport_failures_are_inconclusive() {
        let rules = web_rules();
        for kind in [FailureKind::Timeout, FailureKind::Connection, FailureKind::Other] {
            assert_eq!(
                classify(&ProbeOutcome::Failure(kind), &rules),
                ElementarySignal::Unknown
            );
        }
    }

    #[test]
    fn explicit_status_mapping_wins() {
        let rules = web_rules();
        // 451 maps directly even though the body would say "sign in".
        assert_eq!(
            classify(&response(451, "please sign in"), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    #[test]
    fn mapped_status_inspects_body() {
        let rules = web_rules();
        assert_eq!(
            classify(&response(403, "service not available in your country"), &rules),
            ElementarySignal::RegionRestricted
        );
        assert_eq!(
            classify(&response(403, "just a moment..."), &rules),
            ElementarySignal::ChallengeDetected
        );
        // No match: the per-rule fallback applies.
        assert_eq!(
            classify(&response(403, "forbidden"), &rules),
            ElementarySignal::AccessDenied
        );
    }

    #[test]
    fn restricted_beats_available_when_both_match() {
        let rules = web_rules();
        let body = "sign in -- this service is not available in your country";
        assert_eq!(
            classify(&response(200, body), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    #[test]
    fn restricted_beats_challenge_when_both_match() {
        let rules = web_rules();
        let body = "just a moment... not available in your country";
        assert_eq!(
            classify(&response(200, body), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    #[test]
    fn success_without_any_match_is_unknown() {
        let rules = web_rules();
        assert_eq!(
            classify(&response(200, "<html>some unrelated page</html>"), &rules),
            ElementarySignal::Unknown
        );
    }

    #[test]
    fn unmapped_non_success_status_is_unknown() {
        let rules = web_rules();
        assert_eq!(
            classify(&response(502, "bad gateway"), &rules),
            ElementarySignal::Unknown
        );
    }

    #[test]
    fn phrase_matching_ignores_case() {
        let rules = web_rules();
        assert_eq!(
            classify(&response(200, "NOT AVAILABLE IN YOUR COUNTRY"), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    fn api_rules() -> ClassifierRules {
        ClassifierRules {
            status_rules: vec![
                StatusRule {
                    codes: vec![401, 400],
                    action: StatusAction::Signal(ElementarySignal::Available),
                },
                StatusRule {
                    codes: vec![403],
                    action: StatusAction::InspectBody {
                        fallback: ElementarySignal::RegionRestricted,
                    },
                },
            ],
            restricted_phrases: vec![],
            challenge_phrases: strings(&["attention required", "cloudflare"]),
            available_phrases: vec![],
            error_envelope: Some(EnvelopeRules {
                restricted_codes: strings(&["unsupported_country_region_territory"]),
                restricted_keywords: strings(&["country", "region", "territory"]),
                available_statuses: strings(&["PERMISSION_DENIED"]),
                available_markers: strings(&["api key", "unregistered callers"]),
                fallback: ElementarySignal::AccessDenied,
            }),
        }
    }

    #[test]
    fn unauthenticated_status_means_reachable() {
        let rules = api_rules();
        assert_eq!(
            classify(&response(401, r#"{"error":{"message":"no api key"}}"#), &rules),
            ElementarySignal::Available
        );
    }

    #[test]
    fn envelope_restricted_code_wins() {
        let rules = api_rules();
        let body = r#"{"error":{"code":"unsupported_country_region_territory","message":"unsupported"}}"#;
        assert_eq!(
            classify(&response(403, body), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    #[test]
    fn envelope_message_keyword_means_restricted() {
        let rules = api_rules();
        let body = r#"{"error":{"code":"forbidden","message":"Country, region, or territory not supported"}}"#;
        assert_eq!(
            classify(&response(403, body), &rules),
            ElementarySignal::RegionRestricted
        );
    }

    #[test]
    fn envelope_permission_denied_with_key_marker_is_available() {
        let rules = api_rules();
        let body = r#"{"error":{"code":403,"status":"PERMISSION_DENIED","message":"API key not valid. Please pass a valid API key."}}"#;
        assert_eq!(
            classify(&response(403, body), &rules),
            ElementarySignal::Available
        );
    }

    #[test]
    fn envelope_without_match_uses_envelope_fallback() {
        let rules = api_rules();
        let body = r#"{"error":{"code":"blocked","message":"your account is suspended"}}"#;
        assert_eq!(
            classify(&response(403, body), &rules),
            ElementarySignal::AccessDenied
        );
    }

    #[test]
    fn malformed_envelope_falls_back_to_keyword_scan() {
        let rules = api_rules();
        // Not JSON: the challenge phrases still apply.
        assert_eq!(
            classify(&response(403, "<html>Attention Required! | Cloudflare</html>"), &rules),
            ElementarySignal::ChallengeDetected
        );
        // Not JSON, no phrase match: the status-rule fallback applies.
        assert_eq!(
            classify(&response(403, "<html>blocked</html>"), &rules),
            ElementarySignal::RegionRestricted
        );
    }
}
