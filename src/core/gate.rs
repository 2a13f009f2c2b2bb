use crate::domain::model::IpProfile;

/// Country-level deny-list check, evaluated before any probe is issued.
/// Vendor-documented restrictions are authoritative, so a hit here is
/// decisive; anything else is inconclusive and defers to probing. An
/// undetermined country code never matches.
pub fn region_denied(profile: &IpProfile, deny_list: &[String]) -> bool {
    if !profile.has_known_country() {
        return false;
    }
    deny_list
        .iter()
        .any(|code| code.eq_ignore_ascii_case(&profile.country_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_country(code: &str) -> IpProfile {
        IpProfile {
            country_code: code.to_string(),
            ..IpProfile::unknown()
        }
    }

    fn deny_list(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn denied_country_matches() {
        let profile = profile_with_country("CN");
        assert!(region_denied(&profile, &deny_list(&["CN", "RU"])));
    }

    #[test]
    fn match_is_case_insensitive() {
        let profile = profile_with_country("cn");
        assert!(region_denied(&profile, &deny_list(&["CN"])));
    }

    #[test]
    fn allowed_country_does_not_match() {
        let profile = profile_with_country("DE");
        assert!(!region_denied(&profile, &deny_list(&["CN", "RU"])));
    }

    #[test]
    fn unknown_country_is_inconclusive() {
        let profile = IpProfile::unknown();
        assert!(!region_denied(&profile, &deny_list(&["CN"])));

        let empty = profile_with_country("");
        assert!(!region_denied(&empty, &deny_list(&["CN"])));
    }

    #[test]
    fn empty_deny_list_never_matches() {
        let profile = profile_with_country("CN");
        assert!(!region_denied(&profile, &[]));
    }
}
