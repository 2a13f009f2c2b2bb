//! Geolocation collaborator: resolves the caller's IP profile through a
//! chain of public APIs, degrading stepwise down to "address only" and
//! finally to a fully unknown profile. The core never sees a failure from
//! here, only an `IpProfile` with more or fewer fields filled in.

use crate::domain::model::{IpKind, IpProfile};
use crate::domain::ports::GeoLookup;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const ASN_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Upstream URLs, injectable so tests can point them at a mock server.
#[derive(Debug, Clone)]
pub struct GeoEndpoints {
    pub primary: String,
    pub secondary: String,
    /// Also used for IP-kind enrichment (`{tertiary}{ip}?fields=...`).
    pub tertiary: String,
    pub plain_ip: String,
    pub asn: String,
}

impl Default for GeoEndpoints {
    fn default() -> Self {
        Self {
            primary: "https://ipapi.co/json/".to_string(),
            secondary: "https://ipinfo.io/json".to_string(),
            tertiary: "http://ip-api.com/json/".to_string(),
            plain_ip: "https://api.ipify.org".to_string(),
            asn: "https://api.bgpview.io/asn".to_string(),
        }
    }
}

pub struct GeoClient {
    client: Client,
    endpoints: GeoEndpoints,
}

impl GeoClient {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, GeoEndpoints::default())
    }

    pub fn with_endpoints(client: Client, endpoints: GeoEndpoints) -> Self {
        Self { client, endpoints }
    }

    async fn get_json(&self, url: &str, timeout: Duration) -> Option<Value> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(url, error = %e, "geolocation request failed"))
            .ok()?;
        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "geolocation request rejected");
            return None;
        }
        response.json().await.ok()
    }

    async fn try_primary(&self) -> Option<IpProfile> {
        let data = self.get_json(&self.endpoints.primary, LOOKUP_TIMEOUT).await?;
        let ip = text(&data, "ip")?;
        let country_code = text(&data, "country_code")?;
        Some(IpProfile {
            ip,
            country_code,
            country: text_or_na(&data, "country_name"),
            region: text_or_na(&data, "region"),
            city: text_or_na(&data, "city"),
            isp: text_or_na(&data, "org"),
            asn: text_or_na(&data, "asn"),
            ..IpProfile::unknown()
        })
    }

    async fn try_secondary(&self) -> Option<IpProfile> {
        let data = self
            .get_json(&self.endpoints.secondary, LOOKUP_TIMEOUT)
            .await?;
        let ip = text(&data, "ip")?;
        // ipinfo reports the alpha-2 code in `country`.
        let country_code = text(&data, "country")?;
        Some(IpProfile {
            ip,
            country: country_code.clone(),
            country_code,
            region: text_or_na(&data, "region"),
            city: text_or_na(&data, "city"),
            isp: text_or_na(&data, "org"),
            ..IpProfile::unknown()
        })
    }

    async fn try_tertiary(&self) -> Option<IpProfile> {
        let url = format!(
            "{}?fields=status,country,countryCode,region,city,isp,org,as,query",
            self.endpoints.tertiary
        );
        let data = self.get_json(&url, LOOKUP_TIMEOUT).await?;
        if text(&data, "status").as_deref() != Some("success") {
            return None;
        }
        Some(IpProfile {
            ip: text(&data, "query")?,
            country_code: text(&data, "countryCode")?,
            country: text_or_na(&data, "country"),
            region: text_or_na(&data, "region"),
            city: text_or_na(&data, "city"),
            isp: text_or_na(&data, "isp"),
            asn: text_or_na(&data, "as"),
            ..IpProfile::unknown()
        })
    }

    /// Last resort: the bare address, with everything else undetermined.
    async fn try_plain_ip(&self) -> Option<IpProfile> {
        let response = self
            .client
            .get(&self.endpoints.plain_ip)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "plain-IP lookup rejected");
            return None;
        }
        let ip = response.text().await.ok()?.trim().to_string();
        if ip.is_empty() {
            return None;
        }
        tracing::warn!(ip, "only the IP address could be resolved");
        Some(IpProfile {
            ip,
            ..IpProfile::unknown()
        })
    }

    /// Fills in IP kind (hosting/proxy/mobile flags), usage location, and the
    /// registration country of the IP block. Best-effort on every field.
    async fn enrich(&self, profile: &mut IpProfile) {
        let url = format!(
            "{}{}?fields=status,country,countryCode,region,regionName,city,isp,org,as,hosting,proxy,mobile",
            self.endpoints.tertiary, profile.ip
        );
        let Some(data) = self.get_json(&url, LOOKUP_TIMEOUT).await else {
            return;
        };

        let hosting = data.get("hosting").and_then(Value::as_bool).unwrap_or(false);
        let proxy = data.get("proxy").and_then(Value::as_bool).unwrap_or(false);
        let mobile = data.get("mobile").and_then(Value::as_bool).unwrap_or(false);
        profile.ip_kind = if hosting || proxy {
            IpKind::DatacenterHosting
        } else if mobile {
            IpKind::Mobile
        } else {
            IpKind::Residential
        };

        if let Some(country) = text(&data, "country") {
            profile.usage_location = Some(country);
        }
        if let Some(as_info) = text(&data, "as") {
            profile.asn = as_info;
        }

        if let Some(number) = asn_number(&profile.asn) {
            if let Some(code) = self.asn_registration_country(&number).await {
                profile.registration_location = Some(country_name(&code).to_string());
                return;
            }
        }
        let org = text(&data, "org").unwrap_or_default();
        profile.registration_location = guess_isp_country(&org).map(|c| c.to_string());
    }

    async fn asn_registration_country(&self, asn_number: &str) -> Option<String> {
        let url = format!("{}/{}", self.endpoints.asn, asn_number);
        let data = self.get_json(&url, ASN_LOOKUP_TIMEOUT).await?;
        let code = data.get("data").and_then(|d| d.get("country_code"))?;
        let code = code.as_str()?.trim();
        if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        }
    }
}

#[async_trait]
impl GeoLookup for GeoClient {
    async fn lookup(&self) -> IpProfile {
        let candidate = if let Some(profile) = self.try_primary().await {
            Some(profile)
        } else if let Some(profile) = self.try_secondary().await {
            Some(profile)
        } else if let Some(profile) = self.try_tertiary().await {
            Some(profile)
        } else {
            self.try_plain_ip().await
        };

        match candidate {
            Some(mut profile) => {
                self.enrich(&mut profile).await;
                profile
            }
            None => {
                tracing::warn!("all geolocation sources failed, region info unavailable");
                IpProfile::unknown()
            }
        }
    }
}

fn text(data: &Value, key: &str) -> Option<String> {
    let value = data.get(key)?.as_str()?.trim();
    if value.is_empty() || value == "N/A" {
        None
    } else {
        Some(value.to_string())
    }
}

fn text_or_na(data: &Value, key: &str) -> String {
    text(data, key).unwrap_or_else(|| "N/A".to_string())
}

/// Extracts the number from an AS string like "AS15169 Google LLC".
fn asn_number(as_info: &str) -> Option<String> {
    static ASN_RE: OnceLock<Regex> = OnceLock::new();
    let re = ASN_RE.get_or_init(|| Regex::new(r"AS(\d+)").expect("static pattern"));
    re.captures(as_info)
        .map(|captures| captures[1].to_string())
}

/// Registration-country fallback when the ASN registry gives no answer:
/// the operators behind most datacenter ranges are well known.
fn guess_isp_country(org: &str) -> Option<&'static str> {
    const ISP_COUNTRIES: &[(&str, &str)] = &[
        ("cloudflare", "United States"),
        ("google", "United States"),
        ("amazon", "United States"),
        ("microsoft", "United States"),
        ("digitalocean", "United States"),
        ("linode", "United States"),
        ("vultr", "United States"),
        ("alibaba", "China"),
        ("tencent", "China"),
        ("ovh", "France"),
        ("hetzner", "Germany"),
        ("hostpapa", "Canada"),
    ];
    let lower = org.to_lowercase();
    ISP_COUNTRIES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, country)| *country)
}

fn country_name(code: &str) -> &str {
    match code.to_ascii_uppercase().as_str() {
        "US" => "United States",
        "CA" => "Canada",
        "GB" => "United Kingdom",
        "DE" => "Germany",
        "FR" => "France",
        "JP" => "Japan",
        "CN" => "China",
        "HK" => "Hong Kong",
        "SG" => "Singapore",
        "AU" => "Australia",
        "NL" => "Netherlands",
        "KR" => "South Korea",
        "TW" => "Taiwan",
        "IN" => "India",
        "BR" => "Brazil",
        "RU" => "Russia",
        "ES" => "Spain",
        "IT" => "Italy",
        "SE" => "Sweden",
        "NO" => "Norway",
        "DK" => "Denmark",
        "FI" => "Finland",
        "PL" => "Poland",
        "CH" => "Switzerland",
        "AT" => "Austria",
        "BE" => "Belgium",
        "IE" => "Ireland",
        "PT" => "Portugal",
        "TR" => "Turkey",
        "MX" => "Mexico",
        _ => code,
    }
}
