//! Builtin service table: deny-lists, probe sequences, and keyword sets.
//! Pure data; every service goes through the same gate/classifier/aggregator
//! path. Deny-lists are snapshots of vendor policy and are refreshed here
//! (or via `--services-file`) out-of-band.

use crate::domain::model::{
    ClassifierRules, ElementarySignal, EnvelopeRules, Probe, ServiceSpec, StatusAction,
    StatusRule,
};
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Restriction phrasings shared by most consumer-facing landing pages.
const RESTRICTED_PHRASES: &[&str] = &[
    "not available in your country",
    "not available in your location",
    "not available in your region",
];

/// Bot-check interstitial phrasings (Cloudflare and Google variants).
const CHALLENGE_PHRASES: &[&str] = &[
    "just a moment",
    "checking your browser",
    "attention required",
    "unusual traffic",
    "captcha",
];

/// Ordered collection of service specs. Registry order is report order.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<ServiceSpec>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceSpec>) -> Self {
        Self { services }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            netflix(),
            disney(),
            youtube_premium(),
            chatgpt(),
            claude(),
            gemini(),
            scholar(),
            tiktok(),
            imgur(),
            reddit(),
            spotify(),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }

    pub fn ids(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Applies one timeout to every probe. Used when the operator passes
    /// `--timeout` on the command line.
    pub fn override_probe_timeout(&mut self, timeout: Duration) {
        for service in &mut self.services {
            for probe in &mut service.probes {
                probe.timeout = timeout;
            }
        }
    }
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn rule(codes: &[u16], action: StatusAction) -> StatusRule {
    StatusRule {
        codes: codes.to_vec(),
        action,
    }
}

fn signal(s: ElementarySignal) -> StatusAction {
    StatusAction::Signal(s)
}

fn inspect(fallback: ElementarySignal) -> StatusAction {
    StatusAction::InspectBody { fallback }
}

fn probe(label: &str, url: &str, follow_redirects: bool, rules: ClassifierRules) -> Probe {
    Probe {
        label: label.to_string(),
        url: url.to_string(),
        follow_redirects,
        timeout: DEFAULT_PROBE_TIMEOUT,
        final_on_available: false,
        rules,
    }
}

fn final_probe(label: &str, url: &str, follow_redirects: bool, rules: ClassifierRules) -> Probe {
    Probe {
        final_on_available: true,
        ..probe(label, url, follow_redirects, rules)
    }
}

fn netflix() -> ServiceSpec {
    ServiceSpec {
        id: "netflix".to_string(),
        name: "Netflix".to_string(),
        deny_list: vec![],
        probes: vec![
            // A title page that only resolves where the catalog is served.
            final_probe(
                "title",
                "https://www.netflix.com/title/80018499",
                false,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], inspect(ElementarySignal::Available)),
                        rule(&[403], signal(ElementarySignal::AccessDenied)),
                        rule(&[451], signal(ElementarySignal::RegionRestricted)),
                    ],
                    restricted_phrases: strings(RESTRICTED_PHRASES),
                    ..ClassifierRules::default()
                },
            ),
            probe(
                "web",
                "https://www.netflix.com/",
                true,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], inspect(ElementarySignal::Unknown)),
                        rule(&[403], inspect(ElementarySignal::AccessDenied)),
                        rule(&[451], signal(ElementarySignal::RegionRestricted)),
                    ],
                    restricted_phrases: strings(RESTRICTED_PHRASES),
                    challenge_phrases: strings(CHALLENGE_PHRASES),
                    available_phrases: strings(&["netflix"]),
                    ..ClassifierRules::default()
                },
            ),
        ],
    }
}

fn disney() -> ServiceSpec {
    ServiceSpec {
        id: "disney".to_string(),
        name: "Disney+".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://www.disneyplus.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                    rule(&[451], signal(ElementarySignal::RegionRestricted)),
                ],
                restricted_phrases: {
                    let mut phrases = strings(RESTRICTED_PHRASES);
                    phrases.push("unavailable in your region".to_string());
                    phrases
                },
                challenge_phrases: strings(CHALLENGE_PHRASES),
                available_phrases: strings(&["disneyplus", "disney+"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn youtube_premium() -> ServiceSpec {
    ServiceSpec {
        id: "youtube".to_string(),
        name: "YouTube Premium".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://www.youtube.com/premium",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                ],
                restricted_phrases: {
                    let mut phrases = strings(RESTRICTED_PHRASES);
                    phrases.push("premium is not available".to_string());
                    phrases
                },
                challenge_phrases: strings(CHALLENGE_PHRASES),
                available_phrases: strings(&["premium"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn chatgpt() -> ServiceSpec {
    // https://platform.openai.com/docs/supported-countries
    ServiceSpec {
        id: "chatgpt".to_string(),
        name: "ChatGPT".to_string(),
        deny_list: strings(&["CN", "HK", "RU", "IR", "KP", "SY", "CU", "BY", "VE"]),
        probes: vec![
            // An unauthenticated 401/400 from the API proves reachability,
            // which is stronger evidence than anything the web front can add.
            final_probe(
                "api",
                "https://api.openai.com/v1/models",
                false,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[401, 400], signal(ElementarySignal::Available)),
                        rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                        rule(&[451], signal(ElementarySignal::RegionRestricted)),
                    ],
                    challenge_phrases: strings(&["cloudflare", "attention required"]),
                    error_envelope: Some(EnvelopeRules {
                        restricted_codes: strings(&["unsupported_country_region_territory"]),
                        restricted_keywords: strings(&["country", "region", "territory"]),
                        available_statuses: vec![],
                        available_markers: vec![],
                        fallback: ElementarySignal::AccessDenied,
                    }),
                    ..ClassifierRules::default()
                },
            ),
            probe(
                "web",
                "https://chatgpt.com/",
                true,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], inspect(ElementarySignal::Unknown)),
                        rule(&[403, 503], inspect(ElementarySignal::Unknown)),
                    ],
                    restricted_phrases: strings(RESTRICTED_PHRASES),
                    challenge_phrases: strings(CHALLENGE_PHRASES),
                    available_phrases: strings(&["chatgpt"]),
                    ..ClassifierRules::default()
                },
            ),
        ],
    }
}

fn claude() -> ServiceSpec {
    // https://www.anthropic.com/supported-countries
    ServiceSpec {
        id: "claude".to_string(),
        name: "Claude".to_string(),
        deny_list: strings(&["CN", "HK", "RU", "IR", "KP", "SY", "CU", "BY"]),
        probes: vec![
            final_probe(
                "api",
                "https://api.anthropic.com/v1/messages",
                false,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[401, 400], signal(ElementarySignal::Available)),
                        rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                        rule(&[451], signal(ElementarySignal::RegionRestricted)),
                    ],
                    error_envelope: Some(EnvelopeRules {
                        restricted_codes: vec![],
                        restricted_keywords: strings(&[
                            "request not allowed",
                            "country",
                            "region",
                            "territory",
                        ]),
                        available_statuses: vec![],
                        available_markers: vec![],
                        fallback: ElementarySignal::AccessDenied,
                    }),
                    ..ClassifierRules::default()
                },
            ),
            probe(
                "web",
                "https://claude.ai/",
                true,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], inspect(ElementarySignal::Unknown)),
                        rule(&[403, 503], inspect(ElementarySignal::Unknown)),
                    ],
                    restricted_phrases: {
                        let mut phrases = strings(RESTRICTED_PHRASES);
                        phrases.push("<title>claude - unavailable</title>".to_string());
                        phrases
                    },
                    challenge_phrases: strings(CHALLENGE_PHRASES),
                    ..ClassifierRules::default()
                },
            ),
        ],
    }
}

fn gemini() -> ServiceSpec {
    // https://ai.google.dev/gemini-api/docs/available-regions
    // No probe here is final: Gemini serves partial deployments, so weak
    // positives from the API, the app, a static asset, and AI Studio are
    // accumulated before declaring success.
    ServiceSpec {
        id: "gemini".to_string(),
        name: "Gemini".to_string(),
        deny_list: strings(&["CN", "HK", "MO", "CU", "IR", "KP", "RU", "BY", "SY", "VE"]),
        probes: vec![
            probe(
                "api",
                "https://generativelanguage.googleapis.com/v1beta/models",
                false,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[401, 400], signal(ElementarySignal::Available)),
                        rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                        rule(&[451], signal(ElementarySignal::RegionRestricted)),
                    ],
                    error_envelope: Some(EnvelopeRules {
                        restricted_codes: vec![],
                        restricted_keywords: strings(&[
                            "country",
                            "region",
                            "territory",
                            "not available",
                            "not supported",
                        ]),
                        available_statuses: strings(&["PERMISSION_DENIED"]),
                        available_markers: strings(&[
                            "api key",
                            "unregistered callers",
                            "established identity",
                        ]),
                        fallback: ElementarySignal::AccessDenied,
                    }),
                    ..ClassifierRules::default()
                },
            ),
            probe(
                "web",
                "https://gemini.google.com/",
                true,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], inspect(ElementarySignal::Unknown)),
                        rule(&[403], inspect(ElementarySignal::AccessDenied)),
                    ],
                    restricted_phrases: strings(&[
                        "access denied",
                        "supported in your country",
                        "not available in your country",
                    ]),
                    challenge_phrases: strings(CHALLENGE_PHRASES),
                    available_phrases: strings(&[
                        "sign in",
                        "get started",
                        "continue with google",
                        "chat with gemini",
                    ]),
                    ..ClassifierRules::default()
                },
            ),
            // Even the app's static assets are gated by region.
            probe(
                "static",
                "https://www.gstatic.com/lamda/images/gemini_sparkle_v002_d4735304ff6292a690345.svg",
                true,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200], signal(ElementarySignal::Available)),
                        rule(&[403], signal(ElementarySignal::RegionRestricted)),
                    ],
                    ..ClassifierRules::default()
                },
            ),
            probe(
                "studio",
                "https://aistudio.google.com/app/prompts/new_chat",
                false,
                ClassifierRules {
                    status_rules: vec![
                        rule(&[200, 302], signal(ElementarySignal::Available)),
                        rule(&[403], signal(ElementarySignal::RegionRestricted)),
                    ],
                    ..ClassifierRules::default()
                },
            ),
        ],
    }
}

fn scholar() -> ServiceSpec {
    ServiceSpec {
        id: "scholar".to_string(),
        name: "Google Scholar".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://scholar.google.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403], inspect(ElementarySignal::AccessDenied)),
                    rule(&[429], signal(ElementarySignal::AccessDenied)),
                ],
                restricted_phrases: strings(RESTRICTED_PHRASES),
                challenge_phrases: strings(&["unusual traffic", "captcha", "/sorry/"]),
                available_phrases: strings(&["scholar"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn tiktok() -> ServiceSpec {
    ServiceSpec {
        id: "tiktok".to_string(),
        name: "TikTok".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://www.tiktok.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403, 451], inspect(ElementarySignal::RegionRestricted)),
                ],
                restricted_phrases: {
                    let mut phrases = strings(RESTRICTED_PHRASES);
                    phrases.push("tiktok is banned".to_string());
                    phrases
                },
                challenge_phrases: strings(CHALLENGE_PHRASES),
                available_phrases: strings(&["tiktok"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn imgur() -> ServiceSpec {
    ServiceSpec {
        id: "imgur".to_string(),
        name: "Imgur".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://imgur.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403, 451], inspect(ElementarySignal::RegionRestricted)),
                    // A rate-limit answer still proves the edge serves us.
                    rule(&[429], signal(ElementarySignal::Available)),
                ],
                restricted_phrases: strings(RESTRICTED_PHRASES),
                challenge_phrases: strings(CHALLENGE_PHRASES),
                available_phrases: strings(&["imgur"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn reddit() -> ServiceSpec {
    ServiceSpec {
        id: "reddit".to_string(),
        name: "Reddit".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://www.reddit.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    // Reddit 403s datacenter ranges but lets logged-in
                    // browsers through, so this is a challenge, not a block.
                    rule(&[403, 451], signal(ElementarySignal::ChallengeDetected)),
                ],
                restricted_phrases: strings(RESTRICTED_PHRASES),
                challenge_phrases: {
                    let mut phrases = strings(CHALLENGE_PHRASES);
                    phrases.push("blocked by network security".to_string());
                    phrases
                },
                available_phrases: strings(&["reddit"]),
                ..ClassifierRules::default()
            },
        )],
    }
}

fn spotify() -> ServiceSpec {
    ServiceSpec {
        id: "spotify".to_string(),
        name: "Spotify".to_string(),
        deny_list: vec![],
        probes: vec![probe(
            "web",
            "https://open.spotify.com/",
            true,
            ClassifierRules {
                status_rules: vec![
                    rule(&[200], inspect(ElementarySignal::Unknown)),
                    rule(&[403], inspect(ElementarySignal::RegionRestricted)),
                ],
                restricted_phrases: strings(RESTRICTED_PHRASES),
                challenge_phrases: strings(CHALLENGE_PHRASES),
                available_phrases: strings(&["spotify"]),
                ..ClassifierRules::default()
            },
        )],
    }
}
