//! Console rendering of a run report: aligned verdict table, IP summary,
//! status colors. Mechanical surface only; verdicts are never derived here.

use crate::core::engine::RunReport;
use crate::domain::model::{IpKind, IpProfile, ServiceVerdict, Status};

const COLUMN_WIDTH_SERVICE: usize = 16;
const COLUMN_WIDTH_DETAIL: usize = 26;
const COLUMN_WIDTH_REGION: usize = 7;
const SEPARATOR_WIDTH: usize = 58;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

pub struct ReportFormatter {
    color: bool,
}

impl ReportFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn print_header(&self) {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        println!();
        println!("{}", self.paint(CYAN, &"=".repeat(SEPARATOR_WIDTH)));
        println!("        regioncheck - service region restriction report");
        println!("                 checked at {now}");
        println!("{}", self.paint(CYAN, &"=".repeat(SEPARATOR_WIDTH)));
    }

    pub fn print_ip_profile(&self, profile: &IpProfile) {
        println!();
        println!("{}", self.paint(YELLOW, "Current IP"));
        self.print_separator();

        println!("IP Address: {}", self.paint(GREEN, &profile.ip));

        match native_ip(profile) {
            Some(true) => println!("IP Type: {}", self.paint(GREEN, "Native IP")),
            Some(false) => println!("IP Type: {}", self.paint(RED, "Broadcast IP")),
            None => println!("IP Type: {}", profile.ip_kind.label()),
        }

        if let Some(usage) = &profile.usage_location {
            println!("Usage Location: {usage}");
        } else if profile.country != "N/A" {
            let location = format!("{} {} {}", profile.country, profile.region, profile.city);
            println!("Usage Location: {}", location.trim());
        }
        if let Some(registered) = &profile.registration_location {
            println!("Registered In: {registered}");
        }
        println!("ISP: {}", profile.isp);
        if profile.asn != "N/A" {
            println!("ASN: {}", profile.asn);
        }
    }

    pub fn print_report(&self, report: &RunReport) {
        println!();
        println!("{}", self.paint(YELLOW, "Service Detection Results"));
        self.print_separator();
        let header = format!(
            "    {}: {} : {}",
            pad_to_width("Service", COLUMN_WIDTH_SERVICE),
            pad_to_width("Status", COLUMN_WIDTH_DETAIL),
            pad_to_width("Region", COLUMN_WIDTH_REGION),
        );
        println!("{header}");
        self.print_separator();

        for verdict in &report.verdicts {
            self.print_verdict(verdict);
        }

        let success_count = report
            .verdicts
            .iter()
            .filter(|v| v.status == Status::Success)
            .count();
        println!();
        self.print_separator();
        println!(
            "Detection complete: {} services available",
            self.paint(GREEN, &format!("{}/{}", success_count, report.verdicts.len()))
        );
    }

    fn print_verdict(&self, verdict: &ServiceVerdict) {
        let (icon, color) = match verdict.status {
            Status::Success => ("[+]", GREEN),
            Status::Failed => ("[x]", RED),
            Status::Partial => ("[~]", YELLOW),
            Status::Error => ("[?]", MAGENTA),
        };

        let service = pad_to_width(&verdict.service_name, COLUMN_WIDTH_SERVICE);
        let detail = self.paint(color, &pad_to_width(verdict.reason.as_str(), COLUMN_WIDTH_DETAIL));

        // Failed/error rows keep an empty region cell so columns stay aligned.
        let region = if verdict.region != "N/A" && verdict.region != "Unknown" {
            self.paint(CYAN, &pad_to_width(&verdict.region, COLUMN_WIDTH_REGION))
        } else {
            pad_to_width("", COLUMN_WIDTH_REGION)
        };

        println!("{} {}: {} : {}", self.paint(color, icon), service, detail, region);
    }

    fn print_separator(&self) {
        println!("{}", self.paint(CYAN, &"-".repeat(SEPARATOR_WIDTH)));
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Residential and mobile addresses are native by definition; a datacenter
/// address counts as native only when the block's registration country
/// matches where it is being used.
fn native_ip(profile: &IpProfile) -> Option<bool> {
    match profile.ip_kind {
        IpKind::Residential | IpKind::Mobile => Some(true),
        IpKind::DatacenterHosting => {
            match (&profile.registration_location, &profile.usage_location) {
                (Some(reg), Some(usage)) => Some(reg == usage),
                _ => Some(false),
            }
        }
        IpKind::Unknown => None,
    }
}

/// Display width with wide (CJK) characters counted as two columns.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if (c as u32) > 127 { 2 } else { 1 })
        .sum()
}

fn pad_to_width(text: &str, target_width: usize) -> String {
    let width = display_width(text);
    if width < target_width {
        format!("{}{}", text, " ".repeat(target_width - width))
    } else {
        text.to_string()
    }
}
