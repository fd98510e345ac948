//! Reading nmap XML reports (`nmap -oX -`).
//!
//! Only the first host and its first port matter: the prober always scans a
//! single `host:port`.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{HostPerformance, PortState};
use crate::error::ProbeError;

// `<host>` but not `<hosts>`, `<hostnames>` or `<hosthint>`
static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<host[\s>].*?</host>").expect("valid host pattern"));
static PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<port\s[^>]*>(.*?)</port>").expect("valid port pattern"));
static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<state\s[^>]*?\bstate="([^"]*)""#).expect("valid state pattern"));
static SRTT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<times\s[^>]*?\bsrtt="([^"]*)""#).expect("valid times pattern"));

/// Extract port state and smoothed RTT from an nmap XML report.
///
/// Returns `Ok(None)` when nmap saw no host or no port. A host without a
/// `<times>` element reports zero latency.
pub fn parse_report(xml: &str) -> Result<Option<HostPerformance>, ProbeError> {
    if !xml.contains("<nmaprun") {
        return Err(ProbeError::Parse("missing <nmaprun> element".into()));
    }

    let Some(host) = HOST_RE.find(xml) else {
        return Ok(None);
    };
    let host = host.as_str();

    let Some(port) = PORT_RE.captures(host) else {
        return Ok(None);
    };

    let state = STATE_RE
        .captures(&port[1])
        .map(|caps| PortState::from_nmap(&caps[1]))
        .ok_or_else(|| ProbeError::Parse("<port> without <state>".into()))?;

    let latency_micros = match SRTT_RE.captures(host) {
        Some(caps) => caps[1]
            .parse::<u64>()
            .map_err(|e| ProbeError::Parse(format!("srtt {:?}: {}", &caps[1], e)))?,
        None => 0,
    };

    Ok(Some(HostPerformance::new(latency_micros, state)))
}
