//! HTTP/2 fingerprint parameters (SETTINGS, WINDOW_UPDATE, PRIORITY,
//! pseudo-header order).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// HTTP/2 SETTINGS identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SettingId {
    HeaderTableSize = 0x1,
    EnablePush = 0x2,
    MaxConcurrentStreams = 0x3,
    InitialWindowSize = 0x4,
    MaxFrameSize = 0x5,
    MaxHeaderListSize = 0x6,
    EnableConnectProtocol = 0x8,
    NoRfc7540Priorities = 0x9,
}

impl SettingId {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Configuration name, e.g. `HEADER_TABLE_SIZE`.
    pub fn name(self) -> &'static str {
        match self {
            Self::HeaderTableSize => "HEADER_TABLE_SIZE",
            Self::EnablePush => "ENABLE_PUSH",
            Self::MaxConcurrentStreams => "MAX_CONCURRENT_STREAMS",
            Self::InitialWindowSize => "INITIAL_WINDOW_SIZE",
            Self::MaxFrameSize => "MAX_FRAME_SIZE",
            Self::MaxHeaderListSize => "MAX_HEADER_LIST_SIZE",
            Self::EnableConnectProtocol => "ENABLE_CONNECT_PROTOCOL",
            Self::NoRfc7540Priorities => "NO_RFC7540_PRIORITIES",
        }
    }
}

impl FromStr for SettingId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HEADER_TABLE_SIZE" => Ok(Self::HeaderTableSize),
            "ENABLE_PUSH" => Ok(Self::EnablePush),
            "MAX_CONCURRENT_STREAMS" => Ok(Self::MaxConcurrentStreams),
            "INITIAL_WINDOW_SIZE" => Ok(Self::InitialWindowSize),
            "MAX_FRAME_SIZE" => Ok(Self::MaxFrameSize),
            "MAX_HEADER_LIST_SIZE" => Ok(Self::MaxHeaderListSize),
            "ENABLE_CONNECT_PROTOCOL" => Ok(Self::EnableConnectProtocol),
            "NO_RFC7540_PRIORITIES" => Ok(Self::NoRfc7540Priorities),
            other => Err(Error::http2_settings(format!("unknown setting {:?}", other))),
        }
    }
}

/// HTTP/2 pseudo-header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoHeader {
    Method,
    Authority,
    Scheme,
    Path,
}

impl PseudoHeader {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method => ":method",
            Self::Authority => ":authority",
            Self::Scheme => ":scheme",
            Self::Path => ":path",
        }
    }

    /// Single-letter code used in Akamai fingerprints.
    pub fn letter(self) -> char {
        match self {
            Self::Method => 'm',
            Self::Authority => 'a',
            Self::Scheme => 's',
            Self::Path => 'p',
        }
    }
}

impl FromStr for PseudoHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ":method" => Ok(Self::Method),
            ":authority" => Ok(Self::Authority),
            ":scheme" => Ok(Self::Scheme),
            ":path" => Ok(Self::Path),
            other => Err(Error::http2_settings(format!("unknown pseudo header {:?}", other))),
        }
    }
}

impl fmt::Display for PseudoHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chrome, Edge and Opera order.
pub const CHROME_PSEUDO_HEADER_ORDER: [PseudoHeader; 4] = [
    PseudoHeader::Method,
    PseudoHeader::Authority,
    PseudoHeader::Scheme,
    PseudoHeader::Path,
];

/// Firefox order.
pub const FIREFOX_PSEUDO_HEADER_ORDER: [PseudoHeader; 4] = [
    PseudoHeader::Method,
    PseudoHeader::Path,
    PseudoHeader::Authority,
    PseudoHeader::Scheme,
];

/// Safari and CFNetwork order.
pub const SAFARI_PSEUDO_HEADER_ORDER: [PseudoHeader; 4] = [
    PseudoHeader::Method,
    PseudoHeader::Scheme,
    PseudoHeader::Path,
    PseudoHeader::Authority,
];

/// Stream dependency and weight. `weight` is the wire byte (actual weight - 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityParam {
    pub stream_dep: u32,
    pub exclusive: bool,
    pub weight: u8,
}

impl PriorityParam {
    pub const fn new(stream_dep: u32, exclusive: bool, weight: u8) -> Self {
        Self {
            stream_dep,
            exclusive,
            weight,
        }
    }
}

/// A PRIORITY frame sent right after the connection preface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    pub stream_id: u32,
    pub priority_param: PriorityParam,
}

impl Priority {
    pub const fn new(stream_id: u32, stream_dep: u32, exclusive: bool, weight: u8) -> Self {
        Self {
            stream_id,
            priority_param: PriorityParam::new(stream_dep, exclusive, weight),
        }
    }
}

/// HTTP/2 connection parameters of one browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http2Fingerprint {
    pub settings: HashMap<SettingId, u32>,
    /// Order in which settings are written into the SETTINGS frame.
    pub settings_order: Vec<SettingId>,
    pub pseudo_header_order: Vec<PseudoHeader>,
    /// Connection-level WINDOW_UPDATE increment sent after SETTINGS.
    pub connection_flow: u32,
    /// PRIORITY frames sent before the first request.
    pub priorities: Vec<Priority>,
    /// Priority carried on the HEADERS frame of each request.
    pub header_priority: Option<PriorityParam>,
}

impl Http2Fingerprint {
    /// Build from settings given in the order they are sent.
    pub fn new(
        settings: &[(SettingId, u32)],
        pseudo_header_order: &[PseudoHeader],
        connection_flow: u32,
    ) -> Self {
        Self {
            settings: settings.iter().copied().collect(),
            settings_order: settings.iter().map(|(id, _)| *id).collect(),
            pseudo_header_order: pseudo_header_order.to_vec(),
            connection_flow,
            priorities: Vec::new(),
            header_priority: None,
        }
    }

    pub fn with_priorities(mut self, priorities: &[Priority]) -> Self {
        self.priorities = priorities.to_vec();
        self
    }

    pub fn with_header_priority(mut self, priority: PriorityParam) -> Self {
        self.header_priority = Some(priority);
        self
    }

    /// Settings as (id, value) pairs in send order.
    ///
    /// Ids in the order without a value are skipped; [`validate`](Self::validate)
    /// rejects such sets up front.
    pub fn ordered_settings(&self) -> Vec<(SettingId, u32)> {
        self.settings_order
            .iter()
            .filter_map(|id| self.settings.get(id).map(|v| (*id, *v)))
            .collect()
    }

    /// SETTINGS frame payload: 2-byte id + 4-byte value per entry, in order.
    pub fn settings_payload(&self) -> BytesMut {
        let ordered = self.ordered_settings();
        let mut buf = BytesMut::with_capacity(ordered.len() * 6);
        for (id, value) in ordered {
            buf.put_u16(id.code());
            buf.put_u32(value);
        }
        buf
    }

    /// Check that the settings order names every configured setting exactly once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for id in &self.settings_order {
            if !seen.insert(*id) {
                return Err(Error::http2_settings(format!(
                    "{} listed twice in settings order",
                    id.name()
                )));
            }
            if !self.settings.contains_key(id) {
                return Err(Error::http2_settings(format!(
                    "{} is ordered but has no value",
                    id.name()
                )));
            }
        }
        if let Some(missing) = self.settings.keys().find(|id| !seen.contains(*id)) {
            return Err(Error::http2_settings(format!(
                "{} has a value but is missing from settings order",
                missing.name()
            )));
        }
        Ok(())
    }

    /// Akamai HTTP/2 fingerprint text:
    /// `SETTINGS|WINDOW_UPDATE|PRIORITY|PSEUDO_HEADER_ORDER`.
    pub fn akamai_fingerprint(&self) -> String {
        let settings = self
            .ordered_settings()
            .iter()
            .map(|(id, value)| format!("{}:{}", id.code(), value))
            .collect::<Vec<_>>()
            .join(";");

        let priorities = if self.priorities.is_empty() {
            "0".to_string()
        } else {
            self.priorities
                .iter()
                .map(|p| {
                    format!(
                        "{}:{}:{}:{}",
                        p.stream_id,
                        u8::from(p.priority_param.exclusive),
                        p.priority_param.stream_dep,
                        u16::from(p.priority_param.weight) + 1
                    )
                })
                .collect::<Vec<_>>()
                .join(",")
        };

        let pseudo = self
            .pseudo_header_order
            .iter()
            .map(|h| h.letter().to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!("{}|{}|{}|{}", settings, self.connection_flow, priorities, pseudo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> Http2Fingerprint {
        Http2Fingerprint::new(
            &[
                (SettingId::HeaderTableSize, 65536),
                (SettingId::EnablePush, 0),
                (SettingId::InitialWindowSize, 6291456),
                (SettingId::MaxHeaderListSize, 262144),
            ],
            &CHROME_PSEUDO_HEADER_ORDER,
            15663105,
        )
    }

    #[test]
    fn test_akamai_chrome() {
        assert_eq!(
            chrome().akamai_fingerprint(),
            "1:65536;2:0;4:6291456;6:262144|15663105|0|m,a,s,p"
        );
    }

    #[test]
    fn test_akamai_priorities_show_actual_weight() {
        let fp = chrome().with_priorities(&[Priority::new(3, 0, false, 200), Priority::new(9, 7, true, 0)]);
        assert!(fp.akamai_fingerprint().contains("|3:0:0:201,9:1:7:1|"));
    }

    #[test]
    fn test_settings_payload_follows_order() {
        let payload = chrome().settings_payload();
        assert_eq!(payload.len(), 24);
        assert_eq!(&payload[..6], &[0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(&payload[6..8], &[0x00, 0x02]);
        assert_eq!(&payload[12..14], &[0x00, 0x04]);
    }

    #[test]
    fn test_validate() {
        assert!(chrome().validate().is_ok());

        let mut missing_value = chrome();
        missing_value.settings_order.push(SettingId::MaxFrameSize);
        assert!(missing_value.validate().is_err());

        let mut unordered = chrome();
        unordered.settings.insert(SettingId::MaxFrameSize, 16384);
        assert!(unordered.validate().is_err());

        let mut duplicate = chrome();
        duplicate.settings_order.push(SettingId::EnablePush);
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_names_parse() {
        assert_eq!("INITIAL_WINDOW_SIZE".parse::<SettingId>().unwrap(), SettingId::InitialWindowSize);
        assert!("WINDOW".parse::<SettingId>().is_err());
        assert_eq!(":authority".parse::<PseudoHeader>().unwrap(), PseudoHeader::Authority);
        assert!("method".parse::<PseudoHeader>().is_err());
    }
}
