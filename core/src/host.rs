use serde::Serialize;
use serde_json::Value;
use time::macros::format_description;
use time::PrimitiveDateTime;

pub const UNKNOWN_HOSTNAME: &str = "Unknown hostname";
pub const UNKNOWN_IP: &str = "Unknown IP address";
pub const UNKNOWN_VENDOR: &str = "Unknown vendor";
pub const NOT_RECORDED: &str = "Not recorded";
pub const NO_PROTOCOLS: &str = "No protocols observed";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HostRecord {
    pub ordinal: usize,
    pub mac: String,
    pub vendor: Option<String>,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    #[serde(serialize_with = "serialize_seen")]
    pub first_seen: Option<PrimitiveDateTime>,
    #[serde(serialize_with = "serialize_seen")]
    pub last_seen: Option<PrimitiveDateTime>,
    pub protocols: Vec<ProtocolEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProtocolEntry {
    pub name: String,
    pub observation: ProtocolObservation,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum ProtocolObservation {
    Single(AttributeMap),
    Many(Vec<AttributeMap>),
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AttributeMap {
    pub entries: Vec<(String, String)>,
}

impl HostRecord {
    pub fn new(ordinal: usize, mac: impl Into<String>) -> Self {
        Self {
            ordinal,
            mac: mac.into(),
            vendor: None,
            ip: None,
            hostname: None,
            first_seen: None,
            last_seen: None,
            protocols: Vec::new(),
        }
    }

    pub fn hostname_or_default(&self) -> &str {
        self.hostname.as_deref().unwrap_or(UNKNOWN_HOSTNAME)
    }

    pub fn ip_or_default(&self) -> &str {
        self.ip.as_deref().unwrap_or(UNKNOWN_IP)
    }

    pub fn vendor_or_default(&self) -> &str {
        self.vendor.as_deref().unwrap_or(UNKNOWN_VENDOR)
    }

    pub fn first_seen_display(&self) -> String {
        display_seen(self.first_seen)
    }

    pub fn last_seen_display(&self) -> String {
        display_seen(self.last_seen)
    }

    pub fn title(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.mac)
    }

    pub fn index_label(&self) -> String {
        format!(
            "{} - {} - {}",
            self.mac,
            self.ip_or_default(),
            self.hostname_or_default()
        )
    }
}

impl ProtocolObservation {
    pub fn observations(&self) -> &[AttributeMap] {
        match self {
            ProtocolObservation::Single(map) => std::slice::from_ref(map),
            ProtocolObservation::Many(maps) => maps,
        }
    }
}

impl AttributeMap {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Splits the producer's MAC field into the address proper and an optional
/// vendor suffix (`"AA:BB:CC:DD:EE:FF Apple, Inc."`).
pub fn split_mac_field(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((mac, vendor)) => {
            let vendor = vendor.trim();
            let vendor = (!vendor.is_empty()).then(|| vendor.to_string());
            (mac.to_string(), vendor)
        }
        None => (trimmed.to_string(), None),
    }
}

pub fn parse_seen(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        raw.trim(),
        format_description!("[day]-[month]-[year] [hour]:[minute]:[second]"),
    )
}

pub fn format_seen(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!(
            "[day]-[month]-[year] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| NOT_RECORDED.to_string())
}

fn display_seen(value: Option<PrimitiveDateTime>) -> String {
    value
        .map(format_seen)
        .unwrap_or_else(|| NOT_RECORDED.to_string())
}

fn serialize_seen<S>(value: &Option<PrimitiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(dt) => serializer.serialize_some(&format_seen(*dt)),
        None => serializer.serialize_none(),
    }
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
