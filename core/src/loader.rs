use crate::diagnostics::Diagnostic;
use crate::error::ReportError;
use crate::host::{
    parse_seen, split_mac_field, value_to_string, AttributeMap, HostRecord, ProtocolEntry,
    ProtocolObservation,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;
use tracing::{debug, warn};

const FIELD_MAC: &str = "MAC";
const FIELD_IP: &str = "IP";
const FIELD_HOSTNAME: &str = "HOSTNAME";
const FIELD_FIRST_SEEN: &str = "FIRST SEEN";
const FIELD_LAST_SEEN: &str = "LAST SEEN";
const FIELD_PROTOCOLS: &str = "PROTOCOLS";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub source: PathBuf,
    pub hosts: Vec<HostRecord>,
    pub rejected: Vec<RejectedEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RejectedEntry {
    pub ordinal: usize,
    pub label: String,
    pub reason: String,
}

pub fn load(source: &Path) -> Result<Snapshot, ReportError> {
    let bytes = fs::read(source).map_err(|err| ReportError::SourceNotFound {
        path: source.to_path_buf(),
        source: err,
    })?;
    parse(&bytes, source)
}

pub fn parse(bytes: &[u8], source: &Path) -> Result<Snapshot, ReportError> {
    let malformed = |reason: String| ReportError::MalformedSnapshot {
        path: source.to_path_buf(),
        reason,
    };

    let document: Value =
        serde_json::from_slice(bytes).map_err(|err| malformed(format!("invalid JSON: {err}")))?;
    let entries = match document {
        Value::Array(entries) => entries,
        other => {
            return Err(malformed(format!(
                "expected an array of host records, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut snapshot = Snapshot {
        source: source.to_path_buf(),
        ..Snapshot::default()
    };

    for (ordinal, entry) in entries.into_iter().enumerate() {
        let object = match entry {
            Value::Object(object) => object,
            other => {
                return Err(malformed(format!(
                    "entry {ordinal} is {}, expected an object",
                    json_kind(&other)
                )))
            }
        };

        match host_from_object(ordinal, &object, &mut snapshot.diagnostics) {
            Ok(host) => snapshot.hosts.push(host),
            Err(reason) => {
                let label = object
                    .get(FIELD_MAC)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("entry {ordinal}"));
                warn!(ordinal, %label, %reason, "rejecting snapshot entry");
                snapshot.rejected.push(RejectedEntry {
                    ordinal,
                    label,
                    reason,
                });
            }
        }
    }

    debug!(
        hosts = snapshot.hosts.len(),
        rejected = snapshot.rejected.len(),
        warnings = snapshot.diagnostics.len(),
        "snapshot parsed"
    );
    Ok(snapshot)
}

fn host_from_object(
    ordinal: usize,
    object: &Map<String, Value>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<HostRecord, String> {
    let raw_mac = match object.get(FIELD_MAC) {
        Some(Value::String(mac)) if !mac.trim().is_empty() => mac,
        Some(Value::String(_)) => return Err("MAC is empty".to_string()),
        Some(other) => return Err(format!("MAC is {}, expected a string", json_kind(other))),
        None => return Err("MAC is missing".to_string()),
    };
    let (mac, vendor) = split_mac_field(raw_mac);

    let mut host = HostRecord::new(ordinal, mac);
    host.vendor = vendor;
    host.ip = optional_text(ordinal, object, FIELD_IP, diagnostics);
    host.hostname = optional_text(ordinal, object, FIELD_HOSTNAME, diagnostics);
    host.first_seen = optional_seen(ordinal, object, FIELD_FIRST_SEEN, diagnostics);
    host.last_seen = optional_seen(ordinal, object, FIELD_LAST_SEEN, diagnostics);

    match object.get(FIELD_PROTOCOLS) {
        None | Some(Value::Null) => {}
        // producers dump an empty container as `[]` as often as `{}`
        Some(Value::Array(items)) if items.is_empty() => {}
        Some(Value::Object(protocols)) => {
            for (name, data) in protocols {
                let observation = observation_from_value(data).ok_or_else(|| {
                    format!(
                        "protocol '{name}' is {}, expected a mapping or a list of mappings",
                        json_kind(data)
                    )
                })?;
                host.protocols.push(ProtocolEntry {
                    name: name.clone(),
                    observation,
                });
            }
        }
        Some(other) => {
            return Err(format!(
                "PROTOCOLS is {}, expected a mapping",
                json_kind(other)
            ))
        }
    }

    Ok(host)
}

fn observation_from_value(value: &Value) -> Option<ProtocolObservation> {
    match value {
        Value::Object(map) => Some(ProtocolObservation::Single(attributes(map))),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().map(attributes))
            .collect::<Option<Vec<_>>>()
            .map(ProtocolObservation::Many),
        _ => None,
    }
}

fn attributes(map: &Map<String, Value>) -> AttributeMap {
    let mut attributes = AttributeMap::default();
    for (name, value) in map {
        attributes.push(name.clone(), value_to_string(value));
    }
    attributes
}

fn optional_text(
    ordinal: usize,
    object: &Map<String, Value>,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    match object.get(field)? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Null => None,
        other => {
            diagnostics.push(Diagnostic::field_parse(
                ordinal,
                field,
                format!("expected a string, found {}", json_kind(other)),
            ));
            None
        }
    }
}

fn optional_seen(
    ordinal: usize,
    object: &Map<String, Value>,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<PrimitiveDateTime> {
    let raw = match object.get(field)? {
        Value::String(raw) => raw,
        Value::Null => return None,
        other => {
            diagnostics.push(Diagnostic::field_parse(
                ordinal,
                field,
                format!("expected a timestamp string, found {}", json_kind(other)),
            ));
            return None;
        }
    };
    match parse_seen(raw) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            diagnostics.push(Diagnostic::field_parse(
                ordinal,
                field,
                format!("unparsable timestamp '{raw}': {err}"),
            ));
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn parse_str(source: &str) -> Result<Snapshot, ReportError> {
        parse(source.as_bytes(), Path::new("hosts.json"))
    }

    #[test]
    fn loads_full_record() {
        let snapshot = parse_str(
            r#"[{
                "MAC": "AA:BB:CC:DD:EE:FF Acme Corp",
                "IP": "10.0.0.5",
                "HOSTNAME": "printer",
                "FIRST SEEN": "01-01-2024 10:00:00",
                "LAST SEEN": "02-01-2024 11:30:15",
                "PROTOCOLS": {
                    "DNS": {"query": "example.com", "ttl": 300},
                    "ARP": [{"op": "request"}, {"op": "reply"}]
                }
            }]"#,
        )
        .expect("snapshot parses");

        assert_eq!(snapshot.hosts.len(), 1);
        assert!(snapshot.diagnostics.is_empty());
        let host = &snapshot.hosts[0];
        assert_eq!(host.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(host.vendor.as_deref(), Some("Acme Corp"));
        assert_eq!(host.ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(host.first_seen, Some(datetime!(2024-01-01 10:00:00)));
        assert_eq!(host.last_seen, Some(datetime!(2024-01-02 11:30:15)));

        let names: Vec<_> = host.protocols.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["DNS", "ARP"]);
        match &host.protocols[0].observation {
            ProtocolObservation::Single(map) => {
                let pairs: Vec<_> = map.iter().collect();
                assert_eq!(pairs, [("query", "example.com"), ("ttl", "300")]);
            }
            other => panic!("expected a single observation, got {other:?}"),
        }
        match &host.protocols[1].observation {
            ProtocolObservation::Many(maps) => assert_eq!(maps.len(), 2),
            other => panic!("expected many observations, got {other:?}"),
        }
    }

    #[test]
    fn missing_optional_fields_are_defaulted() {
        let snapshot = parse_str(r#"[{"MAC": "11:22:33:44:55:66"}]"#).expect("parses");
        let host = &snapshot.hosts[0];
        assert_eq!(host.hostname, None);
        assert_eq!(host.ip, None);
        assert_eq!(host.first_seen, None);
        assert!(host.protocols.is_empty());
        assert!(snapshot.diagnostics.is_empty());
    }

    #[test]
    fn unparsable_timestamp_is_a_warning_not_an_error() {
        let snapshot = parse_str(
            r#"[{"MAC": "11:22:33:44:55:66", "FIRST SEEN": "yesterday", "IP": 42}]"#,
        )
        .expect("parses");
        let host = &snapshot.hosts[0];
        assert_eq!(host.first_seen, None);
        assert_eq!(host.ip, None);
        assert_eq!(snapshot.diagnostics.len(), 2);
        assert_eq!(
            snapshot.diagnostics[0].location.as_deref(),
            Some("host[0].IP")
        );
        assert_eq!(
            snapshot.diagnostics[1].location.as_deref(),
            Some("host[0].FIRST SEEN")
        );
    }

    #[test]
    fn non_array_document_is_malformed() {
        let err = parse_str(r#"{"MAC": "x"}"#).expect_err("object is not a snapshot");
        assert!(matches!(err, ReportError::MalformedSnapshot { .. }));
        assert_eq!(err.step(), "load");
    }

    #[test]
    fn truncated_document_is_malformed() {
        let err = parse_str(r#"[{"MAC": "AA:BB"#).expect_err("torn read");
        assert!(matches!(err, ReportError::MalformedSnapshot { .. }));
    }

    #[test]
    fn non_object_entry_is_malformed() {
        let err = parse_str(r#"[{"MAC": "AA"}, 7]"#).expect_err("number entry");
        match err {
            ReportError::MalformedSnapshot { reason, .. } => assert!(reason.contains("entry 1")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unusable_entries_are_rejected_individually() {
        let snapshot = parse_str(
            r#"[
                {"HOSTNAME": "no-mac"},
                {"MAC": "AA:AA", "PROTOCOLS": {"DNS": "oops"}},
                {"MAC": "BB:BB", "PROTOCOLS": {"ARP": [{"op": 1}, 3]}},
                {"MAC": "CC:CC", "PROTOCOLS": [{"DNS": {}}]},
                {"MAC": "DD:DD"}
            ]"#,
        )
        .expect("parses");

        assert_eq!(snapshot.hosts.len(), 1);
        assert_eq!(snapshot.hosts[0].mac, "DD:DD");
        assert_eq!(snapshot.hosts[0].ordinal, 4);

        let rejected: Vec<_> = snapshot
            .rejected
            .iter()
            .map(|entry| (entry.ordinal, entry.label.as_str()))
            .collect();
        assert_eq!(
            rejected,
            [(0, "entry 0"), (1, "AA:AA"), (2, "BB:BB"), (3, "CC:CC")]
        );
    }

    #[test]
    fn empty_protocol_containers_mean_no_protocols() {
        let snapshot = parse_str(
            r#"[
                {"MAC": "AA:BB:CC:DD:EE:FF", "PROTOCOLS": []},
                {"MAC": "11:22:33:44:55:66", "PROTOCOLS": {"DNS": []}},
                {"MAC": "22:33:44:55:66:77", "PROTOCOLS": {}}
            ]"#,
        )
        .expect("parses");

        assert!(snapshot.rejected.is_empty());
        assert_eq!(snapshot.hosts.len(), 3);
        assert!(snapshot.hosts[0].protocols.is_empty());
        assert!(snapshot.hosts[2].protocols.is_empty());
        assert_eq!(
            snapshot.hosts[1].protocols[0].observation,
            ProtocolObservation::Many(Vec::new())
        );
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = load(Path::new("/nonexistent/netmap/hosts.json")).expect_err("missing");
        assert!(matches!(err, ReportError::SourceNotFound { .. }));
    }
}
