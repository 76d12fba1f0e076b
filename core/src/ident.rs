use crate::host::HostRecord;
use std::fmt::Write;

pub const DEVICE_FILE_PREFIX: &str = "device_";

/// `device_<mac>.html`. Only the `:`/`-`/`.` separators are dropped; the rest
/// goes through [`encode_id_component`], so MACs that still differ once the
/// separators are gone never share a file. Equal MACs do, and the later record
/// overwrites the earlier one.
pub fn device_file_name(host: &HostRecord) -> String {
    let stem: String = host
        .mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    let mut stem = encode_id_component(&stem);
    if stem.is_empty() {
        // a lone `_` is never produced by the encoding
        stem.push('_');
    }
    format!("{DEVICE_FILE_PREFIX}{stem}.html")
}

pub fn device_anchor_id(host: &HostRecord, ordinal: usize) -> String {
    format!("host-{ordinal}-{}", encode_id_component(&host.mac))
}

pub fn protocol_anchor_id(host: &HostRecord, ordinal: usize, protocol: &str) -> String {
    format!(
        "protocol-{ordinal}-{}-{}",
        encode_id_component(&host.mac),
        encode_id_component(protocol)
    )
}

// ASCII alphanumerics pass through, anything else (`_` included) becomes
// `_<hex code point>_`.
pub fn encode_id_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            encoded.push(ch);
        } else {
            let _ = write!(encoded, "_{:x}_", ch as u32);
        }
    }
    encoded
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
