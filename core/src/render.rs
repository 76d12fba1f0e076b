use crate::config::{IndexStyle, ReportConfig, TableEnhancement};
use crate::host::{AttributeMap, HostRecord, ProtocolEntry, ProtocolObservation, NO_PROTOCOLS};
use crate::ident::{device_anchor_id, escape_html, protocol_anchor_id};
use crate::timeline::TimelineFragment;

const BASE_CSS: &str = "body{font-family:system-ui,-apple-system,\"Segoe UI\",Arial,sans-serif;line-height:1.6;color:#1e293b;background:#f8fafc;margin:0 auto;padding:20px;}\
    h1,h2,h3{color:#1e3a5f;}\
    table{width:100%;border-collapse:collapse;margin:12px 0 20px;font-size:14px;}\
    th,td{border:1px solid #cbd5e1;padding:8px 10px;text-align:left;vertical-align:top;}\
    th{background:#e2e8f0;font-weight:600;}\
    caption{text-align:left;font-weight:600;padding:4px 0;}\
    details{margin-top:12px;background:#ffffff;border:1px solid #cbd5e1;border-left:4px solid #2563eb;border-radius:6px;padding:8px 12px;}\
    details>summary{cursor:pointer;font-weight:600;color:#1d4ed8;}\
    .button{background:#2563eb;color:#ffffff;padding:10px 20px;text-decoration:none;display:inline-block;border-radius:5px;}\
    .button:hover{background:#1e40af;}\
    .empty,.no-timeline{font-style:italic;color:#64748b;}\
    footer{margin-top:32px;color:#64748b;font-size:13px;}";

const HEADER_CSS: &str = "header{background:#1e3a5f;color:#ffffff;padding:20px;display:flex;align-items:center;justify-content:space-between;gap:16px;border-bottom:3px solid #2563eb;}\
    header h1{margin:0;color:#ffffff;}\
    header p{margin:4px 0;}\
    header img{height:120px;object-fit:contain;}\
    .header-text{flex:2;text-align:center;}\
    .tagline{font-style:italic;}\
    .timeline-panel{overflow-x:auto;background:#ffffff;border:1px solid #cbd5e1;border-radius:6px;padding:12px;}\
    ul.device-links li{margin:4px 0;}";

#[derive(Debug, Clone)]
pub struct MenuLink<'a> {
    pub host: &'a HostRecord,
    pub file_name: String,
}

pub fn render_detail(host: &HostRecord, menu_file_name: &str) -> String {
    let title = escape_html(host.title());
    let mut html = String::new();
    html.push_str(&page_head(&format!("Device {title}"), "900px", &[]));
    html.push_str(&format!(
        "<h1>Device {title} ({})</h1>\n",
        escape_html(&host.mac)
    ));
    html.push_str(&format!(
        "<section id=\"{}\">\n",
        device_anchor_id(host, host.ordinal)
    ));
    html.push_str(&render_identity_table(host));
    html.push_str("<h2>Observed protocols</h2>\n");
    html.push_str(&render_protocols(host));
    html.push_str("</section>\n");
    html.push_str(&format!(
        "<p><a href=\"{}\" class=\"button\">Back to menu</a></p>\n",
        escape_html(menu_file_name)
    ));
    html.push_str("</body>\n</html>\n");
    html
}

pub fn render_menu(
    links: &[MenuLink<'_>],
    timeline: &TimelineFragment,
    generated_at: &str,
    config: &ReportConfig,
) -> String {
    let enhancement = match config.index_style {
        IndexStyle::Table => config.table_enhancement.as_ref(),
        IndexStyle::Links => None,
    };
    let stylesheets: Vec<&str> = enhancement
        .map(|e| e.stylesheets.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let mut html = String::new();
    html.push_str(&page_head(
        &escape_html(&config.title),
        "1240px",
        &stylesheets,
    ));
    html.push_str(&render_header(config, generated_at));
    html.push_str("<h2>Discovery timeline</h2>\n");
    html.push_str("<div class=\"timeline-panel\">\n");
    html.push_str(&timeline.markup);
    html.push_str("\n</div>\n");
    html.push_str("<h2>Detected devices</h2>\n");

    if links.is_empty() {
        html.push_str("<p class=\"empty\">No devices in this snapshot.</p>\n");
    } else {
        match config.index_style {
            IndexStyle::Table => html.push_str(&render_index_table(links)),
            IndexStyle::Links => html.push_str(&render_index_links(links)),
        }
    }

    if let Some(enhancement) = enhancement {
        html.push_str(&render_enhancement_scripts(enhancement));
    }
    html.push_str(&footer(generated_at));
    html.push_str("</body>\n</html>\n");
    html
}

pub fn render_document(
    hosts: &[HostRecord],
    timeline: &TimelineFragment,
    generated_at: &str,
    config: &ReportConfig,
) -> String {
    let mut html = String::new();
    html.push_str(&page_head(&escape_html(&config.title), "1240px", &[]));
    html.push_str(&render_header(config, generated_at));
    html.push_str("<h2>Discovery timeline</h2>\n");
    html.push_str("<div class=\"timeline-panel\">\n");
    html.push_str(&timeline.markup);
    html.push_str("\n</div>\n");
    html.push_str("<h2>Detected devices</h2>\n");

    if hosts.is_empty() {
        html.push_str("<p class=\"empty\">No devices in this snapshot.</p>\n");
    }
    for host in hosts {
        html.push_str(&format!(
            "<details class=\"host\" id=\"{}\">\n<summary>{}</summary>\n",
            device_anchor_id(host, host.ordinal),
            escape_html(&host.index_label())
        ));
        html.push_str(&render_identity_table(host));
        html.push_str(&render_protocols(host));
        html.push_str("</details>\n");
    }

    html.push_str(&footer(generated_at));
    html.push_str("</body>\n</html>\n");
    html
}

fn page_head(title: &str, body_width: &str, stylesheets: &[&str]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    for href in stylesheets {
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\" />\n",
            escape_html(href)
        ));
    }
    html.push_str("<style>");
    html.push_str(BASE_CSS);
    html.push_str(HEADER_CSS);
    html.push_str(&format!("body{{max-width:{body_width}}}"));
    html.push_str("</style>\n</head>\n<body>\n");
    html
}

fn render_header(config: &ReportConfig, generated_at: &str) -> String {
    let mut html = String::from("<header>\n");
    let (left, right) = config.logos.split_at(config.logos.len().min(1));
    for logo in left {
        html.push_str(&logo_markup(&logo.src, &logo.alt));
    }
    html.push_str("<div class=\"header-text\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&config.title)));
    html.push_str(&format!(
        "<p>Report generated on {}</p>\n",
        escape_html(generated_at)
    ));
    if !config.tagline.is_empty() {
        html.push_str(&format!(
            "<p class=\"tagline\">{}</p>\n",
            escape_html(&config.tagline)
        ));
    }
    html.push_str("</div>\n");
    for logo in right {
        html.push_str(&logo_markup(&logo.src, &logo.alt));
    }
    html.push_str("</header>\n");
    html
}

fn logo_markup(src: &str, alt: &str) -> String {
    format!(
        "<div><img src=\"{}\" alt=\"{}\" /></div>\n",
        escape_html(src),
        escape_html(alt)
    )
}

fn render_identity_table(host: &HostRecord) -> String {
    let rows = [
        ("MAC address", host.mac.clone()),
        ("Vendor", host.vendor_or_default().to_string()),
        ("Hostname", host.hostname_or_default().to_string()),
        ("IP address", host.ip_or_default().to_string()),
        ("First seen", host.first_seen_display()),
        ("Last seen", host.last_seen_display()),
    ];
    let mut html = String::from("<table class=\"identity\">\n");
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><th>{label}</th><td>{}</td></tr>\n",
            escape_html(&value)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn render_protocols(host: &HostRecord) -> String {
    if host.protocols.is_empty() {
        return format!("<p class=\"empty\">{NO_PROTOCOLS}</p>\n");
    }
    let mut html = String::new();
    for protocol in &host.protocols {
        html.push_str(&render_protocol(host, protocol));
    }
    html
}

fn render_protocol(host: &HostRecord, protocol: &ProtocolEntry) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<details class=\"protocol\" id=\"{}\">\n<summary>{}</summary>\n",
        protocol_anchor_id(host, host.ordinal, &protocol.name),
        escape_html(&protocol.name)
    ));
    match &protocol.observation {
        ProtocolObservation::Single(attributes) => {
            html.push_str(&render_attributes(attributes, None));
        }
        ProtocolObservation::Many(observations) if observations.is_empty() => {
            html.push_str("<p class=\"empty\">No observations recorded.</p>\n");
        }
        ProtocolObservation::Many(observations) => {
            for (index, attributes) in observations.iter().enumerate() {
                let caption = format!("Observation {}", index + 1);
                html.push_str(&render_attributes(attributes, Some(&caption)));
            }
        }
    }
    html.push_str("</details>\n");
    html
}

fn render_attributes(attributes: &AttributeMap, caption: Option<&str>) -> String {
    let mut html = String::from("<table class=\"observation\">\n");
    if let Some(caption) = caption {
        html.push_str(&format!("<caption>{}</caption>\n", escape_html(caption)));
    }
    if attributes.is_empty() {
        html.push_str("<tr><td class=\"empty\">No attributes recorded.</td></tr>\n");
    }
    for (name, value) in attributes.iter() {
        html.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            escape_html(name),
            escape_html(value)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn render_index_table(links: &[MenuLink<'_>]) -> String {
    let mut html = String::new();
    html.push_str("<table id=\"devices\" class=\"display\">\n");
    html.push_str("<thead><tr><th>MAC address</th><th>IP address</th><th>Hostname</th><th>First seen</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for link in links {
        let host = link.host;
        html.push_str(&format!(
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&link.file_name),
            escape_html(&host.mac),
            escape_html(host.ip_or_default()),
            escape_html(host.hostname_or_default()),
            escape_html(&host.first_seen_display())
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn render_index_links(links: &[MenuLink<'_>]) -> String {
    let mut html = String::from("<ul class=\"device-links\">\n");
    for link in links {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&link.file_name),
            escape_html(&link.host.index_label())
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn render_enhancement_scripts(enhancement: &TableEnhancement) -> String {
    let mut html = String::new();
    for src in &enhancement.scripts {
        html.push_str(&format!(
            "<script src=\"{}\"></script>\n",
            escape_html(src)
        ));
    }
    // Without the library the table stays a plain table.
    html.push_str(
        "<script>if (window.jQuery && window.jQuery.fn && window.jQuery.fn.DataTable) { window.jQuery('#devices').DataTable(); }</script>\n",
    );
    html
}

fn footer(generated_at: &str) -> String {
    format!(
        "<footer>Generated by netmap-report on {}</footer>\n",
        escape_html(generated_at)
    )
}
