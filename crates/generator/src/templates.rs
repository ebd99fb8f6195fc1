//! Template loading and management

use oas2proxy_common::{GeneratorError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all bundle templates
///
/// Template names carry no `.xml` suffix so tera's HTML autoescaping stays
/// off; text is escaped explicitly with the `xml_escape` filter.
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("xml_escape", xml_escape_filter);

    let templates = [
        ("apiproxy", include_str!("../templates/apiproxy.xml.tera")),
        (
            "proxy_endpoint",
            include_str!("../templates/proxy_endpoint.xml.tera"),
        ),
        (
            "target_endpoint",
            include_str!("../templates/target_endpoint.xml.tera"),
        ),
        (
            "oas_validation",
            include_str!("../templates/oas_validation.xml.tera"),
        ),
    ];

    for (name, source) in templates {
        tera.add_raw_template(name, source).map_err(|e| {
            GeneratorError::Generation(format!("Failed to load {} template: {}", name, e))
        })?;
    }

    Ok(tera)
}

/// Filter to escape XML special characters
fn xml_escape_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("xml_escape filter expects a string"))?;

    Ok(Value::String(xml_escape(s)))
}

fn xml_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
