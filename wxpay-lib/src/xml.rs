//! Flat map XML codec used by the legacy pay API.
//!
//! Requests and replies are a single `<xml>` element whose children are
//! scalar fields:
//!
//! ```xml
//! <xml>
//!   <appid><![CDATA[wx2421b1c4370ec43b]]></appid>
//!   <mch_id>10000100</mch_id>
//! </xml>
//! ```
//!
//! [`encode`] writes a [`FieldSet`] in that shape and [`decode`] reads one
//! back. Typed replies are bound from the decoded map with [`bind`], so the
//! XML is parsed once and the same map feeds both signature verification and
//! result binding.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde_json::{Map, Value};
use std::fmt;

use crate::fields::FieldSet;
use crate::{Result, WxPayError};

/// Root element name.
pub const ROOT: &str = "xml";

/// Encode a field set as `<xml><key>value</key>...</xml>`.
pub fn encode(fields: &FieldSet) -> String {
    let mut out = String::with_capacity(16 + fields.len() * 32);
    out.push('<');
    out.push_str(ROOT);
    out.push('>');
    for (key, value) in fields.iter() {
        out.push('<');
        out.push_str(key);
        out.push('>');
        out.push_str(&quick_xml::escape::escape(value));
        out.push_str("</");
        out.push_str(key);
        out.push('>');
    }
    out.push_str("</");
    out.push_str(ROOT);
    out.push('>');
    out
}

/// Decode the direct children of the root element into a flat map.
///
/// Text and CDATA are concatenated per child; content of deeper elements is
/// ignored. A document without a root element is an error.
pub fn decode(data: &[u8]) -> Result<FieldSet> {
    let text = std::str::from_utf8(data)
        .map_err(|e| WxPayError::Xml(format!("response is not UTF-8: {}", e)))?;
    let mut reader = Reader::from_str(text);

    let mut fields = FieldSet::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    seen_root = true;
                } else if depth == 2 {
                    let name = std::str::from_utf8(e.local_name().as_ref())
                        .map_err(|e| WxPayError::Xml(e.to_string()))?
                        .to_string();
                    current = Some((name, String::new()));
                }
            }
            Event::Empty(_) if depth == 0 => seen_root = true,
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, value)) = current.take() {
                        fields.insert(name, value);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if depth == 2 => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) if depth == 2 => {
                if let Some((_, value)) = current.as_mut() {
                    let raw = e.into_inner();
                    let chunk = std::str::from_utf8(&raw)
                        .map_err(|e| WxPayError::Xml(e.to_string()))?;
                    value.push_str(chunk);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(WxPayError::Xml("no root element".to_string()));
    }
    Ok(fields)
}

/// Bind a typed reply from a decoded flat map.
///
/// Every value is a string at this point; numeric fields should use
/// [`int_from_text`].
pub fn bind<T: DeserializeOwned>(fields: &FieldSet) -> Result<T> {
    let object: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    serde_json::from_value(Value::Object(object)).map_err(WxPayError::decode)
}

/// Deserialize an integer from either a JSON number or its decimal text.
///
/// Empty text yields zero.
pub fn int_from_text<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IntVisitor;

    impl<'de> Visitor<'de> for IntVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<i64, E> {
            i64::try_from(v).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<i64, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0);
            }
            v.parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(IntVisitor)
}
