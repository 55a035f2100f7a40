//! Provider responses come in several shapes depending on API version and
//! model. Each shape has a pure decoder; they are tried in priority order and
//! the first one yielding a non-empty result wins.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde_json::Value;

use super::error::GenerationError;
use super::provider::RawResponse;

/// Field names some providers use instead of `b64_json`.
const ALTERNATE_FIELDS: &[&str] = &[
    "b64",
    "base64",
    "image_base64",
    "bytesBase64Encoded",
    "image",
    "b64_json",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A hosted artifact still to be fetched.
    Remote(String),
    Inline(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `data[0].url` (or a top-level `url`). A `data:` URL there is
    /// decoded in place.
    RemoteUrl,
    /// `data[0].b64_json`.
    InlineB64Json,
    /// Base64 under one of `ALTERNATE_FIELDS`, in `data[0]` or at the top level.
    InlineAlternate,
    /// The whole body is base64 (optionally a JSON string or a `data:` URL).
    BareBase64,
}

impl ResponseShape {
    pub const PRIORITY: [ResponseShape; 4] = [
        ResponseShape::RemoteUrl,
        ResponseShape::InlineB64Json,
        ResponseShape::InlineAlternate,
        ResponseShape::BareBase64,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::RemoteUrl => "remote_url",
            ResponseShape::InlineB64Json => "b64_json",
            ResponseShape::InlineAlternate => "alternate_field",
            ResponseShape::BareBase64 => "bare_base64",
        }
    }

    pub fn probe(&self, raw: &RawResponse) -> Option<Decoded> {
        match self {
            ResponseShape::RemoteUrl => remote_url(raw),
            ResponseShape::InlineB64Json => b64_json(raw),
            ResponseShape::InlineAlternate => alternate_field(raw),
            ResponseShape::BareBase64 => bare_base64(raw),
        }
    }
}

/// Decode a response by trying every shape in priority order.
pub fn decode_response(raw: &RawResponse) -> Result<(ResponseShape, Decoded), GenerationError> {
    ResponseShape::PRIORITY
        .iter()
        .find_map(|shape| shape.probe(raw).map(|decoded| (*shape, decoded)))
        .ok_or(GenerationError::UnsupportedProviderResponse)
}

fn first_item(json: &Value) -> Option<&Value> {
    json.get("data")?.as_array()?.first()
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn remote_url(raw: &RawResponse) -> Option<Decoded> {
    let json = raw.json()?;
    let url = first_item(json)
        .and_then(|item| non_empty_str(item, "url"))
        .or_else(|| non_empty_str(json, "url"))?;
    if url.starts_with("data:") {
        decode_base64(url).map(Decoded::Inline)
    } else if url.starts_with("https://") || url.starts_with("http://") {
        Some(Decoded::Remote(url.to_owned()))
    } else {
        None
    }
}

fn b64_json(raw: &RawResponse) -> Option<Decoded> {
    let item = first_item(raw.json()?)?;
    non_empty_str(item, "b64_json")
        .and_then(decode_base64)
        .map(Decoded::Inline)
}

fn alternate_field(raw: &RawResponse) -> Option<Decoded> {
    let json = raw.json()?;
    let scopes = [first_item(json), Some(json)];
    scopes
        .into_iter()
        .flatten()
        .flat_map(|scope| ALTERNATE_FIELDS.iter().map(move |field| (scope, *field)))
        .find_map(|(scope, field)| non_empty_str(scope, field).and_then(decode_base64))
        .map(Decoded::Inline)
}

fn bare_base64(raw: &RawResponse) -> Option<Decoded> {
    let payload = match raw.json() {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return None,
        None => raw.body(),
    };
    decode_base64(payload).map(Decoded::Inline)
}

/// Decode standard or URL-safe base64, padded or not, with an optional
/// `data:...;base64,` prefix. Empty results count as failure.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let input = input.trim();
    let payload = match input.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => input,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD]
        .into_iter()
        .find_map(|engine| engine.decode(&compact).ok())
        .filter(|bytes| !bytes.is_empty())
}
