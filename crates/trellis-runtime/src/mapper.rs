//! URL mapper: encoding and decoding listener targets.
//!
//! The mapper turns the identifying tuple
//! `(page class, page parameters, component path, listener name,
//! behavior index or none)` into a URL and back. This round trip is the
//! correctness contract of the whole request-handling layer: whatever the
//! encoder produces, the decoder must resolve to an equivalent target.
//!
//! # URL Shape
//!
//! ```text
//! /<mount>/<page-class>[/<indexed>...]?<named>...&trellis:component=...&trellis:listener=...[&trellis:behavior=i][&trellis:page=id]
//! ```
//!
//! The reserved `trellis:` query namespace carries the listener tuple; named
//! page parameters ride alongside and may not use the reserved prefix. The
//! behavior parameter is omitted entirely when the listener targets the
//! component itself, so `None` and index `0` can never collide.

use std::fmt::Write as _;

use trellis_core::{ComponentPath, ListenerRegistry, PageClass, PageId, PageParameters};

use crate::error::{MapperError, MapperResult};

/// Reserved query parameter naming the target component path.
pub const COMPONENT_PARAM: &str = "trellis:component";
/// Reserved query parameter naming the listener interface.
pub const LISTENER_PARAM: &str = "trellis:listener";
/// Reserved query parameter carrying the behavior index.
pub const BEHAVIOR_PARAM: &str = "trellis:behavior";
/// Reserved query parameter carrying the stored page id.
pub const PAGE_PARAM: &str = "trellis:page";

/// Prefix of the reserved query parameter namespace.
const RESERVED_PREFIX: &str = "trellis:";

// =============================================================================
// Url
// =============================================================================

/// A parsed URL: path segments plus ordered query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Url {
    /// Creates an empty URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a path segment.
    pub fn push_segment(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Appends a query pair.
    pub fn push_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The query pairs in order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First query value for `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the URL as a string with percent-encoded components.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&encode_component(segment));
        }
        if out.is_empty() {
            out.push('/');
        }
        for (i, (name, value)) in self.query.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(&encode_component(name));
            out.push('=');
            out.push_str(&encode_component(value));
        }
        out
    }

    /// Parses a URL string produced by [`render`](Self::render).
    pub fn parse(raw: &str) -> MapperResult<Self> {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        let mut url = Self::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            url.segments.push(decode_component(segment)?);
        }
        if let Some(query) = query {
            for pair in query.split('&').filter(|s| !s.is_empty()) {
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| MapperError::Malformed(format!("query pair '{pair}'")))?;
                url.query
                    .push((decode_component(name)?, decode_component(value)?));
            }
        }
        Ok(url)
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

// =============================================================================
// Percent Encoding
// =============================================================================

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Percent-encodes everything outside the unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Reverses [`encode_component`].
fn decode_component(raw: &str) -> MapperResult<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| MapperError::Malformed(format!("percent escape in '{raw}'")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| MapperError::Malformed(format!("utf-8 in '{raw}'")))
}

// =============================================================================
// Decoded Requests
// =============================================================================

/// The identifying tuple of a listener target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerTuple {
    /// The target page class.
    pub class: PageClass,
    /// Page construction parameters.
    pub parameters: PageParameters,
    /// Path of the target component.
    pub component: ComponentPath,
    /// Name of the listener interface.
    pub listener: String,
    /// Behavior index, or `None` when the component itself is the target.
    pub behavior_index: Option<usize>,
    /// Stored page id for stateful targets; `None` re-constructs from class
    /// and parameters.
    pub page_id: Option<PageId>,
}

/// What a URL decoded into.
#[derive(Debug, Clone)]
pub enum DecodedRequest {
    /// A plain bookmarkable page render.
    Render {
        /// The target page class.
        class: PageClass,
        /// Page construction parameters.
        parameters: PageParameters,
    },
    /// A listener invocation.
    Listener(ListenerTuple),
}

// =============================================================================
// Url Mapper
// =============================================================================

/// Encodes and decodes application URLs under a mount segment.
#[derive(Debug, Clone)]
pub struct UrlMapper {
    mount: String,
}

impl UrlMapper {
    /// Creates a mapper mounted at `/<mount>`.
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            mount: mount.into(),
        }
    }

    /// The mount segment.
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Encodes a plain bookmarkable page URL.
    pub fn encode_page(&self, class: &PageClass, parameters: &PageParameters) -> Url {
        let mut url = Url::new();
        url.push_segment(&self.mount);
        url.push_segment(class.name());
        for value in parameters.indexed() {
            url.push_segment(value);
        }
        for (name, value) in parameters.named() {
            url.push_query(name, value);
        }
        url
    }

    /// Encodes a listener target URL.
    ///
    /// Fails when a named page parameter collides with the reserved
    /// `trellis:` namespace. The behavior parameter is omitted entirely for
    /// `behavior_index == None`.
    pub fn encode_listener(&self, tuple: &ListenerTuple) -> MapperResult<Url> {
        if let Some((name, _)) = tuple
            .parameters
            .named()
            .find(|(name, _)| name.starts_with(RESERVED_PREFIX))
        {
            return Err(MapperError::ReservedParameter {
                name: name.to_string(),
            });
        }

        let mut url = self.encode_page(&tuple.class, &tuple.parameters);
        url.push_query(COMPONENT_PARAM, tuple.component.to_string());
        url.push_query(LISTENER_PARAM, &tuple.listener);
        if let Some(index) = tuple.behavior_index {
            url.push_query(BEHAVIOR_PARAM, index.to_string());
        }
        if let Some(id) = tuple.page_id {
            url.push_query(PAGE_PARAM, id.value().to_string());
        }
        Ok(url)
    }

    /// Decodes a URL into a request target.
    ///
    /// Listener names are validated against `listeners`, so forged or stale
    /// URLs naming unknown interfaces are rejected here, before any page is
    /// resolved.
    pub fn decode(&self, url: &Url, listeners: &ListenerRegistry) -> MapperResult<DecodedRequest> {
        let segments = url.segments();
        if segments.first().map(String::as_str) != Some(self.mount.as_str()) {
            return Err(MapperError::Malformed(format!(
                "url is not mounted under '/{}'",
                self.mount
            )));
        }
        let class = segments
            .get(1)
            .ok_or_else(|| MapperError::Malformed("missing page class segment".to_string()))?;

        let mut parameters = PageParameters::new();
        for (index, value) in segments[2..].iter().enumerate() {
            parameters.set_indexed(index, value.clone());
        }
        for (name, value) in url.query() {
            if !name.starts_with(RESERVED_PREFIX) {
                parameters.add(name.clone(), value.clone());
            }
        }

        let Some(listener) = url.query_value(LISTENER_PARAM) else {
            return Ok(DecodedRequest::Render {
                class: PageClass::new(class.clone()),
                parameters,
            });
        };
        listeners
            .lookup(listener)
            .map_err(|_| MapperError::UnknownListener {
                name: listener.to_string(),
            })?;

        let component = url
            .query_value(COMPONENT_PARAM)
            .map(ComponentPath::from)
            .ok_or(MapperError::MissingParameter(COMPONENT_PARAM))?;

        let behavior_index = url
            .query_value(BEHAVIOR_PARAM)
            .map(|value| {
                value
                    .parse::<usize>()
                    .map_err(|_| MapperError::InvalidBehaviorIndex {
                        value: value.to_string(),
                    })
            })
            .transpose()?;

        let page_id = url
            .query_value(PAGE_PARAM)
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(PageId::new)
                    .map_err(|_| MapperError::Malformed(format!("page id '{value}'")))
            })
            .transpose()?;

        Ok(DecodedRequest::Listener(ListenerTuple {
            class: PageClass::new(class.clone()),
            parameters,
            component,
            listener: listener.to_string(),
            behavior_index,
            page_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> UrlMapper {
        UrlMapper::new("app")
    }

    fn listeners() -> ListenerRegistry {
        ListenerRegistry::collect_all()
    }

    fn tuple(behavior_index: Option<usize>) -> ListenerTuple {
        let mut parameters = PageParameters::new();
        parameters.set("category", "books & games");
        parameters.add("tag", "rust/web");
        parameters.set_indexed(0, "2024");
        ListenerTuple {
            class: PageClass::new("checkout"),
            parameters,
            component: "checkout/go".parse().unwrap(),
            listener: "submit".to_string(),
            behavior_index,
            page_id: None,
        }
    }

    #[test]
    fn test_listener_tuple_round_trip() {
        let mapper = mapper();
        let original = tuple(Some(2));

        let url = mapper.encode_listener(&original).unwrap();
        let rendered = url.render();
        let parsed = Url::parse(&rendered).unwrap();
        let decoded = mapper.decode(&parsed, &listeners()).unwrap();

        match decoded {
            DecodedRequest::Listener(back) => assert_eq!(back, original),
            other => panic!("expected listener request, got {other:?}"),
        }
    }

    #[test]
    fn test_none_behavior_index_round_trips_and_omits_parameter() {
        let mapper = mapper();
        let original = tuple(None);

        let url = mapper.encode_listener(&original).unwrap();
        assert!(url.query_value(BEHAVIOR_PARAM).is_none());

        let parsed = Url::parse(&url.render()).unwrap();
        match mapper.decode(&parsed, &listeners()).unwrap() {
            DecodedRequest::Listener(back) => assert_eq!(back.behavior_index, None),
            other => panic!("expected listener request, got {other:?}"),
        }
    }

    #[test]
    fn test_behavior_index_zero_is_distinct_from_none() {
        let mapper = mapper();
        let url = mapper.encode_listener(&tuple(Some(0))).unwrap();

        assert_eq!(url.query_value(BEHAVIOR_PARAM), Some("0"));
        let parsed = Url::parse(&url.render()).unwrap();
        match mapper.decode(&parsed, &listeners()).unwrap() {
            DecodedRequest::Listener(back) => assert_eq!(back.behavior_index, Some(0)),
            other => panic!("expected listener request, got {other:?}"),
        }
    }

    #[test]
    fn test_page_url_round_trip() {
        let mapper = mapper();
        let mut parameters = PageParameters::new();
        parameters.set("q", "a=b&c");
        parameters.set_indexed(0, "se/gment");

        let url = mapper.encode_page(&PageClass::new("search"), &parameters);
        let parsed = Url::parse(&url.render()).unwrap();

        match mapper.decode(&parsed, &listeners()).unwrap() {
            DecodedRequest::Render { class, parameters: back } => {
                assert_eq!(class.name(), "search");
                assert_eq!(back, parameters);
            }
            other => panic!("expected render request, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_listener_is_rejected() {
        let mapper = mapper();
        let mut bad = tuple(None);
        bad.listener = "drag".to_string();

        let url = mapper.encode_listener(&bad).unwrap();
        assert!(matches!(
            mapper.decode(&url, &listeners()),
            Err(MapperError::UnknownListener { .. })
        ));
    }

    #[test]
    fn test_reserved_parameter_collision_is_rejected() {
        let mapper = mapper();
        let mut bad = tuple(None);
        bad.parameters.set("trellis:component", "forged");

        assert!(matches!(
            mapper.encode_listener(&bad),
            Err(MapperError::ReservedParameter { .. })
        ));
    }

    #[test]
    fn test_wrong_mount_is_rejected() {
        let mapper = mapper();
        let url = Url::parse("/other/checkout").unwrap();

        assert!(matches!(
            mapper.decode(&url, &listeners()),
            Err(MapperError::Malformed(_))
        ));
    }

    #[test]
    fn test_malformed_percent_escape_is_rejected() {
        assert!(Url::parse("/app/%zz").is_err());
    }

    #[test]
    fn test_invalid_behavior_index_is_rejected() {
        let mapper = mapper();
        let mut url = mapper.encode_page(&PageClass::new("checkout"), &PageParameters::new());
        url.push_query(LISTENER_PARAM, "submit");
        url.push_query(COMPONENT_PARAM, "go");
        url.push_query(BEHAVIOR_PARAM, "two");

        assert!(matches!(
            mapper.decode(&url, &listeners()),
            Err(MapperError::InvalidBehaviorIndex { .. })
        ));
    }

    #[test]
    fn test_stored_page_id_round_trips() {
        let mapper = mapper();
        let mut original = tuple(Some(0));
        original.page_id = Some(PageId::new(42));

        let url = mapper.encode_listener(&original).unwrap();
        let parsed = Url::parse(&url.render()).unwrap();
        match mapper.decode(&parsed, &listeners()).unwrap() {
            DecodedRequest::Listener(back) => assert_eq!(back.page_id, Some(PageId::new(42))),
            other => panic!("expected listener request, got {other:?}"),
        }
    }
}
