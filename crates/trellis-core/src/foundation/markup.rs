//! Markup tag model.
//!
//! The markup template processor is an external collaborator; this module
//! only models the tag handed to a component during rendering so the
//! component can validate and decorate it.

/// An open tag supplied by the markup processor for a component to render
/// onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTag {
    name: String,
    attributes: Vec<(String, String)>,
}

impl ComponentTag {
    /// Creates a tag with the given element name and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Returns the element name (e.g. `input`, `form`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of `name`, if the attribute is present.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing any existing value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value.into(),
            None => self.attributes.push((name, value.into())),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Iterates attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the tag as an opening tag string.
    ///
    /// `self_closing` renders `<input ... />` style void elements.
    pub fn render_open(&self, self_closing: bool) -> String {
        let mut out = String::from("<");
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_attribute(v));
            out.push('"');
        }
        out.push_str(if self_closing { "/>" } else { ">" });
        out
    }
}

/// Escapes a value for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_replaces() {
        let mut tag = ComponentTag::new("input");
        tag.set_attribute("type", "text");
        tag.set_attribute("type", "submit");

        assert_eq!(tag.get_attribute("type"), Some("submit"));
        assert_eq!(tag.attributes().count(), 1);
    }

    #[test]
    fn test_render_open_escapes_values() {
        let tag = ComponentTag::new("input").with_attribute("value", "a\"b<c>");
        assert_eq!(
            tag.render_open(true),
            "<input value=\"a&quot;b&lt;c&gt;\"/>"
        );
    }
}
