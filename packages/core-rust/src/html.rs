//! Structured HTML tree builder.
//!
//! Markup is assembled as owned [`Element`] values and serialized in one pass,
//! so every opened tag is closed by construction. Text and attribute values
//! are escaped on output; [`Node::Raw`] is the only way to emit trusted markup
//! (icons supplied by an [`IconProvider`](crate::render::IconProvider)).

use std::fmt::{self, Write};

/// Tags serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// A piece of an HTML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Text content, escaped on output.
    Text(String),
    /// Trusted markup, written verbatim.
    Raw(String),
    /// A sequence of siblings with no wrapper of its own.
    Fragment(Vec<Node>),
}

impl Node {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub fn raw(markup: impl Into<String>) -> Self {
        Self::Raw(markup.into())
    }

    /// Serializes this node into `out`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying writer.
    pub fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        match self {
            Self::Element(element) => element.write_to(out),
            Self::Text(text) => write_escaped(out, text, false),
            Self::Raw(markup) => out.write_str(markup),
            Self::Fragment(nodes) => nodes.iter().try_for_each(|n| n.write_to(out)),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An HTML element with attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Appends one or more space-separated class names.
    #[must_use]
    pub fn class(mut self, names: &str) -> Self {
        self.classes
            .extend(names.split_whitespace().map(str::to_string));
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((name.to_string(), Some(value.into())));
        self
    }

    /// Sets a `data-<name>` attribute.
    #[must_use]
    pub fn data(self, name: &str, value: impl Into<String>) -> Self {
        self.attr(&format!("data-{name}"), value)
    }

    #[must_use]
    pub fn style(self, value: impl Into<String>) -> Self {
        self.attr("style", value)
    }

    /// Sets a boolean attribute such as `autofocus` or `selected`.
    #[must_use]
    pub fn flag(mut self, name: &str) -> Self {
        self.attributes.push((name.to_string(), None));
        self
    }

    /// Sets a boolean attribute only when `on` is true.
    #[must_use]
    pub fn flag_if(self, name: &str, on: bool) -> Self {
        if on {
            self.flag(name)
        } else {
            self
        }
    }

    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    #[must_use]
    pub fn raw(self, markup: impl Into<String>) -> Self {
        self.child(Node::Raw(markup.into()))
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Serializes this element and its subtree into `out`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying writer.
    pub fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        write!(out, "<{}", self.tag)?;

        if !self.classes.is_empty() {
            out.write_str(" class=\"")?;
            write_escaped(out, &self.classes.join(" "), true)?;
            out.write_char('"')?;
        }

        for (name, value) in &self.attributes {
            write!(out, " {name}")?;
            if let Some(value) = value {
                out.write_str("=\"")?;
                write_escaped(out, value, true)?;
                out.write_char('"')?;
            }
        }

        out.write_char('>')?;

        if VOID_TAGS.contains(&self.tag) {
            return Ok(());
        }

        for child in &self.children {
            child.write_to(out)?;
        }

        write!(out, "</{}>", self.tag)
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

fn write_escaped(out: &mut dyn Write, text: &str, attribute: bool) -> fmt::Result {
    for c in text.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' if attribute => out.write_str("&quot;")?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}
