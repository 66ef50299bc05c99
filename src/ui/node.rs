//! Declarative page description.

use std::fmt;

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    tag: &'static str,
    id: Option<String>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Child {
    Node(Node),
    Text(String),
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            styles: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn panel() -> Self {
        Self::new("div")
    }

    pub fn paragraph() -> Self {
        Self::new("p")
    }

    /// `<h{level}>` with text; level is clamped to 1..=6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        const TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
        let tag = TAGS[usize::from(level.clamp(1, 6)) - 1];
        Self::new(tag).text(text)
    }

    /// A button that raises the UI event `event` when pressed.
    pub fn button(text: impl Into<String>, event: impl Into<String>) -> Self {
        Self::new("button")
            .attr("type", "button")
            .data("event", event)
            .text(text)
    }

    pub fn text_area(id: impl Into<String>) -> Self {
        Self::new("textarea").id(id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add one or more space separated classes.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// `data-{name}` attribute.
    pub fn data(self, name: &str, value: impl Into<String>) -> Self {
        self.attr(format!("data-{name}"), value)
    }

    /// Append an escaped text child.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(Child::Node(node));
        self
    }

    /// Render to an HTML string.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        if let Some(id) = &self.id {
            write!(f, " id=\"{}\"", escape(id))?;
        }
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", escape(&self.classes.join(" ")))?;
        }
        if !self.styles.is_empty() {
            let style: Vec<String> = self
                .styles
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            write!(f, " style=\"{}\"", escape(&style.join("; ")))?;
        }
        for (name, value) in &self.attrs {
            write!(f, " {}=\"{}\"", name, escape(value))?;
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                Child::Node(node) => write!(f, "{node}")?,
                Child::Text(text) => f.write_str(&escape(text))?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

/// Escape text for use in HTML content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_attributes() {
        let html = Node::panel()
            .id("output")
            .class("row  col-3")
            .style("height", "300px")
            .style("overflow", "auto")
            .render();
        assert_eq!(
            html,
            r#"<div id="output" class="row col-3" style="height: 300px; overflow: auto"></div>"#
        );
    }

    #[test]
    fn test_render_nested_and_text() {
        let html = Node::panel()
            .child(Node::heading(3, "Title"))
            .child(Node::paragraph().text("1 < 2"))
            .render();
        assert_eq!(html, "<div><h3>Title</h3><p>1 &lt; 2</p></div>");
    }

    #[test]
    fn test_button_event() {
        let html = Node::button("Run", "run").render();
        assert_eq!(
            html,
            r#"<button type="button" data-event="run">Run</button>"#
        );
    }

    #[test]
    fn test_heading_clamped() {
        assert!(Node::heading(9, "x").render().starts_with("<h6>"));
        assert!(Node::heading(0, "x").render().starts_with("<h1>"));
    }
}
