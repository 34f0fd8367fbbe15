use crate::parsers::collapse_whitespace;
use crate::parsers::html::resolve_href;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

/// Elements whose content is never readable text
const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "canvas",
];

/// Elements that start and end their own block
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "nav", "main", "aside", "ul", "ol",
    "dl", "dt", "dd", "table", "thead", "tbody", "tr", "form", "blockquote", "figure", "pre",
];

struct Block {
    text: String,
    list_item: bool,
}

/// Converts an HTML document to a compact markdown rendering
///
/// Headings become `#` lines, list items `- ` lines and anchors `[text](url)` with
/// the URL resolved against `base`. Scripts, styles and other non-text elements
/// are dropped and whitespace inside each block is collapsed.
pub fn render(html: &str, base: &Url) -> String {
    let doc = Html::parse_document(html);
    let root = doc
        .select(&BODY)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut renderer = Renderer::new(base);
    renderer.walk(root);
    renderer.flush();
    renderer.finish()
}

struct Renderer<'a> {
    base: &'a Url,
    blocks: Vec<Block>,
    line: String,
    prefix: Option<String>,
}

impl<'a> Renderer<'a> {
    fn new(base: &'a Url) -> Self {
        Self {
            base,
            blocks: Vec::new(),
            line: String::new(),
            prefix: None,
        }
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.line.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();

        if SKIPPED.contains(&name) {
            return;
        }

        if let Some(level) = heading_level(name) {
            self.flush();
            self.prefix = Some(format!("{} ", "#".repeat(level)));
            self.walk(element);
            self.flush();
            self.prefix = None;
            return;
        }

        match name {
            "a" => self.anchor(element),
            "br" | "hr" => self.flush(),
            "li" => {
                self.flush();
                self.prefix = Some("- ".to_string());
                self.walk(element);
                self.flush();
                self.prefix = None;
            }
            "td" | "th" => {
                self.walk(element);
                self.line.push_str(" | ");
            }
            _ if BLOCKS.contains(&name) => {
                self.flush();
                self.walk(element);
                self.flush();
            }
            _ => self.walk(element),
        }
    }

    fn anchor(&mut self, element: ElementRef<'_>) {
        let text = collapse_whitespace(&element.text().collect::<String>());
        let target = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(self.base, href));

        match target {
            Some(url) if text.is_empty() => self.line.push_str(&format!(" <{url}> ")),
            Some(url) => self.line.push_str(&format!("[{text}]({url})")),
            None => self.line.push_str(&text),
        }
    }

    /// Ends the current block, if it has any text
    ///
    /// A pending prefix waits for the first non-empty block, so a list item or
    /// heading wrapping a `<p>` or `<div>` keeps its marker.
    fn flush(&mut self) {
        let text = collapse_whitespace(&self.line);
        let text = text.trim_end_matches(" |").to_string();
        self.line.clear();

        if text.is_empty() {
            return;
        }

        let prefix = self.prefix.take();

        let list_item = prefix.as_deref() == Some("- ");
        let text = match prefix {
            Some(prefix) => format!("{prefix}{text}"),
            None => text,
        };
        self.blocks.push(Block { text, list_item });
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let mut previous_list_item = false;

        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str(if previous_list_item && block.list_item {
                    "\n"
                } else {
                    "\n\n"
                });
            }
            out.push_str(&block.text);
            previous_list_item = block.list_item;
        }

        out
    }
}

fn heading_level(name: &str) -> Option<usize> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
