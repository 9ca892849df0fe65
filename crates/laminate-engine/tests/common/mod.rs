//! Shared test harness: a minimal markup parser and renderer so the suite
//! can drive the engine with document strings the way a host pipeline would.

use laminate_engine::{
    Attributes, CommentNode, InMemoryLoader, Location, Node, ParseError, ResolveContext,
    ResolveError, ResolveOptions, TagNode, TemplateParser, TextNode, Tree, resolve_layouts,
};
use std::path::{Path, PathBuf};

/// Just enough of a markup parser for the fixtures: tags with quoted
/// attributes, text runs, and comments.
pub struct TestParser;

impl TemplateParser for TestParser {
    fn parse(&self, source: &str, filename: Option<&Path>) -> Result<Tree, ParseError> {
        Cursor::new(source, filename).parse_nodes(None)
    }
}

/// Parses a document with no filename, resolves it against the given
/// loader with default options, and renders the cleaned result.
pub fn resolve_str(document: &str, loader: &InMemoryLoader) -> Result<String, ResolveError> {
    let parser = TestParser;
    let tree = parser
        .parse(document, None)
        .expect("test document should parse");
    let mut ctx = ResolveContext::new(&parser, loader);
    let resolved = resolve_layouts(tree, &ResolveOptions::default(), &mut ctx)?;
    Ok(clean_html(&render(&resolved)))
}

/// Renders a tree back to markup for assertions.
pub fn render(tree: &Tree) -> String {
    let mut out = String::new();
    for node in tree {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Tag(tag) => {
            out.push('<');
            out.push_str(&tag.name);
            if let Some(attrs) = &tag.attrs {
                for (name, value) in attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    let text = attr_value_text(value);
                    out.push_str(&html_escape::encode_double_quoted_attribute(&text));
                    out.push('"');
                }
            }
            out.push('>');
            for child in tag.content.as_deref().unwrap_or_default() {
                render_node(child, out);
            }
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        }
        Node::Text(text) => out.push_str(&html_escape::encode_text(&text.content)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.content);
            out.push_str("-->");
        }
    }
}

fn attr_value_text(value: &Tree) -> String {
    value
        .iter()
        .map(|node| match node {
            Node::Text(text) => text.content.as_str(),
            _ => "",
        })
        .collect()
}

/// Collapses whitespace between tags and trims the ends, so multi-line
/// fixtures compare against single-line expectations.
pub fn clean_html(html: &str) -> String {
    let chars: Vec<char> = html.trim().chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == '>' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '<' {
                i = j;
                continue;
            }
        }
        i += 1;
    }
    out
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    filename: Option<PathBuf>,
}

impl Cursor {
    fn new(source: &str, filename: Option<&Path>) -> Self {
        Cursor {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            filename: filename.map(Path::to_path_buf),
        }
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
            filename: self.filename.clone(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn eat(&mut self, prefix: &str) {
        for _ in prefix.chars() {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(message, self.location())
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn parse_nodes(&mut self, closing: Option<&str>) -> Result<Tree, ParseError> {
        let mut nodes = Tree::new();
        loop {
            match self.peek() {
                None => {
                    return match closing {
                        Some(name) => Err(self.error(format!("Unclosed <{name}> tag"))),
                        None => Ok(nodes),
                    };
                }
                Some('<') if self.starts_with("</") => {
                    let location = self.location();
                    self.eat("</");
                    let name = self.read_name();
                    self.skip_whitespace();
                    if self.peek() != Some('>') {
                        return Err(self.error(format!("Malformed closing tag </{name}")));
                    }
                    self.bump();
                    return if closing == Some(name.as_str()) {
                        Ok(nodes)
                    } else {
                        Err(ParseError::at(
                            format!("Unexpected closing tag </{name}>"),
                            location,
                        ))
                    };
                }
                Some('<') if self.starts_with("<!--") => nodes.push(self.parse_comment()?),
                Some('<') => nodes.push(self.parse_element()?),
                Some(_) => nodes.push(self.parse_text()),
            }
        }
    }

    fn parse_comment(&mut self) -> Result<Node, ParseError> {
        let location = self.location();
        self.eat("<!--");
        let mut content = String::new();
        while !self.starts_with("-->") {
            match self.bump() {
                Some(c) => content.push(c),
                None => return Err(self.error("Unclosed comment")),
            }
        }
        self.eat("-->");
        Ok(Node::Comment(CommentNode { content, location }))
    }

    fn parse_text(&mut self) -> Node {
        let location = self.location();
        let mut content = String::new();
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            content.push(c);
            self.bump();
        }
        Node::Text(TextNode { content, location })
    }

    fn parse_element(&mut self) -> Result<Node, ParseError> {
        let location = self.location();
        self.bump();
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.error("Expected a tag name after '<'"));
        }

        let mut attrs: Option<Attributes> = None;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(format!("Unclosed <{name}> tag"))),
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('/') if self.starts_with("/>") => {
                    self.eat("/>");
                    return Ok(Node::Tag(TagNode {
                        name,
                        attrs,
                        content: None,
                        location,
                    }));
                }
                Some(_) => {
                    let attr_location = self.location();
                    let attr_name = self.read_name();
                    if attr_name.is_empty() {
                        return Err(self.error(format!("Malformed attribute in <{name}>")));
                    }
                    let value = if self.peek() == Some('=') {
                        self.bump();
                        self.read_quoted_value()?
                    } else {
                        String::new()
                    };
                    attrs.get_or_insert_with(Attributes::new).insert(
                        attr_name,
                        vec![Node::Text(TextNode {
                            content: value,
                            location: attr_location,
                        })],
                    );
                }
            }
        }

        let content = self.parse_nodes(Some(name.as_str()))?;
        Ok(Node::Tag(TagNode {
            name,
            attrs,
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
            location,
        }))
    }

    fn read_quoted_value(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("Expected a quoted attribute value")),
        };
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("Unclosed attribute value")),
            }
        }
    }
}
