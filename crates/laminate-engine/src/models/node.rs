use indexmap::IndexMap;
use std::path::PathBuf;

/// An ordered sequence of sibling nodes. The whole document is a `Tree`, and
/// every tag node's content is itself a `Tree`.
pub type Tree = Vec<Node>;

/// A single element of a document tree.
///
/// Tag nodes are the only variant the engine inspects structurally; text and
/// comments are carried through resolution unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Tag(TagNode),
    Text(TextNode),
    Comment(CommentNode),
}

impl Node {
    /// Source location of the node.
    pub fn location(&self) -> &Location {
        match self {
            Node::Tag(tag) => &tag.location,
            Node::Text(text) => &text.location,
            Node::Comment(comment) => &comment.location,
        }
    }
}

/// A named tag with optional attributes and child content.
#[derive(Debug, Clone, PartialEq)]
pub struct TagNode {
    pub name: String,
    pub attrs: Option<Attributes>,
    pub content: Option<Tree>,
    pub location: Location,
}

impl TagNode {
    pub fn new(name: impl Into<String>) -> Self {
        TagNode {
            name: name.into(),
            attrs: None,
            content: None,
            location: Location::default(),
        }
    }

    /// The value tree of an attribute, if the attribute is present.
    pub fn attr(&self, name: &str) -> Option<&Tree> {
        self.attrs.as_ref()?.get(name)
    }

    /// Whether the attribute is present at all, regardless of its value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Textual content of an attribute value's first node.
    ///
    /// Attribute values are mini content trees; plain `attr="value"` markup
    /// parses to a single text node, which is what this reads.
    pub fn attr_text(&self, name: &str) -> Option<&str> {
        match self.attr(name)?.first()? {
            Node::Text(text) => Some(&text.content),
            _ => None,
        }
    }
}

/// A run of character data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: String,
    pub location: Location,
}

/// A comment, preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub content: String,
    pub location: Location,
}

/// An ordered attribute map. Iteration order is document order; a value is
/// itself a `Tree` of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes(IndexMap<String, Tree>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(IndexMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Tree) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Tree)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Tree)>>(iter: I) -> Self {
        Attributes(iter.into_iter().collect())
    }
}

/// Where a node came from: 1-based line and column, plus the source file when
/// the parser was given one. Nodes parsed without a filename carry `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub filename: Option<PathBuf>,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Location {
            line,
            column,
            filename: None,
        }
    }

    pub fn in_file(line: u32, column: u32, filename: impl Into<PathBuf>) -> Self {
        Location {
            line,
            column,
            filename: Some(filename.into()),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new(1, 1)
    }
}
