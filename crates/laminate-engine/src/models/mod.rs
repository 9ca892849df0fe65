pub mod node;

pub use node::{Attributes, CommentNode, Location, Node, TagNode, TextNode, Tree};
