pub mod io;
pub mod models;
pub mod parsing;
pub mod resolve;

// Re-export the key types so hosts can use the crate root directly
pub use io::{Encoding, FsLoader, InMemoryLoader, LayoutLoader, LoadError};
pub use models::{Attributes, CommentNode, Location, Node, TagNode, TextNode, Tree};
pub use parsing::{ParseError, TemplateParser};
pub use resolve::{
    Dependency, PLUGIN_NAME, ResolveContext, ResolveError, ResolveOptions, resolve_layouts,
    unwrap_blocks,
};
