//! Extends resolution: the recursive walk that loads referenced layouts,
//! merges template blocks into them, and flattens the result.

mod merge;
mod unwrap;

pub use unwrap::unwrap_blocks;

use relative_path::RelativePath;
use std::path::{Path, PathBuf};

use crate::io::{Encoding, LayoutLoader, LoadError};
use crate::models::{Location, Node, TagNode, Tree};
use crate::parsing::{ParseError, TemplateParser};

/// Identifier host pipelines can use to label errors from this engine.
pub const PLUGIN_NAME: &str = "laminate";

/// Per-call configuration. Construct one per resolution; defaults are
/// computed once at entry and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Base directory for resolving layout `src` paths. Defaults to the
    /// directory of the document being processed, else `"."`.
    pub root: Option<PathBuf>,
    /// Text encoding used when reading layout files.
    pub encoding: Encoding,
}

/// Collaborators supplied by the host pipeline for one resolution run.
pub struct ResolveContext<'a> {
    /// Path of the document being processed, when known. Used for the root
    /// default and as the `parent` of top-level dependency edges.
    pub filename: Option<PathBuf>,
    pub parser: &'a dyn TemplateParser,
    pub loader: &'a dyn LayoutLoader,
    /// `Some` enables dependency tracking; one entry is appended per
    /// resolved layout edge.
    pub dependencies: Option<Vec<Dependency>>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(parser: &'a dyn TemplateParser, loader: &'a dyn LayoutLoader) -> Self {
        ResolveContext {
            filename: None,
            parser,
            loader,
            dependencies: None,
        }
    }
}

/// A resolved layout edge: `file` was loaded on behalf of `parent`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub file: PathBuf,
    /// The document that directly referenced the layout; `None` when that
    /// document itself had no known path.
    pub parent: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Extends tag has no 'src' attribute")]
    MissingSourceAttribute { location: Location },
    #[error("'block' element is missing a 'name' attribute")]
    MissingBlockName { location: Location },
    #[error("Block {name:?} doesn't exist in the layout template")]
    UnmatchedTemplateBlock { name: String, location: Location },
    #[error("Inheritance cycle detected while resolving {path}")]
    CyclicInheritance { path: PathBuf, location: Location },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ResolveError {
    /// Stable identifier for hosts that label errors by originating plugin.
    pub fn plugin(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// The node location the failure is anchored to, when known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ResolveError::MissingSourceAttribute { location }
            | ResolveError::MissingBlockName { location }
            | ResolveError::UnmatchedTemplateBlock { location, .. }
            | ResolveError::CyclicInheritance { location, .. } => Some(location),
            ResolveError::Load(_) => None,
            ResolveError::Parse(err) => err.location.as_ref(),
        }
    }
}

/// Resolves every `extends` chain in the tree, then strips the leftover
/// block markers, yielding a single flattened tree with no residual
/// inheritance nodes.
pub fn resolve_layouts(
    tree: Tree,
    options: &ResolveOptions,
    ctx: &mut ResolveContext<'_>,
) -> Result<Tree, ResolveError> {
    let filename = ctx.filename.clone();
    let root = options
        .root
        .clone()
        .or_else(|| {
            filename
                .as_deref()
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));

    let mut resolver = Resolver {
        root,
        encoding: options.encoding,
        parser: ctx.parser,
        loader: ctx.loader,
        dependencies: ctx.dependencies.as_mut(),
        in_progress: Vec::new(),
    };
    let resolved = resolver.resolve_tree(tree, filename.as_deref())?;
    Ok(unwrap::unwrap_blocks(resolved))
}

struct Resolver<'a> {
    root: PathBuf,
    encoding: Encoding,
    parser: &'a dyn TemplateParser,
    loader: &'a dyn LayoutLoader,
    dependencies: Option<&'a mut Vec<Dependency>>,
    /// Layout paths currently being resolved, outermost first.
    in_progress: Vec<PathBuf>,
}

impl Resolver<'_> {
    fn resolve_tree(
        &mut self,
        tree: Tree,
        current_file: Option<&Path>,
    ) -> Result<Tree, ResolveError> {
        let mut out = Vec::with_capacity(tree.len());
        for node in tree {
            match node {
                Node::Tag(tag) if tag.name == "extends" => {
                    out.extend(self.expand_extends(tag, current_file)?);
                }
                Node::Tag(mut tag) => {
                    if let Some(content) = tag.content.take() {
                        tag.content = Some(self.resolve_tree(content, current_file)?);
                    }
                    out.push(Node::Tag(tag));
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    /// Expands one `extends` node into the merged layout nodes that take
    /// its place. One node becomes zero or more siblings.
    fn expand_extends(
        &mut self,
        tag: TagNode,
        current_file: Option<&Path>,
    ) -> Result<Tree, ResolveError> {
        if !tag.has_attr("src") {
            return Err(ResolveError::MissingSourceAttribute {
                location: tag.location,
            });
        }
        let src = tag.attr_text("src").unwrap_or_default().to_string();
        let layout_path = RelativePath::new(&src).normalize().to_path(&self.root);

        if self.in_progress.contains(&layout_path) {
            return Err(ResolveError::CyclicInheritance {
                path: layout_path,
                location: tag.location,
            });
        }

        let source = self.loader.load(&layout_path, self.encoding)?;
        let parsed = self.parser.parse(&source, Some(&layout_path))?;

        // The layout's own extends chain resolves fully before the merge;
        // the stack entry is what catches chains that loop back here.
        self.in_progress.push(layout_path.clone());
        let layout = self.resolve_tree(parsed, Some(&layout_path));
        self.in_progress.pop();
        let layout = layout?;

        let template = match tag.content {
            Some(content) => self.resolve_tree(content, current_file)?,
            None => Tree::new(),
        };

        if let Some(dependencies) = self.dependencies.as_deref_mut() {
            dependencies.push(Dependency {
                file: layout_path,
                parent: current_file.map(Path::to_path_buf),
            });
        }

        merge::merge_extends_and_layout(layout, template)
    }
}
