use crate::models::{Node, Tree};

/// Removes every `block` wrapper from the tree, splicing each block's
/// content into its parent's child sequence at the block's position.
///
/// Blocks that were never overridden unwrap to their default content. This
/// pass has no failure modes.
pub fn unwrap_blocks(tree: Tree) -> Tree {
    let mut out = Vec::with_capacity(tree.len());
    for node in tree {
        match node {
            Node::Tag(mut tag) => {
                if let Some(content) = tag.content.take() {
                    tag.content = Some(unwrap_blocks(content));
                }
                if tag.name == "block" {
                    if let Some(content) = tag.content {
                        out.extend(content);
                    }
                } else {
                    out.push(Node::Tag(tag));
                }
            }
            other => out.push(other),
        }
    }
    out
}
