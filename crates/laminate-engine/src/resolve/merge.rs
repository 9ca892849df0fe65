use indexmap::IndexMap;
use std::collections::HashMap;

use crate::models::{Node, TagNode, Tree};

use super::ResolveError;

/// How a template block combines with the layout block it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BlockType {
    #[default]
    Replace,
    Prepend,
    Append,
}

impl BlockType {
    /// Reads a block's `type` attribute, case-insensitively. Unknown or
    /// absent values fall back to `Replace`.
    fn of(block: &TagNode) -> Self {
        match block
            .attr_text("type")
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("prepend") => BlockType::Prepend,
            Some("append") => BlockType::Append,
            _ => BlockType::Replace,
        }
    }

    fn combine(self, template: Tree, layout: Tree) -> Tree {
        match self {
            BlockType::Replace => template,
            BlockType::Prepend => {
                let mut merged = template;
                merged.extend(layout);
                merged
            }
            BlockType::Append => {
                let mut merged = layout;
                merged.extend(template);
                merged
            }
        }
    }
}

struct BlockRef<'t> {
    /// Position in block-visit order; ties the collection walk to the
    /// application walk over the same tree.
    visit: usize,
    tag: &'t TagNode,
}

/// Collects every `block` node in the tree by its `name` attribute.
///
/// The walk descends into a tag's content before examining the tag itself,
/// and a later same-named block overwrites an earlier entry while keeping
/// the earlier entry's map position. The shadowed occurrence is left alone
/// and keeps its default content.
fn collect_blocks(tree: &Tree) -> Result<IndexMap<String, BlockRef<'_>>, ResolveError> {
    fn walk<'t>(
        tree: &'t Tree,
        visit: &mut usize,
        out: &mut IndexMap<String, BlockRef<'t>>,
    ) -> Result<(), ResolveError> {
        for node in tree {
            let Node::Tag(tag) = node else { continue };
            if let Some(content) = &tag.content {
                walk(content, visit, out)?;
            }
            if tag.name != "block" {
                continue;
            }
            if !tag.has_attr("name") {
                return Err(ResolveError::MissingBlockName {
                    location: tag.location.clone(),
                });
            }
            let name = tag.attr_text("name").unwrap_or_default().to_string();
            let entry = BlockRef { visit: *visit, tag };
            *visit += 1;
            out.insert(name, entry);
        }
        Ok(())
    }

    let mut out = IndexMap::new();
    walk(tree, &mut 0, &mut out)?;
    Ok(out)
}

struct Override {
    block_type: BlockType,
    content: Tree,
}

/// Merges a resolved template tree into a resolved layout tree, filling the
/// layout's blocks from same-named template blocks.
///
/// Template nodes outside `block` wrappers are discarded; layout blocks with
/// no override keep their default content.
pub(crate) fn merge_extends_and_layout(
    mut layout: Tree,
    template: Tree,
) -> Result<Tree, ResolveError> {
    let layout_blocks = collect_blocks(&layout)?;
    let template_blocks = collect_blocks(&template)?;

    // A template block the layout never defines has nowhere to go.
    if let Some((name, block)) = template_blocks
        .iter()
        .find(|(name, _)| !layout_blocks.contains_key(name.as_str()))
    {
        return Err(ResolveError::UnmatchedTemplateBlock {
            name: name.clone(),
            location: block.tag.location.clone(),
        });
    }

    let winners: HashMap<String, usize> = layout_blocks
        .iter()
        .map(|(name, block)| (name.clone(), block.visit))
        .collect();
    let mut overrides: HashMap<String, Override> = template_blocks
        .iter()
        .map(|(name, block)| {
            let over = Override {
                block_type: BlockType::of(block.tag),
                content: block.tag.content.clone().unwrap_or_default(),
            };
            (name.clone(), over)
        })
        .collect();

    apply_overrides(&mut layout, &winners, &mut overrides, &mut 0);
    Ok(layout)
}

fn apply_overrides(
    tree: &mut Tree,
    winners: &HashMap<String, usize>,
    overrides: &mut HashMap<String, Override>,
    visit: &mut usize,
) {
    for node in tree {
        let Node::Tag(tag) = node else { continue };
        if let Some(content) = &mut tag.content {
            apply_overrides(content, winners, overrides, visit);
        }
        if tag.name != "block" {
            continue;
        }
        let index = *visit;
        *visit += 1;
        let name = tag.attr_text("name").unwrap_or_default();
        if winners.get(name) != Some(&index) {
            continue;
        }
        let Some(over) = overrides.remove(name) else {
            continue;
        };
        let existing = tag.content.take().unwrap_or_default();
        tag.content = Some(over.block_type.combine(over.content, existing));
    }
}
