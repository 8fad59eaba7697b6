//! Trimming of paragraph text wrongly attached after a figure caption.

use crate::model::{tokens_to_text, Block, LayoutToken, StructuralObject};
use serde::{Deserialize, Serialize};

/// Maximum distance between the caption block and a block kept with it
pub const CAPTION_PROXIMITY: f64 = 15.0;

/// Lower-cased starts of caption blocks, in the languages seen in practice
pub const CAPTION_PREFIXES: [&str; 8] = [
    "fig", "abb", "scheme", "photo", "gambar", "quadro", "wykres", "fuente",
];

/// Result of [`repair_caption_boundary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionRepair {
    /// Caption tokens followed by the tokens of the blocks kept with it
    pub kept_tokens: Vec<LayoutToken>,

    /// Blocks after the caption that belong to the surrounding text
    pub excluded_blocks: Vec<Block>,
}

fn overlaps_range(block: &Block, first: usize, last: usize) -> bool {
    match (block.tokens.first(), block.tokens.last()) {
        (Some(start), Some(end)) => start.offset <= last && end.offset >= first,
        _ => false,
    }
}

fn starts_like_caption(block: &Block) -> bool {
    let text = block.text().trim().to_lowercase();
    CAPTION_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Split the blocks after a figure's caption into blocks kept with the
/// caption and blocks returned to the paragraph flow.
///
/// Walking forward from the caption block, a block stays with the figure
/// while it lies within [`CAPTION_PROXIMITY`] of the previous block and its
/// non-blank text appears verbatim in the figure's text. The first block failing
/// either test and every block after it are excluded.
///
/// Returns `None` when no caption block can be found among the blocks
/// covering the figure's tokens.
pub fn repair_caption_boundary(figure: &StructuralObject, blocks: &[Block]) -> Option<CaptionRepair> {
    let first = figure.tokens.iter().map(|t| t.offset).min()?;
    let last = figure.tokens.iter().map(|t| t.offset).max()?;
    let figure_blocks: Vec<&Block> = blocks
        .iter()
        .filter(|b| overlaps_range(b, first, last))
        .collect();

    let caption = figure.caption_tokens();
    let caption_index = caption
        .first()
        .and_then(|token| figure_blocks.iter().position(|b| b.contains_offset(token.offset)))
        .or_else(|| figure_blocks.iter().position(|b| starts_like_caption(b)))?;

    let mut kept_tokens: Vec<LayoutToken> = if caption.is_empty() {
        figure_blocks[caption_index].tokens.clone()
    } else {
        caption.to_vec()
    };
    let figure_text = tokens_to_text(&figure.tokens);

    let mut previous = figure_blocks[caption_index];
    let mut following = figure_blocks[caption_index + 1..].iter();
    let mut excluded_blocks = Vec::new();
    for block in following.by_ref() {
        let close = match (previous.bbox, block.bbox) {
            (Some(a), Some(b)) => a.distance_to(&b) < CAPTION_PROXIMITY,
            _ => false,
        };
        let text = block.text();
        let text = text.trim();
        if close && !text.is_empty() && figure_text.contains(text) {
            kept_tokens.extend(block.tokens.iter().cloned());
            previous = *block;
        } else {
            excluded_blocks.push((*block).clone());
            break;
        }
    }
    excluded_blocks.extend(following.map(|b| (*b).clone()));

    log::debug!(
        "caption repair kept {} tokens, excluded {} blocks",
        kept_tokens.len(),
        excluded_blocks.len()
    );
    Some(CaptionRepair {
        kept_tokens,
        excluded_blocks,
    })
}
