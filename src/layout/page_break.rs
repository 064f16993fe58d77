//! # Page Break Decisions
//!
//! The single rule every renderer uses to decide whether a measured block
//! goes on the current page, moves to a fresh page, or is split across
//! pages. Keeping it pure makes the "would this overflow?" question
//! testable without a rendering surface.
//!
//! The rules, in order:
//! 1. If the whole block fits in the remaining space, place it.
//! 2. If it does not fit and the cursor is below the top of its page, move
//!    the whole block to a fresh page. Blocks never start mid-page and
//!    then spill over.
//! 3. At the top of a page there is nowhere better to go. Unbreakable
//!    blocks are placed anyway (and may overflow the bottom bound);
//!    breakable blocks are split after as many items as fit, always at
//!    least one so layout makes progress.

/// What to do with a measured block at the current cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire block here.
    Place,
    /// Start a new page and place the block there.
    MoveToNextPage,
    /// Place the first items here and continue on a new page.
    Split {
        /// How many items (lines, rows) go on the current page.
        items_on_current_page: usize,
    },
}

/// Decide how to place a block made of `item_heights` when
/// `remaining_height` is left on the page.
pub fn decide_break(
    remaining_height: f64,
    at_page_top: bool,
    item_heights: &[f64],
    is_breakable: bool,
) -> BreakDecision {
    let total: f64 = item_heights.iter().sum();

    if total <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    if !at_page_top {
        return BreakDecision::MoveToNextPage;
    }

    if !is_breakable || item_heights.len() <= 1 {
        return BreakDecision::Place;
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in item_heights {
        if running + h > remaining_height + EPSILON {
            break;
        }
        running += h;
        fit_count += 1;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count.max(1),
    }
}

/// Tolerance for floating point accumulation in heights.
pub(crate) const EPSILON: f64 = 1e-6;
