//! # Page Break Decisions
//!
//! Deciding how much of a node fits at the bottom of a page. Text is
//! breakable between lines; everything else moves as a whole.

/// What to do with a node at its position on the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the entire node on the current page (it fits).
    Place,
    /// Move the entire node to the next page.
    MoveToNextPage,
    /// Place some lines here, continue on the next page.
    Split {
        /// How many lines fit on the current page.
        lines_on_current_page: usize,
    },
}

/// How many leading items fit into `remaining_height`.
pub fn fit_count(remaining_height: f64, heights: &[f64]) -> usize {
    let mut running = 0.0;
    let mut count = 0;
    for &h in heights {
        if running + h > remaining_height + 1e-9 {
            break;
        }
        running += h;
        count += 1;
    }
    count
}

/// Given the remaining space on a page and the heights of a node's lines
/// (a single entry for unbreakable nodes), decide how to break.
///
/// `min_orphan_lines` is the fewest lines worth leaving at the bottom of a
/// page, `min_widow_lines` the fewest worth carrying to the next one.
pub fn decide_break(
    remaining_height: f64,
    line_heights: &[f64],
    is_breakable: bool,
    min_orphan_lines: usize,
    min_widow_lines: usize,
) -> BreakDecision {
    let total: f64 = line_heights.iter().sum();
    if total <= remaining_height + 1e-9 {
        return BreakDecision::Place;
    }

    if !is_breakable {
        return BreakDecision::MoveToNextPage;
    }

    let fit = fit_count(remaining_height, line_heights);
    let total_lines = line_heights.len();

    // too few lines would stay behind
    if fit < min_orphan_lines && fit < total_lines {
        return BreakDecision::MoveToNextPage;
    }

    // too few lines would move on: pull some along
    let moved = total_lines - fit;
    if moved < min_widow_lines && moved > 0 {
        let adjusted = fit.saturating_sub(min_widow_lines - moved);
        if adjusted == 0 {
            return BreakDecision::MoveToNextPage;
        }
        return BreakDecision::Split {
            lines_on_current_page: adjusted,
        };
    }

    if fit == 0 {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        lines_on_current_page: fit,
    }
}
