//! The layout engine.
//!
//! A [`Layout`] is a named tiling policy.  Given a window's tiling index,
//! the bounds of its display and a few tuning knobs ([`LayoutParams`]), it
//! computes the rectangle that window should occupy.  Every strategy is a
//! pure function: no state, no side effects, same output for the same
//! input.
//!
//! Index `0` is always the *primary* slot.  Uniform strategies treat it
//! like any other window; the others give it an emphasised region whose
//! size is scaled by [`LayoutParams::primary_factor`].
//!
//! Row variants are never written out by hand.  They run the matching
//! column strategy inside a transposed coordinate space (see
//! [`Rect::transpose`]) and transpose the result back.

use crate::command::Step;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tuning knobs shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Number of windows being tiled on the display.
    pub count: usize,
    /// Gap between adjacent tiles and between a tile and the bounds edge.
    pub margin: f64,
    /// Reserved for multi-primary layouts; no strategy reads it yet.
    pub primary_count: usize,
    /// Multiplier on the primary slot's share of the split axis.
    pub primary_factor: f64,
}

impl LayoutParams {
    pub fn new(count: usize, margin: f64, primary_count: usize, primary_factor: f64) -> Self {
        Self {
            count,
            margin,
            primary_count,
            primary_factor,
        }
    }

    /// Parameters for a uniform sub-layout of `count` windows, used when a
    /// strategy hands part of its bounds to another strategy.
    fn uniform(&self, count: usize) -> Self {
        Self {
            count,
            margin: self.margin,
            primary_count: 0,
            primary_factor: 1.0,
        }
    }
}

/// Signature shared by all strategy functions.
type Strategy = fn(usize, Rect, &LayoutParams) -> Rect;

/// Every registered tiling strategy, in registration order.
///
/// The order matters: it is the cycling order of `next-layout` /
/// `prev-layout`, and the first entry is the default for new displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    EqualColumns,
    EqualRows,
    PrimaryColumns,
    PrimaryRows,
    CenterPrimarySideRows,
    LeftPrimaryRightRows,
    AlternatingSplits,
}

impl Layout {
    /// The registry, in cycling order.
    pub const ALL: [Layout; 7] = [
        Layout::EqualColumns,
        Layout::EqualRows,
        Layout::PrimaryColumns,
        Layout::PrimaryRows,
        Layout::CenterPrimarySideRows,
        Layout::LeftPrimaryRightRows,
        Layout::AlternatingSplits,
    ];

    /// Registry key, as used in config files and `layout <name>` commands.
    pub fn name(self) -> &'static str {
        match self {
            Layout::EqualColumns => "equal_columns",
            Layout::EqualRows => "equal_rows",
            Layout::PrimaryColumns => "primary_columns",
            Layout::PrimaryRows => "primary_rows",
            Layout::CenterPrimarySideRows => "center_primary_side_rows",
            Layout::LeftPrimaryRightRows => "left_primary_right_rows",
            Layout::AlternatingSplits => "alternating_splits",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Layout::EqualColumns => "Equal Columns",
            Layout::EqualRows => "Equal Rows",
            Layout::PrimaryColumns => "Primary Columns",
            Layout::PrimaryRows => "Primary Rows",
            Layout::CenterPrimarySideRows => "Center primary, side rows",
            Layout::LeftPrimaryRightRows => "Left primary, right rows",
            Layout::AlternatingSplits => "Alternating horizontal/vertical splits",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Layout::EqualColumns => "All windows share the space horizontally.",
            Layout::EqualRows => "All windows share the space vertically.",
            Layout::PrimaryColumns => {
                "All windows share the space horizontally, the primary one gets a wider column."
            }
            Layout::PrimaryRows => {
                "All windows share the space vertically, the primary one gets a taller row."
            }
            Layout::CenterPrimarySideRows => {
                "The primary window sits in the center; the others stack in rows on both sides."
            }
            Layout::LeftPrimaryRightRows => {
                "The primary window sits on the left; the others stack in rows on the right."
            }
            Layout::AlternatingSplits => {
                "Splits the space horizontally, then vertically, and so on recursively."
            }
        }
    }

    /// Look up a strategy by its registry key (case-insensitive).
    pub fn from_name(name: &str) -> Option<Layout> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }

    /// Position of this strategy in [`Layout::ALL`].
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|l| *l == self)
            .unwrap_or_default()
    }

    /// The neighbouring strategy in registry order, wrapping at both ends.
    pub fn cycle(self, step: Step) -> Layout {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + step.offset()).rem_euclid(len);
        Self::ALL[next as usize]
    }

    /// Compute the rectangle for the window at tiling `index` inside
    /// `bounds`.
    ///
    /// `index` is expected in `0..params.count`.
    pub fn place(self, index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
        let strategy: Strategy = match self {
            Layout::EqualColumns => equal_columns,
            Layout::EqualRows => equal_rows,
            Layout::PrimaryColumns => primary_columns,
            Layout::PrimaryRows => primary_rows,
            Layout::CenterPrimarySideRows => center_primary_side_rows,
            Layout::LeftPrimaryRightRows => left_primary_right_rows,
            Layout::AlternatingSplits => alternating_splits,
        };
        strategy(index, bounds, params)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//  Strategies

/// Run `strategy` with the axes swapped.
fn transposed(strategy: Strategy, index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    strategy(index, bounds.transpose(), params).transpose()
}

fn equal_columns(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    let margin = params.margin;
    let n = params.count as f64;
    let width = if params.count > 1 {
        (bounds.width - (n + 1.0) * margin) / n
    } else {
        bounds.width - 2.0 * margin
    };
    Rect {
        top: bounds.top + margin,
        left: bounds.left + margin + index as f64 * (width + margin),
        width,
        height: bounds.height - 2.0 * margin,
    }
}

fn equal_rows(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    transposed(equal_columns, index, bounds, params)
}

fn primary_columns(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    let margin = params.margin;
    if params.count <= 1 {
        return bounds.deflate(margin);
    }

    let n = params.count as f64;
    let primary_space = bounds.width / n * params.primary_factor;
    let primary_width = primary_space - 2.0 * margin;
    let width = (bounds.width - primary_width - (n + 1.0) * margin) / (n - 1.0);
    // floor(count / 2 - 1), with count >= 2
    let primary_position = params.count / 2 - 1;

    let (left, width) = if index == 0 {
        (
            margin + primary_position as f64 * (width + margin),
            primary_width,
        )
    } else if index > primary_position {
        ((index - 1) as f64 * (width + margin) + primary_space, width)
    } else {
        (margin + (index - 1) as f64 * (width + margin), width)
    };

    Rect {
        top: bounds.top + margin,
        left: bounds.left + left,
        width,
        height: bounds.height - 2.0 * margin,
    }
}

fn primary_rows(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    transposed(primary_columns, index, bounds, params)
}

fn center_primary_side_rows(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    let margin = params.margin;
    let primary_space = bounds.width / 3.0 * params.primary_factor;
    let side = (bounds.width - primary_space) / 2.0 - 2.0 * margin;

    if index == 0 {
        return Rect {
            top: bounds.top + margin,
            left: bounds.left + side + 3.0 * margin,
            width: primary_space - 2.0 * margin,
            height: bounds.height - 2.0 * margin,
        };
    }

    // The left column takes ceil((count - 1) / 2) windows, the right one
    // the rest.
    let left_count = params.count / 2;
    let right_count = params.count.saturating_sub(1) / 2;
    let side_width = bounds.width - primary_space - side - margin;

    if index <= left_count {
        let column = Rect {
            top: bounds.top,
            left: bounds.left,
            width: side_width,
            height: bounds.height,
        };
        equal_rows(index - 1, column, &params.uniform(left_count))
    } else {
        let column = Rect {
            top: bounds.top,
            left: bounds.left + margin + side + primary_space,
            width: side_width,
            height: bounds.height,
        };
        equal_rows(index - left_count - 1, column, &params.uniform(right_count))
    }
}

fn left_primary_right_rows(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    let margin = params.margin;
    let primary_space = bounds.width / 2.0 * params.primary_factor;
    let primary_width = primary_space - 2.0 * margin;

    if index == 0 {
        return Rect {
            top: bounds.top + margin,
            left: bounds.left + margin,
            width: primary_width,
            height: bounds.height - 2.0 * margin,
        };
    }

    // The column starts one margin early: its own inset restores the gap.
    let column = Rect {
        top: bounds.top,
        left: bounds.left + primary_width + margin,
        width: bounds.width - primary_space + margin,
        height: bounds.height,
    };
    equal_rows(
        index - 1,
        column,
        &params.uniform(params.count.saturating_sub(1)),
    )
}

fn alternating_splits(index: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    split_at_depth(index, 0, bounds, params)
}

/// One level of the alternating split.
///
/// `bounds` is always expressed in the level's own coordinate space, where
/// the cut runs along `width`.  Odd depths are transposed relative to the
/// display, so each level cuts across the previous one.
///
/// The cut is kept inside the level's margin-inset area.  Once a level is
/// too small for another slot, its windows shrink to zero size instead of
/// spilling out of the display.
fn split_at_depth(index: usize, depth: usize, bounds: Rect, params: &LayoutParams) -> Rect {
    let margin = params.margin;
    let inner = bounds.deflate(margin).saturate();
    let cut = (bounds.left + bounds.width / 2.0 * params.primary_factor)
        .min(inner.right())
        .max(inner.left);

    if index <= depth {
        // The last window takes whatever is left.
        if index + 1 >= params.count {
            return inner;
        }
        return Rect {
            width: (cut - margin - inner.left).max(0.0),
            ..inner
        };
    }

    // The remainder starts one margin before the cut: its own inset
    // restores the gap.
    let rest = Rect {
        top: bounds.top,
        left: cut - margin,
        width: bounds.right() - cut + margin,
        height: bounds.height,
    };
    split_at_depth(index, depth + 1, rest.transpose(), params).transpose()
}

//  Tests
