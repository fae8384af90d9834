//! Vertical layout for single-elimination bracket columns.
//!
//! Matches are fixed-height boxes stacked in one column per round. Each round
//! holds half the matches of the previous one, so the gap between boxes has to
//! double (minus one box height) from round to round for the connector of
//! every sibling pair to meet exactly at the centre of the match it feeds:
//!
//! ```text
//!  gap(0)     = G0
//!  gap(r)     = (G0 + H) * 2^r - H        = 2 * gap(r-1) + H
//!  conn(r)    = (H + gap(r)) / 2
//!  offset(r)  = conn(0) + ... + conn(r-1)
//! ```
//!
//! Everything here is plain arithmetic on `f64`; nothing can fail.

use crate::bracket::Bracket;

/// Box height `H` and first-round gap `G0`, in whatever unit the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstants {
    pub box_height: f64,
    pub base_gap: f64,
}

impl LayoutConstants {
    /// Three-row match cards one blank row apart.
    pub const TERMINAL: Self = Self::new(3.0, 1.0);

    pub const fn new(box_height: f64, base_gap: f64) -> Self {
        Self { box_height, base_gap }
    }

    /// Centre-to-centre distance of adjacent first-round boxes.
    pub fn base_pitch(&self) -> f64 {
        self.box_height + self.base_gap
    }
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self::TERMINAL
    }
}

/// Vertical distance between consecutive boxes of `round` (closed form).
pub fn gap(c: LayoutConstants, round: usize) -> f64 {
    if round == 0 {
        return c.base_gap;
    }
    let exponent = i32::try_from(round).unwrap_or(i32::MAX);
    c.base_pitch() * 2f64.powi(exponent) - c.box_height
}

/// Same value as [`gap`], by iterating the recurrence.
pub fn gap_recursive(c: LayoutConstants, round: usize) -> f64 {
    (0..round).fold(c.base_gap, |g, _| 2.0 * g + c.box_height)
}

/// Half the centre-to-centre distance of adjacent boxes in `round`.
pub fn connector_height(c: LayoutConstants, round: usize) -> f64 {
    (c.box_height + gap(c, round)) / 2.0
}

/// Padding above the first box of `round`.
pub fn top_offset(c: LayoutConstants, round: usize) -> f64 {
    (0..round).fold(0.0, |offset, r| offset + connector_height(c, r))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundLayout {
    pub gap: f64,
    pub connector_height: f64,
    pub top_offset: f64,
}

impl RoundLayout {
    /// Distance between the tops of consecutive boxes.
    pub fn pitch(&self, c: LayoutConstants) -> f64 {
        c.box_height + self.gap
    }
}

/// Layout numbers for a single round. O(round) because of the offset sum.
pub fn compute_layout(round: usize, c: LayoutConstants) -> RoundLayout {
    RoundLayout {
        gap: gap(c, round),
        connector_height: connector_height(c, round),
        top_offset: top_offset(c, round),
    }
}

/// Layout numbers for rounds `0..count`, accumulating the offset as it goes.
pub fn layout_rounds(c: LayoutConstants, count: usize) -> Vec<RoundLayout> {
    let mut offset = 0.0;
    (0..count)
        .map(|round| {
            let layout = RoundLayout {
                gap: gap(c, round),
                connector_height: connector_height(c, round),
                top_offset: offset,
            };
            offset += layout.connector_height;
            layout
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-match placement
// ---------------------------------------------------------------------------

/// Which way a match's outgoing connector bends to reach its sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorDirection {
    Down,
    Up,
}

impl ConnectorDirection {
    /// Even-indexed matches are the upper sibling and bend down.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Down } else { Self::Up }
    }

    /// Sign along a y axis that grows downward.
    pub fn sign(self) -> f64 {
        match self {
            Self::Down => 1.0,
            Self::Up => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub direction: ConnectorDirection,
    pub length: f64,
    /// y where this connector meets its sibling's.
    pub merge_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPlacement {
    pub round: usize,
    pub index: usize,
    pub top: f64,
    pub center: f64,
    pub height: f64,
    /// `None` in the last round.
    pub outgoing: Option<Connector>,
    /// Whether a stub enters from the previous round.
    pub incoming: bool,
}

impl MatchPlacement {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Placement of every match of a bracket with the given shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketLayout {
    constants: LayoutConstants,
    rounds: Vec<RoundLayout>,
    matches: Vec<Vec<MatchPlacement>>,
}

impl BracketLayout {
    /// `shape[r]` is the match count of round `r`. The shape is taken as is;
    /// halving is enforced by [`Bracket::new`], not here.
    pub fn new(constants: LayoutConstants, shape: &[usize]) -> Self {
        let rounds = layout_rounds(constants, shape.len());
        let last = shape.len().saturating_sub(1);

        let matches = shape
            .iter()
            .zip(&rounds)
            .enumerate()
            .map(|(round, (&count, layout))| {
                let pitch = layout.pitch(constants);
                (0..count)
                    .map(|index| {
                        let top = layout.top_offset + index as f64 * pitch;
                        let center = top + constants.box_height / 2.0;
                        let outgoing = (round < last).then(|| {
                            let direction = ConnectorDirection::for_index(index);
                            Connector {
                                direction,
                                length: layout.connector_height,
                                merge_y: center + direction.sign() * layout.connector_height,
                            }
                        });
                        MatchPlacement {
                            round,
                            index,
                            top,
                            center,
                            height: constants.box_height,
                            outgoing,
                            incoming: round > 0,
                        }
                    })
                    .collect()
            })
            .collect();

        Self { constants, rounds, matches }
    }

    /// `None` for a bracket with no rounds.
    pub fn for_bracket(bracket: &Bracket, constants: LayoutConstants) -> Option<Self> {
        if bracket.is_empty() {
            return None;
        }
        Some(Self::new(constants, &bracket.shape()))
    }

    pub fn constants(&self) -> LayoutConstants {
        self.constants
    }

    pub fn rounds(&self) -> &[RoundLayout] {
        &self.rounds
    }

    pub fn placements(&self, round: usize) -> &[MatchPlacement] {
        self.matches.get(round).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn placement(&self, round: usize, index: usize) -> Option<&MatchPlacement> {
        self.matches.get(round)?.get(index)
    }

    /// Bottom edge of the lowest box.
    pub fn total_height(&self) -> f64 {
        self.matches
            .iter()
            .flatten()
            .map(MatchPlacement::bottom)
            .fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: LayoutConstants = LayoutConstants::new(112.0, 32.0);

    #[test]
    fn test_gaps_double_plus_box_height() {
        assert_eq!(gap(WEB, 0), 32.0);
        assert_eq!(gap(WEB, 1), 176.0);
        assert_eq!(gap(WEB, 2), 464.0);
    }

    #[test]
    fn test_connectors_and_offsets() {
        assert_eq!(connector_height(WEB, 0), 72.0);
        assert_eq!(connector_height(WEB, 1), 144.0);
        assert_eq!(top_offset(WEB, 0), 0.0);
        assert_eq!(top_offset(WEB, 1), 72.0);
        assert_eq!(top_offset(WEB, 2), 216.0);
    }

    #[test]
    fn test_closed_form_matches_doubling() {
        let mut manual = WEB.base_gap;
        for _ in 0..3 {
            manual = manual * 2.0 + WEB.box_height;
        }
        assert_eq!(gap(WEB, 3), manual);
        assert_eq!(gap_recursive(WEB, 3), manual);
    }

    #[test]
    fn test_compute_layout_agrees_with_precomputed_rounds() {
        let rounds = layout_rounds(WEB, 5);
        for (r, layout) in rounds.iter().enumerate() {
            assert_eq!(*layout, compute_layout(r, WEB));
        }
    }

    #[test]
    fn test_terminal_rows_match_slot_heights() {
        // 3-row boxes, 1-row gap: first-round centres 1, 5, 9...; second 3, 11...
        let layout = BracketLayout::new(LayoutConstants::TERMINAL, &[8, 4, 2, 1]);
        let centers = |r: usize| -> Vec<f64> {
            layout.placements(r).iter().map(|p| (p.center).floor()).collect()
        };
        assert_eq!(centers(0), vec![1.0, 5.0, 9.0, 13.0, 17.0, 21.0, 25.0, 29.0]);
        assert_eq!(centers(1), vec![3.0, 11.0, 19.0, 27.0]);
        assert_eq!(centers(2), vec![7.0, 23.0]);
        assert_eq!(centers(3), vec![15.0]);
        assert_eq!(layout.total_height(), 31.0);
    }

    #[test]
    fn test_siblings_merge_at_parent_center() {
        let layout = BracketLayout::new(WEB, &[8, 4, 2, 1]);
        for r in 0..3 {
            for parent in layout.placements(r + 1) {
                let upper = layout.placement(r, 2 * parent.index).unwrap();
                let lower = layout.placement(r, 2 * parent.index + 1).unwrap();
                let up = upper.outgoing.unwrap();
                let down = lower.outgoing.unwrap();
                assert_eq!(up.direction, ConnectorDirection::Down);
                assert_eq!(down.direction, ConnectorDirection::Up);
                assert_eq!(up.merge_y, parent.center);
                assert_eq!(down.merge_y, parent.center);
            }
        }
    }

    #[test]
    fn test_final_has_no_outgoing_and_first_no_incoming() {
        let layout = BracketLayout::new(WEB, &[2, 1]);
        assert!(layout.placements(0).iter().all(|p| p.outgoing.is_some() && !p.incoming));
        let final_match = layout.placement(1, 0).unwrap();
        assert!(final_match.outgoing.is_none());
        assert!(final_match.incoming);
    }

    #[test]
    fn test_empty_bracket_has_no_layout() {
        // Nothing to lay out before the bracket is generated.
        assert!(BracketLayout::for_bracket(&Bracket::empty(), WEB).is_none());
        assert_eq!(BracketLayout::new(WEB, &[]).total_height(), 0.0);
    }
}
