//! Read-only queries over the document tree.
//!
//! Everything here maps text ranges onto node boundaries: which child owns a
//! location, which leaves a range touches, which block-level element a
//! paragraph edit should operate on. The mutating editor is built entirely
//! on these lookups.
//!
//! Calling a query that assumes children on an element without any, or with
//! an out-of-bounds location, is a precondition violation and panics; those
//! are bugs in the caller, not recoverable conditions.

use crate::dom::document::Document;
use crate::dom::node::{NodeId, NodeKind};
use crate::range::TextRange;

/// One result of a lowest-block-level descent: either a block element owning
/// a sub-range, or a sub-range no descendant claimed (reported against the
/// element the query started from).
enum Piece {
    Match(NodeId, TextRange),
    NoMatch(TextRange),
}

/// Read-only tree navigation.
#[derive(Debug, Clone, Copy)]
pub struct Inspector<'a> {
    dom: &'a Document,
}

impl<'a> Inspector<'a> {
    pub fn new(dom: &'a Document) -> Self {
        Self { dom }
    }

    // MARK: - Parents and siblings

    /// The parent of a node that must have one.
    ///
    /// # Panics
    ///
    /// Panics when the node has no parent set.
    pub fn parent_of(&self, node: NodeId) -> NodeId {
        self.dom
            .parent(node)
            .expect("node unexpectedly has no parent")
    }

    pub fn left_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.dom.parent(node)?;
        let index = self.dom.index_of_child(parent, node);
        (index > 0).then(|| self.dom.children(parent)[index - 1])
    }

    pub fn right_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.dom.parent(node)?;
        let index = self.dom.index_of_child(parent, node);
        self.dom.children(parent).get(index + 1).copied()
    }

    // MARK: - Locating children by offset

    /// The child intersecting `location`, as `(child index, offset within
    /// the child)`.
    ///
    /// Location 0 always resolves to the first child. A location exactly on
    /// the boundary between two children resolves to the left one; this is
    /// the documented tie-break that decides where inserted content lands.
    ///
    /// # Panics
    ///
    /// Panics when the element has no children or `location` is out of
    /// bounds.
    pub fn child_intersecting(&self, element: NodeId, location: usize) -> (usize, usize) {
        let children = self.dom.children(element);
        assert!(
            !children.is_empty(),
            "child_intersecting called on an element without children"
        );
        if location == 0 {
            return (0, 0);
        }

        let mut adjusted = location;
        for (index, &child) in children.iter().enumerate() {
            let child_length = self.dom.length_of(child);
            if adjusted <= child_length {
                return (index, adjusted);
            }
            adjusted -= child_length;
        }

        panic!("location {location} is out of bounds");
    }

    /// The children intersecting `range`, with each intersection expressed
    /// in the child's local coordinates.
    ///
    /// For a zero-length range, a child counts as intersected when the
    /// location equals its start boundary, its end boundary, or falls
    /// strictly inside it; `prefer_left` disambiguates the boundary shared
    /// by two children (the exceptions being position 0, which always goes
    /// to the first child, and the end of the last child, which always goes
    /// to it).
    pub fn children_intersecting(
        &self,
        element: NodeId,
        range: TextRange,
        prefer_left: bool,
    ) -> Vec<(NodeId, TextRange)> {
        let children = self.dom.children(element);
        let mut results = Vec::new();
        let mut offset = 0;

        for (index, &child) in children.iter().enumerate() {
            let child_length = self.dom.length_of(child);
            let child_range = TextRange::new(offset, child_length);

            if range.is_empty() {
                let location = range.location;
                let prefer_left = prefer_left
                    || (index == children.len() - 1 && location == child_range.end());
                let prefer_right = !prefer_left || (index == 0 && location == 0);

                let intersects = (prefer_right && location == offset)
                    || (prefer_left && location == child_range.end())
                    || (location > offset && location < child_range.end());

                if intersects {
                    results.push((child, TextRange::caret(location - offset)));
                }
            } else if let Some(intersection) = range.intersection(child_range)
                && !intersection.is_empty()
            {
                results.push((child, intersection.shifted_left(offset)));
            }

            offset += child_length;
        }

        results
    }

    // MARK: - Block-level descent

    /// The lowest block-level descendants intersecting `range`.
    ///
    /// Descends into block-level children covering the range; any sub-range
    /// that no block-level descendant claims is reported against `element`
    /// itself. Intersections are in the reported node's local coordinates.
    pub fn lowest_block_level_descendants(
        &self,
        element: NodeId,
        range: TextRange,
    ) -> Vec<(NodeId, TextRange)> {
        self.lowest_blocks(element, range)
            .into_iter()
            .map(|piece| match piece {
                Piece::Match(node, intersection) => (node, intersection),
                Piece::NoMatch(intersection) => (element, intersection),
            })
            .collect()
    }

    fn lowest_blocks(&self, element: NodeId, range: TextRange) -> Vec<Piece> {
        let element_is_block = self.dom.node(element).is_block_level();
        let children = self.dom.children(element);
        let mut pieces = Vec::new();
        let mut pending: Option<TextRange> = None;
        let mut offset = 0;
        let mut previous_supplies_boundary = false;

        let flush = |pending: &mut Option<TextRange>, pieces: &mut Vec<Piece>| {
            if let Some(unclaimed) = pending.take() {
                if element_is_block {
                    pieces.push(Piece::Match(element, unclaimed));
                } else {
                    pieces.push(Piece::NoMatch(unclaimed));
                }
            }
        };

        for (index, &child) in children.iter().enumerate() {
            let child_length = self.dom.length_of(child);
            let child_range = TextRange::new(offset, child_length);

            // A child ending in a paragraph boundary of its own does not
            // own the caret position after that boundary; the next sibling
            // does.
            let supplies_boundary = self.dom.needs_closing_separator(child)
                || self.dom.node(child).is_comment();
            let owns_start = index == 0 || previous_supplies_boundary;
            let owns_end = index == children.len() - 1 || !supplies_boundary;
            if child_length > 0 {
                previous_supplies_boundary = supplies_boundary;
            }

            let local =
                match self.local_intersection(range, child_range, owns_start, owns_end) {
                    Some(local) => local,
                    None => {
                        offset += child_length;
                        continue;
                    }
                };

            let is_block_element = self.dom.node(child).is_block_level();
            if is_block_element {
                // A caret sitting on the child's own closing separator maps
                // to the end of its content.
                let local = if local.is_empty() {
                    TextRange::caret(local.location.min(self.dom.content_length(child)))
                } else {
                    local
                };
                for piece in self.lowest_blocks(child, local) {
                    match piece {
                        Piece::NoMatch(unclaimed) => {
                            extend(&mut pending, unclaimed.shifted_right(offset));
                        }
                        matched => {
                            flush(&mut pending, &mut pieces);
                            pieces.push(matched);
                        }
                    }
                }
            } else {
                extend(&mut pending, local.shifted_right(offset));
            }

            offset += child_length;
        }

        flush(&mut pending, &mut pieces);
        pieces
    }

    /// Intersection of `range` with a child's window, in child coordinates.
    /// Zero-length ranges resolve with left preference, except across a
    /// paragraph boundary: `owns_start`/`owns_end` say whether the child
    /// claims the caret sitting exactly on its start/end boundary.
    fn local_intersection(
        &self,
        range: TextRange,
        child_range: TextRange,
        owns_start: bool,
        owns_end: bool,
    ) -> Option<TextRange> {
        if range.is_empty() {
            let location = range.location;
            let hit = (owns_start && location == child_range.location)
                || (location > child_range.location && location < child_range.end())
                || (owns_end && location == child_range.end());
            return hit.then(|| TextRange::caret(location - child_range.location));
        }
        let intersection = range.intersection(child_range)?;
        (!intersection.is_empty()).then(|| intersection.shifted_left(child_range.location))
    }

    // MARK: - Leaves

    /// Every Text/Comment leaf intersected by `range`, in document order,
    /// with each intersection in the leaf's local coordinates.
    pub fn leaf_nodes_wrapping(&self, element: NodeId, range: TextRange) -> Vec<(NodeId, TextRange)> {
        let mut results = Vec::new();
        let mut offset = 0;

        for &child in self.dom.children(element) {
            let child_length = self.dom.length_of(child);
            let child_range = TextRange::new(offset, child_length);

            let intersects = if range.is_empty() {
                child_range.contains_location(range.location)
            } else {
                range
                    .intersection(child_range)
                    .is_some_and(|i| !i.is_empty())
            };

            if intersects {
                let intersection = range
                    .intersection(child_range)
                    .unwrap_or(TextRange::caret(range.location));
                match &self.dom.node(child).kind {
                    NodeKind::Text(_) | NodeKind::Comment(_) => {
                        results.push((child, intersection.shifted_left(offset)));
                    }
                    NodeKind::Element(_) | NodeKind::Root(_) => {
                        results.extend(
                            self.leaf_nodes_wrapping(child, intersection.shifted_left(offset)),
                        );
                    }
                }

                if range.end() <= child_range.end() {
                    break;
                }
            }

            offset += child_length;
        }

        results
    }

    /// Plain rendered text for a range below `element`.
    pub fn text_in_range(&self, element: NodeId, range: TextRange) -> String {
        let mut text = String::new();
        for (leaf, intersection) in self.leaf_nodes_wrapping(element, range) {
            let leaf_text = self.dom.text_of(leaf);
            if let Some(slice) = crate::range::slice_utf16(&leaf_text, intersection) {
                text.push_str(slice);
            }
        }
        text
    }

    // MARK: - Descendant search

    /// The deepest node whose rendered text ends exactly at `location`,
    /// skipping empty children.
    pub fn find_node_ending_at(&self, location: usize) -> Option<NodeId> {
        self.descendant_ending_at(self.dom.root(), location)
    }

    fn descendant_ending_at(&self, element: NodeId, location: usize) -> Option<NodeId> {
        let mut child_start = 0;

        for &child in self.dom.children(element) {
            let child_end = child_start + self.dom.length_of(child);

            // Ignore empty nodes.
            if child_start == child_end {
                continue;
            }

            if location == child_end {
                return Some(child);
            } else if location > child_start && location < child_end {
                return match self.dom.node(child).as_element() {
                    Some(_) => self.descendant_ending_at(child, location - child_start),
                    None => None,
                };
            }

            child_start = child_end;
        }

        None
    }

    /// The two siblings meeting at `location`: the node ending there and
    /// its right-hand neighbor, climbing ancestors until a neighbor exists.
    pub fn siblings_separated_at(&self, location: usize) -> Option<(NodeId, NodeId)> {
        let mut left = self.find_node_ending_at(location)?;
        loop {
            if let Some(right) = self.right_sibling(left) {
                return Some((left, right));
            }
            left = self.dom.parent(left)?;
        }
    }

    /// Depth-first, leftmost-preferring descent from `element` towards
    /// `location`, returning the first node matching `matches` together
    /// with the location expressed in that node's coordinates. The descent
    /// stops at the first match; the caller re-descends if it wants a finer
    /// one.
    pub fn leftmost_lowest_descendant_matching(
        &self,
        element: NodeId,
        location: usize,
        matches: &dyn Fn(NodeId) -> bool,
    ) -> Option<(NodeId, usize)> {
        let mut current = element;
        let mut offset = location;

        loop {
            if matches(current) {
                return Some((current, offset));
            }
            if self.dom.children(current).is_empty() {
                return None;
            }
            let (index, child_offset) = self.child_intersecting(current, offset);
            current = self.dom.children(current)[index];
            offset = child_offset;
        }
    }

    /// The lowest text node wholly wrapping `range`, with the range in the
    /// node's local coordinates.
    pub fn text_node_wrapping(&self, element: NodeId, range: TextRange) -> Option<(NodeId, TextRange)> {
        let mut offset = 0;

        for &child in self.dom.children(element) {
            let child_length = self.dom.length_of(child);
            let child_range = TextRange::new(offset, child_length);

            if child_range.contains(range) && !range.is_empty() {
                return match &self.dom.node(child).kind {
                    NodeKind::Text(_) => Some((child, range.shifted_left(offset))),
                    NodeKind::Element(_) => {
                        self.text_node_wrapping(child, range.shifted_left(offset))
                    }
                    _ => None,
                };
            }

            offset += child_length;
        }

        None
    }
}

fn extend(pending: &mut Option<TextRange>, range: TextRange) {
    *pending = Some(match pending.take() {
        Some(existing) => existing.union(range),
        None => range,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::builder::build_document;
    use crate::html::parse_html;

    fn dom_from(html: &str) -> Document {
        build_document(&parse_html(html))
    }

    #[test]
    fn child_intersecting_prefers_left_at_boundaries() {
        // <p> children: "ab" (0..2), <b>cd</b> (2..4)
        let dom = dom_from("<p>ab<b>cd</b></p>");
        let p = dom.children(dom.root())[0];
        let inspector = Inspector::new(&dom);

        assert_eq!(inspector.child_intersecting(p, 0), (0, 0));
        assert_eq!(inspector.child_intersecting(p, 1), (0, 1));
        // Exactly between the two children: the left one wins.
        assert_eq!(inspector.child_intersecting(p, 2), (0, 2));
        assert_eq!(inspector.child_intersecting(p, 3), (1, 1));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn child_intersecting_rejects_out_of_bounds() {
        let dom = dom_from("<p>ab</p>");
        let p = dom.children(dom.root())[0];
        Inspector::new(&dom).child_intersecting(p, 9);
    }

    #[test]
    fn children_intersecting_zero_length_boundary() {
        let dom = dom_from("<p>ab<b>cd</b></p>");
        let p = dom.children(dom.root())[0];
        let inspector = Inspector::new(&dom);

        let left = inspector.children_intersecting(p, TextRange::caret(2), true);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].0, dom.children(p)[0]);
        assert_eq!(left[0].1, TextRange::caret(2));

        let right = inspector.children_intersecting(p, TextRange::caret(2), false);
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].0, dom.children(p)[1]);
        assert_eq!(right[0].1, TextRange::caret(0));

        // Position zero always goes to the first child.
        let zero = inspector.children_intersecting(p, TextRange::caret(0), false);
        assert_eq!(zero[0].0, dom.children(p)[0]);
    }

    #[test]
    fn lowest_block_level_descendants_reports_paragraphs() {
        // "ab\u{2029}cd\u{2029}" — two paragraphs of length 3 each.
        let dom = dom_from("<p>ab</p><p>cd</p>");
        let inspector = Inspector::new(&dom);

        let found =
            inspector.lowest_block_level_descendants(dom.root(), TextRange::new(1, 4));
        assert_eq!(found.len(), 2);
        let p1 = dom.children(dom.root())[0];
        let p2 = dom.children(dom.root())[1];
        // The separator unit belongs to no child, so the first paragraph
        // only claims its intersected content.
        assert_eq!(found[0], (p1, TextRange::new(1, 1)));
        assert_eq!(found[1], (p2, TextRange::new(0, 2)));
    }

    #[test]
    fn lowest_block_level_descendants_caret_after_boundary_goes_right() {
        let dom = dom_from("<p>ab</p><p>cd</p>");
        let inspector = Inspector::new(&dom);
        let p2 = dom.children(dom.root())[1];

        // Caret at 3 sits after the first paragraph's separator: it belongs
        // to the second paragraph's start.
        let found = inspector.lowest_block_level_descendants(dom.root(), TextRange::caret(3));
        assert_eq!(found, vec![(p2, TextRange::caret(0))]);
    }

    #[test]
    fn lowest_block_level_descendants_unclaimed_range_maps_to_element() {
        // Root-level bare text has no block-level owner below the root.
        let dom = dom_from("plain");
        let inspector = Inspector::new(&dom);
        let found =
            inspector.lowest_block_level_descendants(dom.root(), TextRange::new(0, 5));
        assert_eq!(found, vec![(dom.root(), TextRange::new(0, 5))]);
    }

    #[test]
    fn leaf_nodes_wrapping_collects_in_document_order() {
        let dom = dom_from("<p>ab<b>cd</b>ef</p>");
        let inspector = Inspector::new(&dom);

        let leaves = inspector.leaf_nodes_wrapping(dom.root(), TextRange::new(1, 4));
        let texts: Vec<String> = leaves
            .iter()
            .map(|&(leaf, range)| {
                crate::range::slice_utf16(&dom.text_of(leaf), range)
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(texts, vec!["b", "cd", "e"]);
    }

    #[test]
    fn text_in_range_spans_leaves() {
        let dom = dom_from("<p>ab<b>cd</b>ef</p>");
        let inspector = Inspector::new(&dom);
        assert_eq!(inspector.text_in_range(dom.root(), TextRange::new(1, 4)), "bcde");
    }

    #[test]
    fn find_node_ending_at_descends() {
        let dom = dom_from("<p>ab</p><p>cd</p>");
        let inspector = Inspector::new(&dom);
        let p1 = dom.children(dom.root())[0];

        // Position 3 is the end of the first paragraph (content + separator).
        assert_eq!(inspector.find_node_ending_at(3), Some(p1));
        // Position 2 is the end of the text inside it.
        let text = dom.children(p1)[0];
        assert_eq!(inspector.find_node_ending_at(2), Some(text));
        assert_eq!(inspector.find_node_ending_at(1), None);
    }

    #[test]
    fn siblings_separated_at_climbs_to_a_neighbor() {
        let dom = dom_from("<p>ab</p><p>cd</p>");
        let inspector = Inspector::new(&dom);
        let p1 = dom.children(dom.root())[0];
        let p2 = dom.children(dom.root())[1];

        assert_eq!(inspector.siblings_separated_at(3), Some((p1, p2)));
        assert_eq!(inspector.siblings_separated_at(6), None);
    }

    #[test]
    fn leftmost_lowest_descendant_matching_stops_at_first_match() {
        let dom = dom_from("<p><b>ab</b></p>");
        let inspector = Inspector::new(&dom);
        let p = dom.children(dom.root())[0];
        let b = dom.children(p)[0];

        let found = inspector.leftmost_lowest_descendant_matching(dom.root(), 1, &|id| {
            dom.node(id).is_tag(crate::dom::tag::StandardTag::B)
        });
        assert_eq!(found, Some((b, 1)));

        let text = inspector
            .leftmost_lowest_descendant_matching(dom.root(), 1, &|id| dom.node(id).is_text());
        assert_eq!(text, Some((dom.children(b)[0], 1)));
    }

    #[test]
    fn text_node_wrapping_finds_the_lowest_wrapper() {
        let dom = dom_from("<p>ab<b>cd</b></p>");
        let inspector = Inspector::new(&dom);
        let p = dom.children(dom.root())[0];
        let b = dom.children(p)[1];
        let inner = dom.children(b)[0];

        assert_eq!(
            inspector.text_node_wrapping(dom.root(), TextRange::new(2, 2)),
            Some((inner, TextRange::new(0, 2)))
        );
        // A range spanning two nodes has no single wrapping text node.
        assert_eq!(inspector.text_node_wrapping(dom.root(), TextRange::new(1, 2)), None);
    }
}
