//! Structural edit operations on the document tree.
//!
//! Every operation here is built on the [`Inspector`] lookups and the
//! low-level child-list mutators of [`Document`], and restores the
//! parent/child invariant before returning. Host-supplied ranges are
//! validated at the public entry points; once an operation is underway,
//! inconsistencies mean the tree was already broken and panic.

use tracing::{debug, warn};

use crate::dom::attribute::Attribute;
use crate::dom::document::Document;
use crate::dom::inspector::Inspector;
use crate::dom::node::{ElementData, NodeId, NodeKind};
use crate::dom::tag::chars::PARAGRAPH_SEPARATOR;
use crate::dom::tag::{StandardTag, tags_equivalent};
use crate::error::{Error, Result};
use crate::range::{TextRange, byte_offset, utf16_len};

/// Tunable edit behavior for the documented tie-break policies.
///
/// One policy is fixed rather than tunable: embedded objects (images,
/// rules, comments) interrupt inline-style continuity. Style runs carrying
/// one never merge with their neighbors, and wrap operations never absorb
/// across one.
#[derive(Debug, Clone)]
pub struct EditPolicy {
    /// At a zero-length insertion point sitting exactly between two nodes,
    /// prefer the left node. Position 0 always resolves to the leftmost
    /// node regardless of this setting.
    pub prefer_left: bool,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self { prefer_left: true }
    }
}

/// A description of an element to create: tag name, attributes, and the
/// equivalent names that should be treated as already providing it.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Names considered equivalent to `name` for matching and merging.
    pub matching_names: Vec<String>,
}

impl ElementDescriptor {
    pub fn new(tag: StandardTag) -> Self {
        Self {
            name: tag.name().to_string(),
            attributes: Vec::new(),
            matching_names: tag
                .equivalent_names()
                .iter()
                .map(|n| n.to_string())
                .collect(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let matching_names = match StandardTag::from_name(&name) {
            Some(tag) => tag.equivalent_names().iter().map(|n| n.to_string()).collect(),
            None => vec![name.clone()],
        };
        Self {
            name,
            attributes: Vec::new(),
            matching_names,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn is_block_level(&self) -> bool {
        StandardTag::from_name(&self.name).is_some_and(|tag| tag.is_block_level())
    }

    /// Whether an element named `name` counts as this kind of element.
    pub fn matches(&self, name: &str) -> bool {
        self.matching_names
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
            || tags_equivalent(&self.name, name)
    }

    fn to_element_data(&self) -> ElementData {
        ElementData::with_attributes(self.name.clone(), self.attributes.clone())
    }
}

/// Mutating edit operations over a document.
pub struct Editor<'a> {
    dom: &'a mut Document,
    policy: EditPolicy,
}

impl<'a> Editor<'a> {
    pub fn new(dom: &'a mut Document) -> Self {
        Self {
            dom,
            policy: EditPolicy::default(),
        }
    }

    pub fn with_policy(dom: &'a mut Document, policy: EditPolicy) -> Self {
        Self { dom, policy }
    }

    fn inspector(&self) -> Inspector<'_> {
        Inspector::new(self.dom)
    }

    fn check_range(&self, range: TextRange) -> Result<()> {
        let length = self.dom.length_of(self.dom.root());
        if range.end() > length {
            return Err(Error::InvalidRange { range, length });
        }
        Ok(())
    }

    // MARK: - Inserting text

    /// Insert `text` at `location`.
    ///
    /// Paragraph-separator characters in `text` split it into
    /// sub-paragraphs; each boundary forces a structural split of the
    /// enclosing block element unless the insertion point already sits on a
    /// paragraph boundary. Plain substrings merge into an adjacent text
    /// node when one exists next to the insertion point.
    pub fn insert_text(&mut self, text: &str, location: usize) -> Result<()> {
        self.check_range(TextRange::caret(location))?;
        if text.is_empty() {
            return Ok(());
        }
        debug!(location, len = text.len(), "insert text");

        let parts: Vec<&str> = text.split(PARAGRAPH_SEPARATOR).collect();
        let mut cursor = location;
        for (index, part) in parts.iter().enumerate() {
            if !part.is_empty() {
                self.insert_plain(part, cursor);
                cursor += utf16_len(part);
            }
            if index < parts.len() - 1 {
                cursor = self.ensure_paragraph_boundary(cursor);
            }
        }
        Ok(())
    }

    /// Insert separator-free text at `location`, merging into neighboring
    /// text nodes where possible.
    fn insert_plain(&mut self, text: &str, location: usize) {
        let (element, local) = self.block_owner(location);
        self.insert_in_element(element, local, text);
    }

    fn block_owner(&self, location: usize) -> (NodeId, usize) {
        let owners = self
            .inspector()
            .lowest_block_level_descendants(self.dom.root(), TextRange::caret(location));
        match owners.first() {
            Some(&(element, intersection)) => (element, intersection.location),
            // An empty document has no children to claim the caret; the
            // root owns it.
            None => (self.dom.root(), location),
        }
    }

    fn insert_in_element(&mut self, element: NodeId, local: usize, text: &str) {
        if self.dom.children(element).is_empty() {
            let node = self.dom.new_text(text);
            self.dom.append_child(element, node);
            return;
        }

        let (index, child_local) = self.inspector().child_intersecting(element, local);
        let child = self.dom.children(element)[index];

        let insertion_index = if child_local == 0 {
            index
        } else {
            if child_local < self.dom.length_of(child) {
                self.split(child, child_local);
            }
            index + 1
        };

        self.insert_string_at_index(element, insertion_index, text);
    }

    /// Insert a string at a child index, absorbing into an adjacent text
    /// node sibling when one exists.
    fn insert_string_at_index(&mut self, element: NodeId, index: usize, text: &str) {
        let children = self.dom.children(element);
        let previous = index.checked_sub(1).map(|i| children[i]);
        let next = children.get(index).copied();

        if let Some(previous) = previous
            && self.dom.node(previous).is_text()
        {
            let mut contents = self.dom.text_contents(previous).to_string();
            contents.push_str(text);
            self.dom.set_text_contents(previous, contents);
        } else if let Some(next) = next
            && self.dom.node(next).is_text()
        {
            let mut contents = text.to_string();
            contents.push_str(self.dom.text_contents(next));
            self.dom.set_text_contents(next, contents);
        } else {
            let node = self.dom.new_text(text);
            self.dom.insert_child(element, index, node);
        }
    }

    /// Make `cursor` a paragraph boundary, splitting the enclosing block
    /// element when the cursor is strictly inside its content. Returns the
    /// cursor advanced past the boundary's separator character.
    fn ensure_paragraph_boundary(&mut self, cursor: usize) -> usize {
        let (element, local) = self.block_owner(cursor);

        if !self.dom.node(element).is_root() {
            let content_length = self.dom.content_length(element);
            if local > 0 && local < content_length {
                self.split_element(element, local);
                return cursor + 1;
            }
            if local == content_length && self.dom.needs_closing_separator(element) {
                // Already on the block's own boundary.
                return cursor + 1;
            }
        }

        // No enclosing block to split; the separator becomes literal text.
        self.insert_in_element(element, local, &PARAGRAPH_SEPARATOR.to_string());
        cursor + 1
    }

    // MARK: - Deleting

    /// Delete the characters in `range`.
    ///
    /// A block element whose closing paragraph separator falls inside the
    /// range is merged with its right-hand neighbor, so deleting across a
    /// paragraph boundary joins the paragraphs instead of leaving two
    /// adjacent blocks.
    pub fn delete(&mut self, range: TextRange) -> Result<()> {
        self.check_range(range)?;
        if range.is_empty() {
            return Ok(());
        }
        debug!(%range, "delete");
        self.delete_in(self.dom.root(), range);
        Ok(())
    }

    fn delete_in(&mut self, element: NodeId, range: TextRange) {
        let pairs = self
            .inspector()
            .children_intersecting(element, range, self.policy.prefer_left);
        let mut merge_candidates = Vec::new();

        for (child, intersection) in pairs {
            let child_length = self.dom.length_of(child);
            let covers_child = intersection.location == 0 && intersection.length == child_length;

            match &self.dom.node(child).kind {
                NodeKind::Text(_) => {
                    if covers_child {
                        self.dom.remove_child(element, child);
                    } else {
                        self.delete_text_range(child, intersection);
                    }
                }
                NodeKind::Comment(_) => {
                    // Comments are atomic: only a full-range delete removes
                    // one.
                    if covers_child {
                        self.dom.remove_child(element, child);
                    } else {
                        warn!(?child, "ignoring partial delete of an atomic comment node");
                    }
                }
                NodeKind::Element(_) | NodeKind::Root(_) => {
                    if covers_child {
                        self.dom.remove_child(element, child);
                        continue;
                    }
                    let hits_separator = self.dom.needs_closing_separator(child)
                        && intersection.end() == child_length;
                    let content_length = self.dom.content_length(child);
                    let content_end = intersection.end().min(content_length);
                    if content_end > intersection.location {
                        let content_part =
                            TextRange::new(intersection.location, content_end - intersection.location);
                        self.delete_in(child, content_part);
                    }
                    if hits_separator {
                        merge_candidates.push(child);
                    }
                }
            }
        }

        for child in merge_candidates {
            if let Some(right) = self.inspector().right_sibling(child) {
                self.merge_siblings(child, right);
            }
        }
    }

    fn delete_text_range(&mut self, node: NodeId, range: TextRange) {
        let contents = self.dom.text_contents(node);
        let start = byte_offset(contents, range.location)
            .expect("delete range must not split a surrogate pair");
        let end = byte_offset(contents, range.end())
            .expect("delete range must not split a surrogate pair");
        let mut remaining = contents[..start].to_string();
        remaining.push_str(&contents[end..]);

        if remaining.is_empty() {
            let parent = self.inspector().parent_of(node);
            self.dom.remove_child(parent, node);
        } else {
            self.dom.set_text_contents(node, remaining);
        }
    }

    // MARK: - Splitting

    /// Split a node at `offset` in its own content coordinates. A no-op at
    /// either extreme.
    ///
    /// # Panics
    ///
    /// Panics when `offset` is out of bounds or the node is an atomic leaf.
    pub fn split(&mut self, node: NodeId, offset: usize) {
        match &self.dom.node(node).kind {
            NodeKind::Text(_) => self.split_text(node, offset),
            NodeKind::Element(_) => self.split_element(node, offset),
            NodeKind::Comment(_) => panic!("comment nodes are atomic and cannot be split"),
            NodeKind::Root(_) => panic!("the root node cannot be split"),
        }
    }

    fn split_text(&mut self, node: NodeId, offset: usize) {
        let contents = self.dom.text_contents(node);
        let length = utf16_len(contents);
        if offset == 0 || offset == length {
            return;
        }
        assert!(offset < length, "split offset {offset} is out of bounds");

        let cut = byte_offset(contents, offset).expect("split must not divide a surrogate pair");
        let head = contents[..cut].to_string();
        let tail = contents[cut..].to_string();

        let parent = self.inspector().parent_of(node);
        let index = self.dom.index_of_child(parent, node);
        self.dom.set_text_contents(node, head);
        let tail_node = self.dom.new_text(tail);
        self.dom.insert_child(parent, index + 1, tail_node);
    }

    fn split_element(&mut self, element: NodeId, offset: usize) {
        let content_length = self.dom.content_length(element);
        if offset == 0 || offset == content_length {
            return;
        }
        assert!(
            offset < content_length,
            "split offset {offset} is out of bounds"
        );

        let parent = self.inspector().parent_of(element);
        let index = self.dom.index_of_child(parent, element);

        let post = self.split_children_after(element, offset);
        if !post.is_empty() {
            let data = self.element_data_shell(element);
            let sibling = self.dom.new_element(data);
            self.dom.insert_child(parent, index + 1, sibling);
            for child in post {
                self.dom.append_child(sibling, child);
            }
        }
    }

    /// Split a node so that exactly `range` remains inside it; content
    /// before and after moves into newly created siblings of the same kind.
    fn split_range(&mut self, node: NodeId, range: TextRange) {
        match &self.dom.node(node).kind {
            NodeKind::Text(_) => self.split_text_range(node, range),
            NodeKind::Element(_) => self.split_element_range(node, range),
            _ => panic!("cannot range-split an atomic node"),
        }
    }

    fn split_text_range(&mut self, node: NodeId, range: TextRange) {
        let contents = self.dom.text_contents(node);
        let length = utf16_len(contents);
        assert!(range.end() <= length, "split range {range} is out of bounds");

        let start = byte_offset(contents, range.location).expect("range splits a surrogate pair");
        let end = byte_offset(contents, range.end()).expect("range splits a surrogate pair");
        let head = contents[..start].to_string();
        let middle = contents[start..end].to_string();
        let tail = contents[end..].to_string();

        let parent = self.inspector().parent_of(node);
        let index = self.dom.index_of_child(parent, node);

        self.dom.set_text_contents(node, middle);
        if !tail.is_empty() {
            let tail_node = self.dom.new_text(tail);
            self.dom.insert_child(parent, index + 1, tail_node);
        }
        if !head.is_empty() {
            let head_node = self.dom.new_text(head);
            self.dom.insert_child(parent, index, head_node);
        }
    }

    fn split_element_range(&mut self, element: NodeId, range: TextRange) {
        // Clamp to content coordinates: an element's closing separator is
        // not splittable content.
        let content_length = self.dom.content_length(element);
        let start = range.location.min(content_length);
        let end = range.end().min(content_length);
        if start >= end {
            return;
        }

        let parent = self.inspector().parent_of(element);
        let index = self.dom.index_of_child(parent, element);

        let post = self.split_children_after(element, end);
        if !post.is_empty() {
            let data = self.element_data_shell(element);
            let sibling = self.dom.new_element(data);
            self.dom.insert_child(parent, index + 1, sibling);
            for child in post {
                self.dom.append_child(sibling, child);
            }
        }

        let pre = self.split_children_before(element, start);
        if !pre.is_empty() {
            let data = self.element_data_shell(element);
            let sibling = self.dom.new_element(data);
            self.dom.insert_child(parent, index, sibling);
            for child in pre {
                self.dom.append_child(sibling, child);
            }
        }
    }

    /// Children at or after `location`, splitting the straddling child so
    /// it keeps its tail. The returned nodes are still attached.
    fn split_children_after(&mut self, element: NodeId, location: usize) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child_offset = 0;

        for child in self.dom.children(element).to_vec() {
            let child_length = self.dom.length_of(child);
            let child_end = child_offset + child_length;

            if child_offset >= location {
                result.push(child);
            } else if child_end > location {
                let local = location - child_offset;
                self.split_range(child, TextRange::new(local, child_length - local));
                result.push(child);
            }

            child_offset = child_end;
        }

        result
    }

    /// Children at or before `location`, splitting the straddling child so
    /// it keeps its head. The returned nodes are still attached.
    fn split_children_before(&mut self, element: NodeId, location: usize) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child_offset = 0;

        for child in self.dom.children(element).to_vec() {
            let child_length = self.dom.length_of(child);
            let child_end = child_offset + child_length;

            if child_end <= location {
                result.push(child);
            } else if child_offset < location {
                self.split_range(child, TextRange::new(0, location - child_offset));
                result.push(child);
            }

            child_offset = child_end;
        }

        result
    }

    fn element_data_shell(&self, element: NodeId) -> ElementData {
        let data = self
            .dom
            .node(element)
            .as_element()
            .expect("element expected");
        ElementData::with_attributes(data.name.clone(), data.attributes.clone())
    }

    // MARK: - Merging

    /// Merge `right` into `left`.
    ///
    /// Two text nodes concatenate. A block-level right element is unwrapped
    /// and its children appended to a block-level left element; this is the
    /// merge that joins two paragraphs when the boundary between them is
    /// deleted.
    pub fn merge_siblings(&mut self, left: NodeId, right: NodeId) {
        if self.dom.node(left).is_text() && self.dom.node(right).is_text() {
            let mut contents = self.dom.text_contents(left).to_string();
            contents.push_str(self.dom.text_contents(right));
            self.dom.set_text_contents(left, contents);
            self.dom.detach(right);
            return;
        }

        let right_is_block = self.dom.node(right).is_block_level();
        let final_right_nodes = if right_is_block {
            let children = self.dom.children(right).to_vec();
            let parent = self.inspector().parent_of(right);
            self.dom.replace_child_with(parent, right, children.clone());
            children
        } else {
            vec![right]
        };

        if self.dom.node(left).is_block_level() {
            for node in final_right_nodes {
                self.dom.append_child(left, node);
            }
        }
    }

    /// Merge the two siblings separated at `location`, if any.
    pub fn merge_nodes_separated_at(&mut self, location: usize) {
        if let Some((left, right)) = self.inspector().siblings_separated_at(location) {
            self.merge_siblings(left, right);
        }
    }

    // MARK: - Wrapping

    /// Wrap `range` in a new element described by `descriptor`, removing
    /// equivalent wrappers from the range first so styles don't nest
    /// duplicated.
    pub fn wrap(&mut self, range: TextRange, descriptor: &ElementDescriptor) -> Result<()> {
        self.check_range(range)?;
        if range.is_empty() {
            return Ok(());
        }
        debug!(%range, name = %descriptor.name, "wrap");
        self.wrap_children_in_element(self.dom.root(), range, descriptor);
        Ok(())
    }

    fn wrap_children_in_element(
        &mut self,
        element: NodeId,
        range: TextRange,
        descriptor: &ElementDescriptor,
    ) {
        let mut names = descriptor.matching_names.clone();
        if !names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&descriptor.name))
        {
            names.push(descriptor.name.clone());
        }
        self.unwrap_element(element, range, &names);

        if descriptor.is_block_level() {
            self.force_wrap(element, range, descriptor);
        } else {
            for (owner, intersection) in self
                .inspector()
                .lowest_block_level_descendants(element, range)
            {
                // Zero-length intersections make no sense for wrapping.
                if intersection.is_empty() {
                    continue;
                }
                self.force_wrap_children(owner, intersection, descriptor);
            }
        }
    }

    /// Wrap `range` of `element`, wrapping the element itself when the
    /// range covers it entirely and block-level compatibility allows it.
    fn force_wrap(&mut self, element: NodeId, range: TextRange, descriptor: &ElementDescriptor) {
        if range == self.dom.range_of(element) && !self.dom.node(element).is_root() {
            let can_wrap_node =
                descriptor.is_block_level() || !self.dom.node(element).is_block_level();
            if can_wrap_node {
                self.wrap_node(element, descriptor);
                return;
            }
        }
        self.force_wrap_children(element, range, descriptor);
    }

    fn force_wrap_children(
        &mut self,
        element: NodeId,
        range: TextRange,
        descriptor: &ElementDescriptor,
    ) {
        assert!(
            self.dom.range_of(element).contains(range),
            "wrap range {range} escapes its element"
        );

        let pairs = self
            .inspector()
            .children_intersecting(element, range, self.policy.prefer_left);
        // The range may only touch formatting characters the element itself
        // contributes (a closing separator); nothing to wrap then.
        if pairs.is_empty() {
            return;
        }

        let (first, first_range) = pairs[0];
        if !self.dom.node(first).is_comment() && first_range != self.dom.range_of(first) {
            self.split_range(first, first_range);
        }
        if pairs.len() > 1 {
            let &(last, last_range) = pairs.last().unwrap();
            if !self.dom.node(last).is_comment() && last_range != self.dom.range_of(last) {
                self.split_range(last, last_range);
            }
        }

        let group: Vec<NodeId> = pairs.into_iter().map(|(child, _)| child).collect();
        self.wrap_children_group(element, &group, descriptor);
    }

    /// Wrap a group of adjacent children in a new element, or absorb the
    /// group into an adjacent sibling that already is that kind of element.
    /// Emptied duplicate wrappers are pruned.
    fn wrap_children_group(
        &mut self,
        element: NodeId,
        group: &[NodeId],
        descriptor: &ElementDescriptor,
    ) -> NodeId {
        assert!(!group.is_empty(), "cannot wrap an empty group");

        let first_index = self.dom.index_of_child(element, group[0]);
        let last_index = self.dom.index_of_child(element, *group.last().unwrap());

        let matching_sibling = |editor: &Self, index: Option<usize>| -> Option<NodeId> {
            let index = index?;
            let &sibling = editor.dom.children(element).get(index)?;
            let node = editor.dom.node(sibling);
            if node.is_block_level() {
                return None;
            }
            let data = node.as_element()?;
            descriptor.matches(&data.name).then_some(sibling)
        };

        let right_sibling = matching_sibling(self, Some(last_index + 1));
        let left_sibling = matching_sibling(self, first_index.checked_sub(1));

        let mut children_to_wrap: Vec<NodeId> = group.to_vec();
        let mut result = None;

        if let Some(right) = right_sibling {
            for (offset, &child) in children_to_wrap.iter().enumerate() {
                self.dom.insert_child(right, offset, child);
            }
            children_to_wrap = self.dom.children(right).to_vec();
            result = Some(right);
        }

        if let Some(left) = left_sibling {
            for &child in &children_to_wrap {
                self.dom.append_child(left, child);
            }
            if let Some(right) = right_sibling
                && self.dom.children(right).is_empty()
            {
                self.dom.detach(right);
            }
            result = Some(left);
        }

        match result {
            Some(wrapper) => wrapper,
            None => {
                let wrapper = self.dom.new_element(descriptor.to_element_data());
                self.dom.insert_child(element, first_index, wrapper);
                for &child in group {
                    self.dom.append_child(wrapper, child);
                }
                wrapper
            }
        }
    }

    /// Wrap a single node in a new element at the node's position.
    fn wrap_node(&mut self, node: NodeId, descriptor: &ElementDescriptor) -> NodeId {
        let parent = self.inspector().parent_of(node);
        let index = self.dom.index_of_child(parent, node);
        let wrapper = self.dom.new_element(descriptor.to_element_data());
        self.dom.insert_child(parent, index, wrapper);
        self.dom.append_child(wrapper, node);
        wrapper
    }

    // MARK: - Unwrapping

    /// Unwrap `range` from every element whose name is in `names`. If the
    /// range covers only part of a matching element, the element is first
    /// narrowed so only the matching sub-range loses its wrapper.
    pub fn unwrap(&mut self, range: TextRange, names: &[String]) -> Result<()> {
        self.check_range(range)?;
        if range.is_empty() {
            return Ok(());
        }
        debug!(%range, ?names, "unwrap");
        self.unwrap_element(self.dom.root(), range, names);
        Ok(())
    }

    fn unwrap_element(&mut self, element: NodeId, range: TextRange, names: &[String]) {
        if self.dom.children(element).is_empty() {
            return;
        }

        self.unwrap_children_in_range(element, range, names);

        let is_named = {
            let node = self.dom.node(element);
            !node.is_root()
                && node
                    .as_element()
                    .is_some_and(|data| names.iter().any(|n| n.eq_ignore_ascii_case(&data.name)))
        };
        if !is_named {
            return;
        }

        let length = self.dom.length_of(element);
        assert!(range.end() <= length, "unwrap range {range} is out of bounds");

        let descriptor = self.descriptor_of(element);

        if range.location > 0 {
            self.force_wrap_children(element, TextRange::new(0, range.location), &descriptor);
        }
        if range.end() < length {
            self.force_wrap_children(
                element,
                TextRange::new(range.end(), length - range.end()),
                &descriptor,
            );
        }

        self.unwrap_children(element);
    }

    fn unwrap_children_in_range(&mut self, element: NodeId, range: TextRange, names: &[String]) {
        // A range touching only the closing separator has nothing to
        // unwrap.
        if self.dom.node(element).is_block_level()
            && range.location + 1 == self.dom.length_of(element)
            && self.dom.needs_closing_separator(element)
        {
            return;
        }

        for (child, child_range) in
            self.inspector()
                .children_intersecting(element, range, self.policy.prefer_left)
        {
            if self.dom.node(child).as_element().is_some() {
                self.unwrap_element(child, child_range, names);
            }
        }
    }

    /// Splice an element's children into its parent in its place. A
    /// block-level element that supplied its own closing separator gets a
    /// synthetic line break appended first, preserving the visual line
    /// structure.
    fn unwrap_children(&mut self, element: NodeId) {
        if self.dom.needs_closing_separator(element) {
            let line_break = self.dom.new_element(ElementData::new(StandardTag::Br.name()));
            self.dom.append_child(element, line_break);
        }

        let parent = self.inspector().parent_of(element);
        let children = self.dom.children(element).to_vec();
        self.dom.replace_child_with(parent, element, children);
    }

    fn descriptor_of(&self, element: NodeId) -> ElementDescriptor {
        let data = self
            .dom
            .node(element)
            .as_element()
            .expect("descriptor_of expects an element");
        let matching_names = match data.standard() {
            Some(tag) => tag.equivalent_names().iter().map(|n| n.to_string()).collect(),
            None => vec![data.name.clone()],
        };
        ElementDescriptor {
            name: data.name.clone(),
            attributes: data.attributes.clone(),
            matching_names,
        }
    }

    // MARK: - Replacing

    /// Delete `range`, then insert `text` at its start. An empty range
    /// skips the delete; an empty string skips the insert.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<()> {
        self.check_range(range)?;
        if !range.is_empty() {
            self.delete(range)?;
        }
        if !text.is_empty() {
            self.insert_text(text, range.location)?;
        }
        Ok(())
    }

    /// Replace `range` with a newly created element (an image, say). The
    /// range must sit inside a single text node.
    pub fn insert_element(&mut self, range: TextRange, descriptor: &ElementDescriptor) -> Result<()> {
        self.check_range(range)?;

        let Some((text_node, local)) = self.inspector().text_node_wrapping(self.dom.root(), range)
        else {
            warn!(%range, "no single text node wraps the range, skipping element insert");
            return Ok(());
        };

        self.split_range(text_node, local);
        let parent = self.inspector().parent_of(text_node);
        let index = self.dom.index_of_child(parent, text_node);
        let element = self.dom.new_element(descriptor.to_element_data());
        self.dom.insert_child(parent, index, element);
        self.dom.remove_child(parent, text_node);
        Ok(())
    }
}
