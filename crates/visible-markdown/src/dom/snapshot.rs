//! Page snapshots captured from a live browser.
//!
//! A snapshot is the serialized form of the data the extractor reads from a
//! real page: each element's computed style, bounding client rect and offset
//! size, plus the viewport and page URL. A capture script running in the page
//! (or a DevTools bridge) produces it; [`Document::from_snapshot_json`] turns
//! it back into a [`Document`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::style::ComputedStyle;
use super::{DEFAULT_FONT_SIZE, Document, Element, Layout, NodeId, Rect, Viewport};
use crate::error::Result;

/// A captured page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// Page URL; becomes the document's base URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Window inner size at capture time.
    #[serde(default)]
    pub viewport: Viewport,
    /// Computed font size of the root element.
    #[serde(default)]
    pub base_font_size: Option<f64>,
    /// Topmost captured node, usually `<html>` or `<body>`.
    pub root: SnapshotNode,
}

/// A captured node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SnapshotNode {
    /// An element.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes.
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        /// Computed style properties by CSS name.
        #[serde(default)]
        style: BTreeMap<String, String>,
        /// Bounding client rect.
        #[serde(default)]
        rect: Rect,
        /// `offsetWidth`, defaults to the rect width.
        #[serde(default, rename = "offsetWidth")]
        offset_width: Option<f64>,
        /// `offsetHeight`, defaults to the rect height.
        #[serde(default, rename = "offsetHeight")]
        offset_height: Option<f64>,
        /// `currentSrc` of images.
        #[serde(default, rename = "currentSrc")]
        current_src: Option<String>,
        /// Child nodes.
        #[serde(default)]
        children: Vec<SnapshotNode>,
    },
    /// A text node.
    Text {
        /// Text content.
        text: String,
    },
    /// A comment.
    Comment {
        /// Comment content.
        text: String,
    },
}

impl Document {
    /// Decode a JSON page snapshot.
    ///
    /// Nesting depth is unbounded: every DOM level takes two JSON levels, so
    /// real pages routinely exceed `serde_json`'s default limit. The stack
    /// grows on demand while decoding.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::Snapshot`] when the JSON does not match the snapshot format.
    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let snapshot = PageSnapshot::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(Self::from_snapshot(&snapshot))
    }

    /// Build a document from a decoded snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut document = Self::new(snapshot.viewport);
        let base_font_size = snapshot.base_font_size.unwrap_or(DEFAULT_FONT_SIZE);
        document.set_base_font_size(base_font_size);
        document.set_base_url(snapshot.url.as_deref().and_then(|raw| Url::parse(raw).ok()));

        let root_style = ComputedStyle {
            font_size: base_font_size,
            ..ComputedStyle::default()
        };
        let mut stack: Vec<(&SnapshotNode, NodeId, ComputedStyle)> = vec![(&snapshot.root, document.root(), root_style)];

        while let Some((node, parent, parent_style)) = stack.pop() {
            match node {
                SnapshotNode::Element {
                    tag,
                    attributes,
                    style,
                    rect,
                    offset_width,
                    offset_height,
                    current_src,
                    children,
                } => {
                    let mut computed = ComputedStyle::inherit_from(&parent_style);
                    for (property, value) in style {
                        computed.apply(property, value, parent_style.font_size, base_font_size);
                    }

                    let mut element = Element::new(tag);
                    element.attributes = attributes
                        .iter()
                        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
                        .collect();
                    element.style = computed.clone();
                    element.layout = Layout {
                        rect: *rect,
                        offset_width: offset_width.unwrap_or(rect.width),
                        offset_height: offset_height.unwrap_or(rect.height),
                    };
                    element.current_src = current_src.clone().filter(|src| !src.is_empty());

                    let id = document.append_element(parent, element);
                    for child in children.iter().rev() {
                        stack.push((child, id, computed.clone()));
                    }
                }
                SnapshotNode::Text { text } => {
                    document.append_text(parent, text);
                }
                SnapshotNode::Comment { text } => {
                    document.append_comment(parent, text);
                }
            }
        }

        document
    }
}
