// src/models/widget.rs

use serde::{Deserialize, Serialize};

use crate::models::{action::Action, question::QuestionOption};

/// A node of a declarative widget document.
///
/// Serialized with a `type` tag and camelCase fields so that the JSON
/// matches what widget clients expect, e.g.
/// `{"type": "Badge", "label": "MCQ", "color": "info"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WidgetNode {
    Card {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<String>,
        #[serde(default)]
        children: Vec<WidgetNode>,
    },
    Row {
        #[serde(default)]
        children: Vec<WidgetNode>,
    },
    Col {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<u32>,
        #[serde(default)]
        children: Vec<WidgetNode>,
    },
    Title {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<String>,
    },
    Caption {
        value: String,
    },
    Badge {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Form {
        on_submit_action: Action,
        #[serde(default)]
        children: Vec<WidgetNode>,
    },
    RadioGroup {
        name: String,
        options: Vec<QuestionOption>,
        #[serde(default)]
        default_value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        disabled: bool,
    },
    Button {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        submit: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon_end: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_click_action: Option<Action>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disabled: Option<bool>,
    },
    Spacer,
}

impl WidgetNode {
    pub fn children(&self) -> &[WidgetNode] {
        match self {
            WidgetNode::Card { children, .. }
            | WidgetNode::Row { children }
            | WidgetNode::Col { children, .. }
            | WidgetNode::Form { children, .. } => children.as_slice(),
            _ => &[],
        }
    }

    /// Depth-first search over this node and its descendants.
    pub fn find(&self, pred: &dyn Fn(&WidgetNode) -> bool) -> Option<&WidgetNode> {
        if pred(self) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(pred))
    }

    /// Every button in document order.
    pub fn buttons(&self) -> Vec<&WidgetNode> {
        let mut out = Vec::new();
        self.collect(&|n| matches!(n, WidgetNode::Button { .. }), &mut out);
        out
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&WidgetNode) -> bool, out: &mut Vec<&'a WidgetNode>) {
        if pred(self) {
            out.push(self);
        }
        for child in self.children() {
            child.collect(pred, out);
        }
    }
}
