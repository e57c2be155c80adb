// src/widgets/structural.rs

use crate::{
    models::{
        action::{Action, ActionKind},
        widget::WidgetNode,
    },
    quiz::session::{AnswerStatus, QuestionView},
    widgets::{RenderError, WidgetRenderer},
};

/// The always-available MCQ card. Clients depend on this exact layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralRenderer;

impl StructuralRenderer {
    pub fn build(&self, view: &QuestionView) -> WidgetNode {
        let answered = view.status == AnswerStatus::Correct;
        let last = view.is_last();
        let action = |kind| Action::quiz(kind, &view.question_id, view.index);

        let header = WidgetNode::Row {
            children: vec![
                WidgetNode::Caption {
                    value: format!("Question {} of {}", view.index, view.total),
                },
                WidgetNode::Spacer,
                WidgetNode::Badge {
                    label: "MCQ".to_string(),
                    color: Some("info".to_string()),
                },
            ],
        };

        let submit = WidgetNode::Button {
            label: if view.status == AnswerStatus::Incorrect {
                "Try again".to_string()
            } else {
                "Submit answer".to_string()
            },
            submit: Some(true),
            style: Some("primary".to_string()),
            variant: None,
            icon_end: None,
            on_click_action: None,
            disabled: Some(answered),
        };

        let clear = WidgetNode::Button {
            label: "Clear".to_string(),
            submit: None,
            style: None,
            variant: Some("outline".to_string()),
            icon_end: None,
            on_click_action: Some(action(ActionKind::Clear)),
            disabled: None,
        };

        // Locked until the current question is answered correctly.
        let advance = WidgetNode::Button {
            label: (if last { "Finish" } else { "Next" }).to_string(),
            submit: None,
            style: None,
            variant: None,
            icon_end: Some("chevron-right".to_string()),
            on_click_action: Some(action(if last {
                ActionKind::Finish
            } else {
                ActionKind::Next
            })),
            disabled: Some(!answered),
        };

        let form = WidgetNode::Form {
            on_submit_action: action(ActionKind::Submit),
            children: vec![WidgetNode::Col {
                gap: Some(3),
                children: vec![
                    WidgetNode::RadioGroup {
                        name: "answer".to_string(),
                        options: view.options.clone(),
                        default_value: view.selected.clone(),
                        direction: Some("col".to_string()),
                        required: true,
                        disabled: answered,
                    },
                    WidgetNode::Row {
                        children: vec![submit, clear, WidgetNode::Spacer, advance],
                    },
                ],
            }],
        };

        WidgetNode::Card {
            size: Some("md".to_string()),
            children: vec![
                header,
                WidgetNode::Title {
                    value: view.prompt.clone(),
                    size: Some("sm".to_string()),
                },
                form,
            ],
        }
    }
}

impl WidgetRenderer for StructuralRenderer {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn render(&self, view: &QuestionView) -> Result<WidgetNode, RenderError> {
        Ok(self.build(view))
    }
}
