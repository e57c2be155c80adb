// src/widgets/template.rs

use std::path::Path;

use serde_json::{Map, Value};

use crate::{
    models::widget::WidgetNode,
    quiz::session::{AnswerStatus, QuestionView},
    widgets::{RenderError, WidgetRenderer},
};

/// Renders a JSON widget template with `{{field}}` placeholders.
///
/// A string that is exactly one placeholder is replaced by the bound value
/// with its JSON type kept (so `"{{options}}"` becomes an array). Placeholders
/// inside longer strings are replaced by their text form. Dotted paths reach
/// nested fields, e.g. `{{feedback.hint}}`.
///
/// Bindings are the view fields (`questionId, index, total, prompt, options,
/// selected, status, feedback`) plus `answered`, `isLast`, `submitLabel`,
/// `advanceLabel` and `advanceAction`.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: Value,
}

impl TemplateRenderer {
    pub fn new(template: Value) -> Self {
        Self { template }
    }

    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Template(format!("{}: {}", path.display(), e)))?;
        let template = serde_json::from_str(&raw)
            .map_err(|e| RenderError::Template(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(template))
    }

    fn bindings(view: &QuestionView) -> Result<Value, RenderError> {
        let mut data = serde_json::to_value(view).map_err(|e| RenderError::Template(e.to_string()))?;
        let answered = view.status == AnswerStatus::Correct;
        let last = view.is_last();

        if let Value::Object(map) = &mut data {
            map.insert("answered".into(), Value::Bool(answered));
            map.insert("isLast".into(), Value::Bool(last));
            map.insert(
                "submitLabel".into(),
                Value::from(if view.status == AnswerStatus::Incorrect {
                    "Try again"
                } else {
                    "Submit answer"
                }),
            );
            map.insert("advanceLabel".into(), Value::from(if last { "Finish" } else { "Next" }));
            map.insert(
                "advanceAction".into(),
                Value::from(if last { "mcq.finish" } else { "mcq.next" }),
            );
        }
        Ok(data)
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |value, key| value.as_object()?.get(key))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn substitute_str(raw: &str, data: &Value) -> Result<Value, RenderError> {
    let trimmed = raw.trim();
    if let Some(path) = trimmed
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .filter(|inner| !inner.contains("{{"))
    {
        let path = path.trim();
        return lookup(data, path)
            .cloned()
            .ok_or_else(|| RenderError::Template(format!("unknown binding '{}'", path)));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            return Err(RenderError::Template(format!("unclosed placeholder in '{}'", raw)));
        };
        let path = rest[start + 2..start + len].trim();
        let value = lookup(data, path)
            .ok_or_else(|| RenderError::Template(format!("unknown binding '{}'", path)))?;
        out.push_str(&rest[..start]);
        out.push_str(&as_text(value));
        rest = &rest[start + len + 2..];
    }
    out.push_str(rest);
    Ok(Value::String(out))
}

fn substitute(node: &Value, data: &Value) -> Result<Value, RenderError> {
    match node {
        Value::String(s) => substitute_str(s, data),
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, data))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), substitute(v, data)?)))
            .collect::<Result<Map<_, _>, RenderError>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

impl WidgetRenderer for TemplateRenderer {
    fn name(&self) -> &'static str {
        "template"
    }

    fn render(&self, view: &QuestionView) -> Result<WidgetNode, RenderError> {
        let data = Self::bindings(view)?;
        let filled = substitute(&self.template, &data)?;
        serde_json::from_value(filled).map_err(|e| RenderError::InvalidWidget(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{bank::default_questions, session::QuizSession};
    use serde_json::json;

    fn view(answer: Option<&str>) -> QuestionView {
        let mut session = QuizSession::at(default_questions().remove(1), 2, 2);
        if answer.is_some() {
            session.submit(answer);
        }
        session.view()
    }

    #[test]
    fn whole_string_placeholder_keeps_json_type() {
        let template = TemplateRenderer::new(json!({
            "type": "Card",
            "children": [
                {"type": "Caption", "value": "Q{{index}}/{{total}}: {{feedback.hint}}"},
                {"type": "RadioGroup", "name": "answer", "options": "{{options}}", "defaultValue": "{{selected}}",
                 "disabled": "{{answered}}"},
                {"type": "Button", "label": "{{advanceLabel}}",
                 "onClickAction": {"type": "{{advanceAction}}", "payload": {"questionId": "{{questionId}}", "index": "{{index}}"}}}
            ]
        }));

        let doc = template.render(&view(Some("a"))).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["children"][0]["value"], "Q2/2: It's known as the City of Light");
        assert_eq!(value["children"][1]["options"].as_array().unwrap().len(), 4);
        assert_eq!(value["children"][1]["defaultValue"], "a");
        assert_eq!(value["children"][1]["disabled"], false);
        assert_eq!(value["children"][2]["label"], "Finish");
        assert_eq!(
            value["children"][2]["onClickAction"],
            json!({"type": "mcq.finish", "payload": {"questionId": "q2", "index": 2}})
        );
    }

    #[test]
    fn idle_view_binds_empty_feedback() {
        let template = TemplateRenderer::new(json!({
            "type": "Col",
            "children": [
                {"type": "Caption", "value": "Hint: {{feedback.hint}}"},
                {"type": "Caption", "value": "Why: {{feedback.explanation}}"}
            ]
        }));

        let doc = template.render(&view(None)).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["children"][0]["value"], "Hint: ");
        assert_eq!(value["children"][1]["value"], "Why: ");
    }

    #[test]
    fn unknown_binding_is_an_error() {
        let template = TemplateRenderer::new(json!({"type": "Caption", "value": "{{nope}}"}));
        assert!(matches!(template.render(&view(None)), Err(RenderError::Template(_))));
    }

    #[test]
    fn non_widget_output_is_rejected() {
        let template = TemplateRenderer::new(json!({"kind": "Card"}));
        assert!(matches!(template.render(&view(None)), Err(RenderError::InvalidWidget(_))));
    }

    #[test]
    fn missing_file_is_a_template_error() {
        let err = TemplateRenderer::from_file(Path::new("/no/such/file.widget")).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }
}
