// src/widgets/mod.rs

//! Rendering of quiz state into widget documents.
//!
//! `McqRenderer` tries an optional richer renderer (a JSON template) first and
//! falls back to the fixed structural card whenever that one is missing or
//! fails, so callers always get a document.

pub mod structural;
pub mod template;

use std::fmt;

use crate::{models::widget::WidgetNode, quiz::session::QuestionView};

pub use structural::StructuralRenderer;
pub use template::TemplateRenderer;

#[derive(Debug)]
pub enum RenderError {
    /// The template file could not be read or parsed.
    Template(String),

    /// The template produced something that is not a widget tree.
    InvalidWidget(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Template(msg) => write!(f, "template error: {}", msg),
            RenderError::InvalidWidget(msg) => write!(f, "invalid widget: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Turns a question view into a complete widget document. Must be pure.
pub trait WidgetRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, view: &QuestionView) -> Result<WidgetNode, RenderError>;
}

/// Optional preferred renderer with the structural card as safety net.
pub struct McqRenderer {
    preferred: Option<Box<dyn WidgetRenderer>>,
    fallback: StructuralRenderer,
}

impl Default for McqRenderer {
    fn default() -> Self {
        Self::structural()
    }
}

impl McqRenderer {
    pub fn structural() -> Self {
        Self {
            preferred: None,
            fallback: StructuralRenderer,
        }
    }

    pub fn with_preferred(preferred: Box<dyn WidgetRenderer>) -> Self {
        Self {
            preferred: Some(preferred),
            fallback: StructuralRenderer,
        }
    }

    /// Uses the template at `path` when it loads, the structural card otherwise.
    pub fn from_template_path(path: Option<&std::path::Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("No widget template configured, using structural MCQ card");
            return Self::structural();
        };

        match TemplateRenderer::from_file(path) {
            Ok(template) => {
                tracing::info!("Loaded widget template from {}", path.display());
                Self::with_preferred(Box::new(template))
            }
            Err(e) => {
                tracing::warn!("Widget template {} unavailable ({}), using structural MCQ card", path.display(), e);
                Self::structural()
            }
        }
    }

    pub fn render(&self, view: &QuestionView) -> WidgetNode {
        if let Some(preferred) = &self.preferred {
            match preferred.render(view) {
                Ok(widget) => return widget,
                Err(e) => tracing::warn!(
                    "Renderer '{}' failed for question {}: {}; using fallback",
                    preferred.name(),
                    view.question_id,
                    e
                ),
            }
        }
        self.fallback.build(view)
    }
}
