use html_minifier::HTMLMinifier;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::warn;

use crate::page::Page;
use crate::render::ResultsView;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("rendering error")]
    Tera(#[from] tera::Error),
}

const TEMPLATES: &[(&str, &str)] = &[
    ("results.html", include_str!("../templates/results.html")),
    ("page.html", include_str!("../templates/page.html")),
];

/// The page templates, compiled once.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Templates { tera })
    }

    /// Renders the contents of the results container.
    pub fn render_results(&self, results: &ResultsView) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("results", results);
        Ok(self.tera.render("results.html", &context)?)
    }

    pub fn render_page(&self, page: &Page) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("page", page);
        context.insert("results", &page.results);

        let rendered = self.tera.render("page.html", &context)?;
        Ok(minify(rendered))
    }
}

/// Minifies a rendered page, serving it as rendered if the minifier chokes on it.
fn minify(rendered: String) -> String {
    let mut minifier = HTMLMinifier::new();
    let minified = minifier
        .digest(&rendered)
        .map_err(|err| err.to_string())
        .and_then(|()| String::from_utf8(minifier.get_html().to_vec()).map_err(|err| err.to_string()));

    minified.unwrap_or_else(|reason| {
        warn!(%reason, "serving page unminified");
        rendered
    })
}
