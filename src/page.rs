//! HTML page rendering.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::{
    catalog::{ClassLevel, MaterialRequest, MaterialType},
    error::HubError,
};

pub const INDEX: &str = include_str!("../templates/index.html");

pub const DEFAULT_PROFILE: &str = include_str!("../templates/profile.md");

pub const NOTHING_AVAILABLE: &str = "Nothing is available here right now, come back later.";

#[derive(Debug, Serialize)]
struct Choice {
    slug: &'static str,
    label: &'static str,
}

/// A PDF shown on the results grid.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialCard {
    pub file_name: String,

    pub download_url: String,

    /// PNG data URI, missing when the preview could not be rendered.
    pub thumbnail: Option<String>,
}

impl MaterialCard {
    pub fn new(request: &MaterialRequest, file_name: String, thumbnail: Option<String>) -> Self {
        let download_url = format!(
            "/materials/{}/{}/{}",
            request.class.slug(),
            request.material.slug(),
            urlencoding::encode(&file_name)
        );
        Self {
            file_name,
            download_url,
            thumbnail,
        }
    }
}

/// Everything that varies between renders of the landing page.
#[derive(Debug, Default, Serialize)]
pub struct PageView {
    pub error: Option<String>,

    pub welcome: Option<String>,

    pub nothing_available: Option<&'static str>,

    pub cards: Vec<MaterialCard>,

    pub submitted: bool,

    pub suggestion_received: bool,
}

impl PageView {
    pub fn rejected(message: String) -> Self {
        Self {
            error: Some(message),
            ..Default::default()
        }
    }

    /// Results for an accepted student form.
    pub fn materials(name: &str, request: &MaterialRequest, cards: Vec<MaterialCard>) -> Self {
        let welcome = format!(
            "Welcome, {name}! Here are the {} for {}:",
            request.material.label().to_lowercase(),
            request.class.label()
        );

        Self {
            welcome: Some(welcome),
            nothing_available: cards.is_empty().then_some(NOTHING_AVAILABLE),
            cards,
            submitted: true,
            ..Default::default()
        }
    }

    pub fn suggestion_received() -> Self {
        Self {
            suggestion_received: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pages {
    env: Environment<'static>,

    title: String,

    /// Sidebar profile, already rendered to HTML.
    profile: String,
}

impl Pages {
    pub fn new(title: String, profile_markdown: &str) -> Result<Self, HubError> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX)?;

        Ok(Self {
            env,
            title,
            profile: markdown::to_html(profile_markdown),
        })
    }

    pub fn render(&self, view: &PageView) -> Result<String, HubError> {
        let classes = ClassLevel::ALL
            .iter()
            .map(|class| Choice {
                slug: class.slug(),
                label: class.label(),
            })
            .collect::<Vec<_>>();

        let materials = MaterialType::ALL
            .iter()
            .map(|material| Choice {
                slug: material.slug(),
                label: material.label(),
            })
            .collect::<Vec<_>>();

        let template = self.env.get_template("index.html")?;

        Ok(template.render(context! {
            title => self.title,
            profile => self.profile,
            classes => classes,
            materials => materials,
            error => view.error,
            welcome => view.welcome,
            nothing_available => view.nothing_available,
            cards => view.cards,
            submitted => view.submitted,
            suggestion_received => view.suggestion_received,
        })?)
    }
}
