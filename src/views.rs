//! HTML rendering of the view-models produced by the handlers.
//!
//! Every piece of user-supplied text goes through [`escape`].

use axum::response::Html;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::recipes::repo_types::{Recipe, RecipeWithOwner};

/// The logged-in user as exposed to templates.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for Viewer {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
        }
    }
}

#[derive(Debug)]
pub struct RecipeCard {
    pub recipe: RecipeWithOwner,
    pub can_edit: bool,
}

#[derive(Debug)]
pub struct DashboardView {
    pub viewer: Option<Viewer>,
    pub is_logged_in: bool,
    pub recipes: Vec<RecipeCard>,
}

#[derive(Debug)]
pub struct DetailView {
    pub viewer: Option<Viewer>,
    pub is_logged_in: bool,
    pub recipe: RecipeCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Register,
}

#[derive(Debug)]
pub struct AuthView {
    pub kind: AuthKind,
    pub error: Option<&'static str>,
}

#[derive(Debug)]
pub struct RecipeFormView {
    pub viewer: Viewer,
    /// `None` renders the create form, `Some` the edit form.
    pub recipe: Option<Recipe>,
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, viewer: Option<&Viewer>, body: &str) -> Html<String> {
    let nav = match viewer {
        Some(v) => format!(
            r#"<span class="who">{}</span> <a href="/create">New recipe</a>
<form method="post" action="/logout" class="inline"><button type="submit">Logout</button></form>"#,
            escape(&v.name)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };
    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<nav><a href="/">Recipes</a> {nav}</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

/// Unreserved URL characters stay as they are; everything else is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Absolute URL for a stored `uploads/...` path, one segment at a time.
fn upload_url(path: &str) -> String {
    path.split('/')
        .map(|seg| utf8_percent_encode(seg, PATH_SEGMENT).to_string())
        .fold(String::new(), |mut url, seg| {
            url.push('/');
            url.push_str(&seg);
            url
        })
}

fn image_tag(image: Option<&str>) -> String {
    match image {
        Some(path) => format!(r#"<img src="{}" alt="">"#, escape(&upload_url(path))),
        None => String::new(),
    }
}

fn owner_actions(id: Uuid) -> String {
    format!(
        r#"<a href="/edit/{id}">Edit</a>
<form method="post" action="/delete/{id}" class="inline"><button type="submit">Delete</button></form>"#
    )
}

pub fn dashboard(view: &DashboardView) -> Html<String> {
    let mut body = String::from("<h1>Recipes</h1>\n");
    if view.recipes.is_empty() {
        body.push_str("<p>No recipes yet.</p>\n");
    }
    for card in &view.recipes {
        let r = &card.recipe;
        body.push_str(&format!(
            r#"<article class="recipe" data-id="{id}">
{img}
<h2><a href="/recipe/{id}">{title}</a></h2>
<p class="owner">by {owner}</p>
<p>{description}</p>
{actions}
</article>
"#,
            id = r.id,
            img = image_tag(r.image.as_deref()),
            title = escape(&r.title),
            owner = escape(&r.owner_name),
            description = escape(&r.description),
            actions = if card.can_edit { owner_actions(r.id) } else { String::new() },
        ));
    }
    page("Recipes", view.viewer.as_ref(), &body)
}

pub fn detail(view: &DetailView) -> Html<String> {
    let r = &view.recipe.recipe;
    let body = format!(
        r#"<article class="recipe" data-id="{id}">
{img}
<h1>{title}</h1>
<p class="owner">by {owner}</p>
<p>{description}</p>
<h2>Ingredients</h2>
<pre>{ingredients}</pre>
<h2>Instructions</h2>
<pre>{instructions}</pre>
{actions}
</article>"#,
        id = r.id,
        img = image_tag(r.image.as_deref()),
        title = escape(&r.title),
        owner = escape(&r.owner_name),
        description = escape(&r.description),
        ingredients = escape(&r.ingredients),
        instructions = escape(&r.instructions),
        actions = if view.recipe.can_edit { owner_actions(r.id) } else { String::new() },
    );
    page(&r.title, view.viewer.as_ref(), &body)
}

pub fn auth(view: &AuthView) -> Html<String> {
    let (title, action, extra) = match view.kind {
        AuthKind::Login => ("Login", "/login", ""),
        AuthKind::Register => (
            "Register",
            "/register",
            r#"<label>Name <input name="name" required></label>"#,
        ),
    };
    let error = view
        .error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>{title}</h1>
{error}
<form method="post" action="{action}">
{extra}
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{title}</button>
</form>"#
    );
    page(title, None, &body)
}

pub fn recipe_form(view: &RecipeFormView) -> Html<String> {
    let (title, action) = match &view.recipe {
        Some(r) => ("Edit recipe", format!("/edit/{}", r.id)),
        None => ("New recipe", "/create".to_string()),
    };
    let (t, d, i, n) = match &view.recipe {
        Some(r) => (
            escape(&r.title),
            escape(&r.description),
            escape(&r.ingredients),
            escape(&r.instructions),
        ),
        None => Default::default(),
    };
    let current_image = view
        .recipe
        .as_ref()
        .map(|r| image_tag(r.image.as_deref()))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>{title}</h1>
<form method="post" action="{action}" enctype="multipart/form-data">
<label>Title <input name="title" value="{t}" required></label>
<label>Description <textarea name="description">{d}</textarea></label>
<label>Ingredients <textarea name="ingredients">{i}</textarea></label>
<label>Instructions <textarea name="instructions">{n}</textarea></label>
{current_image}
<label>Image <input type="file" name="image" accept="image/*"></label>
<button type="submit">Save</button>
</form>"#,
    );
    page(title, Some(&view.viewer), &body)
}
