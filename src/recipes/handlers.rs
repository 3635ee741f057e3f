use axum::{
    extract::{DefaultBodyLimit, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ImagePart, RecipeForm, MAX_FORM_BYTES},
    repo, services,
};
use crate::{
    auth::extractors::{CurrentUser, MaybeUser},
    error::{AppError, AppResult},
    state::AppState,
    views::{self, DashboardView, DetailView, RecipeCard, RecipeFormView, Viewer},
};

/// Pages anyone may see.
pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/recipe/:id", get(detail))
}

/// Pages behind the authorization gate: every handler here takes `CurrentUser`.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/create", get(create_form).post(create))
        .route("/edit/:id", get(edit_form).post(update))
        .route("/delete/:id", post(delete))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

fn to_dashboard() -> Response {
    Redirect::to("/").into_response()
}

#[instrument(skip(state, viewer))]
pub async fn dashboard(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> AppResult<Html<String>> {
    let viewer_id = viewer.as_ref().map(|u| u.id);
    let recipes = repo::list_with_owner(&state.db)
        .await?
        .into_iter()
        .map(|recipe| RecipeCard {
            can_edit: Some(recipe.user_id) == viewer_id,
            recipe,
        })
        .collect();

    Ok(views::dashboard(&DashboardView {
        is_logged_in: viewer.is_some(),
        viewer: viewer.as_ref().map(Viewer::from),
        recipes,
    }))
}

#[instrument(skip(state, viewer))]
pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Ok(recipe_id) = id.parse::<Uuid>() else {
        return Ok(to_dashboard());
    };
    let Some(recipe) = repo::get_with_owner(&state.db, recipe_id).await? else {
        return Ok(to_dashboard());
    };

    let can_edit = viewer.as_ref().is_some_and(|u| u.id == recipe.user_id);
    Ok(views::detail(&DetailView {
        is_logged_in: viewer.is_some(),
        viewer: viewer.as_ref().map(Viewer::from),
        recipe: RecipeCard { recipe, can_edit },
    })
    .into_response())
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_form(CurrentUser(user): CurrentUser) -> Html<String> {
    views::recipe_form(&RecipeFormView {
        viewer: Viewer::from(&user),
        recipe: None,
    })
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut form: RecipeForm,
) -> AppResult<Redirect> {
    let image = match std::mem::take(&mut form.image) {
        ImagePart::File(img) => Some(
            services::store_image(&state, user.id, img)
                .await
                .map_err(AppError::Upload)?,
        ),
        ImagePart::Rejected(reason) => return Err(AppError::Upload(anyhow::anyhow!(reason))),
        ImagePart::Absent => None,
    };

    let recipe = repo::insert(&state.db, user.id, form.into_new_recipe(image)).await?;
    info!(recipe_id = %recipe.id, "recipe created");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Ok(recipe_id) = id.parse::<Uuid>() else {
        return Ok(to_dashboard());
    };
    let Some(recipe) = repo::get(&state.db, recipe_id).await? else {
        return Ok(to_dashboard());
    };
    if recipe.user_id != user.id {
        warn!(%recipe_id, "edit form denied: not the owner");
        return Ok(to_dashboard());
    }

    Ok(views::recipe_form(&RecipeFormView {
        viewer: Viewer::from(&user),
        recipe: Some(recipe),
    })
    .into_response())
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    mut form: RecipeForm,
) -> AppResult<Response> {
    let Ok(recipe_id) = id.parse::<Uuid>() else {
        return Ok(to_dashboard());
    };
    let Some(recipe) = repo::get(&state.db, recipe_id).await? else {
        return Ok(to_dashboard());
    };
    if recipe.user_id != user.id {
        warn!(%recipe_id, "update denied: not the owner");
        return Ok(to_dashboard());
    }

    // A failed upload keeps the current image.
    let image = match std::mem::take(&mut form.image) {
        ImagePart::File(img) => match services::store_image(&state, user.id, img).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, %recipe_id, "image upload failed; keeping old image");
                None
            }
        },
        ImagePart::Rejected(reason) => {
            warn!(%reason, %recipe_id, "image rejected; keeping old image");
            None
        }
        ImagePart::Absent => None,
    };

    let updated =
        repo::update_owned(&state.db, recipe.id, user.id, form.into_changes(image)).await?;
    if !updated {
        return Ok(to_dashboard());
    }
    info!(%recipe_id, "recipe updated");
    Ok(Redirect::to(&format!("/recipe/{}", recipe.id)).into_response())
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    if let Ok(recipe_id) = id.parse::<Uuid>() {
        if repo::soft_delete_owned(&state.db, recipe_id, user.id).await? {
            info!(%recipe_id, "recipe deleted");
        } else {
            warn!(%recipe_id, "delete ignored: missing or not the owner");
        }
    }
    Ok(Redirect::to("/"))
}
