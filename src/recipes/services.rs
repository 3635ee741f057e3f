use anyhow::Context;
use uuid::Uuid;

use super::dto::UploadedImage;
use crate::state::AppState;

/// Public URL prefix under which uploaded images are served.
pub const UPLOADS_PREFIX: &str = "uploads";

/// Reduce a client-supplied filename to its last path component, so an upload
/// can never land outside the uploads directory. Both `/` and `\` count as
/// separators.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Store `image` under the uploading user's own directory and return the
/// relative path recorded on the recipe, `uploads/<user_id>/<name>`. Two users
/// uploading the same file name never touch each other's file.
pub async fn store_image(st: &AppState, user_id: Uuid, image: UploadedImage) -> anyhow::Result<String> {
    let name = sanitize_file_name(&image.file_name)
        .with_context(|| format!("unusable file name {:?}", image.file_name))?;
    let key = object_key(user_id, &name);
    st.storage
        .put_object(&key, image.body)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(format!("{}/{}", UPLOADS_PREFIX, key))
}

fn object_key(user_id: Uuid, name: &str) -> String {
    format!("{}/{}", user_id, name)
}
