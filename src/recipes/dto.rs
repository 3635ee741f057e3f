use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
};
use bytes::{Bytes, BytesMut};

use super::repo_types::{NewRecipe, RecipeChanges};
use crate::error::AppError;

/// Largest accepted image. Bigger files are dropped while the rest of the
/// form is still decoded.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Whole-body cap for the create and edit forms. Kept well above
/// `MAX_IMAGE_BYTES` so an oversized image never hides the text fields.
pub const MAX_FORM_BYTES: usize = 64 * 1024 * 1024;

/// A file submitted in the `image` part.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Filename exactly as the client sent it; not yet safe to use as a path.
    pub file_name: String,
    pub body: Bytes,
}

/// Decoded `multipart/form-data` body of the create and edit forms.
/// A text field is `Some` only when the client sent it.
#[derive(Debug, Default)]
pub struct RecipeForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub image: ImagePart,
}

/// What the `image` part of a form turned out to be.
#[derive(Debug, Default)]
pub enum ImagePart {
    /// No file chosen.
    #[default]
    Absent,
    File(UploadedImage),
    /// A file was sent but cannot be accepted; carries the reason.
    Rejected(String),
}

/// Collects an image part chunk by chunk, giving up on the content (but not
/// on the stream) once `cap` is exceeded.
struct CappedBuffer {
    buf: BytesMut,
    cap: usize,
    overflowed: bool,
}

impl CappedBuffer {
    fn new(cap: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            cap,
            overflowed: false,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        if self.overflowed {
            return;
        }
        if self.buf.len() + chunk.len() > self.cap {
            self.overflowed = true;
            self.buf = BytesMut::new();
            return;
        }
        self.buf.extend_from_slice(chunk);
    }

    fn finish(self, file_name: String) -> ImagePart {
        if self.overflowed {
            return ImagePart::Rejected(format!(
                "image {file_name:?} is larger than {} bytes",
                self.cap
            ));
        }
        match image_part(file_name, self.buf.freeze()) {
            Some(img) => ImagePart::File(img),
            None => ImagePart::Absent,
        }
    }
}

impl RecipeForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = RecipeForm::default();
        while let Some(mut field) = mp
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let mut buf = CappedBuffer::new(MAX_IMAGE_BYTES);
                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?
                    {
                        buf.push(&chunk);
                    }
                    form.image = buf.finish(file_name);
                }
                "title" | "description" | "ingredients" | "instructions" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    let slot = match name.as_str() {
                        "title" => &mut form.title,
                        "description" => &mut form.description,
                        "ingredients" => &mut form.ingredients,
                        _ => &mut form.instructions,
                    };
                    *slot = Some(text);
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// Text fields for a new recipe; absent fields become empty.
    pub fn into_new_recipe(self, image: Option<String>) -> NewRecipe {
        NewRecipe {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
            image,
        }
    }

    pub fn into_changes(self, image: Option<String>) -> RecipeChanges {
        RecipeChanges {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            image,
        }
    }
}

/// Browsers submit an empty part when no file was chosen; that is "no image".
fn image_part(file_name: String, body: Bytes) -> Option<UploadedImage> {
    if file_name.is_empty() || body.is_empty() {
        return None;
    }
    Some(UploadedImage { file_name, body })
}

#[async_trait]
impl<S> FromRequest<S> for RecipeForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mp = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Self::from_multipart(mp).await
    }
}
