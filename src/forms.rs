//! HTML form payloads and their validation.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::models::{user::is_valid_username, Group};
use crate::{AppError, Result};

const REQUIRED: &str = "This field is required.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Per-field messages plus messages about the form as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages for one field joined for display.
    pub fn field(&self, field: &str) -> Option<String> {
        self.fields.get(field).map(|messages| messages.join(" "))
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn into_result(self) -> std::result::Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(REQUIRED.into()));
    }
    Ok(())
}

fn username_chars(value: &str) -> std::result::Result<(), ValidationError> {
    if !is_valid_username(value.trim()) {
        return Err(ValidationError::new("invalid_username").with_message(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        ));
    }
    Ok(())
}

fn optional_email(value: &str) -> std::result::Result<(), ValidationError> {
    let value = value.trim();
    if !value.is_empty() && !value.validate_email() {
        return Err(ValidationError::new("email").with_message("Enter a valid email address.".into()));
    }
    Ok(())
}

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    /// Accepts anything whose header decodes to image dimensions.
    pub fn is_image(&self) -> bool {
        imagesize::blob_size(&self.data).is_ok()
    }
}

/// Create/edit post form, posted as multipart.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Raw group choice; empty means no group.
    pub group: String,
    pub image: Option<UploadedImage>,
}

/// A post form that passed validation.
#[derive(Debug, Clone)]
pub struct CleanPost {
    pub text: String,
    pub group: Option<Group>,
    pub image: Option<UploadedImage>,
}

impl PostForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = PostForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::ValidationError(format!("Malformed form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::ValidationError(format!("Malformed upload: {}", e)))?;
                    if !filename.is_empty() || !data.is_empty() {
                        form.image = Some(UploadedImage {
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                "text" | "group" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::ValidationError(format!("Malformed form data: {}", e)))?;
                    if name == "text" {
                        form.text = value;
                    } else {
                        form.group = value;
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// `groups` are the valid choices for the group field.
    pub fn clean(&self, groups: &[Group]) -> std::result::Result<CleanPost, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let group_choice = self.group.trim();
        let group = if group_choice.is_empty() {
            None
        } else {
            let chosen = Uuid::parse_str(group_choice)
                .ok()
                .and_then(|id| groups.iter().find(|group| group.id == id));
            if chosen.is_none() {
                errors.add("group", INVALID_GROUP);
            }
            chosen.cloned()
        };

        if let Some(image) = &self.image {
            if image.filename.is_empty() || !image.is_image() {
                errors.add("image", INVALID_IMAGE);
            }
        }

        errors.into_result()?;
        Ok(CleanPost {
            text: self.text.trim().to_string(),
            group,
            image: self.image.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(custom(function = "username_chars"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "optional_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
}

impl SignupForm {
    pub fn clean(&self) -> std::result::Result<(), FormErrors> {
        self.validate().map_err(FormErrors::from)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\");
    local.then(|| next.to_string())
}
