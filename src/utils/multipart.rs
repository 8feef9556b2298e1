use std::collections::BTreeSet;

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::TryStreamExt;

use crate::errors::AppError;
use crate::models::employee::{Course, Designation, Gender, NewEmployee};
use crate::models::file::ImageUpload;
use crate::utils::storage::inspect_image;
use crate::utils::validation::validate_payload;

const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// Raw text fields of a create-employee form, before typing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmployeeSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub course: Vec<String>,
    pub gender: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn invalid(err: impl std::fmt::Display) -> AppError {
    AppError::Validation(err.to_string())
}

impl EmployeeSubmission {
    /// Checks presence, parses enums and runs field validation.
    pub fn into_new_employee(self) -> Result<NewEmployee, AppError> {
        let employee = NewEmployee {
            name: required(self.name, "name")?,
            email: required(self.email, "email")?,
            mobile: required(self.mobile, "mobile")?,
            designation: required(self.designation, "designation")?
                .parse::<Designation>()
                .map_err(invalid)?,
            course: self
                .course
                .iter()
                .map(|c| c.trim().parse::<Course>())
                .collect::<Result<BTreeSet<_>, _>>()
                .map_err(invalid)?,
            gender: required(self.gender, "gender")?
                .parse::<Gender>()
                .map_err(invalid)?,
        };
        validate_payload(&employee)?;
        Ok(employee)
    }
}

fn map_multipart_error(err: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {err}"))
}

async fn read_field(field: &mut Field, limit: usize, name: &str) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if data.len() + chunk.len() > limit {
            return Err(AppError::Validation(format!(
                "{name} exceeds the {limit} byte limit"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, AppError> {
    let bytes = read_field(field, MAX_TEXT_FIELD_BYTES, name).await?;
    String::from_utf8(bytes).map_err(|_| AppError::Validation(format!("{name} must be UTF-8 text")))
}

/// Collects a create-employee multipart body.
///
/// An `image` part with no content counts as no image, which is what a
/// browser sends when the file input was left empty.
pub async fn read_employee_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<(NewEmployee, Option<ImageUpload>), AppError> {
    let mut submission = EmployeeSubmission::default();
    let mut image = None;

    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(str::to_string);

        match name.as_str() {
            "name" => submission.name = Some(read_text(&mut field, "name").await?),
            "email" => submission.email = Some(read_text(&mut field, "email").await?),
            "mobile" => submission.mobile = Some(read_text(&mut field, "mobile").await?),
            "designation" => {
                submission.designation = Some(read_text(&mut field, "designation").await?);
            }
            "course" | "course[]" => submission.course.push(read_text(&mut field, "course").await?),
            "gender" => submission.gender = Some(read_text(&mut field, "gender").await?),
            "image" => {
                let bytes = read_field(&mut field, max_image_bytes, "image").await?;
                if !bytes.is_empty() {
                    image = Some(inspect_image(file_name, bytes, max_image_bytes)?);
                }
            }
            other => {
                return Err(AppError::Validation(format!("Unexpected field '{other}'")));
            }
        }
    }

    Ok((submission.into_new_employee()?, image))
}
