use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::auth::AuthenticatedUser;
use crate::models::employee::{EmployeeEnvelope, EmployeeUpdate};
use crate::utils::multipart::read_employee_form;
use crate::utils::validation::validate_payload;
use crate::AppState;

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("Employee not found".to_string()))
}

/// Removes an image that no record points at. Failures are only logged.
async fn discard_image(state: &AppState, key: &str) {
    if let Err(err) = state.images.remove(key).await {
        log::warn!("Failed to remove image {key}: {err}");
    }
}

pub async fn create_employee(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (new_employee, image) = read_employee_form(payload, state.max_image_bytes).await?;

    let stored_image = match image {
        Some(upload) => {
            log::debug!(
                "Storing image '{}' ({}, {} bytes)",
                upload.file_name.as_deref().unwrap_or("unnamed"),
                upload.content_type,
                upload.bytes.len()
            );
            Some(state.images.put(upload).await?)
        }
        None => None,
    };
    let image_key = stored_image.as_ref().map(|file| file.key.clone());

    let employee = match state.employees.insert_employee(new_employee, stored_image).await {
        Ok(employee) => employee,
        Err(err) => {
            if let Some(key) = image_key {
                discard_image(&state, &key).await;
            }
            return Err(err.into());
        }
    };

    log::info!("Employee {} created by '{}'", employee.id, user.username);
    Ok(HttpResponse::Created().json(EmployeeEnvelope { employee }))
}

pub async fn get_employees(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let employees = state.employees.list_employees().await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    let employee = state
        .employees
        .get_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(EmployeeEnvelope { employee }))
}

pub async fn update_employee(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
    updates: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    let mut updates = updates.into_inner();
    updates.normalize();
    if updates.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    validate_payload(&updates)?;

    let employee = state
        .employees
        .update_employee(id, &updates)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    log::info!("Employee {id} updated by '{}'", user.username);
    Ok(HttpResponse::Ok().json(EmployeeEnvelope { employee }))
}

pub async fn delete_employee(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    let employee = state
        .employees
        .delete_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    if let Some(key) = &employee.image_key {
        discard_image(&state, key).await;
    }

    log::info!("Employee {id} deleted by '{}'", user.username);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}
