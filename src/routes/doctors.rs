//! Hospital doctor route handlers
//!
//! CRUD for a hospital's medical staff, plus staff statistics and the
//! specialty picker.

use crate::db::queries::{
    COUNT_PENDING_DOCTOR_APPOINTMENTS, DELETE_DOCTOR, DOCTOR_STATISTICS, GET_DOCTOR,
    GET_DOCTOR_BY_EMAIL, GET_DOCTOR_ID_AND_NAME, GET_HOSPITAL_ID, INSERT_DOCTOR,
    LIST_HOSPITAL_DOCTORS, LIST_SPECIALTIES,
};
use crate::db::col;
use crate::error::{
    conflict_error, not_found_error, validation_error, ApiResult, AppError,
};
use crate::models::{
    CreateDoctorRequest, DoctorListResponse, DoctorResponse, DoctorStatistics,
    DoctorStatisticsResponse, DoctorView, ExperienceInput, HospitalScopeQuery, MessageResponse,
    SpecialtiesResponse, UpdateDoctorRequest, COMMON_SPECIALTIES,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Params, Row, Value};
use tracing::{debug, info};
use validator::Validate;

/// Strip a caller-provided string, collapsing blanks to `None`
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Re-read one doctor row after a write
async fn fetch_doctor(conn: &mut Conn, doctor_id: u64) -> Result<DoctorView, AppError> {
    let row: Option<Row> = conn.exec_first(GET_DOCTOR, (doctor_id,)).await?;
    row.map(|row| DoctorView::from_row(&row))
        .ok_or_else(|| AppError::Internal(format!("Doctor {doctor_id} disappeared after write")))
}

/// List all doctors for a hospital with today's appointment load
pub async fn list_doctors(
    State(state): State<SharedState>,
    Query(params): Query<HospitalScopeQuery>,
) -> ApiResult<Json<DoctorListResponse>> {
    let hospital_id = params
        .hospital_id
        .ok_or_else(|| validation_error("hospital_id is required"))?;

    debug!("Listing doctors for hospital {}", hospital_id);

    let mut conn = state.db_pool.get_conn().await?;
    let rows: Vec<Row> = conn.exec(LIST_HOSPITAL_DOCTORS, (hospital_id,)).await?;

    let doctors: Vec<DoctorView> = rows.iter().map(DoctorView::from_row).collect();
    let total = doctors.len();

    info!("Listed {} doctors for hospital {}", total, hospital_id);

    Ok(Json(DoctorListResponse {
        success: true,
        doctors,
        total,
    }))
}

/// Add a doctor to a hospital
pub async fn create_doctor(
    State(state): State<SharedState>,
    Json(payload): Json<CreateDoctorRequest>,
) -> ApiResult<(StatusCode, Json<DoctorResponse>)> {
    if let Some(field) = payload.missing_fields().first() {
        return Err(validation_error(format!("{field} is required")));
    }
    payload
        .validate()
        .map_err(|e| validation_error(e.to_string()))?;

    // missing_fields() verified these are present
    let hospital_id = payload.hospital_id.unwrap_or_default();
    let name = payload.name.clone().unwrap_or_default().trim().to_string();
    let specialty = payload
        .specialty
        .clone()
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut conn = state.db_pool.get_conn().await?;

    let hospital: Option<Row> = conn.exec_first(GET_HOSPITAL_ID, (hospital_id,)).await?;
    if hospital.is_none() {
        return Err(not_found_error("Hospital not found"));
    }

    // One email, one registration per hospital
    let email = payload.normalized_email();
    if let Some(email) = &email {
        let existing: Option<Row> = conn
            .exec_first(GET_DOCTOR_BY_EMAIL, (email.as_str(), hospital_id))
            .await?;
        if existing.is_some() {
            return Err(conflict_error("Email already registered in this hospital"));
        }
    }

    let experience = payload.experience.as_ref().and_then(ExperienceInput::years);

    let params = Params::Positional(vec![
        Value::from(name),
        Value::from(email),
        Value::from(clean(payload.phone)),
        Value::from(specialty),
        Value::from(clean(payload.qualification)),
        Value::from(experience),
        Value::from(0.0_f64), // initial rating
        Value::from(hospital_id),
        Value::from(payload.consultation_fee.unwrap_or(0.0)),
        Value::from(true), // available by default
        Value::from(clean(payload.bio)),
    ]);

    conn.exec_drop(INSERT_DOCTOR, params).await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("Duplicate entry") {
            conflict_error(format!("Database integrity error: {err_msg}"))
        } else {
            AppError::Database(e)
        }
    })?;

    let doctor_id = conn.last_insert_id().unwrap_or(0);
    let doctor = fetch_doctor(&mut conn, doctor_id).await?;

    info!("Doctor {} added to hospital {}", doctor_id, hospital_id);

    Ok((
        StatusCode::CREATED,
        Json(DoctorResponse {
            success: true,
            message: "Doctor added successfully".to_string(),
            doctor,
        }),
    ))
}

/// Update any subset of a doctor's editable fields
pub async fn update_doctor(
    State(state): State<SharedState>,
    Path(doctor_id): Path<u64>,
    Json(payload): Json<UpdateDoctorRequest>,
) -> ApiResult<Json<DoctorResponse>> {
    let mut conn = state.db_pool.get_conn().await?;

    let existing: Option<Row> = conn.exec_first(GET_DOCTOR_ID_AND_NAME, (doctor_id,)).await?;
    if existing.is_none() {
        return Err(not_found_error("Doctor not found"));
    }

    let Some((statement, params)) = payload.into_builder().build("id", doctor_id) else {
        return Err(AppError::BadRequest("No valid fields to update".to_string()));
    };

    debug!("Updating doctor {}: {}", doctor_id, statement);
    conn.exec_drop(statement, params).await?;

    let doctor = fetch_doctor(&mut conn, doctor_id).await?;

    info!("Doctor {} updated", doctor_id);

    Ok(Json(DoctorResponse {
        success: true,
        message: "Doctor updated successfully".to_string(),
        doctor,
    }))
}

/// Remove a doctor, unless appointments still depend on them
pub async fn delete_doctor(
    State(state): State<SharedState>,
    Path(doctor_id): Path<u64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = state.db_pool.get_conn().await?;

    let existing: Option<Row> = conn.exec_first(GET_DOCTOR_ID_AND_NAME, (doctor_id,)).await?;
    let Some(row) = existing else {
        return Err(not_found_error("Doctor not found"));
    };
    let doctor_name: String = col(&row, "name").unwrap_or_default();

    let pending: Option<Row> = conn
        .exec_first(COUNT_PENDING_DOCTOR_APPOINTMENTS, (doctor_id,))
        .await?;
    let pending_count: u64 = pending
        .as_ref()
        .and_then(|row| col(row, "count"))
        .unwrap_or(0);

    if pending_count > 0 {
        return Err(conflict_error(format!(
            "Cannot delete doctor with {pending_count} pending appointments"
        )));
    }

    conn.exec_drop(DELETE_DOCTOR, (doctor_id,)).await?;

    info!("Doctor {} ({}) removed", doctor_id, doctor_name);
    Ok(Json(MessageResponse::new(format!(
        "Doctor {doctor_name} removed successfully"
    ))))
}

/// Aggregate statistics for a hospital's medical staff
pub async fn doctor_statistics(
    State(state): State<SharedState>,
    Query(params): Query<HospitalScopeQuery>,
) -> ApiResult<Json<DoctorStatisticsResponse>> {
    let hospital_id = params
        .hospital_id
        .ok_or_else(|| validation_error("hospital_id is required"))?;

    let mut conn = state.db_pool.get_conn().await?;
    let row: Option<Row> = conn.exec_first(DOCTOR_STATISTICS, (hospital_id,)).await?;

    let statistics = row
        .map(|row| DoctorStatistics::from_row(&row))
        .unwrap_or(DoctorStatistics {
            total_doctors: 0,
            active_doctors: 0,
            offline_doctors: 0,
            average_rating: 0.0,
            today_appointments: 0,
        });

    Ok(Json(DoctorStatisticsResponse {
        success: true,
        statistics,
    }))
}

/// All specialties known to the system, database-defined plus built-ins
pub async fn list_specialties(
    State(state): State<SharedState>,
) -> ApiResult<Json<SpecialtiesResponse>> {
    let mut conn = state.db_pool.get_conn().await?;
    let mut specialties: Vec<String> = conn.query(LIST_SPECIALTIES).await?;

    for specialty in COMMON_SPECIALTIES {
        if !specialties.iter().any(|s| s == specialty) {
            specialties.push(specialty.to_string());
        }
    }
    specialties.sort();

    Ok(Json(SpecialtiesResponse {
        success: true,
        specialties,
    }))
}
