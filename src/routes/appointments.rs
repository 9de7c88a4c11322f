//! Hospital appointment route handlers
//!
//! CRUD for a hospital's appointment book, plus the doctor list backing
//! the booking form.

use crate::db::queries::{
    DELETE_APPOINTMENT, GET_APPOINTMENT_ID, GET_HOSPITAL_DOCTOR_IN_HOSPITAL, GET_HOSPITAL_ID,
    INSERT_APPOINTMENT, LIST_AVAILABLE_DOCTORS, LIST_HOSPITAL_APPOINTMENTS,
    UPDATE_APPOINTMENT_STATUS,
};
use crate::error::{not_found_error, validation_error, ApiResult, AppError};
use crate::models::{
    Appointment, AppointmentListResponse, AppointmentStats, AvailableDoctor,
    AvailableDoctorsResponse, CreateAppointmentRequest, CreateAppointmentResponse,
    HospitalScopeQuery, MessageResponse, UpdateAppointmentRequest, UpdateStatusRequest,
    VALID_STATUSES,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mysql_async::prelude::Queryable;
use mysql_async::{Params, Row, Value};
use tracing::{debug, info};
use validator::Validate;

/// List all appointments for a hospital, newest first, with headline stats
pub async fn list_appointments(
    State(state): State<SharedState>,
    Query(params): Query<HospitalScopeQuery>,
) -> ApiResult<Json<AppointmentListResponse>> {
    let hospital_id = params
        .hospital_id
        .ok_or_else(|| validation_error("hospital_id is required"))?;

    debug!("Listing appointments for hospital {}", hospital_id);

    let mut conn = state.db_pool.get_conn().await?;
    let rows: Vec<Row> = conn.exec(LIST_HOSPITAL_APPOINTMENTS, (hospital_id,)).await?;

    let appointments: Vec<Appointment> = rows.iter().map(Appointment::from_row).collect();
    let stats = AppointmentStats::summarize(&appointments);

    info!(
        "Listed {} appointments for hospital {}",
        appointments.len(),
        hospital_id
    );

    Ok(Json(AppointmentListResponse {
        appointments,
        stats,
    }))
}

/// Book a new appointment
pub async fn create_appointment(
    State(state): State<SharedState>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<CreateAppointmentResponse>)> {
    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(validation_error(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    payload
        .validate()
        .map_err(|e| validation_error(e.to_string()))?;

    // missing_fields() verified these are present
    let hospital_id = payload.hospital_id.unwrap_or_default();

    let mut conn = state.db_pool.get_conn().await?;

    // Verify hospital exists
    let hospital: Option<Row> = conn.exec_first(GET_HOSPITAL_ID, (hospital_id,)).await?;
    if hospital.is_none() {
        return Err(not_found_error("Hospital not found"));
    }

    // Verify the doctor belongs to this hospital when one was picked
    if let Some(doctor_id) = payload.hospital_doctor_id {
        let doctor: Option<Row> = conn
            .exec_first(GET_HOSPITAL_DOCTOR_IN_HOSPITAL, (doctor_id, hospital_id))
            .await?;
        if doctor.is_none() {
            return Err(not_found_error("Hospital doctor not found"));
        }
    }

    let params = Params::Positional(vec![
        Value::from(hospital_id),
        Value::from(payload.hospital_doctor_id),
        Value::from(payload.patient_name),
        Value::from(payload.patient_phone),
        Value::from(payload.patient_email),
        Value::from(payload.appointment_date),
        Value::from(payload.appointment_time),
        Value::from(payload.department),
        Value::from(payload.appointment_type),
        Value::from(payload.priority),
        Value::from(payload.status),
        Value::from(payload.symptoms),
        Value::from(payload.notes),
    ]);
    conn.exec_drop(INSERT_APPOINTMENT, params).await?;
    let appointment_id = conn.last_insert_id().unwrap_or(0);

    info!(
        "Created appointment {} for hospital {}",
        appointment_id, hospital_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateAppointmentResponse {
            message: "Appointment created successfully".to_string(),
            appointment_id,
        }),
    ))
}

/// Update any subset of an appointment's editable fields
pub async fn update_appointment(
    State(state): State<SharedState>,
    Path(appointment_id): Path<u64>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = state.db_pool.get_conn().await?;

    let existing: Option<Row> = conn.exec_first(GET_APPOINTMENT_ID, (appointment_id,)).await?;
    if existing.is_none() {
        return Err(not_found_error("Appointment not found"));
    }

    let Some((statement, params)) = payload.into_builder().build("id", appointment_id) else {
        return Err(AppError::BadRequest("No valid fields to update".to_string()));
    };

    debug!("Updating appointment {}: {}", appointment_id, statement);
    conn.exec_drop(statement, params).await?;

    info!("Appointment {} updated", appointment_id);
    Ok(Json(MessageResponse::new("Appointment updated successfully")))
}

/// Move an appointment to a new status
pub async fn update_status(
    State(state): State<SharedState>,
    Path(appointment_id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let status = payload
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| validation_error("status is required"))?;

    if !VALID_STATUSES.contains(&status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Invalid status. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )));
    }

    let mut conn = state.db_pool.get_conn().await?;

    let existing: Option<Row> = conn.exec_first(GET_APPOINTMENT_ID, (appointment_id,)).await?;
    if existing.is_none() {
        return Err(not_found_error("Appointment not found"));
    }

    conn.exec_drop(UPDATE_APPOINTMENT_STATUS, (status.as_str(), appointment_id))
        .await?;

    info!("Appointment {} moved to {}", appointment_id, status);
    Ok(Json(MessageResponse::new("Status updated successfully")))
}

/// Remove an appointment
pub async fn delete_appointment(
    State(state): State<SharedState>,
    Path(appointment_id): Path<u64>,
) -> ApiResult<Json<MessageResponse>> {
    let mut conn = state.db_pool.get_conn().await?;

    let existing: Option<Row> = conn.exec_first(GET_APPOINTMENT_ID, (appointment_id,)).await?;
    if existing.is_none() {
        return Err(not_found_error("Appointment not found"));
    }

    conn.exec_drop(DELETE_APPOINTMENT, (appointment_id,)).await?;

    info!("Appointment {} deleted", appointment_id);
    Ok(Json(MessageResponse::new("Appointment deleted successfully")))
}

/// Available doctors for the booking form dropdown
pub async fn doctors_for_appointments(
    State(state): State<SharedState>,
    Query(params): Query<HospitalScopeQuery>,
) -> ApiResult<Json<AvailableDoctorsResponse>> {
    let hospital_id = params
        .hospital_id
        .ok_or_else(|| validation_error("hospital_id is required"))?;

    let mut conn = state.db_pool.get_conn().await?;
    let rows: Vec<Row> = conn.exec(LIST_AVAILABLE_DOCTORS, (hospital_id,)).await?;

    let doctors: Vec<AvailableDoctor> = rows.iter().map(AvailableDoctor::from_row).collect();

    Ok(Json(AvailableDoctorsResponse { doctors }))
}
