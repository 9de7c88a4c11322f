//! Appointment-related models and DTOs

use mysql_async::Row;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::col;
use crate::db::queries::UpdateBuilder;
use crate::validation::validate_phone;

/// Appointment statuses accepted by the API
pub const VALID_STATUSES: &[&str] = &["pending", "confirmed", "completed", "cancelled"];

/// One hospital appointment, with doctor details when a doctor is assigned
#[derive(Debug, Serialize)]
pub struct Appointment {
    pub id: u64,
    pub hospital_id: u64,
    pub hospital_doctor_id: Option<u64>,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub department: String,
    pub appointment_type: String,
    pub priority: String,
    pub status: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_specialty: Option<String>,
}

impl Appointment {
    /// Map a `LIST_HOSPITAL_APPOINTMENTS` row. Dates arrive pre-formatted
    /// by the query.
    pub(crate) fn from_row(row: &Row) -> Self {
        Self {
            id: col(row, "id").unwrap_or_default(),
            hospital_id: col(row, "hospital_id").unwrap_or_default(),
            hospital_doctor_id: col(row, "hospital_doctor_id"),
            patient_name: col(row, "patient_name").unwrap_or_default(),
            patient_phone: col(row, "patient_phone"),
            patient_email: col(row, "patient_email"),
            appointment_date: col(row, "appointment_date").unwrap_or_default(),
            appointment_time: col(row, "appointment_time").unwrap_or_default(),
            department: col(row, "department").unwrap_or_default(),
            appointment_type: col(row, "appointment_type").unwrap_or_default(),
            priority: col(row, "priority").unwrap_or_default(),
            status: col(row, "status").unwrap_or_default(),
            symptoms: col(row, "symptoms"),
            notes: col(row, "notes"),
            created_at: col(row, "created_at"),
            updated_at: col(row, "updated_at"),
            doctor_name: col(row, "doctor_name"),
            doctor_specialty: col(row, "doctor_specialty"),
        }
    }
}

/// Headline numbers shown above the appointment list
#[derive(Debug, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub today: usize,
    pub pending: usize,
    pub confirmed: usize,
}

impl AppointmentStats {
    /// Compute stats over an already-fetched appointment list
    pub fn summarize(appointments: &[Appointment]) -> Self {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

        Self {
            total: appointments.len(),
            today: appointments
                .iter()
                .filter(|a| a.appointment_date == today)
                .count(),
            pending: appointments.iter().filter(|a| a.status == "pending").count(),
            confirmed: appointments
                .iter()
                .filter(|a| a.status == "confirmed")
                .count(),
        }
    }
}

/// Response for the appointment list endpoint
#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
    pub stats: AppointmentStats,
}

/// Query string for endpoints scoped to one hospital
#[derive(Debug, Deserialize)]
pub struct HospitalScopeQuery {
    pub hospital_id: Option<u64>,
}

/// Request to book a new appointment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    pub hospital_id: Option<u64>,
    pub hospital_doctor_id: Option<u64>,

    #[validate(length(min = 1, max = 255, message = "Patient name must be between 1 and 255 characters"))]
    pub patient_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub patient_phone: Option<String>,

    #[validate(email(message = "Invalid patient email address"))]
    pub patient_email: Option<String>,

    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub department: Option<String>,

    #[serde(default = "default_appointment_type")]
    pub appointment_type: String,

    #[serde(default = "default_priority")]
    pub priority: String,

    #[serde(default = "default_status")]
    pub status: String,

    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

fn default_appointment_type() -> String {
    "Consultation".to_string()
}

fn default_priority() -> String {
    "normal".to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

impl CreateAppointmentRequest {
    /// Names of required fields the caller left out or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.hospital_id.is_none() {
            missing.push("hospital_id");
        }
        if self.patient_name.as_deref().map_or(true, str::is_empty) {
            missing.push("patient_name");
        }
        if self.appointment_date.as_deref().map_or(true, str::is_empty) {
            missing.push("appointment_date");
        }
        if self.appointment_time.as_deref().map_or(true, str::is_empty) {
            missing.push("appointment_time");
        }
        if self.department.as_deref().map_or(true, str::is_empty) {
            missing.push("department");
        }
        missing
    }
}

/// Response after booking an appointment
#[derive(Debug, Serialize)]
pub struct CreateAppointmentResponse {
    pub message: String,
    pub appointment_id: u64,
}

/// Partial update for an existing appointment. Absent fields are left
/// untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub hospital_doctor_id: Option<u64>,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub department: Option<String>,
    pub appointment_type: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    /// Register every provided field on a statement builder. The column
    /// names here are the full allow-list of updatable fields.
    pub fn into_builder(self) -> UpdateBuilder {
        let mut builder = UpdateBuilder::new("hospital_appointments");
        builder
            .set("hospital_doctor_id", self.hospital_doctor_id)
            .set("patient_name", self.patient_name)
            .set("patient_phone", self.patient_phone)
            .set("patient_email", self.patient_email)
            .set("appointment_date", self.appointment_date)
            .set("appointment_time", self.appointment_time)
            .set("department", self.department)
            .set("appointment_type", self.appointment_type)
            .set("priority", self.priority)
            .set("status", self.status)
            .set("symptoms", self.symptoms)
            .set("notes", self.notes);
        builder
    }
}

/// Request to move an appointment to a new status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Doctor entry for the booking form dropdown
#[derive(Debug, Serialize)]
pub struct AvailableDoctor {
    pub id: u64,
    pub name: String,
    pub department: String,
    pub is_available: bool,
}

impl AvailableDoctor {
    pub(crate) fn from_row(row: &Row) -> Self {
        Self {
            id: col(row, "id").unwrap_or_default(),
            name: col(row, "name").unwrap_or_default(),
            department: col(row, "department").unwrap_or_default(),
            is_available: col(row, "is_available").unwrap_or_default(),
        }
    }
}

/// Response for the booking form doctor list
#[derive(Debug, Serialize)]
pub struct AvailableDoctorsResponse {
    pub doctors: Vec<AvailableDoctor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(date: &str, status: &str) -> Appointment {
        Appointment {
            id: 1,
            hospital_id: 1,
            hospital_doctor_id: None,
            patient_name: "Test Patient".to_string(),
            patient_phone: None,
            patient_email: None,
            appointment_date: date.to_string(),
            appointment_time: "10:00:00".to_string(),
            department: "Cardiology".to_string(),
            appointment_type: "Consultation".to_string(),
            priority: "normal".to_string(),
            status: status.to_string(),
            symptoms: None,
            notes: None,
            created_at: None,
            updated_at: None,
            doctor_name: None,
            doctor_specialty: None,
        }
    }

    #[test]
    fn stats_count_statuses_and_today() {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        let list = vec![
            appointment(&today, "pending"),
            appointment("2000-01-01", "confirmed"),
            appointment("2000-01-02", "cancelled"),
        ];

        let stats = AppointmentStats::summarize(&list);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.confirmed, 1);
    }

    #[test]
    fn missing_fields_reports_absent_and_empty_values() {
        let request = CreateAppointmentRequest {
            hospital_id: Some(1),
            hospital_doctor_id: None,
            patient_name: Some(String::new()),
            patient_phone: None,
            patient_email: None,
            appointment_date: Some("2026-09-01".to_string()),
            appointment_time: None,
            department: Some("Cardiology".to_string()),
            appointment_type: default_appointment_type(),
            priority: default_priority(),
            status: default_status(),
            symptoms: None,
            notes: None,
        };

        assert_eq!(
            request.missing_fields(),
            vec!["patient_name", "appointment_time"]
        );
    }

    #[test]
    fn update_request_builds_only_provided_assignments() {
        let request = UpdateAppointmentRequest {
            status: Some("confirmed".to_string()),
            notes: Some("bring previous reports".to_string()),
            ..Default::default()
        };

        let (statement, _) = request.into_builder().build("id", 9).unwrap();
        assert_eq!(
            statement,
            "UPDATE `hospital_appointments` SET `status` = ?, `notes` = ? WHERE `id` = ?"
        );
    }

    #[test]
    fn update_request_with_no_fields_is_empty() {
        assert!(UpdateAppointmentRequest::default().into_builder().is_empty());
    }
}
