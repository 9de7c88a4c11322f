//! SQL query constants and builders
//!
//! Contains all SQL queries used by the application. Date and time columns
//! are formatted server-side so rows arrive JSON-ready.

use mysql_async::{Params, Value};

/// All appointments for a hospital, newest first, with doctor details when
/// a doctor is assigned.
pub const LIST_HOSPITAL_APPOINTMENTS: &str = r#"
    SELECT
        ha.id,
        ha.hospital_id,
        ha.hospital_doctor_id,
        ha.patient_name,
        ha.patient_phone,
        ha.patient_email,
        DATE_FORMAT(ha.appointment_date, '%Y-%m-%d') AS appointment_date,
        TIME_FORMAT(ha.appointment_time, '%H:%i:%s') AS appointment_time,
        ha.department,
        ha.appointment_type,
        ha.priority,
        ha.status,
        ha.symptoms,
        ha.notes,
        DATE_FORMAT(ha.created_at, '%Y-%m-%dT%H:%i:%s') AS created_at,
        DATE_FORMAT(ha.updated_at, '%Y-%m-%dT%H:%i:%s') AS updated_at,
        hd.name AS doctor_name,
        hd.specialty AS doctor_specialty
    FROM hospital_appointments ha
    LEFT JOIN hospital_doctors hd ON ha.hospital_doctor_id = hd.id
    WHERE ha.hospital_id = ?
    ORDER BY ha.appointment_date DESC, ha.appointment_time DESC
"#;

/// Existence check used before inserts/updates/deletes
pub const GET_APPOINTMENT_ID: &str =
    "SELECT id FROM hospital_appointments WHERE id = ?";

pub const INSERT_APPOINTMENT: &str = r#"
    INSERT INTO hospital_appointments
        (hospital_id, hospital_doctor_id, patient_name, patient_phone, patient_email,
         appointment_date, appointment_time, department, appointment_type,
         priority, status, symptoms, notes)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const UPDATE_APPOINTMENT_STATUS: &str =
    "UPDATE hospital_appointments SET status = ? WHERE id = ?";

pub const DELETE_APPOINTMENT: &str = "DELETE FROM hospital_appointments WHERE id = ?";

pub const GET_HOSPITAL_ID: &str = "SELECT id FROM hospitals WHERE id = ?";

/// Doctor lookup scoped to a hospital (appointment booking must not cross
/// hospitals)
pub const GET_HOSPITAL_DOCTOR_IN_HOSPITAL: &str =
    "SELECT id, name FROM hospital_doctors WHERE id = ? AND hospital_id = ?";

/// Available doctors for the appointment form dropdown
pub const LIST_AVAILABLE_DOCTORS: &str = r#"
    SELECT id, name, specialty AS department, is_available
    FROM hospital_doctors
    WHERE hospital_id = ? AND is_available = TRUE
    ORDER BY name
"#;

/// All doctors for a hospital with today's active appointment count
pub const LIST_HOSPITAL_DOCTORS: &str = r#"
    SELECT
        hd.id,
        hd.name,
        hd.email,
        hd.phone,
        hd.specialty,
        hd.qualification,
        hd.experience,
        hd.rating,
        hd.hospital_id,
        hd.consultation_fee,
        hd.is_available,
        hd.bio,
        DATE_FORMAT(hd.created_at, '%Y-%m-%dT%H:%i:%s') AS created_at,
        COUNT(DISTINCT a.id) AS appointment_count
    FROM hospital_doctors hd
    LEFT JOIN appointments a ON hd.id = a.doctor_id
        AND DATE(a.appointment_date) = CURDATE()
        AND a.status IN ('pending', 'confirmed')
    WHERE hd.hospital_id = ?
    GROUP BY hd.id, hd.name, hd.email, hd.phone, hd.specialty, hd.qualification,
             hd.experience, hd.rating, hd.hospital_id, hd.consultation_fee,
             hd.is_available, hd.bio, hd.created_at
    ORDER BY hd.name
"#;

/// Single doctor, shaped like a `LIST_HOSPITAL_DOCTORS` row without the join
pub const GET_DOCTOR: &str = r#"
    SELECT id, name, email, phone, specialty, qualification,
           experience, rating, hospital_id, consultation_fee,
           is_available, bio,
           DATE_FORMAT(created_at, '%Y-%m-%dT%H:%i:%s') AS created_at
    FROM hospital_doctors
    WHERE id = ?
"#;

pub const GET_DOCTOR_ID_AND_NAME: &str =
    "SELECT id, name FROM hospital_doctors WHERE id = ?";

/// Per-hospital duplicate email guard
pub const GET_DOCTOR_BY_EMAIL: &str =
    "SELECT id FROM hospital_doctors WHERE email = ? AND hospital_id = ?";

pub const INSERT_DOCTOR: &str = r#"
    INSERT INTO hospital_doctors
        (name, email, phone, specialty, qualification,
         experience, rating, hospital_id, consultation_fee, is_available, bio)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const DELETE_DOCTOR: &str = "DELETE FROM hospital_doctors WHERE id = ?";

/// Upcoming pending/confirmed appointments blocking a doctor's removal
pub const COUNT_PENDING_DOCTOR_APPOINTMENTS: &str = r#"
    SELECT COUNT(*) AS count
    FROM appointments
    WHERE doctor_id = ?
        AND appointment_date >= CURDATE()
        AND status IN ('pending', 'confirmed')
"#;

/// Aggregate doctor statistics for a hospital
pub const DOCTOR_STATISTICS: &str = r#"
    SELECT
        COUNT(DISTINCT hd.id) AS total_doctors,
        COUNT(DISTINCT CASE WHEN hd.is_available = TRUE THEN hd.id END) AS available_doctors,
        COUNT(DISTINCT CASE WHEN hd.is_available = FALSE THEN hd.id END) AS offline_doctors,
        COALESCE(AVG(hd.rating), 0.0) AS average_rating,
        COUNT(DISTINCT a.id) AS today_appointments
    FROM hospital_doctors hd
    LEFT JOIN appointments a ON hd.id = a.doctor_id
        AND DATE(a.appointment_date) = CURDATE()
        AND a.status IN ('pending', 'confirmed')
    WHERE hd.hospital_id = ?
"#;

pub const LIST_SPECIALTIES: &str = r#"
    SELECT DISTINCT name
    FROM specialties
    WHERE name != 'Other'
    ORDER BY name
"#;

/// Parameterized `UPDATE ... SET` builder.
///
/// Callers register each updatable column with a literal name; values
/// travel as bind parameters. Caller-supplied field names never reach the
/// SQL text, so the set of `set` calls is the update allow-list.
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<&'static str>,
    values: Vec<Value>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Register a column assignment when the caller provided a value.
    pub fn set<V: Into<Value>>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.assignments.push(column);
            self.values.push(value.into());
        }
        self
    }

    /// True when no field was provided
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assemble the statement and its parameters, keyed on `key_column`.
    /// Returns `None` when no assignment was registered.
    pub fn build(mut self, key_column: &'static str, key: u64) -> Option<(String, Params)> {
        if self.assignments.is_empty() {
            return None;
        }

        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|column| format!("`{column}` = ?"))
            .collect();

        let statement = format!(
            "UPDATE `{}` SET {} WHERE `{}` = ?",
            self.table,
            assignments.join(", "),
            key_column
        );

        self.values.push(Value::from(key));
        Some((statement, Params::Positional(self.values)))
    }
}
