//! Doctor-related models and DTOs

use mysql_async::Row;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::col;
use crate::db::queries::UpdateBuilder;
use crate::validation::{parse_experience, validate_phone};

/// Specialties always offered in the picker, whether or not the database
/// has a doctor for them yet
pub const COMMON_SPECIALTIES: &[&str] = &[
    "Cardiology",
    "Neurology",
    "Pediatrics",
    "Orthopedics",
    "Oncology",
    "Emergency Medicine",
    "General Medicine",
    "Surgery",
    "Gynecology",
    "Dermatology",
];

/// Years of experience as presented to the frontend: a number when known,
/// otherwise the placeholder string it expects.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExperienceView {
    Years(u32),
    Unspecified(&'static str),
}

impl From<Option<u32>> for ExperienceView {
    fn from(years: Option<u32>) -> Self {
        match years {
            Some(n) => ExperienceView::Years(n),
            None => ExperienceView::Unspecified("Not specified"),
        }
    }
}

/// Experience as accepted from the frontend: either a plain number or free
/// text like "10 years".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Years(u32),
    Text(String),
}

impl ExperienceInput {
    /// Extract a year count; free text yields its first digit run.
    pub fn years(&self) -> Option<u32> {
        match self {
            ExperienceInput::Years(n) => Some(*n),
            ExperienceInput::Text(text) => parse_experience(text),
        }
    }
}

/// One doctor as returned by the API
#[derive(Debug, Serialize)]
pub struct DoctorView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub qualification: String,
    pub experience: ExperienceView,
    pub rating: f64,
    pub hospital_id: u64,
    pub consultation_fee: f64,
    pub is_available: bool,
    pub bio: Option<String>,
    pub appointments: u64,
    pub status: String,
    pub created_at: Option<String>,
}

impl DoctorView {
    /// Map a doctor row. Works for both the list query (which carries an
    /// `appointment_count` column) and the single-row lookup (which does
    /// not; the count defaults to zero).
    pub(crate) fn from_row(row: &Row) -> Self {
        let is_available: bool = col(row, "is_available").unwrap_or_default();

        Self {
            id: col(row, "id").unwrap_or_default(),
            name: col(row, "name").unwrap_or_default(),
            email: col(row, "email").unwrap_or_else(|| "Not provided".to_string()),
            phone: col(row, "phone").unwrap_or_else(|| "Not provided".to_string()),
            specialty: col(row, "specialty").unwrap_or_default(),
            qualification: col(row, "qualification").unwrap_or_else(|| "Not specified".to_string()),
            experience: ExperienceView::from(col::<u32>(row, "experience")),
            rating: col(row, "rating").unwrap_or(0.0),
            hospital_id: col(row, "hospital_id").unwrap_or_default(),
            consultation_fee: col(row, "consultation_fee").unwrap_or(0.0),
            is_available,
            bio: col(row, "bio"),
            appointments: col(row, "appointment_count").unwrap_or(0),
            status: if is_available { "available" } else { "offline" }.to_string(),
            created_at: col(row, "created_at"),
        }
    }
}

/// Response for the doctor list endpoint
#[derive(Debug, Serialize)]
pub struct DoctorListResponse {
    pub success: bool,
    pub doctors: Vec<DoctorView>,
    pub total: usize,
}

/// Response carrying a single doctor (create/update)
#[derive(Debug, Serialize)]
pub struct DoctorResponse {
    pub success: bool,
    pub message: String,
    pub doctor: DoctorView,
}

/// Request to add a doctor to a hospital
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDoctorRequest {
    #[validate(length(min = 1, max = 255, message = "Doctor name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Specialty is required"))]
    pub specialty: Option<String>,

    pub hospital_id: Option<u64>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[serde(alias = "qualifications")]
    pub qualification: Option<String>,

    pub experience: Option<ExperienceInput>,

    pub consultation_fee: Option<f64>,

    pub bio: Option<String>,
}

impl CreateDoctorRequest {
    /// Names of required fields the caller left out or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.as_deref().map_or(true, str::is_empty) {
            missing.push("name");
        }
        if self.specialty.as_deref().map_or(true, str::is_empty) {
            missing.push("specialty");
        }
        if self.hospital_id.is_none() {
            missing.push("hospital_id");
        }
        missing
    }

    /// Trimmed email, with empty strings collapsed to `None`
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

/// Partial update for an existing doctor. Absent fields are left
/// untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,

    #[serde(alias = "qualifications")]
    pub qualification: Option<String>,

    pub experience: Option<ExperienceInput>,
    pub consultation_fee: Option<f64>,
    pub bio: Option<String>,
    pub is_available: Option<bool>,

    /// UI status string ("available" / "offline" / "in-session"), mapped
    /// onto `is_available`
    pub status: Option<String>,
}

impl UpdateDoctorRequest {
    /// Effective availability: an explicit `is_available` wins over the UI
    /// status string.
    pub fn availability(&self) -> Option<bool> {
        if self.is_available.is_some() {
            return self.is_available;
        }
        self.status.as_deref().map(|status| match status {
            "available" => true,
            "offline" | "in-session" => false,
            other => !other.is_empty(),
        })
    }

    /// Register every provided field on a statement builder. The column
    /// names here are the full allow-list of updatable fields.
    pub fn into_builder(self) -> UpdateBuilder {
        let availability = self.availability();
        let experience = self.experience.as_ref().and_then(ExperienceInput::years);

        let mut builder = UpdateBuilder::new("hospital_doctors");
        builder
            .set("name", self.name)
            .set("email", self.email)
            .set("phone", self.phone)
            .set("specialty", self.specialty)
            .set("qualification", self.qualification)
            .set("experience", experience)
            .set("consultation_fee", self.consultation_fee)
            .set("bio", self.bio)
            .set("is_available", availability);
        builder
    }
}

/// Aggregate numbers for a hospital's medical staff
#[derive(Debug, Serialize)]
pub struct DoctorStatistics {
    pub total_doctors: u64,
    pub active_doctors: u64,
    pub offline_doctors: u64,
    pub average_rating: f64,
    pub today_appointments: u64,
}

impl DoctorStatistics {
    pub(crate) fn from_row(row: &Row) -> Self {
        Self {
            total_doctors: col(row, "total_doctors").unwrap_or(0),
            active_doctors: col(row, "available_doctors").unwrap_or(0),
            offline_doctors: col(row, "offline_doctors").unwrap_or(0),
            average_rating: col(row, "average_rating").unwrap_or(0.0),
            today_appointments: col(row, "today_appointments").unwrap_or(0),
        }
    }
}

/// Response for the statistics endpoint
#[derive(Debug, Serialize)]
pub struct DoctorStatisticsResponse {
    pub success: bool,
    pub statistics: DoctorStatistics,
}

/// Response for the specialties endpoint
#[derive(Debug, Serialize)]
pub struct SpecialtiesResponse {
    pub success: bool,
    pub specialties: Vec<String>,
}
