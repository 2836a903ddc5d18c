//! Descriptor constructors for every backing-service endpoint.
//!
//! Paths are relative to the gateway's base URL. Each function only builds
//! a [`RequestDescriptor`]; nothing here touches the network. Body payload
//! types for the write endpoints live here too.

use serde::Serialize;

use crate::{Credentials, ProtocolError, RequestDescriptor};

pub const LOGIN: &str = "auth/login/";
pub const LOGOUT: &str = "auth/logout/";
pub const ME: &str = "auth/me/";
pub const REFRESH: &str = "auth/refresh/";
pub const DASHBOARD_STATS: &str = "dashboard/stats/";
pub const STUDENTS: &str = "students/";
pub const PAY: &str = "pay/";
pub const INSTALLMENTS: &str = "installments/";
pub const RECEIPTS: &str = "receipts/";
pub const RESULTS: &str = "results/";
pub const ADD_SUBJECT: &str = "results/add_subject/";
pub const CONTACT_MESSAGES: &str = "contact-messages/";

/// Installment amount used when the caller doesn't give one.
pub const DEFAULT_INSTALLMENT_AMOUNT: u64 = 100;

// ---------------------------------------------------------------------------
// Query and body types
// ---------------------------------------------------------------------------

/// Filters for the student list. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    pub search: Option<String>,
    pub level: Option<u8>,
    pub specialization: Option<String>,
}

impl StudentQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(level) = self.level {
            pairs.push(("level", level.to_string()));
        }
        if let Some(spec) = &self.specialization {
            pairs.push(("specialization", spec.clone()));
        }
        pairs
    }
}

/// Filters for the admin contact-message list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessageQuery {
    pub is_read: Option<bool>,
}

/// Body of `POST pay/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPayment {
    pub student_id: u64,
    pub installment_number: u8,
    pub amount: u64,
}

impl NewPayment {
    /// A payment for the default installment amount.
    pub fn new(student_id: u64, installment_number: u8) -> Self {
        Self {
            student_id,
            installment_number,
            amount: DEFAULT_INSTALLMENT_AMOUNT,
        }
    }
}

/// Body of `POST results/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewResult {
    pub student: u64,
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ScoreUpdate {
    total_score: f64,
}

/// Body of `POST results/add_subject/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectScore {
    pub student_id: u64,
    pub subject_name: String,
    pub score: f64,
}

/// Body of the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// Partial update of a contact message (`PATCH`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

pub fn login(credentials: &Credentials) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(LOGIN).with_json(credentials)
}

pub fn logout() -> RequestDescriptor {
    RequestDescriptor::post(LOGOUT)
}

pub fn me() -> RequestDescriptor {
    RequestDescriptor::get(ME)
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub fn dashboard_stats() -> RequestDescriptor {
    RequestDescriptor::get(DASHBOARD_STATS)
}

pub fn students(query: &StudentQuery) -> RequestDescriptor {
    RequestDescriptor::get(STUDENTS).with_query(query.pairs())
}

pub fn student(id: u64) -> RequestDescriptor {
    RequestDescriptor::get(format!("{STUDENTS}{id}/"))
}

pub fn create_student<B: Serialize>(student: &B) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(STUDENTS).with_json(student)
}

pub fn update_student<B: Serialize>(
    id: u64,
    student: &B,
) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::put(format!("{STUDENTS}{id}/")).with_json(student)
}

pub fn delete_student(id: u64) -> RequestDescriptor {
    RequestDescriptor::delete(format!("{STUDENTS}{id}/"))
}

pub fn create_payment(payment: &NewPayment) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(PAY).with_json(payment)
}

fn for_student(path: &str, student_id: Option<u64>) -> RequestDescriptor {
    RequestDescriptor::get(path).with_query(
        student_id.map(|id| ("student", id.to_string())),
    )
}

pub fn installments(student_id: Option<u64>) -> RequestDescriptor {
    for_student(INSTALLMENTS, student_id)
}

pub fn receipts(student_id: Option<u64>) -> RequestDescriptor {
    for_student(RECEIPTS, student_id)
}

pub fn results(student_id: Option<u64>) -> RequestDescriptor {
    for_student(RESULTS, student_id)
}

pub fn create_result(result: &NewResult) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(RESULTS).with_json(result)
}

pub fn update_result(id: u64, total_score: f64) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::patch(format!("{RESULTS}{id}/")).with_json(&ScoreUpdate { total_score })
}

pub fn add_subject_result(score: &SubjectScore) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(ADD_SUBJECT).with_json(score)
}

pub fn submit_contact_message(
    submission: &ContactSubmission,
) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::post(CONTACT_MESSAGES).with_json(submission)
}

pub fn contact_messages(query: &ContactMessageQuery) -> RequestDescriptor {
    RequestDescriptor::get(CONTACT_MESSAGES)
        .with_query(query.is_read.map(|read| ("is_read", read.to_string())))
}

pub fn update_contact_message(
    id: u64,
    update: &ContactMessageUpdate,
) -> Result<RequestDescriptor, ProtocolError> {
    RequestDescriptor::patch(format!("{CONTACT_MESSAGES}{id}/")).with_json(update)
}

pub fn delete_contact_message(id: u64) -> RequestDescriptor {
    RequestDescriptor::delete(format!("{CONTACT_MESSAGES}{id}/"))
}
