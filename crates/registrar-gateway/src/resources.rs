//! Resource methods used by the dashboard pages.
//!
//! Each method builds a descriptor from [`registrar_protocol::endpoints`]
//! and runs it through [`Gateway::execute`], so every resource gets the
//! same classification and refresh behavior. Responses come back as
//! envelopes, untouched: the backing service's business rules (receipts,
//! uniform and book entitlement after a payment, ...) are its own.

use registrar_protocol::endpoints::{
    self, ContactMessageQuery, ContactMessageUpdate, ContactSubmission, NewPayment, NewResult,
    StudentQuery, SubjectScore,
};
use registrar_protocol::ResponseEnvelope;
use registrar_transport::HttpTransport;
use serde::Serialize;

use crate::{Gateway, GatewayError};

type CallResult = Result<ResponseEnvelope, GatewayError>;

impl<T: HttpTransport> Gateway<T> {
    pub async fn dashboard_stats(&self) -> CallResult {
        self.execute(&endpoints::dashboard_stats()).await
    }

    // -- Students ---------------------------------------------------------

    pub async fn students(&self, query: &StudentQuery) -> CallResult {
        self.execute(&endpoints::students(query)).await
    }

    pub async fn student(&self, id: u64) -> CallResult {
        self.execute(&endpoints::student(id)).await
    }

    pub async fn create_student<B: Serialize>(&self, student: &B) -> CallResult {
        self.execute(&endpoints::create_student(student)?).await
    }

    pub async fn update_student<B: Serialize>(&self, id: u64, student: &B) -> CallResult {
        self.execute(&endpoints::update_student(id, student)?).await
    }

    pub async fn delete_student(&self, id: u64) -> CallResult {
        self.execute(&endpoints::delete_student(id)).await
    }

    // -- Payments ---------------------------------------------------------

    pub async fn create_payment(&self, payment: &NewPayment) -> CallResult {
        self.execute(&endpoints::create_payment(payment)?).await
    }

    pub async fn installments(&self, student_id: Option<u64>) -> CallResult {
        self.execute(&endpoints::installments(student_id)).await
    }

    pub async fn receipts(&self, student_id: Option<u64>) -> CallResult {
        self.execute(&endpoints::receipts(student_id)).await
    }

    // -- Results ----------------------------------------------------------

    pub async fn results(&self, student_id: Option<u64>) -> CallResult {
        self.execute(&endpoints::results(student_id)).await
    }

    pub async fn create_result(&self, result: &NewResult) -> CallResult {
        self.execute(&endpoints::create_result(result)?).await
    }

    pub async fn update_result(&self, id: u64, total_score: f64) -> CallResult {
        self.execute(&endpoints::update_result(id, total_score)?).await
    }

    pub async fn add_subject_result(&self, score: &SubjectScore) -> CallResult {
        self.execute(&endpoints::add_subject_result(score)?).await
    }

    // -- Contact messages -------------------------------------------------

    /// Public contact form; works without a signed-in user.
    pub async fn submit_contact_message(&self, submission: &ContactSubmission) -> CallResult {
        self.execute(&endpoints::submit_contact_message(submission)?).await
    }

    pub async fn contact_messages(&self, query: &ContactMessageQuery) -> CallResult {
        self.execute(&endpoints::contact_messages(query)).await
    }

    pub async fn update_contact_message(
        &self,
        id: u64,
        update: &ContactMessageUpdate,
    ) -> CallResult {
        self.execute(&endpoints::update_contact_message(id, update)?).await
    }

    pub async fn delete_contact_message(&self, id: u64) -> CallResult {
        self.execute(&endpoints::delete_contact_message(id)).await
    }
}
