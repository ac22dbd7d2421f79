//! HTTP API Layer
//!
//! This crate provides the REST API for the school fees system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for students, fees, settings and expenses
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: Consistent JSON error responses
//!
//! The router only sees domain services and ports, so tests can build it
//! over in-memory ports while the server binary wires in PostgreSQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppPorts, AppState};
//!
//! let state = AppState::new(config, AppPorts::postgres(pool));
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_admissions::{AdmissionService, StudentPort};
use domain_expenses::{ExpensePort, ExpenseService};
use domain_fees::{
    EnrollmentPort, FeeObligationPort, FeePaymentService, FeeScheduleService, FeeSettingsPort,
};
use infra_db::{
    DatabasePool, PostgresExpenseAdapter, PostgresFeeAdapter, PostgresSettingsAdapter,
    PostgresStudentAdapter,
};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{expenses, fees, health, login, settings, students};

/// Storage ports the API runs on
#[derive(Clone)]
pub struct AppPorts {
    pub students: Arc<dyn StudentPort>,
    pub settings: Arc<dyn FeeSettingsPort>,
    pub obligations: Arc<dyn FeeObligationPort>,
    pub enrollments: Arc<dyn EnrollmentPort>,
    pub expenses: Arc<dyn ExpensePort>,
}

impl AppPorts {
    /// PostgreSQL adapters sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        let fees = Arc::new(PostgresFeeAdapter::new(pool.clone()));
        Self {
            students: Arc::new(PostgresStudentAdapter::new(pool.clone())),
            settings: Arc::new(PostgresSettingsAdapter::new(pool.clone())),
            obligations: fees.clone(),
            enrollments: fees,
            expenses: Arc::new(PostgresExpenseAdapter::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub ports: AppPorts,
    pub admissions: Arc<AdmissionService>,
    pub fee_schedules: Arc<FeeScheduleService>,
    pub fee_payments: Arc<FeePaymentService>,
    pub expenses: Arc<ExpenseService>,
}

impl AppState {
    pub fn new(config: ApiConfig, ports: AppPorts) -> Self {
        let admissions = AdmissionService::new(ports.students.clone());
        let fee_schedules = FeeScheduleService::new(
            ports.settings.clone(),
            ports.obligations.clone(),
            ports.enrollments.clone(),
            config.admission_fee_attribution,
        );
        let fee_payments = FeePaymentService::new(ports.obligations.clone());
        let expenses = ExpenseService::new(ports.expenses.clone(), config.currency);

        Self {
            config: Arc::new(config),
            ports,
            admissions: Arc::new(admissions),
            fee_schedules: Arc::new(fee_schedules),
            fee_payments: Arc::new(fee_payments),
            expenses: Arc::new(expenses),
        }
    }

    /// Today's date in the school's timezone
    pub fn today(&self) -> chrono::NaiveDate {
        self.config.school_timezone.today()
    }
}

/// Creates the main API router
///
/// Public routes are `/health`, `/health/ready` and `/auth/login`;
/// everything under `/api/v1` requires a bearer token and is audit logged.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/login", post(login::login));

    let student_routes = Router::new()
        .route("/", post(students::admit_student).get(students::list_students))
        .route(
            "/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::deactivate_student),
        )
        .route("/:id/fees", get(fees::student_statement));

    let fee_routes = Router::new()
        .route("/monthly", post(fees::generate_monthly_fees))
        .route("/:id", get(fees::get_obligation))
        .route("/:id/payments", post(fees::record_payment).get(fees::list_payments));

    let settings_routes = Router::new()
        .route("/", get(settings::get_settings))
        .route("/class-fees", put(settings::update_class_fees))
        .route("/transport-bands", put(settings::update_transport_bands))
        .route("/transport-fee", get(settings::transport_fee));

    let expense_routes = Router::new()
        .route("/", post(expenses::create_expense).get(expenses::list_expenses))
        .route("/summary", get(expenses::expense_summary))
        .route("/:id", axum::routing::delete(expenses::delete_expense));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/students", student_routes)
        .nest("/fees", fee_routes)
        .nest("/settings", settings_routes)
        .nest("/expenses", expense_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
