//! Admission control infrastructure

mod controller;

pub use controller::AdmissionController;
