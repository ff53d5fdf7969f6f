//! Backend for the VAGR TECHNOLOGY marketing site: static pages, a contact
//! form and job applications with PDF resumes, recorded in append-only CSV
//! logs on local disk.

pub mod config;
pub mod errors;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod storage;
