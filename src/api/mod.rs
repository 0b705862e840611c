//! HTTP API exposing the workflow controller to the browser

pub mod routes;
