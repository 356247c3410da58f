pub mod ingest_task;
pub mod rest;
pub mod state;

// Re-export the router builder and the OpenAPI definition to make them easily
// accessible to the binaries that build the web server.
pub use rest::{api_router, ApiDoc};
