// handlers/mod.rs - axum entry points
//
// payload:  request body extraction for project attributes
// projects: one handler per /projects route, each delegating to the controller
pub mod payload;
pub mod projects;
