// Integration test suite for Warbler
//
// Organized into focused modules by feature area.
// All modules share the common::TestClient for DB lifecycle management.


mod auth;
mod messages;
mod profile;
