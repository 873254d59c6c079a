pub mod coordinator;
pub mod geofence;
