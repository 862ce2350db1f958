pub mod gps_fix;
pub mod map_view;
pub mod metrics;
pub mod session_state;
pub mod step_record;
