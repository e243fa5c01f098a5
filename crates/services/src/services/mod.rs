pub mod absence_marker;
pub mod attendance_cleanup;
pub mod fixture_seeder;
pub mod setup_validator;
pub mod table_reset;
pub mod user_admin;
