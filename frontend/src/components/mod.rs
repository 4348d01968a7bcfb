pub mod analytics;
pub mod handlers;
pub mod header;
pub mod preview_area;
pub mod realtime;
pub mod results;
pub mod upload_section;
pub mod utils;
