pub mod format;
pub mod html;

pub use html::{kst_update_stamp, render_dashboard, DashboardData};
