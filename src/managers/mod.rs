// Jobboard state managers
// Managers own client-side state: list views, bookmarks, the session, the blog reader and the post-job wizard.

pub mod blog_reader;
pub mod bookmark_tracker;
pub mod collection_view;
pub mod filter;
pub mod job_wizard;
pub mod paginator;
pub mod session_manager;
