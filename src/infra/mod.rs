pub mod checkpoint_file;
pub mod helpdesk;
pub mod postgres;
pub mod telegram;
pub mod version_page;
