pub mod list;
pub mod redirect;
pub mod shorten;
