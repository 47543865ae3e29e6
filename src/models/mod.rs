pub mod books;
pub mod list_params;
pub mod pagination;
