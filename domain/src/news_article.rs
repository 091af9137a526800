pub use entity_api::news_article::{create, delete_by_id, find_all, find_by_id, update};
