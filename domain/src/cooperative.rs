pub use entity_api::cooperative::{create, delete_by_id, find_all, find_by_id, update};
