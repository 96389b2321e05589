pub mod discourse_client;

pub use discourse_client::{parse_search_response, DiscourseSearchClient};
