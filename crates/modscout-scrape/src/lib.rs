// Adapters that feed the core: fetch the favorites page, scrape records out of it
pub mod client;
pub mod extract;
pub mod html;

pub use client::{scrape_favorites, FavoritesClient, PageSource, ScrapeError};
pub use extract::extract_favorites;
