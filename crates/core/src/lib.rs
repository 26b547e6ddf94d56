//! `binventory-core` — inventory domain types and client-side behaviours.
//!
//! This crate is **pure**: no IO, no HTTP, no storage. The server crates build
//! on the record types here, and the suggestion/pagination helpers capture the
//! behaviour the browser widgets implement.

pub mod autocomplete;
pub mod error;
pub mod id;
pub mod item;
pub mod location;
pub mod navigator;
pub mod pagination;
pub mod suggestions;
pub mod vocabulary;

pub use error::{DomainError, DomainResult};
pub use id::ItemId;
pub use item::{Item, ItemPatch, ItemTag, NewItem};
pub use location::{
    AreaDetail, Autocomplete, BinDetail, BinRef, ContainerDetail, ContainerRef, ContainerSummary,
    LocationNames, SearchResult, TagDetail, UNKNOWN_LOCATION,
};
