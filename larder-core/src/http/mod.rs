//! HTTP fetching for the extraction pipeline.
//!
//! All page retrieval goes through the [`HttpClient`] trait so tests can
//! substitute canned responses via [`MockClient`].

mod client;

pub use client::{FetchClient, FetchClientBuilder, HttpClient, MockClient, MockResponse};
