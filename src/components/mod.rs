//! Leptos components.

pub mod details;
pub mod toolbar;
pub mod topology_graph;
