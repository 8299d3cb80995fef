//! Canvas rendering of the network topology.
//!
//! Draws the reconciled scene with:
//! - Internet and network boxes, device circles and category labels
//! - Distinct strokes per edge kind
//! - Pan, zoom and tap selection
//!
//! # Example
//!
//! ```ignore
//! let topology = RwSignal::new(None::<Arc<Topology>>);
//! let render_state = RwSignal::new(RenderState::default());
//! let on_select = Callback::new(|event: SelectionEvent| log::info!("{event:?}"));
//!
//! view! { <TopologyGraphCanvas topology render_state on_select fullscreen=true /> }
//! ```

mod component;
mod legend;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::TopologyGraphCanvas;
pub use theme::Theme;
