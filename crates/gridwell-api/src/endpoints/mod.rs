// Transport-agnostic endpoint layer.
//
// Each function validates inputs, calls the service layer, and converts
// results to V1 DTOs. HTTP adapters in `transports::http` wrap these with
// extraction, deadlines, and the response envelope.

pub mod events;
pub mod feedback;
pub mod frames;
pub mod heatmap;
pub mod objects;
pub mod stats;
pub mod system;
