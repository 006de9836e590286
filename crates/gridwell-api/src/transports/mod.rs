// Transport adapters over the shared endpoint layer.

pub mod http;
