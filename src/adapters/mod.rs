// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod process;

pub use http::HttpProbe;
pub use process::ProcessRunner;
