pub mod gemini;
pub mod transport;

pub use gemini::{GeminiClient, GenerationConfig};
pub use transport::{ReqwestTransport, Transport, TransportFailure};
