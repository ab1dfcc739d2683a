pub mod extractor;
pub mod llm;
pub mod redact;

pub use extractor::{DocumentExtract, ExtractError, PdfTextExtractor};
pub use llm::{ChatModel, Classification, LlmError, OllamaChatModel};
