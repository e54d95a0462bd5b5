pub mod llm;
pub mod writer;

pub use llm::{DisabledLlm, HttpLlmClient, LlmClient};
pub use writer::{build_prompt, render_plain, QuoteCopywriter};
