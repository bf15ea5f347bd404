use crate::chat::PromptContext;

const INSTRUCTIONS: &str = "You are a helpful AI assistant answering questions about a PDF document. \
Use the following context from the document to answer the user's question. \
If the context doesn't contain relevant information, say so.";

const NO_CONTEXT: &str = "No passages of the document matched this question. \
Tell the user the document does not appear to contain this information.";

/// System prompt for a chat turn, ending with a `CONTEXT:` block.
#[must_use]
pub fn build_system_prompt(context: &PromptContext) -> String {
    let body = match context {
        PromptContext::Found(text) => text.as_str(),
        PromptContext::Empty => NO_CONTEXT,
        PromptContext::Unavailable(reason) => {
            return format!(
                "{INSTRUCTIONS}\n\nCONTEXT:\nThe document could not be searched ({reason}). \
                 Tell the user the document is temporarily unavailable and answer only from \
                 general knowledge, saying so explicitly."
            );
        }
    };
    format!("{INSTRUCTIONS}\n\nCONTEXT:\n{body}")
}
