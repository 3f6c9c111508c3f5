#[cfg(test)]
mod tests;

/// Question-answering prompt filled with retrieved context
pub const RAG_PROMPT: &str = "Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

Context: {context}

Question: {question}

Answer:";

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// A prompt with `{context}` and `{question}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    #[inline]
    fn default() -> Self {
        Self::new(RAG_PROMPT)
    }
}

impl PromptTemplate {
    #[inline]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute both placeholders in one pass, so text inside the
    /// substituted values is never treated as a placeholder
    #[inline]
    pub fn format(&self, context: &str, question: &str) -> String {
        let mut prompt =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            let (before, from_brace) = rest.split_at(start);
            prompt.push_str(before);

            if let Some(after) = from_brace.strip_prefix(CONTEXT_PLACEHOLDER) {
                prompt.push_str(context);
                rest = after;
            } else if let Some(after) = from_brace.strip_prefix(QUESTION_PLACEHOLDER) {
                prompt.push_str(question);
                rest = after;
            } else {
                let (brace, after) = from_brace.split_at(1);
                prompt.push_str(brace);
                rest = after;
            }
        }

        prompt.push_str(rest);
        prompt
    }
}
