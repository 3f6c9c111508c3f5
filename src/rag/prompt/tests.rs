use super::*;

#[test]
fn default_prompt_layout() {
    let prompt = PromptTemplate::default().format("Rust is fast.", "Is Rust fast?");

    assert_eq!(
        prompt,
        "Use the following pieces of context to answer the question at the end.\n\
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
         \n\
         Context: Rust is fast.\n\
         \n\
         Question: Is Rust fast?\n\
         \n\
         Answer:"
    );
}

#[test]
fn empty_context_leaves_label() {
    let prompt = PromptTemplate::default().format("", "Anything?");
    assert!(prompt.contains("Context: \n\nQuestion: Anything?"));
}

#[test]
fn substituted_text_is_not_reinterpreted() {
    let template = PromptTemplate::new("[{context}] [{question}]");

    assert_eq!(
        template.format("says {question}", "asks {context}"),
        "[says {question}] [asks {context}]"
    );
}

#[test]
fn unknown_braces_are_kept() {
    let template = PromptTemplate::new("{ {other} {context}");
    assert_eq!(template.format("x", "y"), "{ {other} x");
}

#[test]
fn multi_byte_text_around_placeholders() {
    let template = PromptTemplate::new("Kontext: {context} | Frage: {question} ✓");
    assert_eq!(
        template.format("Größe", "Wie groß?"),
        "Kontext: Größe | Frage: Wie groß? ✓"
    );
}
