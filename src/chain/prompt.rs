/// Prompt rendering for retrieval-grounded answers.
use indoc::formatdoc;

/// Fill the instruction template with the retrieved context and the question.
///
/// Both values are inserted verbatim; braces inside them are left alone.
#[must_use]
pub fn question_answering(context: &str, question: &str) -> String {
    formatdoc!(
        "You are a helpful assistant.
        Answer ONLY from the provided context in detail.
        If the context is insufficient, just say you don't know.

        {context}
        Question: {question}
        ",
        context = context,
        question = question,
    )
}
