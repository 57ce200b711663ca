//! Prompt template for grounded answers about Prabhu.

/// Reply the model must give when the context does not hold the answer.
pub const REFUSAL: &str = "That's a detail Prabhu hasn't shared with me yet.";

/// Build the prompt sent to the generation API.
///
/// The template is fixed. It pins the assistant to the PRAXIS persona,
/// restricts answers to `context`, requires third-person phrasing about
/// Prabhu, and forbids mentioning that a context was supplied.
pub fn build_prompt(context: &str, query: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are PRAXIS, a helpful AI assistant for Prabhu Charan's portfolio.\n");
    prompt.push_str(
        "Your task is to answer the user's 'Query' about Prabhu Charan based ONLY on the provided 'Context'.\n",
    );
    prompt.push_str("Follow these rules strictly:\n");
    prompt.push_str(
        "1. Speak in a natural, direct tone. Do not mention that you are referencing the context.\n",
    );
    prompt.push_str(
        "2. **Always refer to the subject in the third person (e.g., 'Prabhu's GPA was...', NOT 'Your GPA was...'). This is a strict rule.**\n",
    );
    prompt.push_str(&format!(
        "3. If the context does not contain the answer, you MUST say '{}'\n\n",
        REFUSAL
    ));

    prompt.push_str(&format!("Context: {}\n\n", context));
    prompt.push_str(&format!("Query: {}\n\n", query));
    prompt.push_str("Answer:");

    prompt
}
