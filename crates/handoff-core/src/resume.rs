//! The resume prompt: the first message of the fresh session.
//!
//! It names the continuation document and carries the user's directive
//! verbatim between fixed delimiters, and nothing else. The session that
//! reads it has no other context to lean on.

pub const DIRECTIVE_START: &str = "--- USER DIRECTIVE ---";
pub const DIRECTIVE_END: &str = "--- END USER DIRECTIVE ---";

pub const PROPOSE_NEXT_ACTION: &str = "The USER DIRECTIVE block is empty. Do not start work on your own: \
propose the single most sensible next action based on the document, then wait for my confirmation.";

pub const FOLLOW_DIRECTIVE: &str =
    "Once you have read the document, carry out the USER DIRECTIVE above.";

/// Treat whitespace-only directives as absent.
pub fn normalize_directive(directive: Option<&str>) -> Option<&str> {
    directive.filter(|d| !d.trim().is_empty())
}

pub fn build_resume_prompt(document: &str, directive: Option<&str>) -> String {
    let directive = normalize_directive(directive);
    let mut prompt = String::new();

    prompt.push_str(
        "I'm continuing work on this project from a previous session whose context has been cleared.\n\n",
    );
    prompt.push_str("Before doing anything else, read this continuation document in full:\n\n");
    prompt.push_str(&format!("    {document}\n\n"));
    prompt.push_str(
        "Treat it as the record of where the project stands. Respect the Do Not Touch List, \
and re-verify anything the Confidence & Freshness section rates LOW before relying on it.\n\n",
    );

    prompt.push_str(DIRECTIVE_START);
    prompt.push('\n');
    if let Some(d) = directive {
        prompt.push_str(d);
        prompt.push('\n');
    }
    prompt.push_str(DIRECTIVE_END);
    prompt.push_str("\n\n");

    match directive {
        Some(_) => prompt.push_str(FOLLOW_DIRECTIVE),
        None => prompt.push_str(PROPOSE_NEXT_ACTION),
    }
    prompt.push('\n');
    prompt
}

/// Contents of the directive block, or `None` if the block is missing.
pub fn extract_directive(prompt: &str) -> Option<&str> {
    let start = prompt.find(DIRECTIVE_START)? + DIRECTIVE_START.len();
    let end = start + prompt[start..].find(DIRECTIVE_END)?;
    let body = &prompt[start..end];
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some(body.strip_suffix('\n').unwrap_or(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "docs/handoffs/AI_Continuation_Document-19Oct2026-1405.md";

    #[test]
    fn directive_is_embedded_verbatim() {
        let prompt = build_resume_prompt(DOC, Some("continue testing the billing system"));
        assert_eq!(
            extract_directive(&prompt),
            Some("continue testing the billing system")
        );
        assert!(prompt.contains(FOLLOW_DIRECTIVE));
        assert!(!prompt.contains(PROPOSE_NEXT_ACTION));
    }

    #[test]
    fn multiline_directive_survives() {
        let directive = "fix the refund path\n  then rerun `cargo test`";
        let prompt = build_resume_prompt(DOC, Some(directive));
        assert_eq!(extract_directive(&prompt), Some(directive));
    }

    #[test]
    fn missing_directive_leaves_empty_block_and_asks_for_proposal() {
        for directive in [None, Some(""), Some("   ")] {
            let prompt = build_resume_prompt(DOC, directive);
            assert_eq!(extract_directive(&prompt), Some(""));
            assert!(prompt.contains(PROPOSE_NEXT_ACTION));
        }
    }

    #[test]
    fn prompt_references_document_first() {
        let prompt = build_resume_prompt(DOC, None);
        let doc_pos = prompt.find(DOC).unwrap();
        let block_pos = prompt.find(DIRECTIVE_START).unwrap();
        assert!(doc_pos < block_pos);
        assert!(prompt.contains("read this continuation document in full"));
    }

    #[test]
    fn extract_without_block_is_none() {
        assert_eq!(extract_directive("hello"), None);
    }
}
