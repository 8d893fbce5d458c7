//! Compiled-in default prompts for the answer pipeline.
//!
//! Each prompt can be overridden by dropping a YAML file with the same id
//! into `.verity/prompts/`. The wording of the grading prompts is load
//! bearing; changing it shifts how strict the graders are.

use crate::types::PromptDefinition;

/// Prompt id for routing a question to a retrieval source.
pub const ROUTER_DECIDE: &str = "router.decide";

/// Prompt id for grading document relevance.
pub const GRADE_DOCUMENT: &str = "grade.document";

/// Prompt id for grading whether a generation is grounded in evidence.
pub const GRADE_HALLUCINATION: &str = "grade.hallucination";

/// Prompt id for grading whether an answer resolves the question.
pub const GRADE_ANSWER: &str = "grade.answer";

/// Prompt id for evidence-grounded answer generation.
pub const GENERATE_GROUNDED: &str = "generate.grounded";

/// Prompt id for answering from model knowledge alone.
pub const GENERATE_FALLBACK: &str = "generate.fallback";

const ROUTER_PREAMBLE: &str =
    "You are an expert at routing a user question to a vectorstore or web search.\n\
     The vectorstore contains documents related to {{corpus}}.\n\
     Use the vectorstore for questions on these topics. Otherwise, use web-search.";

const GRADE_DOCUMENT_PREAMBLE: &str =
    "You are a grader assessing relevance of a retrieved document to a user question. \n \
     If the document contains keyword(s) or semantic meaning related to the user question, \
     grade it as relevant. \n \
     Give a binary score 'yes' or 'no' score to indicate whether the document is relevant \
     to the question.";

const GRADE_HALLUCINATION_PREAMBLE: &str =
    "You are a grader assessing whether an LLM generation is grounded in / supported by \
     a set of retrieved facts. \n \
     Give a binary score 'yes' or 'no'. 'Yes' means that the answer is grounded in / \
     supported by the set of facts.";

const GRADE_ANSWER_PREAMBLE: &str =
    "You are a grader assessing whether an answer addresses / resolves a question \n \
     Give a binary score 'yes' or 'no'. 'Yes' means that the answer resolves the question.";

const GENERATE_GROUNDED_PREAMBLE: &str =
    "You are an assistant for question-answering tasks. Use the following pieces of \
     retrieved context to answer the question. If you don't know the answer, just say \
     that you don't know. Use three sentences maximum and keep the answer concise.";

const GENERATE_FALLBACK_PREAMBLE: &str =
    "You are an assistant for question-answering tasks. Answer the question based upon \
     your knowledge. Use three sentences maximum and keep the answer concise.";

/// Look up the compiled-in default for a prompt id.
///
/// Returns `None` for ids that have no default.
pub fn default_prompt(id: &str) -> Option<PromptDefinition> {
    let (preamble, template) = match id {
        ROUTER_DECIDE => (ROUTER_PREAMBLE, "{{question}}"),
        GRADE_DOCUMENT => (
            GRADE_DOCUMENT_PREAMBLE,
            "Retrieved document: \n\n {{document}} \n\n User question: {{question}}",
        ),
        GRADE_HALLUCINATION => (
            GRADE_HALLUCINATION_PREAMBLE,
            "Set of facts: \n\n {{documents}} \n\n LLM generation: {{generation}}",
        ),
        GRADE_ANSWER => (
            GRADE_ANSWER_PREAMBLE,
            "User question: \n\n {{question}} \n\n LLM generation: {{generation}}",
        ),
        GENERATE_GROUNDED => (GENERATE_GROUNDED_PREAMBLE, "Question: {{question}} \nAnswer: "),
        GENERATE_FALLBACK => (GENERATE_FALLBACK_PREAMBLE, "Question: {{question}} \nAnswer: "),
        _ => return None,
    };

    Some(PromptDefinition {
        id: id.to_string(),
        preamble: Some(preamble.to_string()),
        template: template.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_default_ids_resolve() {
        let ids = [
            ROUTER_DECIDE,
            GRADE_DOCUMENT,
            GRADE_HALLUCINATION,
            GRADE_ANSWER,
            GENERATE_GROUNDED,
            GENERATE_FALLBACK,
        ];

        for id in ids {
            let def = default_prompt(id).unwrap();
            assert_eq!(def.id, id);
            assert!(!def.template.is_empty());
        }
    }

    #[test]
    fn test_unknown_id_has_no_default() {
        assert!(default_prompt("does.not.exist").is_none());
    }

    #[test]
    fn test_router_preamble_mentions_corpus() {
        let def = default_prompt(ROUTER_DECIDE).unwrap();
        assert!(def.preamble.unwrap().contains("{{corpus}}"));
        assert_eq!(def.template, "{{question}}");
    }

    #[test]
    fn test_grading_templates_carry_their_variables() {
        let doc = default_prompt(GRADE_DOCUMENT).unwrap();
        assert!(doc.template.contains("{{document}}"));
        assert!(doc.template.contains("{{question}}"));

        let hallucination = default_prompt(GRADE_HALLUCINATION).unwrap();
        assert!(hallucination.template.contains("{{documents}}"));
        assert!(hallucination.template.contains("{{generation}}"));

        let answer = default_prompt(GRADE_ANSWER).unwrap();
        assert!(answer.template.contains("{{question}}"));
        assert!(answer.template.contains("{{generation}}"));
    }
}
