//! Knowledge-base lookup tool over the bundled FAQ records

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::knowledge_base::KnowledgeBase;
use crate::domain::schema::names;
use crate::domain::tool::{ToolArguments, ToolExecutor};
use crate::domain::DomainError;

/// FAQ records compiled into the binary
const BUNDLED_RECORDS: &str = include_str!("../../../data/knowledge_base.json");

#[derive(Debug)]
pub struct KnowledgeBaseTool {
    knowledge_base: KnowledgeBase,
}

impl KnowledgeBaseTool {
    pub fn new(knowledge_base: KnowledgeBase) -> Self {
        Self { knowledge_base }
    }

    pub fn bundled() -> Result<Self, DomainError> {
        Ok(Self::new(KnowledgeBase::from_json_str(BUNDLED_RECORDS)?))
    }
}

#[async_trait]
impl ToolExecutor for KnowledgeBaseTool {
    fn name(&self) -> &'static str {
        "search_knowledge_base"
    }

    fn description(&self) -> &'static str {
        "Search the FAQ knowledge base for an answer to a customer question"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The customer's question"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    fn result_schema(&self) -> &'static str {
        names::KB_ANSWER
    }

    /// A question with no matching record is a reportable result, not a
    /// failure
    async fn execute(&self, args: ToolArguments) -> Result<Value, DomainError> {
        let question = args.require_str("question", 0)?;

        match self.knowledge_base.search(question) {
            Some(hit) => Ok(json!({
                "found": true,
                "answer": hit.record.text,
                "matched_question": hit.record.question,
            })),
            None => Ok(json!({"found": false})),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::SchemaRegistry;

    fn tool() -> KnowledgeBaseTool {
        KnowledgeBaseTool::bundled().unwrap()
    }

    async fn search(question: &str) -> Value {
        tool()
            .execute(ToolArguments::from_value(json!({"question": question})).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_answer_conforms_to_contract() {
        let answer = search("What is your return policy?").await;
        assert_eq!(answer["found"], true);

        let registry = SchemaRegistry::with_defaults();
        registry
            .get(names::KB_ANSWER)
            .unwrap()
            .validate(&answer)
            .unwrap();
    }

    #[tokio::test]
    async fn test_paraphrased_question_still_matches() {
        let answer = search("i want to return an item, what's the policy?").await;
        assert_eq!(answer["found"], true);
        assert!(answer["matched_question"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("return"));
    }

    #[tokio::test]
    async fn test_unrelated_question_reports_no_answer() {
        let answer = search("what is the capital of France?").await;
        assert_eq!(answer, json!({"found": false}));
    }
}
