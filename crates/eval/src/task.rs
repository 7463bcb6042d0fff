use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

use crate::scorer::Reference;

/// Produces the output scored for one evaluation input.
#[async_trait]
pub trait EvalTask: Send + Sync {
    async fn run(&self, input: &Value) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> EvalTask for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn run(&self, input: &Value) -> anyhow::Result<Value> {
        (self)(input.clone()).await
    }
}

/// A task's raw output split into the scored response and optional context.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub response: Value,
    pub context: Option<Reference>,
}

impl TaskOutput {
    /// An object carrying a `response` key is unwrapped, with its `context`
    /// (string or list of strings) handed to scorers. Anything else is the
    /// response itself.
    pub fn normalize(raw: Value) -> Result<Self, serde_json::Error> {
        match raw {
            Value::Object(mut obj) if obj.contains_key("response") => {
                let response = obj.remove("response").unwrap_or(Value::Null);
                let context = match obj.remove("context") {
                    None | Some(Value::Null) => None,
                    Some(ctx) => Some(serde_json::from_value(ctx)?),
                };
                Ok(Self { response, context })
            }
            other => Ok(Self {
                response: other,
                context: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_value_is_the_response() {
        let out = TaskOutput::normalize(json!({"role": "assistant", "content": "4"})).unwrap();
        assert_eq!(out.response, json!({"role": "assistant", "content": "4"}));
        assert!(out.context.is_none());
    }

    #[test]
    fn test_response_object_is_unwrapped() {
        let out = TaskOutput::normalize(json!({"response": "4", "context": ["a", "b"]})).unwrap();
        assert_eq!(out.response, json!("4"));
        assert_eq!(
            out.context,
            Some(Reference::Many(vec!["a".into(), "b".into()]))
        );

        let single = TaskOutput::normalize(json!({"response": 1, "context": "doc"})).unwrap();
        assert_eq!(single.context, Some(Reference::One("doc".into())));
    }

    #[test]
    fn test_bad_context_is_rejected() {
        assert!(TaskOutput::normalize(json!({"response": 1, "context": 7})).is_err());
    }

    #[tokio::test]
    async fn test_closure_is_a_task() {
        let task = |input: Value| async move { Ok::<_, anyhow::Error>(json!({"echo": input})) };
        let out = task.run(&json!("hi")).await.unwrap();
        assert_eq!(out, json!({"echo": "hi"}));
    }
}
