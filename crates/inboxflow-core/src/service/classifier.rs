//! Classifier collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use inboxflow_gmail::MailMessage;
use inboxflow_llm::{ClassifierClient, ClassifyInput, Verdict};

/// Scores messages for importance and visibility.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns verdicts keyed by message id. Never fails; ids without a
    /// verdict are simply absent.
    async fn classify(&self, messages: &[&MailMessage]) -> HashMap<String, Verdict>;
}

#[async_trait]
impl Classifier for ClassifierClient {
    async fn classify(&self, messages: &[&MailMessage]) -> HashMap<String, Verdict> {
        let inputs: Vec<ClassifyInput<'_>> = messages
            .iter()
            .map(|m| ClassifyInput {
                id: &m.id,
                from_name: &m.from_name,
                from_email: &m.from_email,
                subject: &m.subject,
                body: &m.body,
            })
            .collect();
        ClassifierClient::classify(self, &inputs).await
    }
}
