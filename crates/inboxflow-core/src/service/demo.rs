//! Built-in sample mailbox used when no mailbox credentials are configured.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use inboxflow_gmail::{Label, MailMessage};
use inboxflow_mime::detect_language;

use super::mailbox::{FetchRequest, Mailbox};
use crate::Result;

/// (id, name, address, subject, body, tags, hours ago, unread, score)
type Sample = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
    i64,
    bool,
    u8,
);

const SAMPLES: &[Sample] = &[
    (
        "demo-1",
        "Sarah Johnson",
        "sarah.johnson@example.com",
        "Q1 Marketing Campaign Results & Next Steps",
        "Hi team,\n\nThe Q1 campaign brought a 23% increase in lead generation and a 15% \
         better conversion rate than last quarter.\n\nKey highlights:\n- Email campaigns: 45% \
         open rate\n- Social engagement up 32%\n\nCan we meet to discuss the Q2 strategy?\n\n\
         Best regards,\nSarah",
        &["Marketing", "Report"],
        2,
        true,
        85,
    ),
    (
        "demo-2",
        "田中太郎",
        "tanaka@example.co.jp",
        "プロジェクト進捗報告 - 3月分",
        "お疲れ様です。\n\n3月分のプロジェクト進捗をご報告いたします。\n\n- フロントエンド開発：85%完了\n\
         - バックエンドAPI：90%完了\n- テスト：60%完了\n\n来週中にベータ版をリリースできる見込みです。\n\n田中太郎",
        &["Project"],
        5,
        true,
        78,
    ),
    (
        "demo-3",
        "Pierre Dupont",
        "pierre.dupont@example.fr",
        "Proposition de partenariat stratégique",
        "Bonjour,\n\nJe me permets de vous contacter au sujet d'une proposition de partenariat \
         stratégique entre nos deux entreprises.\n\nSeriez-vous disponible pour une réunion la \
         semaine prochaine ?\n\nCordialement,\nPierre Dupont",
        &["Partnership"],
        26,
        false,
        72,
    ),
    (
        "demo-4",
        "Max Weber",
        "max.weber@example.de",
        "Technischer Support - Dringende Fehlerbehebung",
        "Sehr geehrtes Team,\n\nder API-Endpunkt für die Benutzerauthentifizierung gibt \
         intermittierende 500-Fehler zurück.\n\nBetroffen:\n- Login-Service\n- Token-Validierung\n\n\
         Bitte behandeln Sie dies mit höchster Priorität.\n\nMit freundlichen Grüßen,\nMax Weber",
        &["Support", "Urgent"],
        1,
        true,
        95,
    ),
    (
        "demo-5",
        "Lucía Fernández",
        "lucia@example.es",
        "Consulta sobre facturación",
        "Hola,\n\n¿Podrían enviarme la factura de marzo? No la encuentro en el portal.\n\n\
         Muchas gracias,\nLucía",
        &["Billing"],
        30,
        false,
        64,
    ),
    (
        "demo-6",
        "王明",
        "wangming@example.cn",
        "关于接口文档的问题",
        "你好，\n\n我们在对接订单接口时发现文档中的字段说明与实际返回不一致，麻烦确认一下。\n\n谢谢！\n王明",
        &["Support"],
        48,
        true,
        81,
    ),
    (
        "demo-7",
        "Growth Team",
        "offers@seo-boost.example",
        "Guest post opportunity for your blog",
        "Hello,\n\nWe offer high authority backlinks and guest posts at special prices. \
         Reply today to get 50% off!",
        &[],
        72,
        true,
        12,
    ),
];

/// Mailbox serving a fixed set of sample messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoMailbox;

impl DemoMailbox {
    /// All sample messages, newest first.
    #[must_use]
    pub fn messages() -> Vec<MailMessage> {
        let now = Utc::now();
        let mut messages: Vec<MailMessage> = SAMPLES
            .iter()
            .map(
                |&(id, from_name, from_email, subject, body, tags, hours_ago, unread, score)| MailMessage {
                    id: id.to_string(),
                    from_name: from_name.to_string(),
                    from_email: from_email.to_string(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                    language: detect_language(body),
                    tags: tags.iter().map(ToString::to_string).collect(),
                    received_at: now - Duration::hours(hours_ago),
                    unread,
                    default_score: Some(score),
                },
            )
            .collect();
        messages.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        messages
    }
}

#[async_trait]
impl Mailbox for DemoMailbox {
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<MailMessage>> {
        let limit = usize::try_from(request.max_results).unwrap_or(usize::MAX);
        Ok(Self::messages().into_iter().take(limit).collect())
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(vec![
            Label {
                id: "INBOX".into(),
                name: "INBOX".into(),
                kind: "system".into(),
            },
            Label {
                id: "Label_demo".into(),
                name: "Support".into(),
                kind: "user".into(),
            },
        ])
    }
}
