//! Chain Navigator
//!
//! Solves a single hop: fetch the quiz page, derive an answer, submit it to
//! `<origin>/submit` and keep the server's reply. Every failure is turned
//! into a failed [`HopResult`]; nothing escapes to the orchestrator.

use std::sync::Arc;
use tracing::{info, warn};

use quiz_core::{
    base_url, submit_url, ClassifierPolicy, DelimitedParser, HopResult, Submission, TableParser,
};
use quiz_net::{Fetcher, PageDocument};

use crate::{derive_answer, rendered_context, HopError, SolveContext};

/// Solves hops with a fixed set of collaborators
#[derive(Clone)]
pub struct Navigator {
    fetcher: Arc<dyn Fetcher>,
    tables: Arc<dyn TableParser>,
    policy: Arc<ClassifierPolicy>,
}

impl Navigator {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            tables: Arc::new(DelimitedParser::new()),
            policy: Arc::new(ClassifierPolicy::default()),
        }
    }

    pub fn with_table_parser(mut self, tables: Arc<dyn TableParser>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_policy(mut self, policy: ClassifierPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub async fn solve_hop(
        &self,
        caller_identity: &str,
        shared_secret: &str,
        quiz_url: &str,
    ) -> HopResult {
        match self.try_solve_hop(caller_identity, shared_secret, quiz_url).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Hop {} failed: {}", quiz_url, e);
                HopResult::failed(quiz_url, e)
            }
        }
    }

    async fn try_solve_hop(
        &self,
        caller_identity: &str,
        shared_secret: &str,
        quiz_url: &str,
    ) -> Result<HopResult, HopError> {
        let response = self.fetcher.get(quiz_url).await?;

        let base = base_url(quiz_url).map_err(|e| HopError::InvalidUrl {
            url: quiz_url.to_string(),
            reason: e.to_string(),
        })?;
        let page = rendered_context(PageDocument::parse(&response.body), quiz_url);

        let ctx = SolveContext {
            page: &page,
            base_url: &base,
            caller_identity,
            fetcher: self.fetcher.as_ref(),
            tables: self.tables.as_ref(),
        };
        let (category, answer) = derive_answer(&ctx, &self.policy).await;
        info!("Quiz {} classified as {}, answering {:?}", quiz_url, category, answer);

        let submit_url = submit_url(&base);
        let submission = Submission {
            email: caller_identity.to_string(),
            secret: shared_secret.to_string(),
            url: quiz_url.to_string(),
            answer: answer.clone(),
        };
        let reply = self
            .fetcher
            .post_json(&submit_url, &serde_json::to_value(&submission)?)
            .await?;

        Ok(HopResult::Solved {
            quiz_url: quiz_url.to_string(),
            submit_url,
            category,
            answer,
            server_response: reply.body,
        })
    }
}

/// Solve one hop with the default table parser and classifier policy
pub async fn solve_hop(
    fetcher: Arc<dyn Fetcher>,
    caller_identity: &str,
    shared_secret: &str,
    quiz_url: &str,
) -> HopResult {
    Navigator::new(fetcher)
        .solve_hop(caller_identity, shared_secret, quiz_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Cell, ParseError, Table, TaskCategory};
    use serde_json::json;

    use crate::testing::FakeFetcher;

    const QUIZ_URL: &str = "https://q.example/quiz-1?email=me@example.com";
    const SUBMIT_URL: &str = "https://q.example/submit";

    #[tokio::test]
    async fn test_solve_hop_submits_answer() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_page(QUIZ_URL, "<p>Sum these: 3, 4, and 5</p>")
                .with_reply(SUBMIT_URL, json!({"correct": true, "url": "https://q.example/quiz-2"})),
        );

        let result = solve_hop(fetcher.clone(), "me@example.com", "s3cret", QUIZ_URL).await;

        assert_eq!(
            result,
            HopResult::Solved {
                quiz_url: QUIZ_URL.to_string(),
                submit_url: SUBMIT_URL.to_string(),
                category: TaskCategory::ArithmeticAggregation,
                answer: "12".to_string(),
                server_response: json!({"correct": true, "url": "https://q.example/quiz-2"}),
            }
        );
        assert_eq!(result.next_hop().next_url.as_deref(), Some("https://q.example/quiz-2"));

        let posts = fetcher.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, SUBMIT_URL);
        assert_eq!(
            posts[0].1,
            json!({"email": "me@example.com", "secret": "s3cret", "url": QUIZ_URL, "answer": "12"})
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_error_hop() {
        let fetcher = Arc::new(FakeFetcher::new());
        let result = solve_hop(fetcher.clone(), "me@example.com", "s", QUIZ_URL).await;

        assert_eq!(result.quiz_url(), QUIZ_URL);
        assert!(result.error().unwrap().contains("no route"));
        assert!(fetcher.posts().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_becomes_error_hop() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(QUIZ_URL, "<p>Hello</p>"));
        let result = solve_hop(fetcher.clone(), "me@example.com", "s", QUIZ_URL).await;

        assert!(result.error().is_some());
        assert_eq!(fetcher.posts().len(), 1);
    }

    /// Ignores the download and serves a fixed two-row table
    struct FixedTable;

    impl TableParser for FixedTable {
        fn parse(&self, _text: &str) -> Result<Table, ParseError> {
            Ok(Table {
                headers: vec!["value".to_string()],
                rows: vec![vec![Cell::Number(7.0)], vec![Cell::Number(8.0)]],
            })
        }
    }

    #[tokio::test]
    async fn test_custom_table_parser() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_page(QUIZ_URL, r#"<p>Add up the <a href="/files/data.csv">values</a></p>"#)
                .with_page("https://q.example/files/data.csv", "not,really\ncsv")
                .with_reply(SUBMIT_URL, json!({"correct": true})),
        );
        let navigator = Navigator::new(fetcher.clone()).with_table_parser(Arc::new(FixedTable));

        let result = navigator.solve_hop("me@example.com", "s", QUIZ_URL).await;

        assert_eq!(result.answer(), Some("15"));
        assert_eq!(fetcher.gets(), vec![QUIZ_URL, "https://q.example/files/data.csv"]);
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .with_page(QUIZ_URL, "<p>How many total items: 3 4</p>")
                .with_reply(SUBMIT_URL, json!({"correct": true})),
        );
        let navigator = Navigator::new(fetcher).with_policy(ClassifierPolicy::default().prioritize("counting"));

        let result = navigator.solve_hop("me@example.com", "s", QUIZ_URL).await;
        assert_eq!(result.answer(), Some("2"));
    }
}
