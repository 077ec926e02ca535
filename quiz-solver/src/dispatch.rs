//! Category dispatch

use quiz_core::{
    arithmetic_aggregation, counting, literal_default, secret_extraction, ClassifierPolicy,
    TaskCategory,
};

use crate::{encoded_redirect, tabular_aggregation, SolveContext};

/// Classify the page and run the matching extractor
pub async fn derive_answer(
    ctx: &SolveContext<'_>,
    policy: &ClassifierPolicy,
) -> (TaskCategory, String) {
    let category = policy.classify(ctx.page);
    let answer = answer_for(category, ctx).await;
    (category, answer)
}

pub async fn answer_for(category: TaskCategory, ctx: &SolveContext<'_>) -> String {
    let page = ctx.page;
    match category {
        TaskCategory::LiteralDefault => literal_default(),
        TaskCategory::SecretExtraction => secret_extraction(&page.text),
        TaskCategory::ArithmeticAggregation => arithmetic_aggregation(&page.text),
        TaskCategory::Counting => counting(&page.text, &page.lower),
        TaskCategory::TabularAggregation => tabular_aggregation(ctx).await,
        TaskCategory::EncodedRedirect => encoded_redirect(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{base_url, DelimitedParser, PageContext};

    use crate::testing::FakeFetcher;

    async fn derive(page: &PageContext) -> (TaskCategory, String) {
        let base = base_url(&page.url).unwrap();
        let fetcher = FakeFetcher::new();
        let tables = DelimitedParser::new();
        let ctx = SolveContext {
            page,
            base_url: &base,
            caller_identity: "me@example.com",
            fetcher: &fetcher,
            tables: &tables,
        };
        derive_answer(&ctx, &ClassifierPolicy::default()).await
    }

    #[tokio::test]
    async fn test_text_categories() {
        let cases = [
            ("https://q.example/demo", "Sum 1 and 2", TaskCategory::LiteralDefault, "test"),
            ("https://q.example/a", "Sum these: 3, 4, and 5", TaskCategory::ArithmeticAggregation, "12"),
            ("https://q.example/b", "How many words are here", TaskCategory::Counting, "5"),
            ("https://q.example/c", "secret code is 42 and not 99", TaskCategory::SecretExtraction, "42"),
            ("https://q.example/d", "Welcome aboard", TaskCategory::LiteralDefault, "test"),
        ];

        for (url, text, category, answer) in cases {
            let derived = derive(&PageContext::new(url, text)).await;
            assert_eq!(derived, (category, answer.to_string()), "{url}");
        }
    }
}
