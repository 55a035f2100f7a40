use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Set};

use atelier_server::entity::generation;

use crate::common::{GenerationForm, TestApp, routes};

async fn seed(app: &TestApp, prompt: &str, user: &str, created_at: DateTime<Utc>) {
    generation::ActiveModel {
        prompt: Set(prompt.to_string()),
        original_url: Set(None),
        generated_url: Set(format!("https://blobs.test/atelier/generated/{prompt}.png")),
        user: Set(user.to_string()),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .expect("Failed to seed generation");
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap()
}

async fn seeded_app() -> TestApp {
    let app = TestApp::spawn().await;
    seed(&app, "a red bicycle", "alice", day(1)).await;
    seed(&app, "a blue bicycle", "bob", day(2)).await;
    seed(&app, "A RED balloon", "alice", day(3)).await;
    seed(&app, "50% off_sale", "bob", day(4)).await;
    seed(&app, "green fields", "alice", day(5)).await;
    app
}

fn prompts(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["prompt"].as_str().unwrap().to_string())
        .collect()
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::GENERATIONS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn newest_first_with_pagination() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(&format!("{}?page_size=2", routes::GENERATIONS), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(prompts(&res.body), vec!["green fields", "50% off_sale"]);
        assert_eq!(res.body["pagination"]["page"], 1);
        assert_eq!(res.body["pagination"]["per_page"], 2);
        assert_eq!(res.body["pagination"]["total"], 5);
        assert_eq!(res.body["pagination"]["total_pages"], 3);

        let res = app
            .get_with_token(&format!("{}?page_size=2&page=3", routes::GENERATIONS), &token)
            .await;
        assert_eq!(prompts(&res.body), vec!["a red bicycle"]);
    }

    #[tokio::test]
    async fn defaults_to_six_per_page_and_clamps() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app.get_with_token(routes::GENERATIONS, &token).await;
        assert_eq!(res.body["pagination"]["per_page"], 6);

        let res = app
            .get_with_token(&format!("{}?page_size=1000&page=0", routes::GENERATIONS), &token)
            .await;
        assert_eq!(res.body["pagination"]["per_page"], 100);
        assert_eq!(res.body["pagination"]["page"], 1);
    }

    #[tokio::test]
    async fn generated_requests_show_up() {
        let app = TestApp::spawn().await;
        let token = app.token_for("carol");

        let res = app
            .generate(
                GenerationForm {
                    prompt: Some("a lighthouse at dusk"),
                    ..Default::default()
                },
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(routes::GENERATIONS, &token).await;
        assert_eq!(prompts(&res.body), vec!["a lighthouse at dusk"]);
        assert_eq!(res.body["data"][0]["user"], "carol");
        assert!(res.body["data"][0]["original_url"].is_null());
    }
}

mod filters {
    use super::*;

    #[tokio::test]
    async fn prompt_filter_is_case_insensitive() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(&format!("{}?prompt=Red", routes::GENERATIONS), &token)
            .await;

        assert_eq!(prompts(&res.body), vec!["A RED balloon", "a red bicycle"]);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn prompt_wildcards_match_literally() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(&format!("{}?prompt=%25%20off_", routes::GENERATIONS), &token)
            .await;
        assert_eq!(prompts(&res.body), vec!["50% off_sale"]);

        let res = app
            .get_with_token(&format!("{}?prompt=_", routes::GENERATIONS), &token)
            .await;
        assert_eq!(prompts(&res.body), vec!["50% off_sale"]);
    }

    #[tokio::test]
    async fn date_bounds_are_inclusive() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(
                &format!("{}?from=2026-03-02&to=2026-03-03", routes::GENERATIONS),
                &token,
            )
            .await;
        assert_eq!(prompts(&res.body), vec!["A RED balloon", "a blue bicycle"]);

        let res = app
            .get_with_token(
                &format!("{}?from=2026-03-04T12:00:00Z", routes::GENERATIONS),
                &token,
            )
            .await;
        assert_eq!(prompts(&res.body), vec!["green fields", "50% off_sale"]);
    }

    #[tokio::test]
    async fn filters_combine() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(
                &format!("{}?prompt=bicycle&user=bob", routes::GENERATIONS),
                &token,
            )
            .await;

        assert_eq!(prompts(&res.body), vec!["a blue bicycle"]);
    }

    #[tokio::test]
    async fn malformed_or_inverted_dates_are_rejected() {
        let app = seeded_app().await;
        let token = app.token_for("alice");

        let res = app
            .get_with_token(&format!("{}?from=yesterday", routes::GENERATIONS), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .get_with_token(
                &format!("{}?from=2026-03-05&to=2026-03-01", routes::GENERATIONS),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
