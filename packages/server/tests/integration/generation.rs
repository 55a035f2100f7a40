use crate::common::{GenerationForm, Reply, ScriptedProvider, TestApp, jpeg};

fn create(prompt: &str) -> GenerationForm<'_> {
    GenerationForm {
        prompt: Some(prompt),
        ..Default::default()
    }
}

fn edit(prompt: &str, image: Vec<u8>) -> GenerationForm<'_> {
    GenerationForm {
        prompt: Some(prompt),
        mode: Some("edit"),
        image: Some((image, "image/jpeg")),
    }
}

mod rejections {
    use super::*;

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.generate(create("a red bicycle"), None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn blank_prompt_is_invalid_and_reaches_no_provider() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::inline(b"png"), Reply::inline(b"png")))
            .with_storage()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(create("  "), Some(&token)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_PROMPT");
        let provider = app.provider.as_ref().unwrap();
        assert!(provider.create_prompts.lock().unwrap().is_empty());
        assert!(app.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn missing_prompt_field_is_invalid() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");

        let res = app.generate(GenerationForm::default(), Some(&token)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_PROMPT");
    }

    #[tokio::test]
    async fn overlong_prompt_is_invalid() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");
        let prompt = "p".repeat(301);

        let res = app.generate(create(&prompt), Some(&token)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_PROMPT");
    }

    #[tokio::test]
    async fn unknown_mode_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");

        let res = app
            .generate(
                GenerationForm {
                    prompt: Some("a red bicycle"),
                    mode: Some("remix"),
                    image: None,
                },
                Some(&token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn edit_without_image_is_missing_image() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");

        let res = app
            .generate(
                GenerationForm {
                    prompt: Some("add a hat"),
                    mode: Some("edit"),
                    image: None,
                },
                Some(&token),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MISSING_IMAGE");

        let res = app.generate(edit("add a hat", Vec::new()), Some(&token)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MISSING_IMAGE");
    }

    #[tokio::test]
    async fn undecodable_image_is_unprocessable() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");

        let res = app
            .generate(edit("add a hat", b"GIF89a but not really".to_vec()), Some(&token))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "UNPROCESSABLE_IMAGE");
    }

    #[tokio::test]
    async fn image_over_the_limit_is_too_large() {
        let app = TestApp::builder().max_upload_bytes(1024).spawn().await;
        let token = app.token_for("alice");

        let res = app.generate(edit("add a hat", vec![0u8; 4096]), Some(&token)).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }
}

mod create_mode {
    use super::*;

    #[tokio::test]
    async fn hosted_result_is_downloaded_stored_and_recorded() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(
                Reply::url("https://provider.test/img.png"),
                Reply::Fail(500),
            ))
            .with_storage()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(create("  a red bicycle "), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert!(res.body["created_at"].is_string());
        assert_eq!(res.body["prompt"], "a red bicycle");
        assert_eq!(res.body["mode"], "create");
        assert_eq!(res.body["user"], "alice");
        assert_eq!(res.body["source"], "provider_primary");
        assert!(res.body["original_url"].is_null());
        assert!(
            res.body["generated_url"]
                .as_str()
                .unwrap()
                .starts_with("https://blobs.test/atelier/generated/")
        );
        assert!(res.body.get("error").is_none());
        assert_eq!(
            app.stored_object("generated/").unwrap(),
            ScriptedProvider::DOWNLOADED.to_vec()
        );
        assert_eq!(app.stored_keys().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_placeholder() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::Fail(500), Reply::Fail(500)))
            .with_storage()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(create("a red bicycle"), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["source"], "placeholder");
        assert!(
            res.body["generated_url"]
                .as_str()
                .unwrap()
                .starts_with("data:image/svg+xml;base64,")
        );
        assert!(res.body["id"].is_number());
        assert!(app.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_service_still_answers() {
        let app = TestApp::spawn().await;
        let token = app.token_for("alice");

        let res = app.generate(create("a red bicycle"), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["source"], "placeholder");
        assert!(res.body["generated_url"].as_str().unwrap().starts_with("data:"));
    }
}

mod edit_mode {
    use image::GenericImageView;

    use super::*;

    #[tokio::test]
    async fn large_photo_is_normalized_stored_and_edited() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::Fail(500), Reply::inline(b"edited")))
            .with_storage()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(edit("add a hat", jpeg(2048, 1536)), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["mode"], "edit");
        assert_eq!(res.body["source"], "provider_primary");
        assert!(
            res.body["original_url"]
                .as_str()
                .unwrap()
                .starts_with("https://blobs.test/atelier/original/")
        );
        assert!(
            res.body["generated_url"]
                .as_str()
                .unwrap()
                .starts_with("https://blobs.test/atelier/generated/")
        );

        let original = app.stored_object("original/").unwrap();
        let decoded = image::load_from_memory(&original).unwrap();
        assert_eq!(decoded.dimensions(), (1024, 1024));
        assert!(decoded.color().has_alpha());
        assert_eq!(app.stored_object("generated/").unwrap(), b"edited".to_vec());
    }

    #[tokio::test]
    async fn rejected_edit_falls_back_to_a_variation() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::inline(b"variation"), Reply::Fail(400)))
            .with_storage()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(edit("add a hat", jpeg(300, 200)), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["source"], "provider_fallback");
        let provider = app.provider.as_ref().unwrap();
        assert_eq!(*provider.edit_prompts.lock().unwrap(), vec!["add a hat".to_string()]);
        assert_eq!(
            *provider.create_prompts.lock().unwrap(),
            vec!["a variation of the image with add a hat".to_string()]
        );
        assert_eq!(app.stored_object("generated/").unwrap(), b"variation".to_vec());
    }
}

mod history_failure {
    use super::*;

    #[tokio::test]
    async fn answers_ok_with_advisory_by_default() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::inline(b"png"), Reply::Fail(500)))
            .with_storage()
            .broken_history()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(create("a red bicycle"), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["error"], "Image generated but not saved to history");
        assert!(res.body["id"].is_null());
        assert!(res.body["created_at"].is_null());
        assert_eq!(res.body["prompt"], "a red bicycle");
        assert!(
            res.body["generated_url"]
                .as_str()
                .unwrap()
                .starts_with("https://blobs.test/atelier/generated/")
        );
    }

    #[tokio::test]
    async fn answers_multi_status_when_configured() {
        let app = TestApp::builder()
            .provider(ScriptedProvider::new(Reply::inline(b"png"), Reply::Fail(500)))
            .with_storage()
            .broken_history()
            .partial_success_status()
            .spawn()
            .await;
        let token = app.token_for("alice");

        let res = app.generate(create("a red bicycle"), Some(&token)).await;

        assert_eq!(res.status, 207, "{}", res.text);
        assert_eq!(res.body["error"], "Image generated but not saved to history");
        assert!(res.body["id"].is_null());
        assert_eq!(res.body["source"], "provider_primary");
    }

    #[tokio::test]
    async fn recorded_requests_keep_status_ok_when_configured() {
        let app = TestApp::builder().partial_success_status().spawn().await;
        let token = app.token_for("alice");

        let res = app.generate(create("a red bicycle"), Some(&token)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body.get("error").is_none());
    }
}
