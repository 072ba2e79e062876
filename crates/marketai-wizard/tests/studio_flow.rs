//! End-to-end tests: the client core against the real router on an
//! ephemeral port.

use std::time::Duration;

use axum::Json;
use axum::routing::post;
use serde_json::{Value, json};

use marketai_api::{ApiConfig, AppStateInner};
use marketai_db::Database;
use marketai_types::Platform;
use marketai_wizard::client::Action;
use marketai_wizard::{
    ApiClient, ClientError, CreationMethod, MemorySessionStore, SessionContext, Studio,
    UploadedImage, UserSession, Wizard, WizardError, WizardStep,
};

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_backend(edit_api_url: &str) -> String {
    let config = ApiConfig {
        jwt_secret: "studio-test-secret".to_string(),
        edit_api_url: edit_api_url.to_string(),
        edit_timeout: Duration::from_secs(5),
        upload_delay: Duration::from_millis(10),
    };
    let state = AppStateInner::new(Database::in_memory(), config).unwrap();
    serve(marketai_api::router(state)).await
}

fn studio(base_url: &str) -> Studio {
    Studio::new(
        ApiClient::new(base_url),
        SessionContext::restore(MemorySessionStore::new()),
        Wizard::new(),
    )
}

fn finish_draft(wizard: &mut Wizard, platform: Platform) {
    wizard.choose_method(CreationMethod::AiGenerated).unwrap();
    wizard.set_description("Summer sale").unwrap();
    wizard.advance().unwrap();
    wizard.select_output(0).unwrap();
    wizard.advance().unwrap();
    wizard.select_platform(platform).unwrap();
    wizard.set_caption("Everything 20% off").unwrap();
    wizard.add_hashtag("summer").unwrap();
    assert_eq!(wizard.advance().unwrap(), WizardStep::PreviewingFinal);
}

#[tokio::test]
async fn save_connect_and_upload_scenario() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    assert!(studio.client().health().await.unwrap());

    studio
        .register("owner@example.com", "hunter22", "Shop Owner")
        .await
        .unwrap();

    finish_draft(studio.wizard_mut(), Platform::Instagram);
    let instagram_id = studio.save_draft().await.unwrap();
    assert_eq!(studio.wizard().step(), WizardStep::ChoosingMethod);
    assert!(studio.wizard().draft().platform.is_none());

    finish_draft(studio.wizard_mut(), Platform::Twitter);
    let twitter_id = studio.save_draft().await.unwrap();

    let posts = studio.refresh_catalog().await.unwrap();
    assert_eq!(posts.len(), 2);
    let saved = posts.iter().find(|p| p.id == instagram_id).unwrap();
    assert_eq!(saved.caption, "Everything 20% off");
    assert_eq!(saved.hashtags, vec!["#summer"]);
    assert_eq!(saved.image_url, marketai_wizard::studio::PLACEHOLDER_IMAGE_URL);

    let connections = studio.connect(Platform::Instagram, "ig-token").await.unwrap();
    assert!(connections.is_connected(Platform::Instagram));
    assert!(!connections.is_connected(Platform::Twitter));
    assert_eq!(connections.connections.len(), 1);

    let uploaded = studio.upload(&instagram_id).await.unwrap();
    assert!(uploaded.success);
    assert_eq!(
        uploaded.message,
        "Post uploaded to instagram successfully (simulated)"
    );

    match studio.upload(&twitter_id).await {
        Err(ClientError::NotConnected(Platform::Twitter)) => {}
        other => panic!("expected local refusal, got {other:?}"),
    }

    // The server refuses on its own as well.
    let token = studio.session().access_token().unwrap().to_string();
    match studio.client().upload(&token, &twitter_id, None).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Social account not connected");
        }
        other => panic!("expected 400, got {other:?}"),
    }
}

#[tokio::test]
async fn saving_requires_a_session() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    finish_draft(studio.wizard_mut(), Platform::Facebook);

    match studio.save_draft().await {
        Err(ClientError::Wizard(WizardError::NotSignedIn)) => {}
        other => panic!("expected NotSignedIn, got {other:?}"),
    }
    assert!(studio.wizard().is_final());
    assert_eq!(studio.wizard().draft().platform, Some(Platform::Facebook));
}

#[tokio::test]
async fn saving_requires_final_step() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    studio
        .register("early@example.com", "hunter22", "Early")
        .await
        .unwrap();

    studio
        .wizard_mut()
        .choose_method(CreationMethod::AiGenerated)
        .unwrap();
    match studio.save_draft().await {
        Err(ClientError::Wizard(WizardError::StepNotReached { required, .. })) => {
            assert_eq!(required, WizardStep::PreviewingFinal);
        }
        other => panic!("expected StepNotReached, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_save_keeps_the_draft() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let stale = UserSession {
        email: "ghost@example.com".into(),
        name: "Ghost".into(),
        access_token: "not-a-jwt".into(),
    };
    let mut studio = Studio::new(
        ApiClient::new(&url),
        SessionContext::restore(MemorySessionStore::with_session(stale)),
        Wizard::new(),
    );
    finish_draft(studio.wizard_mut(), Platform::LinkedIn);

    match studio.save_draft().await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected 401, got {other:?}"),
    }
    assert!(studio.wizard().is_final());
    assert_eq!(studio.wizard().draft().caption.as_deref(), Some("Everything 20% off"));
}

#[tokio::test]
async fn busy_action_is_rejected_without_a_request() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    studio
        .register("busy@example.com", "hunter22", "Busy")
        .await
        .unwrap();
    finish_draft(studio.wizard_mut(), Platform::TikTok);

    let guard = studio.client().try_begin(Action::SavePost).unwrap();
    match studio.save_draft().await {
        Err(ClientError::Busy(Action::SavePost)) => {}
        other => panic!("expected Busy, got {other:?}"),
    }
    assert!(studio.wizard().is_final());

    drop(guard);
    studio.save_draft().await.unwrap();
    assert_eq!(studio.refresh_catalog().await.unwrap().len(), 1);
}

#[tokio::test]
async fn login_logout_and_bad_credentials() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    studio
        .register("pat@example.com", "hunter22", "Pat")
        .await
        .unwrap();
    studio.logout().unwrap();
    assert!(!studio.session().is_signed_in());

    match studio.login("pat@example.com", "wrong-pass").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("expected 400, got {other:?}"),
    }

    let session = studio.login("pat@example.com", "hunter22").await.unwrap();
    assert_eq!(session.name, "Pat");
    assert!(studio.refresh_connections().await.unwrap().connections.is_empty());
}

#[tokio::test]
async fn delete_and_disconnect_update_local_state() {
    let url = spawn_backend("http://127.0.0.1:9").await;
    let mut studio = studio(&url);
    studio
        .register("del@example.com", "hunter22", "Del")
        .await
        .unwrap();
    finish_draft(studio.wizard_mut(), Platform::Instagram);
    let id = studio.save_draft().await.unwrap();
    studio.refresh_catalog().await.unwrap();

    studio.delete_post(&id).await.unwrap();
    assert!(studio.catalog().is_empty());
    // Deleting again is not an error.
    studio.delete_post(&id).await.unwrap();
    assert!(studio.refresh_catalog().await.unwrap().is_empty());
    // Reserved characters stay inside the id segment and still hit the route.
    studio.delete_post("odd/id?x=1#frag").await.unwrap();

    studio.connect(Platform::Facebook, "fb").await.unwrap();
    let connections = studio.disconnect(Platform::Facebook).await.unwrap();
    assert!(!connections.is_connected(Platform::Facebook));
}

#[tokio::test]
async fn enhance_image_goes_through_edit_proxy() {
    let upstream = axum::Router::new().route(
        "/edit-image",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["image"], "aGVsbG8=");
            assert_eq!(body["prompt"], "make it pop");
            Json(json!({ "edited_image": "ZWRpdGVk" }))
        }),
    );
    let upstream_url = serve(upstream).await;
    let url = spawn_backend(&upstream_url).await;

    let mut studio = studio(&url);
    let wizard = studio.wizard_mut();
    wizard.choose_method(CreationMethod::UploadEnhance).unwrap();
    wizard
        .upload_image(UploadedImage::new("hello.txt", b"hello".to_vec()))
        .unwrap();

    match studio.enhance_image().await {
        Err(ClientError::Wizard(WizardError::Incomplete(_))) => {}
        other => panic!("expected missing prompt, got {other:?}"),
    }

    studio
        .wizard_mut()
        .set_image_edit_description("make it pop")
        .unwrap();
    let edited = studio.enhance_image().await.unwrap();
    assert_eq!(edited, json!("ZWRpdGVk"));
}
