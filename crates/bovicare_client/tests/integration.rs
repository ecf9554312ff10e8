use std::sync::Arc;
use std::time::Duration;

use bovicare_client::http_client::ReqwestBovicareClient;
use bovicare_client::events::MutationMethod;
use bovicare_client::{
    AnimalInput, AnimalQuery, BovicareClient, BovicareError, ChangePasswordRequest, Credentials,
    DataChange, FilterCriteria, ForgotPasswordRequest, HerdInput, NewUser, NewWeight,
    RecoveryMethod, ResetPasswordRequest, Session, User, VerifyCodeRequest, WeightHistory,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn logged_in_client(server: &MockServer) -> ReqwestBovicareClient {
    let session = Session::in_memory();
    session
        .set(
            "tok",
            User {
                id: Some("u1".into()),
                username: Some("maria".into()),
                ..User::default()
            },
        )
        .await
        .expect("session");
    ReqwestBovicareClient::new(&server.uri(), Arc::new(session), Duration::from_secs(5))
        .expect("client")
}

#[tokio::test]
async fn requests_carry_bearer_and_user_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/herds"))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-user-id", "u1"))
        .and(header("x-user-name", "maria"))
        .and(query_param("user_id", "u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"herds": [{"id": 1, "name": "Fazenda Boa Vista"}]})),
        )
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let herds = client.list_herds().await.expect("herds");
    assert_eq!(herds.len(), 1);
    assert_eq!(herds[0].id, "1");
}

#[tokio::test]
async fn login_stores_session_and_login_401_keeps_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({"email": "ana@x.com", "password": "segura123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"token": "abc", "user": {"id": 9, "username": "ana"}}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({"email": "ana@x.com", "password": "errada"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Credenciais inválidas"})))
        .mount(&server)
        .await;

    let client = ReqwestBovicareClient::new(
        &server.uri(),
        Arc::new(Session::in_memory()),
        Duration::from_secs(5),
    )
    .expect("client");
    let mut changes = client.changes().subscribe();

    let resp = client
        .login(&Credentials {
            email: "ana@x.com".into(),
            password: "segura123".into(),
        })
        .await
        .expect("login");
    assert_eq!(resp.token, "abc");
    assert_eq!(client.session().user_id().await.as_deref(), Some("9"));

    let err = client
        .login(&Credentials {
            email: "ana@x.com".into(),
            password: "errada".into(),
        })
        .await
        .unwrap_err();
    match err {
        BovicareError::Auth(msg) => assert_eq!(msg, "Credenciais inválidas"),
        other => panic!("expected auth error, got {other:?}"),
    }
    // A rejected login does not end an existing session.
    assert!(client.session().is_authenticated().await);
    // Logging in is not a data change.
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn unauthorized_elsewhere_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let err = client.get_dashboard().await.unwrap_err();
    assert!(err.is_auth());
    assert!(!client.session().is_authenticated().await);
    assert!(client.session().user().await.is_none());
}

#[tokio::test]
async fn status_codes_map_to_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/herds/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Rebanho não encontrado"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weight/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    assert!(matches!(
        client.get_herd("404").await,
        Err(BovicareError::NotFound(m)) if m == "Rebanho não encontrado"
    ));
    assert!(matches!(
        client.get_weight_stats().await,
        Err(BovicareError::Api { status: 500, .. })
    ));
    // Server errors leave the session alone.
    assert!(client.session().is_authenticated().await);
}

#[tokio::test]
async fn list_animals_accepts_wrapped_shapes_and_rejects_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/animals"))
        .and(query_param("herd_id", "h1"))
        .and(query_param("per_page", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "animals": [
                {"id": 1, "name": "Mimosa", "current_weight": "412.5"},
                {"id": "2", "earring": "BR-002"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/animals"))
        .and(query_param("herd_id", "h2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let animals = client
        .list_animals(&AnimalQuery::for_herd("h1"))
        .await
        .expect("animals");
    assert_eq!(animals.len(), 2);
    assert_eq!(animals[0].current_weight, Some(412.5));
    assert_eq!(animals[1].display_name(), "BR-002");

    assert!(matches!(
        client.list_animals(&AnimalQuery::for_herd("h2")).await,
        Err(BovicareError::UnexpectedShape(_))
    ));
}

#[tokio::test]
async fn weight_history_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weight/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [{"date": "2024-03-01", "weight": 420}, {"date": "2024-02-01", "weight": "400"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weight/a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "sem dados"})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let h = client.get_weight_history("a1").await.expect("history");
    assert_eq!(h.entries().map(<[_]>::len), Some(2));
    assert_eq!(h.first_weight(), Some(420.0));

    let h = client.get_weight_history("a2").await.expect("history");
    assert_eq!(h, WeightHistory::Unrecognized);
}

#[tokio::test]
async fn filter_cattle_unknown_shape_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cattle/filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();
    let res = client
        .filter_cattle(&FilterCriteria::default())
        .await
        .expect("filter");
    assert!(res.is_empty());
    assert!(changes.try_recv().is_err());

    let received = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).expect("json");
    assert_eq!(body["userId"], "u1");
}

#[tokio::test]
async fn add_weight_publishes_change_and_validates_animal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/weight"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();

    let err = client
        .add_weight(&NewWeight {
            animal_id: "  ".into(),
            weight: 400.0,
            date: "2024-05-01".into(),
            user_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BovicareError::InvalidInput(m) if m == "Selecione um gado para registrar o peso."));

    client
        .add_weight(&NewWeight {
            animal_id: "a1".into(),
            weight: 401.5,
            date: "2024-05-01".into(),
            user_id: None,
        })
        .await
        .expect("add weight");

    let change = changes.try_recv().expect("change published");
    assert_eq!(change.path, "/api/weight");

    let received = server.received_requests().await.expect("requests");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).expect("json");
    assert_eq!(body["cattleId"], "a1");
    assert_eq!(body["user_id"], "u1");
}

#[tokio::test]
async fn user_scoped_calls_require_identity() {
    let server = MockServer::start().await;
    let client = ReqwestBovicareClient::new(
        &server.uri(),
        Arc::new(Session::in_memory()),
        Duration::from_secs(5),
    )
    .expect("client");
    assert!(matches!(
        client.get_current_user(None).await,
        Err(BovicareError::Session(m)) if m == "ID do usuário não encontrado"
    ));
    assert!(matches!(
        client.chat_diagnose("   ").await,
        Err(BovicareError::InvalidInput(_))
    ));
    assert!(server.received_requests().await.expect("requests").is_empty());
}

#[tokio::test]
async fn activities_pass_identity_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/activities"))
        .and(query_param("user_id", "u1"))
        .and(query_param("username", "maria"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activities": [
                {"id": 5, "object_type": "animal", "action": "create", "object_name": "Mimosa"},
                {"id": 6, "object_type": "vacina", "action": "dose"}
            ]
        })))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let acts = client
        .get_recent_activities(&bovicare_client::ActivityFilter {
            user_id: Some("u1".into()),
            username: Some("maria".into()),
        })
        .await
        .expect("activities");
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0].object_type, bovicare_client::ObjectType::Animal);
    assert_eq!(acts[1].object_type, bovicare_client::ObjectType::Other);
    assert_eq!(acts[1].action, bovicare_client::ActivityAction::Unspecified);
}

#[tokio::test]
async fn chat_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/diagnose"))
        .and(body_json(json!({"message": "bezerro com febre"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Procure um veterinário."})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let reply = client.chat_diagnose("  bezerro com febre ").await.expect("reply");
    assert_eq!(reply.reply.as_deref(), Some("Procure um veterinário."));
    assert!(reply.sources.is_empty());
}

fn anonymous_client(server: &MockServer) -> ReqwestBovicareClient {
    ReqwestBovicareClient::new(
        &server.uri(),
        Arc::new(Session::in_memory()),
        Duration::from_secs(5),
    )
    .expect("client")
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<DataChange>) -> Vec<(MutationMethod, String)> {
    let mut out = Vec::new();
    while let Ok(change) = rx.try_recv() {
        out.push((change.method, change.path));
    }
    out
}

async fn sent_json(server: &MockServer, index: usize) -> serde_json::Value {
    let received = server.received_requests().await.expect("requests");
    serde_json::from_slice(&received[index].body).expect("json body")
}

#[tokio::test]
async fn password_recovery_validates_before_sending() {
    let server = MockServer::start().await;
    let client = anonymous_client(&server);
    let mut changes = client.changes().subscribe();

    let err = client
        .forgot_password(&ForgotPasswordRequest {
            method: RecoveryMethod::Email,
            email: Some("nope".into()),
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BovicareError::InvalidInput(m) if m.contains("e-mail válido")));
    let err = client
        .verify_reset_code(&VerifyCodeRequest {
            code: "12a".into(),
            email: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BovicareError::InvalidInput(m) if m.contains("6 dígitos")));
    let err = client
        .reset_password(&ResetPasswordRequest {
            token: "t".into(),
            new_password: "novaSenha1".into(),
            confirm_password: "outra".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BovicareError::InvalidInput(m) if m.contains("não coincidem")));
    assert!(server.received_requests().await.expect("requests").is_empty());

    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .and(body_json(json!({"method": "sms", "phone": "(11) 98765-4321"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "enviado"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/verify-code"))
        .and(body_json(json!({"code": "123456", "email": "ana@x.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "reset-tok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .and(body_json(json!({"token": "reset-tok", "new_password": "novaSenha1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .forgot_password(&ForgotPasswordRequest {
            method: RecoveryMethod::Sms,
            email: None,
            phone: Some("(11) 98765-4321".into()),
        })
        .await
        .expect("forgot");
    let verified = client
        .verify_reset_code(&VerifyCodeRequest {
            code: " 123456 ".into(),
            email: Some("ana@x.com".into()),
        })
        .await
        .expect("verify");
    assert_eq!(verified["token"], "reset-tok");
    client
        .reset_password(&ResetPasswordRequest {
            token: "reset-tok".into(),
            new_password: "novaSenha1".into(),
            confirm_password: "novaSenha1".into(),
        })
        .await
        .expect("reset");

    assert!(drain(&mut changes).is_empty());
}

#[tokio::test]
async fn animal_writes_fill_defaults_and_publish() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/animals"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/animals/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/animals/10"))
        .and(query_param("user_id", "u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();

    client
        .create_animal(&AnimalInput {
            name: Some("Mimosa".into()),
            breed: Some("Nelore".into()),
            herd_options: vec!["h9".into()],
            ..AnimalInput::default()
        })
        .await
        .expect("create");
    client
        .update_animal(
            "10",
            &AnimalInput {
                earring: Some("BR-010".into()),
                name: Some("Mimosa".into()),
                status: Some("vendido".into()),
                herd_options: vec!["h9".into()],
                ..AnimalInput::default()
            },
        )
        .await
        .expect("update");
    client.delete_animal("10").await.expect("delete");

    let created = sent_json(&server, 0).await;
    assert_eq!(created["earring"], "Mimosa");
    assert_eq!(created["status"], "ativo");
    assert_eq!(created["herd_id"], "h9");
    assert_eq!(created["user_id"], "u1");
    let updated = sent_json(&server, 1).await;
    assert_eq!(updated["earring"], "BR-010");
    assert_eq!(updated["status"], "vendido");
    assert!(updated["herd_id"].is_null());

    assert_eq!(
        drain(&mut changes),
        vec![
            (MutationMethod::Post, "/api/v1/animals".to_string()),
            (MutationMethod::Put, "/api/v1/animals/10".to_string()),
            (MutationMethod::Delete, "/api/v1/animals/10".to_string()),
        ]
    );
}

#[tokio::test]
async fn animal_create_without_identity_sends_nothing() {
    let server = MockServer::start().await;
    let client = anonymous_client(&server);
    let err = client
        .create_animal(&AnimalInput {
            name: Some("Mimosa".into()),
            ..AnimalInput::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BovicareError::Session(_)));
    assert!(server.received_requests().await.expect("requests").is_empty());
}

#[tokio::test]
async fn herd_writes_require_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/herds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/herds/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/herds/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();

    let incomplete = HerdInput {
        name: "Boa Vista".into(),
        location: "Estrada 1".into(),
        ..HerdInput::default()
    };
    assert!(matches!(
        client.create_herd(&incomplete).await,
        Err(BovicareError::InvalidInput(m)) if m == "Por favor, preencha todos os campos obrigatórios"
    ));
    assert!(client.update_herd("3", &incomplete).await.is_err());
    assert!(server.received_requests().await.expect("requests").is_empty());

    let herd = HerdInput {
        city: "Uberaba".into(),
        capacity: Some(120),
        ..incomplete
    };
    client.create_herd(&herd).await.expect("create");
    client.update_herd("3", &herd).await.expect("update");
    client.delete_herd("3").await.expect("delete");

    let created = sent_json(&server, 0).await;
    assert_eq!(created["name"], "Boa Vista");
    assert_eq!(created["city"], "Uberaba");
    assert_eq!(created["capacity"], 120);

    let paths: Vec<String> = drain(&mut changes).into_iter().map(|(_, p)| p).collect();
    assert_eq!(paths, ["/api/v1/herds", "/api/v1/herds/3", "/api/v1/herds/3"]);
}

#[tokio::test]
async fn user_administration_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"id": 1, "username": "ana"}, {"id": 2, "username": "joao"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": 1, "username": "ana"}})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/1"))
        .and(body_json(json!({"role": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({"username": "bia", "email": "bia@x.com", "password": "segura123"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();

    let users = client.list_users().await.expect("users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].username.as_deref(), Some("joao"));
    let user = client.get_user("1").await.expect("user");
    assert_eq!(user.id.as_deref(), Some("1"));
    assert!(drain(&mut changes).is_empty());

    client
        .update_user("1", &json!({"role": "admin"}))
        .await
        .expect("update");
    client.delete_user("1").await.expect("delete");
    client
        .register_user(&NewUser {
            username: "bia".into(),
            email: "bia@x.com".into(),
            password: "segura123".into(),
            name: None,
            role: None,
        })
        .await
        .expect("register");

    assert_eq!(
        drain(&mut changes),
        vec![
            (MutationMethod::Put, "/users/1".to_string()),
            (MutationMethod::Delete, "/users/1".to_string()),
            (MutationMethod::Post, "/users/register".to_string()),
        ]
    );
}

#[tokio::test]
async fn profile_calls_use_session_identity() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/user/profile"))
        .and(body_json(json!({"name": "Maria Souza"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/user/change-password"))
        .and(body_json(json!({
            "current_password": "antiga123",
            "new_password": "novaSenha1",
            "user_id": "u1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(query_param("user_id", "u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"farm": "Boa Vista"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/stats"))
        .and(query_param("user_id", "u7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"animals": 12})))
        .mount(&server)
        .await;

    let client = logged_in_client(&server).await;
    let mut changes = client.changes().subscribe();

    client
        .update_profile(&json!({"name": "Maria Souza"}))
        .await
        .expect("profile");
    client
        .change_password(&ChangePasswordRequest {
            current_password: "antiga123".into(),
            new_password: "novaSenha1".into(),
            user_id: None,
        })
        .await
        .expect("password");
    let profile = client.get_profile_data(None).await.expect("profile data");
    assert_eq!(profile["farm"], "Boa Vista");
    let stats = client.get_user_stats(Some("u7")).await.expect("stats");
    assert_eq!(stats["animals"], 12);

    let paths: Vec<String> = drain(&mut changes).into_iter().map(|(_, p)| p).collect();
    assert_eq!(paths, ["/api/user/profile", "/api/user/change-password"]);
}

#[tokio::test]
async fn client_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weight/report"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ReqwestBovicareClient::new(
        &server.uri(),
        Arc::new(Session::in_memory()),
        Duration::from_millis(50),
    )
    .expect("client");
    let err = client.get_dashboard().await.unwrap_err();
    assert!(err.is_transport(), "expected transport failure, got {err:?}");

    let err = client.get_weight_report().await.unwrap_err();
    assert!(matches!(err, BovicareError::Api { status: 503, .. }));
    assert!(!err.is_transport());
}
