mod common;

use common::Server;
use municipal_tickets::{
    api::user::{self, Registration, Role},
    app::NoticeKind,
    backend::{Backend, Error},
    route::Route,
    storage::{self, Storage},
};

#[tokio::test]
async fn citizen_login_lands_on_dashboard() {
    let server = Server::start().await;
    let mut app = server.app().await;
    assert_eq!(app.route(), Route::Login);

    assert!(app.login("citizen1", "password").await);

    let principal = app.session().principal().unwrap();
    assert_eq!(principal.id, user::Id::from(1));
    assert_eq!(principal.role, Role::Citizen);
    assert_eq!(principal.display_name, "John Doe");
    assert_eq!(app.route(), Route::Dashboard);
    assert_eq!(app.route().to_string(), "/dashboard");
    assert_eq!(app.tickets().all().len(), 2);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = Server::start().await;

    let mut credentials = common::credentials("staff1");
    credentials.password = "letmein".into();
    let err = server.client().login(&credentials).await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn session_survives_restart_until_logout() {
    let server = Server::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut app = server
        .app_with(Box::new(storage::File::new(&path)))
        .await;
    assert!(app.login("staff1", "password").await);
    drop(app);

    let mut app = server
        .app_with(Box::new(storage::File::new(&path)))
        .await;
    assert!(app.session().is_authenticated());
    assert_eq!(app.route(), Route::Dashboard);
    assert!(app.tickets().is_loaded());

    app.logout().await;
    let saved = storage::File::new(&path).get("user").await.unwrap();
    assert_eq!(saved, None);

    let app = server
        .app_with(Box::new(storage::File::new(&path)))
        .await;
    assert!(!app.session().is_authenticated());
    assert_eq!(app.route(), Route::Login);
}

#[tokio::test]
async fn registers_new_citizen_once() {
    let server = Server::start().await;
    let mut app = server.app().await;
    app.navigate("/register").await;

    let form = || municipal_tickets::form::RegistrationForm {
        username: "citizen2".into(),
        password: "hunter2".into(),
        display_name: "Mary Major".into(),
    };
    assert!(app.register(form()).await);
    assert_eq!(app.route(), Route::Login);
    assert_eq!(
        app.notice().map(|n| n.text.as_str()),
        Some("Registration successful! Please log in."),
    );

    assert!(!app.register(form()).await);
    let notice = app.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Registration failed: Username already exists.");

    assert!(app.login("citizen2", "hunter2").await);
    assert_eq!(
        app.session().principal().map(|p| p.role),
        Some(Role::Citizen),
    );
}

#[tokio::test]
async fn register_reports_conflict_status() {
    let server = Server::start().await;

    let err = server
        .client()
        .register(&Registration {
            username: "admin1".into(),
            password: "password".into(),
            display_name: "Someone Else".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Conflict));
}
