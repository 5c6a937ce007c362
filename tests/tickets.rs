mod common;

use common::Server;
use municipal_tickets::{
    api::ticket::{self, Category, Priority, Status},
    backend::{Backend, Scope},
    form::TicketForm,
    route::Route,
    store::Tickets,
};

#[tokio::test]
async fn staff_receives_own_department_from_server() {
    let server = Server::start().await;
    let client = server.client();
    let staff = client.login(&common::credentials("staff1")).await.unwrap();
    assert_eq!(staff.department, Some("SANITATION".into()));

    let mut tickets = Tickets::default();
    tickets.fetch_for(&client, &staff).await.unwrap();

    assert!(!tickets.all().is_empty());
    assert!(tickets
        .all()
        .iter()
        .all(|t| t.department.as_str() == "SANITATION"));
}

#[tokio::test]
async fn citizen_filing_starts_open() {
    let server = Server::start().await;
    let mut app = server.app().await;
    assert!(app.login("citizen1", "password").await);

    let created = app
        .create_ticket(TicketForm {
            title: "Burst pipe".into(),
            description: "Water leaking onto the road.".into(),
            category: Some(Category::WaterSupply),
            priority: Priority::High,
            location: "Elm Street 4".into(),
            department: Some("WATER_SUPPLY".into()),
        })
        .await;

    assert!(created);
    assert_eq!(app.route(), Route::MyTickets);
    assert_eq!(
        app.notice().map(|n| n.text.as_str()),
        Some("Ticket created successfully!"),
    );
    let ticket = app
        .tickets()
        .all()
        .iter()
        .find(|t| t.title == "Burst pipe")
        .unwrap();
    assert_eq!(ticket.status, Status::Open);
    assert_eq!(ticket.location.as_deref(), Some("Elm Street 4"));

    let on_server = server
        .backend
        .list_tickets(&Scope::All)
        .await
        .unwrap();
    assert_eq!(on_server.len(), 3);
}

#[tokio::test]
async fn incomplete_form_sends_nothing() {
    let server = Server::start().await;
    let mut app = server.app().await;
    assert!(app.login("citizen1", "password").await);

    let created = app
        .create_ticket(TicketForm {
            title: "Burst pipe".into(),
            ..Default::default()
        })
        .await;

    assert!(!created);
    assert_eq!(
        app.notice().map(|n| n.text.as_str()),
        Some("Please check the form: description is required."),
    );
    let on_server = server
        .backend
        .list_tickets(&Scope::All)
        .await
        .unwrap();
    assert_eq!(on_server.len(), 2);
}

#[tokio::test]
async fn staff_advances_department_ticket() {
    let server = Server::start().await;
    let mut app = server.app().await;
    assert!(app.login("staff1", "password").await);
    app.navigate("/department-tickets").await;
    let id = app.tickets().all()[0].id;
    assert!(app.render().contains(&format!("Start Progress: advance {id}")));

    assert!(app.advance_ticket(id).await);

    assert_eq!(
        app.notice().map(|n| n.text.as_str()),
        Some("Ticket #TKT00002 status updated to IN PROGRESS."),
    );
    assert!(app.render().contains(&format!("Mark Resolved: advance {id}")));
    let on_server = server
        .backend
        .list_tickets(&Scope::Department("SANITATION".into()))
        .await
        .unwrap();
    assert_eq!(on_server[0].status, Status::InProgress);
    assert!(on_server[0].updated_at >= on_server[0].created_at);
}

#[tokio::test]
async fn unknown_ticket_status_update_is_not_found() {
    let server = Server::start().await;

    let err = server
        .client()
        .update_ticket_status(ticket::Id::from(99), Status::Closed)
        .await
        .unwrap_err();

    assert!(matches!(err, municipal_tickets::backend::Error::NotFound));
}
