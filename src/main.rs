use std::{env, error::Error};

use tokio::{
    fs,
    io::{
        self, AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Stdin,
        Stdout,
    },
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use municipal_tickets::{
    app::NoticeKind,
    backend::{self, Backend},
    command::{Command, HELP},
    config,
    form::{DepartmentForm, RegistrationForm, TicketForm},
    guard::{self, Decision},
    route::Route,
    storage::{self, Storage},
    view, App, Config,
};

type Lines = io::Lines<BufReader<Stdin>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).unwrap_or_else(|| "config.toml".into());
    let config = fs::read_to_string(&path).await?;
    let config = toml::from_str::<Config>(&config)?;

    tracing_subscriber::registry()
        .with(config.log.level.parse::<LevelFilter>()?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let backend: Box<dyn Backend> = match config.backend {
        config::Backend::Remote { url } => {
            info!(%url, "using remote backend");
            Box::new(backend::Remote::new(url))
        }
        config::Backend::Local => {
            info!("using local backend with demo data");
            Box::new(backend::Local::seeded())
        }
    };
    let storage: Box<dyn Storage> = match config.session.path {
        Some(path) => Box::new(storage::File::new(path)),
        None => Box::new(storage::Memory::default()),
    };

    let mut app = App::start(backend, storage).await;
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut out = io::stdout();

    show(&mut out, &app).await?;
    while let Some(line) = ask(&mut out, &mut lines, "> ").await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                say(&mut out, &e).await?;
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => say(&mut out, HELP).await?,
            Command::Menu => match app.session().principal() {
                Some(principal) => {
                    let menu = view::Menu {
                        principal,
                        current: app.route(),
                    };
                    say(&mut out, menu.to_string().trim_end()).await?
                }
                None => say(&mut out, "Log in to see the menu.").await?,
            },
            command => {
                run(&mut app, command, &mut out, &mut lines).await?;
                show(&mut out, &app).await?;
            }
        }
    }

    Ok(())
}

async fn run(
    app: &mut App,
    command: Command,
    out: &mut Stdout,
    lines: &mut Lines,
) -> io::Result<()> {
    match command {
        Command::Login { username, password } => {
            app.login(&username, &password).await;
        }
        Command::Register {
            username,
            password,
            display_name,
        } => {
            app.register(RegistrationForm {
                username,
                password,
                display_name,
            })
            .await;
        }
        Command::Logout => app.logout().await,
        Command::Go(path) => {
            app.navigate(&path).await;
        }
        Command::FilterStatus(status) => app.filter_status(status),
        Command::FilterDepartment(department) => {
            app.filter_department(department);
        }
        Command::CreateTicket => {
            let role = app.session().principal().map(|p| p.role);
            let form = if guard::check_route(role, Route::CreateTicket)
                == Decision::Render
            {
                match fill_ticket(out, lines).await? {
                    Some(form) => form,
                    None => return Ok(()),
                }
            } else {
                TicketForm::default()
            };
            app.create_ticket(form).await;
        }
        Command::Advance(id) => {
            app.advance_ticket(id).await;
        }
        Command::AddDepartment { id, name } => {
            app.create_department(DepartmentForm { id, name }).await;
        }
        Command::RenameDepartment { id, name } => {
            app.rename_department(id, name).await;
        }
        Command::DeleteDepartment(id) => {
            app.delete_department(id).await;
        }
        Command::UserRole { id, role } => {
            app.change_user_role(id, role).await;
        }
        Command::UserDepartment { id, department } => {
            app.change_user_department(id, department).await;
        }
        Command::Dismiss => app.dismiss(),
        Command::Menu | Command::Help | Command::Quit => {}
    }
    Ok(())
}

/// Prompts for every field of a new ticket. `None` when the input ends or a
/// choice is not recognized.
async fn fill_ticket(
    out: &mut Stdout,
    lines: &mut Lines,
) -> io::Result<Option<TicketForm>> {
    let mut form = TicketForm::default();
    let Some(title) = ask(out, lines, "Title: ").await? else {
        return Ok(None);
    };
    form.title = title;
    let Some(description) = ask(out, lines, "Description: ").await? else {
        return Ok(None);
    };
    form.description = description;

    let Some(category) = ask(out, lines, "Category: ").await? else {
        return Ok(None);
    };
    if !category.trim().is_empty() {
        match category.trim().parse() {
            Ok(category) => form.category = Some(category),
            Err(()) => {
                say(out, &format!("Unknown category `{}`.", category.trim()))
                    .await?;
                return Ok(None);
            }
        }
    }

    let Some(priority) = ask(out, lines, "Priority [MEDIUM]: ").await? else {
        return Ok(None);
    };
    if !priority.trim().is_empty() {
        match priority.trim().parse() {
            Ok(priority) => form.priority = priority,
            Err(()) => {
                say(out, &format!("Unknown priority `{}`.", priority.trim()))
                    .await?;
                return Ok(None);
            }
        }
    }

    let Some(location) = ask(out, lines, "Location (optional): ").await? else {
        return Ok(None);
    };
    form.location = location;
    let Some(department) = ask(out, lines, "Department: ").await? else {
        return Ok(None);
    };
    let department = department.trim();
    form.department =
        (!department.is_empty()).then(|| department.to_uppercase().into());

    Ok(Some(form))
}

/// Prints the pending notice and the current screen.
async fn show(out: &mut Stdout, app: &App) -> io::Result<()> {
    if let Some(notice) = app.notice() {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        say(out, &format!("[{tag}] {}", notice.text)).await?;
    }
    say(out, &format!("\n{}", app.render().trim_end())).await
}

async fn ask(
    out: &mut Stdout,
    lines: &mut Lines,
    prompt: &str,
) -> io::Result<Option<String>> {
    out.write_all(prompt.as_bytes()).await?;
    out.flush().await?;
    lines.next_line().await
}

async fn say(out: &mut Stdout, text: impl ToString) -> io::Result<()> {
    out.write_all(format!("{}\n", text.to_string()).as_bytes()).await?;
    out.flush().await
}
