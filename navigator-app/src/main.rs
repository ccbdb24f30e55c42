use anyhow::{anyhow, bail, Context};
use navigator_app::app::{App, Mounted};
use navigator_app::screens::airport_search::Tab;
use navigator_app::screens::sign_up::SignUpForm;
use navigator_app::{AppContext, Nav, View};
use navigator_shared::{BillingCycle, Masked};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  go <home|find|tracker|dashboard|pricing|signin|create|reset>
  search <text>            filter airports / search flights
  open <n>                 open the n-th airport, map or lounge
  tab <overview|maps|lounges>
  back
  track <n> | untrack <n>
  signin <email> <password>
  signup <email> <password> <confirm> <full name>
  reset <email>
  signout
  cycle <monthly|yearly>
  subscribe <n>
  notify                   enable flight notifications
  install | dismiss
  retry | home             recover after an error
  render | help | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navigator_app=debug,navigator_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = navigator_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting Airport Navigator (refresh every {}s)",
        config.refresh.interval().as_secs()
    );

    let ctx = AppContext::from_config(&config);
    if let Ok(token) = std::env::var("NAVIGATOR_SESSION_TOKEN") {
        match ctx.session.restore(Masked::new(token)).await {
            Ok(identity) => tracing::info!("Restored session of {}", identity.email),
            Err(e) => tracing::warn!("Ignoring stored session: {}", e),
        }
    }

    let mut app = App::start(ctx).await;
    print_page(&app).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match execute(&mut app, line).await {
            Ok(true) => print_page(&app).await?,
            Ok(false) => break,
            Err(e) => eprintln!("! {}", e),
        }
    }
    Ok(())
}

async fn print_page(app: &App) -> anyhow::Result<()> {
    let page = app.render().await;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// Run one console command. `Ok(false)` ends the session.
async fn execute(app: &mut App, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    match command {
        "quit" | "exit" => return Ok(false),
        "help" => println!("{}", HELP),
        "render" => {}
        "go" => {
            let view: View = arg(&args, 0)?.parse()?;
            app.navigate(Nav::To(view)).await;
        }
        "search" => match app.screen() {
            Mounted::Find(screen) => screen.set_query(rest).await,
            Mounted::Tracker(screen) => {
                screen.set_query(rest).await;
                screen.search().await;
            }
            _ => bail!("Nothing to search here"),
        },
        "open" => {
            let n = index(&args)?;
            let Mounted::Find(screen) = app.screen() else {
                bail!("Nothing to open here");
            };
            if let Some(maps) = screen.maps().await {
                let id = maps.map_at(n).await.ok_or_else(|| anyhow!("No map #{}", n + 1))?;
                maps.open_map(id).await?;
            } else if let Some(lounges) = screen.lounges().await {
                let id = lounges.lounge_at(n).await.ok_or_else(|| anyhow!("No lounge #{}", n + 1))?;
                lounges.open_lounge(id).await?;
            } else {
                let airport = screen
                    .visible_airports()
                    .await
                    .into_iter()
                    .nth(n)
                    .ok_or_else(|| anyhow!("No airport #{}", n + 1))?;
                screen.select_airport(airport.id).await?;
            }
        }
        "tab" => {
            let tab = match arg(&args, 0)? {
                "overview" => Tab::Overview,
                "maps" => Tab::Maps,
                "lounges" => Tab::Lounges,
                other => bail!("Unknown tab '{}'", other),
            };
            let Mounted::Find(screen) = app.screen() else {
                bail!("Open an airport first");
            };
            screen.open_tab(tab).await?;
        }
        "back" => {
            let Mounted::Find(screen) = app.screen() else {
                bail!("Nothing to go back from");
            };
            screen.back().await;
        }
        "track" | "untrack" => {
            let n = index(&args)?;
            match app.screen() {
                Mounted::Tracker(screen) => {
                    let id = screen.result_at(n).await.ok_or_else(|| anyhow!("No flight #{}", n + 1))?;
                    if command == "track" {
                        screen.track(id).await?;
                    } else {
                        screen.untrack(id).await?;
                    }
                }
                Mounted::Dashboard(screen) if command == "untrack" => {
                    let id = screen.flight_at(n).await.ok_or_else(|| anyhow!("No flight #{}", n + 1))?;
                    screen.untrack(id).await?;
                }
                _ => bail!("Open the flight tracker first"),
            }
        }
        "signin" => {
            if app.view() != View::SignIn {
                app.navigate(Nav::SignIn).await;
            }
            app.sign_in(arg(&args, 0)?, arg(&args, 1)?).await?;
        }
        "signup" => {
            if app.view() != View::Create {
                app.navigate(Nav::CreateAccount).await;
            }
            let form = SignUpForm {
                email: args.first().copied().unwrap_or_default().to_string(),
                password: args.get(1).copied().unwrap_or_default().to_string(),
                confirm_password: args.get(2).copied().unwrap_or_default().to_string(),
                display_name: args.get(3..).map(|name| name.join(" ")).unwrap_or_default(),
            };
            if let Mounted::Create(screen) = app.screen() {
                screen.submit(&form).await?;
            }
        }
        "reset" => {
            if app.view() != View::Reset {
                app.navigate(Nav::ForgotPassword).await;
            }
            if let Mounted::Reset(screen) = app.screen() {
                screen.submit(rest).await?;
            }
        }
        "signout" => app.sign_out().await?,
        "cycle" => {
            let cycle = match arg(&args, 0)? {
                "monthly" => BillingCycle::Monthly,
                "yearly" => BillingCycle::Yearly,
                other => bail!("Unknown billing cycle '{}'", other),
            };
            let Mounted::Pricing(screen) = app.screen() else {
                bail!("Open the pricing page first");
            };
            screen.set_cycle(cycle).await;
        }
        "subscribe" => {
            let n = index(&args)?;
            let Mounted::Pricing(screen) = app.screen() else {
                bail!("Open the pricing page first");
            };
            let id = screen.tier_at(n).await.ok_or_else(|| anyhow!("No plan #{}", n + 1))?;
            screen.subscribe(id).await?;
        }
        "notify" => {
            let Mounted::Dashboard(screen) = app.screen() else {
                bail!("Open the dashboard first");
            };
            if !screen.enable_notifications().await? {
                println!("Notifications were not enabled");
            }
        }
        "install" => {
            app.install_prompt().accept().await;
        }
        "dismiss" => app.install_prompt().dismiss().await,
        "retry" => {
            app.retry().await;
        }
        "home" => {
            app.go_home().await;
        }
        other => bail!("Unknown command '{}', try 'help'", other),
    }
    Ok(true)
}

fn arg<'a>(args: &[&'a str], position: usize) -> anyhow::Result<&'a str> {
    args.get(position)
        .copied()
        .ok_or_else(|| anyhow!("Missing argument #{}", position + 1))
}

/// 1-based list position from the console, 0-based index back.
fn index(args: &[&str]) -> anyhow::Result<usize> {
    let n: usize = arg(args, 0)?.parse().context("Expected a list number")?;
    n.checked_sub(1).ok_or_else(|| anyhow!("List numbers start at 1"))
}
