use clap::Parser;
use color_eyre::Result;
use daily_routine::cli::{self, Cli, Commands};
use daily_routine::models::TaskPatch;
use daily_routine::{Config, Profile, Routine, SystemClock};
use std::rc::Rc;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?.with_profile(profile),
        None => Config::load_with_profile(profile)?,
    };

    daily_routine::logging::init_logging(&config.log_level, &config.get_log_dir())?;

    let store = cli::open_store(cli.ephemeral, &config.get_database_path())?;
    let mut routine = Routine::open(store, Rc::new(SystemClock))?
        .with_toast_duration(config.toast_duration());

    let command = cli.command.unwrap_or(Commands::Tui);
    if command.requires_session() {
        cli::ensure_session(&routine)?;
    }

    match command {
        Commands::Tui => {
            let app = daily_routine::tui::App::new(config, routine);
            daily_routine::tui::run_event_loop(app)?;
        }
        Commands::Login { name } => cli::handle_login(name, &mut routine)?,
        Commands::Logout => cli::handle_logout(&routine)?,
        Commands::Add { title, description, category, priority, due, time, reminder, repeat, subtasks } => {
            cli::handle_add(title, description, category, priority, due, time, reminder, repeat, subtasks, &mut routine)?;
        }
        Commands::Edit { id, title, description, category, priority, due, time, reminder, repeat } => {
            let patch = TaskPatch {
                title,
                description,
                category,
                priority,
                due_date: due,
                due_time: time,
                reminder,
                repeat,
                subtasks: None,
            };
            cli::handle_edit(id, patch, &mut routine)?;
        }
        Commands::List { filter, category, priority } => cli::handle_list(filter, category, priority, &routine)?,
        Commands::Completed => cli::handle_completed(&routine)?,
        Commands::Toggle { id } => cli::handle_toggle(id, &mut routine)?,
        Commands::Delete { id } => cli::handle_delete(id, &mut routine)?,
        Commands::Dashboard => cli::handle_dashboard(&mut routine)?,
        Commands::Settings { command } => cli::handle_settings(command, &mut routine)?,
        Commands::Profile { command } => cli::handle_profile(command, &mut routine)?,
        Commands::Notifications { command } => cli::handle_notifications(command, &mut routine)?,
        Commands::Export { dir } => cli::handle_export(dir, &mut routine)?,
        Commands::Clear { force } => {
            let stdin = std::io::stdin();
            cli::handle_clear(force, &mut routine, &mut stdin.lock())?;
        }
    }

    Ok(())
}
