use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;
use crate::prompt::Prompter;

/// Dispatch a parsed command to the corresponding handler module.
///
/// No subcommand opens the interactive menu.
pub async fn dispatch<P: Prompter>(
    command: Option<Commands>,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let Some(command) = command else {
        return commands::menu::run(ctx, prompter, flags).await;
    };

    match command {
        Commands::Create(args) => commands::schema::create(&args, ctx, flags).await,
        Commands::Drop(args) => commands::schema::drop(&args, ctx, prompter, flags).await,
        Commands::Tables => commands::schema::tables(ctx, flags).await,
        Commands::Show(args) => commands::schema::show(&args, ctx, prompter, flags).await,
        Commands::Insert(args) => commands::manual::insert::run(&args, ctx, prompter, flags).await,
        Commands::Update(args) => commands::manual::update::run(&args, ctx, prompter, flags).await,
        Commands::Delete(args) => commands::manual::delete::run(&args, ctx, prompter, flags).await,
        Commands::Populate(args) => commands::populate::handle(&args, ctx, prompter, flags).await,
        Commands::Ask(args) => commands::ask::handle(&args, ctx, prompter, flags).await,
        Commands::Similar(args) => commands::similar::handle(&args, ctx, prompter, flags).await,
        Commands::Report(args) => commands::report::handle(&args, ctx, prompter, flags).await,
        Commands::Seed(args) => commands::seed::handle(&args, ctx, flags).await,
        Commands::Demo(args) => commands::demo::handle(&args, ctx, prompter, flags).await,
        Commands::Query(args) => commands::query::handle(&args, ctx, flags).await,
        Commands::Rewrite(args) => commands::random_rows::rewrite(&args, ctx, prompter, flags).await,
        Commands::Prune(args) => commands::random_rows::prune(&args, ctx, prompter, flags).await,
        Commands::Order(args) => commands::order::handle(&args, ctx, flags).await,
        Commands::Menu => commands::menu::run(ctx, prompter, flags).await,
    }
}
