use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "subadmin",
    version,
    about = "admin dashboard for user submissions",
    long_about = "subadmin lists, searches, deletes and exports user submission records held in a realtime database collection.\n\nExamples:\n  subadmin --db https://demo-default-rtdb.firebaseio.com\n  subadmin list --search hdfc --page 2\n  subadmin export -s sbi -o ./exports/\n  subadmin delete --yes -- -NxY3kPq_9aBcD\n\nTip: Use --init-config to write ~/.subadmin/config.yml and keep CLI invocations short."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.subadmin/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "db",
        visible_alias = "database-url",
        value_name = "URL",
        env = "SUBADMIN_DATABASE_URL",
        global = true,
        help_heading = "Store",
        help = "Realtime database URL (e.g. https://demo-default-rtdb.firebaseio.com)."
    )]
    pub database_url: Option<String>,

    #[arg(
        long = "col",
        visible_alias = "collection",
        value_name = "NAME",
        global = true,
        help_heading = "Store",
        help = "Collection holding the submissions (default: users)."
    )]
    pub collection: Option<String>,

    #[arg(
        long = "auth",
        value_name = "TOKEN",
        env = "SUBADMIN_AUTH",
        hide_env_values = true,
        global = true,
        help_heading = "Store",
        help = "Access token sent as the auth query parameter."
    )]
    pub auth_token: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        global = true,
        help_heading = "Table",
        help = "Rows per page (default: 10)."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 'y',
        long = "yes",
        visible_alias = "assume-yes",
        global = true,
        help_heading = "Actions",
        help = "Skip confirmation prompts for delete and clear."
    )]
    pub yes: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print one page of submissions.
    List {
        #[arg(
            short = 's',
            long = "search",
            value_name = "TERM",
            help = "Filter by mobile, amount, bank or pin."
        )]
        search: Option<String>,

        #[arg(
            long = "page",
            value_name = "N",
            default_value_t = 1,
            help = "Page to show (clamped to the last page)."
        )]
        page: usize,

        #[arg(
            short = 'A',
            long = "of",
            visible_alias = "format",
            value_name = "FORMAT",
            help = "Output format (table or json)."
        )]
        format: Option<String>,
    },

    /// Delete one submission by id.
    Delete {
        #[arg(value_name = "ID", allow_hyphen_values = true)]
        id: String,
    },

    /// Delete every submission.
    Clear,

    /// Write the (filtered) submissions as CSV.
    Export {
        #[arg(
            short = 's',
            long = "search",
            value_name = "TERM",
            help = "Export only matching submissions."
        )]
        search: Option<String>,

        #[arg(
            short = 'o',
            long = "out",
            visible_alias = "output",
            value_name = "PATH",
            help = "Output file, or directory for user-submissions-<date>.csv."
        )]
        output: Option<String>,
    },

    /// Interactive dashboard (default).
    Shell,
}
