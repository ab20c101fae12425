use clap::{Parser, Subcommand};

/// Command-line interface definition for invigilator
#[derive(Parser)]
#[command(
    name = "invigilator",
    version = env!("CARGO_PKG_VERSION"),
    about = "Exam invigilation from the terminal: attendance, barcode scanning and incidents, online or offline",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the API base URL (e.g. http://192.168.1.20:8080/api)
    #[arg(global = true, long = "api")]
    pub api: Option<String>,

    /// Do not try the server: behave as if the network were down
    #[arg(global = true, long = "offline")]
    pub offline: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the local database (integrity checks, storage usage)
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "info", help = "Show database and local storage information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "op", help = "Only rows for this operation (e.g. sync, mark_offline)")]
        operation: Option<String>,
    },

    /// Log in and store the session token
    Login { username: String, password: String },

    /// Drop the stored session token
    Logout,

    /// List the exams assigned to you
    Exams {
        #[arg(long = "id", help = "Show a single exam")]
        id: Option<String>,
    },

    /// Exam roster, or student lookups for librarians
    Students {
        /// Exam id whose roster to show (cached for offline scanning)
        exam: Option<String>,

        #[arg(long = "all", help = "List every registered student", conflicts_with = "exam")]
        all: bool,

        #[arg(long = "search", help = "Find a student by barcode id", conflicts_with_all = ["exam", "all"])]
        search: Option<String>,

        #[arg(
            long = "register",
            value_name = "STUDENT_ID",
            help = "Register a new student (needs --name and --program)",
            conflicts_with_all = ["exam", "all", "search"],
            requires_all = ["name", "program"]
        )]
        register: Option<String>,

        #[arg(long = "name", help = "Full name of the student to register", requires = "register")]
        name: Option<String>,

        #[arg(long = "program", help = "Academic program of the student to register", requires = "register")]
        program: Option<String>,
    },

    /// Mark one student's attendance
    Mark {
        exam: String,

        /// Server id of the student
        student: String,

        /// PRESENT, ABSENT or LATE (P/A/L accepted)
        status: String,

        #[arg(long = "method", default_value = "MANUAL", help = "MANUAL or SCAN")]
        method: String,
    },

    /// Mark attendance from barcode scans, one code per line
    Scan {
        exam: String,

        #[arg(long = "input", value_name = "FILE", help = "Read codes from a file instead of stdin")]
        input: Option<String>,

        #[arg(long = "cooldown-ms", help = "Pause after each mark (default from config)")]
        cooldown_ms: Option<i64>,
    },

    /// Report an incident
    Incident {
        exam: String,

        #[arg(long = "category", help = "CHEATING, HEALTH_EMERGENCY, DISRUPTION or OTHER")]
        category: String,

        #[arg(long = "severity", default_value = "MEDIUM", help = "LOW, MEDIUM or HIGH")]
        severity: String,

        #[arg(long = "description", short = 'd')]
        description: String,

        #[arg(long = "student", help = "Server id of the student involved (omit for a general incident)")]
        student: Option<String>,
    },

    /// List the incidents reported for an exam
    Incidents { exam: String },

    /// Attendance summary and incident count for an exam
    Report { exam: String },

    /// Countdown for an exam
    Timer {
        exam: String,

        #[arg(long = "follow", short = 'f', help = "Refresh every second until the exam ends")]
        follow: bool,
    },

    /// Replay offline records to the server now
    Sync,

    /// Watch connectivity and sync automatically when the network comes back
    Watch {
        #[arg(long = "interval", help = "Seconds between probes (default from config)")]
        interval: Option<u64>,

        #[arg(long = "max-polls", hide = true)]
        max_polls: Option<u64>,
    },

    /// Show connectivity, session and records waiting to be synced
    Status,

    /// Download a student's ID-card barcode (PNG), or generate them all
    Barcode {
        student: Option<String>,

        #[arg(long, value_name = "FILE")]
        file: Option<String>,

        #[arg(
            long = "generate-all",
            help = "Generate the barcode of every registered student on the server",
            conflicts_with_all = ["student", "file"]
        )]
        generate_all: bool,
    },
}
