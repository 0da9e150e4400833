//! Dota 2 lane role CLI
//!
//! Ingests professional matches from OpenDota, infers lane roles and prints
//! laning statistics.

use clap::{Parser, Subcommand};
use dota_lanes::{Config, Result};

#[derive(Parser)]
#[command(name = "dota-lanes")]
#[command(about = "Lane role inference for professional Dota 2 matches", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Fetch new league matches and store inferred roles
    Sync {
        /// Cache directory for match payloads
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached payloads (no network requests)
        #[arg(long)]
        offline: bool,
    },
    /// Show database status
    Status,
    /// Infer roles for a saved match payload without storing anything
    Inspect {
        /// Path to a /matches/{id} JSON response
        path: String,
    },
    /// List stored reference data
    List {
        #[command(subcommand)]
        what: ListCommands,
    },
    /// Average and median laning numbers
    Stats {
        /// Player account id
        #[arg(long)]
        player: Option<i64>,
        /// Player name prefix (case-insensitive)
        #[arg(long)]
        name: Option<String>,
        /// Hero id
        #[arg(long)]
        hero: Option<i64>,
        /// Team id
        #[arg(long)]
        team: Option<i64>,
        /// League id
        #[arg(long)]
        league: Option<i64>,
        /// Patch id
        #[arg(long)]
        patch: Option<i64>,
        /// Assumed lane role (1, 2, 3, 4, 4.5 or 5)
        #[arg(long)]
        role: Option<f64>,
        /// Allied hero on the lane (name)
        #[arg(long)]
        ally: Option<String>,
        /// Enemy hero on the lane (name)
        #[arg(long)]
        enemy: Option<String>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Registered leagues
    Leagues,
    /// Teams, optionally only those with players seen in a league
    Teams {
        #[arg(long)]
        league: Option<i64>,
    },
    /// Players, optionally on one team
    Players {
        #[arg(long)]
        team: Option<i64>,
        /// Only current team members
        #[arg(long)]
        active: bool,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Sync { cache, offline } => commands::sync(&config, cache, offline),
        Commands::Status => commands::status(&config),
        Commands::Inspect { path } => commands::inspect(&config, &path),
        Commands::List { what } => commands::list(&config, what),
        Commands::Stats {
            player,
            name,
            hero,
            team,
            league,
            patch,
            role,
            ally,
            enemy,
            format,
        } => commands::StatsArgs {
            player,
            name,
            hero,
            team,
            league,
            patch,
            role,
            ally,
            enemy,
        }
        .run(&config, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use dota_lanes::data::api::MatchDetail;
    use dota_lanes::data::{Database, MatchStore, OpenDotaClient};
    use dota_lanes::inference::{self, LaneNote, PlayerOutcome};
    use dota_lanes::ingest::Ingestor;
    use dota_lanes::stats::{PerformanceSummary, RecordFilter, Summary};
    use dota_lanes::{
        lane_names, AccountId, AssumedRole, DotaError, HeroCatalog, HeroId, LeagueId, TeamId,
    };

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to choose leagues", config_path);
        println!("  2. Run 'dota-lanes sync' to ingest matches");
        println!("  3. Run 'dota-lanes stats --hero <ID>' to query laning numbers");

        Ok(())
    }

    pub fn sync(config: &Config, cache: Option<String>, offline: bool) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let mut client = OpenDotaClient::from_config(&config.api)?;

        if let Some(cache_dir) = cache {
            println!("Using cache directory: {}", cache_dir);
            client = client.with_cache(&cache_dir);
        }

        if offline {
            println!("Offline mode: using cached payloads only");
            client = client.offline_only(true);
        }

        let mut ingestor = Ingestor::new(client, db).with_delay(config.request_delay());
        let report = ingestor.run(&config.leagues)?;

        println!("Sync finished");
        println!("───────────────────────────────");
        println!(
            "  Leagues:  {} synced, {} up to date, {} failed, {} without id",
            report.leagues_synced,
            report.leagues_skipped,
            report.leagues_failed,
            report.leagues_unresolved
        );
        println!(
            "  Matches:  {} processed, {} skipped",
            report.matches_processed, report.matches_failed
        );
        println!(
            "  Players:  {} stored, {} rejected, {} too short",
            report.records_written, report.players_rejected, report.players_too_short
        );
        if let Some(finished) = report.finished_at {
            let elapsed = finished - report.started_at;
            println!("  Elapsed:  {}s", elapsed.num_seconds());
        }

        Ok(())
    }

    pub fn status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Heroes:   {}", stats.hero_count);
        println!("  Leagues:  {}", stats.league_count);
        println!("  Teams:    {}", stats.team_count);
        println!("  Players:  {}", stats.player_count);
        println!("  Matches:  {}", stats.match_count);
        println!("  Records:  {}", stats.record_count);
        if let Some(latest) = stats.high_water_mark {
            println!("  Latest:   {}", latest);
        }

        Ok(())
    }

    pub fn inspect(config: &Config, path: &str) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let heroes = db.heroes()?;
        if heroes.is_empty() {
            return Err(DotaError::Config(
                "No heroes in database. Run 'dota-lanes sync' first.".to_string(),
            ));
        }
        let catalog = HeroCatalog::new(heroes);

        let content = std::fs::read_to_string(path)?;
        let detail: MatchDetail = serde_json::from_str(&content)?;
        let league_id = detail.leagueid.unwrap_or(LeagueId(0));
        let result = inference::infer(&detail, league_id, &catalog)?;

        println!("Match {} (patch {:?})", result.match_id, detail.patch);
        println!(
            "{:<24} {:<20} {:>4} {:>4} {:<22} {:<40} {}",
            "Player", "Hero", "LH", "DN", "Role", "Lane", "Against"
        );
        for outcome in &result.outcomes {
            match outcome {
                PlayerOutcome::Inferred(inference) => {
                    let record = &inference.record;
                    let hero = catalog.name(record.hero_id)?;
                    println!(
                        "{:<24} {:<20} {:>4} {:>4} {:<22} {:<40} {}",
                        record.account_id.0,
                        hero,
                        record.last_hits_at_5,
                        record.denies_at_5,
                        record.assumed_lane_role.to_string(),
                        lane_names(&record.heroes_on_lane),
                        lane_names(&record.enemy_heroes_on_lane)
                    );
                    for note in &inference.notes {
                        match note {
                            LaneNote::Roaming => println!("    roaming"),
                            LaneNote::NoLaneTeammate { role } => {
                                println!("    no lane teammate, kept {}", role)
                            }
                            LaneNote::SharedLane { teammates } => {
                                println!("    {} lane teammates, compared with the first", teammates)
                            }
                        }
                    }
                }
                PlayerOutcome::TooShort { player, snapshots } => {
                    println!("{:<24} too short ({} snapshots)", player, snapshots);
                }
                PlayerOutcome::Rejected { player, error } => {
                    println!("{:<24} rejected: {}", player, error);
                }
            }
        }

        Ok(())
    }

    pub fn list(config: &Config, what: ListCommands) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;

        match what {
            ListCommands::Leagues => {
                println!("{:>8} {:<40} {:<12} {:>6}", "ID", "League", "Tier", "Patch");
                for league in db.leagues()? {
                    println!(
                        "{:>8} {:<40} {:<12} {:>6}",
                        league.id.0, league.name, league.tier, league.patch_id
                    );
                }
            }
            ListCommands::Teams { league } => {
                println!("{:>10} {:<32} {:>8}", "ID", "Team", "Rating");
                for team in db.teams(league.map(LeagueId))? {
                    println!("{:>10} {:<32} {:>8.1}", team.id.0, team.name, team.rating);
                }
            }
            ListCommands::Players { team, active } => {
                println!("{:>12} {:<24} {:>10} {:>7}", "Account", "Player", "Team", "Active");
                for player in db.players(team.map(TeamId))? {
                    if active && !player.is_active {
                        continue;
                    }
                    println!(
                        "{:>12} {:<24} {:>10} {:>7}",
                        player.account_id.0,
                        player.name,
                        player.team_id.0,
                        if player.is_active { "yes" } else { "no" }
                    );
                }
            }
        }

        Ok(())
    }

    pub struct StatsArgs {
        pub player: Option<i64>,
        pub name: Option<String>,
        pub hero: Option<i64>,
        pub team: Option<i64>,
        pub league: Option<i64>,
        pub patch: Option<i64>,
        pub role: Option<f64>,
        pub ally: Option<String>,
        pub enemy: Option<String>,
    }

    impl StatsArgs {
        fn filter(&self) -> Result<RecordFilter> {
            let mut filter = RecordFilter::new();
            if let Some(id) = self.player {
                filter = filter.player(AccountId(id));
            }
            if let Some(prefix) = &self.name {
                filter = filter.player_name(prefix);
            }
            if let Some(id) = self.hero {
                filter = filter.hero(HeroId(id));
            }
            if let Some(id) = self.team {
                filter = filter.team(TeamId(id));
            }
            if let Some(id) = self.league {
                filter = filter.league(LeagueId(id));
            }
            if let Some(patch) = self.patch {
                filter = filter.patch(patch);
            }
            if let Some(value) = self.role {
                let role = AssumedRole::try_from(value).map_err(DotaError::Parse)?;
                filter = filter.role(role);
            }
            if let Some(name) = &self.ally {
                filter = filter.ally_hero(name);
            }
            if let Some(name) = &self.enemy {
                filter = filter.enemy_hero(name);
            }
            Ok(filter)
        }

        pub fn run(self, config: &Config, format: OutputFormat) -> Result<()> {
            let db = Database::open(&config.data.database_path)?;
            let records = db.query_records(&self.filter()?)?;
            let summary = PerformanceSummary::from_records(&records);

            match format {
                OutputFormat::Table => match summary {
                    Some(summary) => {
                        println!("{:<16} {:>8} {:>10} {:>10}", "", "Samples", "Average", "Median");
                        print_row("Last hits @5", &summary.last_hits_at_5);
                        print_row("Kills", &summary.kills);
                    }
                    None => println!("No records match the filter"),
                },
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }

            Ok(())
        }
    }

    fn print_row(label: &str, summary: &Summary) {
        println!(
            "{:<16} {:>8} {:>10.2} {:>10.1}",
            label, summary.samples, summary.average, summary.median
        );
    }
}
