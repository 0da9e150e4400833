//! SQLite database management for match data

use super::{DatabaseStats, MatchStore};
use crate::stats::RecordFilter;
use crate::{
    AccountId, AssumedRole, Hero, HeroId, InferredPlayerRecord, LaneHero, League, LeagueId,
    MatchId, Player, Result, Team, TeamId,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

const RECORD_COLUMNS: &str = "match_id, league_id, account_id, hero_id, kills, last_hits_at_5,
    denies_at_5, heroes_on_lane, enemy_heroes_on_lane, assumed_lane_role, is_roaming,
    is_radiant, patch_id";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS heroes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                attack_type TEXT NOT NULL,
                primary_attribute TEXT NOT NULL,
                base_attack_min INTEGER NOT NULL,
                base_attack_max INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS leagues (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                tier TEXT NOT NULL,
                patch_id INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                rating REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                account_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                team_id INTEGER NOT NULL REFERENCES teams(id),
                is_active INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);

            CREATE TABLE IF NOT EXISTS player_matches (
                match_id INTEGER NOT NULL,
                league_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                hero_id INTEGER NOT NULL,
                kills INTEGER NOT NULL,
                last_hits_at_5 INTEGER NOT NULL,
                denies_at_5 INTEGER NOT NULL,
                heroes_on_lane TEXT NOT NULL DEFAULT '[]',
                enemy_heroes_on_lane TEXT NOT NULL DEFAULT '[]',
                assumed_lane_role REAL NOT NULL,
                is_roaming INTEGER NOT NULL,
                is_radiant INTEGER NOT NULL,
                patch_id INTEGER,
                PRIMARY KEY (match_id, account_id)
            );

            CREATE INDEX IF NOT EXISTS idx_player_matches_account ON player_matches(account_id);
            CREATE INDEX IF NOT EXISTS idx_player_matches_hero ON player_matches(hero_id);
            CREATE INDEX IF NOT EXISTS idx_player_matches_league ON player_matches(league_id);
            "#,
        )?;
        Ok(())
    }

    fn row_to_hero(row: &rusqlite::Row) -> rusqlite::Result<Hero> {
        Ok(Hero {
            id: HeroId(row.get(0)?),
            name: row.get(1)?,
            attack_type: row.get(2)?,
            primary_attribute: row.get(3)?,
            base_attack_min: row.get(4)?,
            base_attack_max: row.get(5)?,
        })
    }

    fn row_to_league(row: &rusqlite::Row) -> rusqlite::Result<League> {
        Ok(League {
            id: LeagueId(row.get(0)?),
            name: row.get(1)?,
            tier: row.get(2)?,
            patch_id: row.get(3)?,
        })
    }

    fn row_to_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
        Ok(Team {
            id: TeamId(row.get(0)?),
            name: row.get(1)?,
            rating: row.get(2)?,
        })
    }

    fn row_to_player(row: &rusqlite::Row) -> rusqlite::Result<Player> {
        Ok(Player {
            account_id: AccountId(row.get(0)?),
            name: row.get(1)?,
            team_id: TeamId(row.get(2)?),
            is_active: row.get(3)?,
        })
    }

    fn lane_heroes_from_json(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<LaneHero>> {
        let json: String = row.get(idx)?;
        serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<InferredPlayerRecord> {
        let role_value: f64 = row.get(9)?;
        let assumed_lane_role = AssumedRole::from_value(role_value).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                9,
                Type::Real,
                format!("not a lane role: {}", role_value).into(),
            )
        })?;

        Ok(InferredPlayerRecord {
            match_id: MatchId(row.get(0)?),
            league_id: LeagueId(row.get(1)?),
            account_id: AccountId(row.get(2)?),
            hero_id: HeroId(row.get(3)?),
            kills: row.get(4)?,
            last_hits_at_5: row.get(5)?,
            denies_at_5: row.get(6)?,
            heroes_on_lane: Self::lane_heroes_from_json(row, 7)?,
            enemy_heroes_on_lane: Self::lane_heroes_from_json(row, 8)?,
            assumed_lane_role,
            is_roaming: row.get(10)?,
            is_radiant: row.get(11)?,
            patch_id: row.get(12)?,
        })
    }

    fn count(&self, query: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(query, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Escape LIKE wildcards so a prefix matches literally
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl MatchStore for Database {
    fn high_water_mark(&self) -> Result<Option<MatchId>> {
        let max: Option<i64> = self
            .conn
            .query_row("SELECT MAX(match_id) FROM player_matches", [], |row| {
                row.get(0)
            })?;
        Ok(max.map(MatchId))
    }

    fn league_exists(&self, league: LeagueId) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM leagues WHERE id = ?1",
                params![league.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_league(&mut self, league: &League) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO leagues (id, name, tier, patch_id) VALUES (?1, ?2, ?3, ?4)",
            params![league.id.0, league.name, league.tier, league.patch_id],
        )?;
        Ok(())
    }

    fn league(&self, league: LeagueId) -> Result<Option<League>> {
        let league = self
            .conn
            .query_row(
                "SELECT id, name, tier, patch_id FROM leagues WHERE id = ?1",
                params![league.0],
                Self::row_to_league,
            )
            .optional()?;
        Ok(league)
    }

    fn leagues(&self) -> Result<Vec<League>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, tier, patch_id FROM leagues ORDER BY id")?;
        let leagues = stmt
            .query_map([], Self::row_to_league)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(leagues)
    }

    fn upsert_team(&mut self, team: &Team) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO teams (id, name, rating) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                rating = excluded.rating
            "#,
            params![team.id.0, team.name, team.rating],
        )?;
        Ok(())
    }

    fn teams(&self, league: Option<LeagueId>) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, rating FROM teams
             WHERE ?1 IS NULL OR id IN (
                 SELECT p.team_id FROM players p
                 JOIN player_matches m ON m.account_id = p.account_id
                 WHERE m.league_id = ?1)
             ORDER BY name",
        )?;
        let teams = stmt
            .query_map(params![league.map(|l| l.0)], Self::row_to_team)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    fn upsert_player(&mut self, player: &Player) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO players (account_id, name, team_id, is_active) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(account_id) DO UPDATE SET
                name = excluded.name,
                team_id = excluded.team_id,
                is_active = excluded.is_active
            "#,
            params![
                player.account_id.0,
                player.name,
                player.team_id.0,
                player.is_active
            ],
        )?;
        Ok(())
    }

    fn players(&self, team: Option<TeamId>) -> Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_id, name, team_id, is_active FROM players
             WHERE ?1 IS NULL OR team_id = ?1
             ORDER BY name",
        )?;
        let players = stmt
            .query_map(params![team.map(|t| t.0)], Self::row_to_player)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(players)
    }

    fn upsert_heroes(&mut self, heroes: &[Hero]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for hero in heroes {
            tx.execute(
                r#"
                INSERT INTO heroes (id, name, attack_type, primary_attribute,
                                    base_attack_min, base_attack_max)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    attack_type = excluded.attack_type,
                    primary_attribute = excluded.primary_attribute,
                    base_attack_min = excluded.base_attack_min,
                    base_attack_max = excluded.base_attack_max
                "#,
                params![
                    hero.id.0,
                    hero.name,
                    hero.attack_type,
                    hero.primary_attribute,
                    hero.base_attack_min,
                    hero.base_attack_max
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn heroes(&self) -> Result<Vec<Hero>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, attack_type, primary_attribute, base_attack_min, base_attack_max
             FROM heroes ORDER BY id",
        )?;
        let heroes = stmt
            .query_map([], Self::row_to_hero)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(heroes)
    }

    fn upsert_inferred_record(&mut self, record: &InferredPlayerRecord) -> Result<()> {
        let heroes_on_lane = serde_json::to_string(&record.heroes_on_lane)?;
        let enemy_heroes_on_lane = serde_json::to_string(&record.enemy_heroes_on_lane)?;
        self.conn.execute(
            &format!(
                r#"
                INSERT INTO player_matches ({})
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(match_id, account_id) DO UPDATE SET
                    league_id = excluded.league_id,
                    hero_id = excluded.hero_id,
                    kills = excluded.kills,
                    last_hits_at_5 = excluded.last_hits_at_5,
                    denies_at_5 = excluded.denies_at_5,
                    heroes_on_lane = excluded.heroes_on_lane,
                    enemy_heroes_on_lane = excluded.enemy_heroes_on_lane,
                    assumed_lane_role = excluded.assumed_lane_role,
                    is_roaming = excluded.is_roaming,
                    is_radiant = excluded.is_radiant,
                    patch_id = excluded.patch_id
                "#,
                RECORD_COLUMNS
            ),
            params![
                record.match_id.0,
                record.league_id.0,
                record.account_id.0,
                record.hero_id.0,
                record.kills,
                record.last_hits_at_5,
                record.denies_at_5,
                heroes_on_lane,
                enemy_heroes_on_lane,
                record.assumed_lane_role.value(),
                record.is_roaming,
                record.is_radiant,
                record.patch_id,
            ],
        )?;
        Ok(())
    }

    fn query_records(&self, filter: &RecordFilter) -> Result<Vec<InferredPlayerRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(id) = filter.account_id {
            clauses.push("account_id = ?");
            values.push(Value::Integer(id.0));
        }
        if let Some(id) = filter.hero_id {
            clauses.push("hero_id = ?");
            values.push(Value::Integer(id.0));
        }
        if let Some(id) = filter.team_id {
            clauses.push("account_id IN (SELECT account_id FROM players WHERE team_id = ?)");
            values.push(Value::Integer(id.0));
        }
        if let Some(prefix) = &filter.player_name {
            clauses.push(
                r"account_id IN (SELECT account_id FROM players WHERE name LIKE ? ESCAPE '\')",
            );
            values.push(Value::Text(format!("{}%", escape_like(prefix))));
        }
        if let Some(id) = filter.league_id {
            clauses.push("league_id = ?");
            values.push(Value::Integer(id.0));
        }
        if let Some(patch) = filter.patch_id {
            clauses.push("patch_id = ?");
            values.push(Value::Integer(patch));
        }
        if let Some(role) = filter.role {
            clauses.push("assumed_lane_role = ?");
            values.push(Value::Real(role.value()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        let query = format!(
            "SELECT {} FROM player_matches{} ORDER BY match_id, account_id",
            RECORD_COLUMNS, where_clause
        );

        let mut stmt = self.conn.prepare(&query)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Lane heroes live in JSON columns
        Ok(records
            .into_iter()
            .filter(|r| filter.matches_lane(r))
            .collect())
    }

    fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            hero_count: self.count("SELECT COUNT(*) FROM heroes")?,
            league_count: self.count("SELECT COUNT(*) FROM leagues")?,
            team_count: self.count("SELECT COUNT(*) FROM teams")?,
            player_count: self.count("SELECT COUNT(*) FROM players")?,
            match_count: self.count("SELECT COUNT(DISTINCT match_id) FROM player_matches")?,
            record_count: self.count("SELECT COUNT(*) FROM player_matches")?,
            high_water_mark: self.high_water_mark()?,
        })
    }
}
