use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE participants (
                user_id       INTEGER NOT NULL,
                chat_id       INTEGER NOT NULL,
                username      TEXT,
                display_name  TEXT NOT NULL,
                last_active   INTEGER NOT NULL,
                PRIMARY KEY (user_id, chat_id)
            );

            CREATE INDEX idx_participants_chat
                ON participants(chat_id);

            -- id preserves insertion order for leaderboard tie-breaks
            CREATE TABLE aura_accounts (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id   INTEGER NOT NULL,
                chat_id   INTEGER NOT NULL,
                balance   INTEGER NOT NULL DEFAULT 0,
                UNIQUE (user_id, chat_id),
                FOREIGN KEY (user_id, chat_id) REFERENCES participants(user_id, chat_id)
            );

            CREATE INDEX idx_aura_accounts_chat
                ON aura_accounts(chat_id, balance);

            CREATE TABLE cooldowns (
                command   TEXT NOT NULL,
                chat_id   INTEGER NOT NULL,
                day       TEXT NOT NULL,
                PRIMARY KEY (command, chat_id, day)
            );

            CREATE TABLE announcements (
                user_id            INTEGER NOT NULL,
                chat_id            INTEGER NOT NULL,
                command            TEXT NOT NULL,
                last_announced_at  INTEGER NOT NULL,
                PRIMARY KEY (user_id, chat_id, command)
            );

            CREATE TABLE duels (
                id             TEXT PRIMARY KEY,
                chat_id        INTEGER NOT NULL,
                challenger_id  INTEGER NOT NULL,
                opponent_id    INTEGER NOT NULL,
                message_ref    INTEGER NOT NULL,
                status         TEXT NOT NULL DEFAULT 'pending',
                winner_id      INTEGER,
                created_at     INTEGER NOT NULL,
                resolved_at    INTEGER
            );

            CREATE UNIQUE INDEX idx_duels_pending_ref
                ON duels(chat_id, message_ref) WHERE status = 'pending';

            CREATE INDEX idx_duels_status
                ON duels(status, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
