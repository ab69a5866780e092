use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::classifier::{
    DeadlineCandidate, Extraction, PolicyCandidate, PolicyType, TextbookCandidate,
};

const DB_PATH: &str = "data/caddy.sqlite";

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            id           INTEGER PRIMARY KEY,
            filename     TEXT UNIQUE NOT NULL,
            char_len     INTEGER NOT NULL,
            raw_text     TEXT NOT NULL,
            ingested_at  TEXT NOT NULL DEFAULT (datetime('now')),
            processed_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_documents_processed ON documents(processed_at);

        -- Extracted candidates. source_text keeps the originating line for
        -- the citation trail shown at review time.
        CREATE TABLE IF NOT EXISTS deadlines (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id),
            title        TEXT NOT NULL,
            due_at       TEXT,
            details      TEXT,
            source_text  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_deadlines_document ON deadlines(document_id);
        CREATE INDEX IF NOT EXISTS idx_deadlines_due ON deadlines(due_at);

        CREATE TABLE IF NOT EXISTS policies (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id),
            policy_type  TEXT NOT NULL,
            text         TEXT NOT NULL,
            source_text  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_policies_document ON policies(document_id);

        CREATE TABLE IF NOT EXISTS textbooks (
            id           INTEGER PRIMARY KEY,
            document_id  INTEGER NOT NULL REFERENCES documents(id),
            title        TEXT NOT NULL,
            author       TEXT,
            isbn         TEXT,
            notes        TEXT,
            source_text  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_textbooks_document ON textbooks(document_id);
        ",
    )?;
    Ok(())
}

// ── Ingestion ──

pub struct NewDocument {
    pub filename: String,
    pub raw_text: String,
}

/// Insert documents, skipping filenames already present. Returns how many
/// rows were actually added.
pub fn insert_documents(conn: &Connection, docs: &[NewDocument]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO documents (filename, char_len, raw_text) VALUES (?1, ?2, ?3)",
        )?;
        for d in docs {
            count += stmt.execute(rusqlite::params![
                d.filename,
                d.raw_text.chars().count() as i64,
                d.raw_text,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Processing ──

pub struct PendingDocument {
    pub id: i64,
    pub raw_text: String,
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<PendingDocument>> {
    let sql = format!(
        "SELECT id, raw_text FROM documents
         WHERE processed_at IS NULL
         ORDER BY id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PendingDocument {
                id: row.get(0)?,
                raw_text: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Save a batch of extractions. Prior candidates for each document are
/// replaced, and the document is stamped processed.
pub fn save_extractions(conn: &Connection, batch: &[(i64, Extraction)]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut clear_deadlines = tx.prepare("DELETE FROM deadlines WHERE document_id = ?1")?;
        let mut clear_policies = tx.prepare("DELETE FROM policies WHERE document_id = ?1")?;
        let mut clear_textbooks = tx.prepare("DELETE FROM textbooks WHERE document_id = ?1")?;

        let mut d_stmt = tx.prepare(
            "INSERT INTO deadlines (document_id, title, due_at, details, source_text)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut p_stmt = tx.prepare(
            "INSERT INTO policies (document_id, policy_type, text, source_text)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut t_stmt = tx.prepare(
            "INSERT INTO textbooks (document_id, title, author, isbn, notes, source_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut mark = tx.prepare(
            "UPDATE documents SET processed_at = datetime('now') WHERE id = ?1",
        )?;

        for (doc_id, extraction) in batch {
            clear_deadlines.execute(rusqlite::params![doc_id])?;
            clear_policies.execute(rusqlite::params![doc_id])?;
            clear_textbooks.execute(rusqlite::params![doc_id])?;

            for d in &extraction.deadlines {
                d_stmt.execute(rusqlite::params![
                    doc_id,
                    d.title,
                    d.due_at.map(|t| t.to_rfc3339()),
                    d.details,
                    d.source_text,
                ])?;
            }
            for p in &extraction.policies {
                p_stmt.execute(rusqlite::params![
                    doc_id,
                    p.policy_type.as_str(),
                    p.text,
                    p.source_text,
                ])?;
            }
            for t in &extraction.textbooks {
                t_stmt.execute(rusqlite::params![
                    doc_id, t.title, t.author, t.isbn, t.notes, t.source_text,
                ])?;
            }
            mark.execute(rusqlite::params![doc_id])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Review surfaces ──

pub struct OverviewRow {
    pub id: i64,
    pub filename: String,
    pub char_len: i64,
    pub deadline_count: i64,
    pub undated_count: i64,
    pub policy_count: i64,
    pub textbook_count: i64,
    pub processed: bool,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT d.id, d.filename, d.char_len,
                (SELECT COUNT(*) FROM deadlines x WHERE x.document_id = d.id),
                (SELECT COUNT(*) FROM deadlines x WHERE x.document_id = d.id AND x.due_at IS NULL),
                (SELECT COUNT(*) FROM policies x WHERE x.document_id = d.id),
                (SELECT COUNT(*) FROM textbooks x WHERE x.document_id = d.id),
                d.processed_at IS NOT NULL
         FROM documents d
         ORDER BY d.id
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(OverviewRow {
                id: row.get(0)?,
                filename: row.get(1)?,
                char_len: row.get(2)?,
                deadline_count: row.get(3)?,
                undated_count: row.get(4)?,
                policy_count: row.get(5)?,
                textbook_count: row.get(6)?,
                processed: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct ScheduleRow {
    pub due_at: String,
    pub title: String,
    pub filename: String,
}

/// Dated deadlines across all documents, soonest first. RFC 3339 strings
/// sort chronologically, so ordering happens in SQL.
pub fn fetch_schedule(conn: &Connection, limit: usize) -> Result<Vec<ScheduleRow>> {
    let sql = format!(
        "SELECT dl.due_at, dl.title, d.filename
         FROM deadlines dl
         JOIN documents d ON d.id = dl.document_id
         WHERE dl.due_at IS NOT NULL
         ORDER BY dl.due_at, dl.id
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ScheduleRow {
                due_at: row.get(0)?,
                title: row.get(1)?,
                filename: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct ReviewRow {
    pub filename: String,
    pub title: String,
    pub source_text: String,
}

/// Deadlines with no parsed date, i.e. the human-review queue.
pub fn fetch_needs_review(conn: &Connection, limit: usize) -> Result<Vec<ReviewRow>> {
    let sql = format!(
        "SELECT d.filename, dl.title, dl.source_text
         FROM deadlines dl
         JOIN documents d ON d.id = dl.document_id
         WHERE dl.due_at IS NULL
         ORDER BY dl.document_id, dl.id
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ReviewRow {
                filename: row.get(0)?,
                title: row.get(1)?,
                source_text: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Export ──

/// Rebuild one document's extraction from its persisted rows.
pub fn fetch_extraction(conn: &Connection, document_id: i64) -> Result<(String, Extraction)> {
    let filename: String = conn.query_row(
        "SELECT filename FROM documents WHERE id = ?1",
        [document_id],
        |r| r.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT title, due_at, details, source_text FROM deadlines
         WHERE document_id = ?1 ORDER BY id",
    )?;
    let deadlines = stmt
        .query_map([document_id], |row| {
            Ok(DeadlineCandidate {
                title: row.get(0)?,
                due_at: row.get::<_, Option<String>>(1)?.and_then(|s| parse_due_at(&s)),
                details: row.get(2)?,
                source_text: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT policy_type, text, source_text FROM policies
         WHERE document_id = ?1 ORDER BY id",
    )?;
    let policies = stmt
        .query_map([document_id], |row| {
            Ok(PolicyCandidate {
                policy_type: PolicyType::parse(&row.get::<_, String>(0)?),
                text: row.get(1)?,
                source_text: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT title, author, isbn, notes, source_text FROM textbooks
         WHERE document_id = ?1 ORDER BY id",
    )?;
    let textbooks = stmt
        .query_map([document_id], |row| {
            Ok(TextbookCandidate {
                title: row.get(0)?,
                author: row.get(1)?,
                isbn: row.get(2)?,
                notes: row.get(3)?,
                source_text: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((filename, Extraction { deadlines, policies, textbooks }))
}

fn parse_due_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ── Stats ──

pub struct Stats {
    pub documents: usize,
    pub processed: usize,
    pub unprocessed: usize,
    pub deadlines: usize,
    pub undated: usize,
    pub policies: usize,
    pub textbooks: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let documents: usize = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    let processed: usize = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE processed_at IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let deadlines: usize = conn.query_row("SELECT COUNT(*) FROM deadlines", [], |r| r.get(0))?;
    let undated: usize = conn.query_row(
        "SELECT COUNT(*) FROM deadlines WHERE due_at IS NULL",
        [],
        |r| r.get(0),
    )?;
    let policies: usize = conn.query_row("SELECT COUNT(*) FROM policies", [], |r| r.get(0))?;
    let textbooks: usize = conn.query_row("SELECT COUNT(*) FROM textbooks", [], |r| r.get(0))?;
    Ok(Stats {
        documents,
        processed,
        unprocessed: documents - processed,
        deadlines,
        undated,
        policies,
        textbooks,
    })
}
