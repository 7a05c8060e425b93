//! Plain-text and JSON rendering of query results.

use std::io::Write;

use serde::Serialize;
use tsuiseki_api::{AnilistItem, MediaKind, Update, Viewer};

use crate::error::CliError;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn item(&self, item: Option<&AnilistItem>) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&item);
        }
        match item {
            Some(item) => self.print(&format_item(item)),
            None => self.print("no match"),
        }
    }

    pub fn names(&self, names: &[String]) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&names);
        }
        self.print(&names.join("\n"))
    }

    pub fn updates(&self, updates: &[Update]) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&updates);
        }
        let lines: Vec<String> = updates.iter().map(format_update).collect();
        self.print(&lines.join("\n"))
    }

    pub fn progress(&self, progress: u32) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&serde_json::json!({ "progress": progress }));
        }
        self.print(&progress.to_string())
    }

    pub fn viewer(&self, viewer: Option<&Viewer>) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&viewer);
        }
        match viewer {
            Some(v) => self.print(&format!("{} (id {})", v.name, v.id)),
            None => self.print("unknown viewer"),
        }
    }

    pub fn done(&self) -> Result<(), CliError> {
        if self.json {
            return self.print_json(&serde_json::json!({ "ok": true }));
        }
        self.print("ok")
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CliError> {
        let s = serde_json::to_string_pretty(value)?;
        self.print(&s)
    }

    fn print(&self, s: &str) -> Result<(), CliError> {
        if s.is_empty() {
            return Ok(());
        }
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{s}")?;
        Ok(())
    }
}

fn or_dash(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
}

pub fn format_item(item: &AnilistItem) -> String {
    let mut out = item.url.clone();
    if let Some(title) = &item.title {
        out.push_str(&format!("\n  title:    {title}"));
    }
    out.push_str(&format!("\n  score:    {}", or_dash(item.score)));
    if item.episodes.is_some() {
        out.push_str(&format!("\n  episodes: {}", or_dash(item.episodes)));
    }
    if item.chapters.is_some() || item.volumes.is_some() {
        out.push_str(&format!(
            "\n  chapters: {}  volumes: {}",
            or_dash(item.chapters),
            or_dash(item.volumes)
        ));
    }
    out
}

pub fn format_update(update: &Update) -> String {
    let progress = match update.media_kind {
        MediaKind::Anime => format!(
            "ep {}/{}",
            or_dash(update.progress),
            or_dash(update.total_episodes)
        ),
        MediaKind::Manga => format!(
            "ch {}/{} vol {}/{}",
            or_dash(update.progress),
            or_dash(update.total_chapters),
            or_dash(update.progress_volumes),
            or_dash(update.total_volumes)
        ),
    };
    let updated = update
        .updated_at
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into());

    format!(
        "[{}] {} - {progress} (updated {updated}) {}",
        update.status, update.title, update.url
    )
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn item() -> AnilistItem {
        AnilistItem {
            id: 21,
            url: "https://anilist.co/anime/21".into(),
            score: Some(88),
            episodes: None,
            chapters: None,
            volumes: None,
            title: Some("ONE PIECE".into()),
            cover_url: None,
        }
    }

    #[test]
    fn test_format_item() {
        assert_eq!(
            format_item(&item()),
            "https://anilist.co/anime/21\n  title:    ONE PIECE\n  score:    88"
        );
    }

    #[test]
    fn test_format_manga_update() {
        let update = Update {
            user_name: "reader".into(),
            media_id: 30013,
            media_kind: MediaKind::Manga,
            title: "One Piece".into(),
            url: "https://anilist.co/manga/30013".into(),
            cover_url: None,
            status: "CURRENT".into(),
            updated_at: DateTime::from_timestamp(1_690_000_000, 0),
            score: Some(95),
            progress: Some(1050),
            progress_volumes: Some(104),
            total_episodes: None,
            total_volumes: Some(107),
            total_chapters: None,
        };
        assert_eq!(
            format_update(&update),
            "[CURRENT] One Piece - ch 1050/- vol 104/107 (updated 2023-07-22) https://anilist.co/manga/30013"
        );
    }
}
