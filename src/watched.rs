use crate::database::{JsonFile, WatchedDb};
use crate::error::StoreError;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug)]
pub struct WatchHistoryStore {
    file: JsonFile,
    history: BTreeMap<String, Vec<String>>,
}

impl WatchHistoryStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> WatchHistoryStore {
        let file = JsonFile::new(path);
        let mut history: BTreeMap<String, Vec<String>> = file.load_or_default();
        for (username, titles) in history.iter_mut() {
            let before = titles.len();
            dedup_in_order(titles);
            if titles.len() != before {
                debug!("Dropped duplicate watched titles for {}", username);
            }
        }
        WatchHistoryStore { file, history }
    }

    fn undo_record(&mut self, username: &str) {
        if let Some(titles) = self.history.get_mut(username) {
            titles.pop();
            if titles.is_empty() {
                self.history.remove(username);
            }
        }
    }
}

fn dedup_in_order(titles: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(titles.len());
    titles.retain(|title| {
        if seen.contains(title) {
            false
        } else {
            seen.push(title.clone());
            true
        }
    });
}

impl WatchedDb for WatchHistoryStore {
    type Error = StoreError;

    fn record_watched(&mut self, username: &str, title: &str) -> Result<bool, StoreError> {
        let titles = self.history.entry(username.to_owned()).or_default();
        let added = !titles.iter().any(|t| t == title);
        if added {
            titles.push(title.to_owned());
        }
        if let Err(err) = self.file.save(&self.history) {
            if added {
                self.undo_record(username);
            }
            return Err(err);
        }
        if added {
            info!("{} watched {:?}", username, title);
        }
        Ok(added)
    }

    fn get_watched(&self, username: &str) -> &[String] {
        self.history
            .get(username)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
