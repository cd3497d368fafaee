//! In-memory implementation of every store trait.
//!
//! Backs the unit and HTTP tests. Each collection sits behind its own [`RwLock`]; a write
//! replaces a whole record while holding the lock, so readers never see
//! a partially written line or alert.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use gridwatch_types::{Alert, AlertId, AlertStatus, Line, LineId, NewLine, NewUser, User};
use tokio::sync::RwLock;

use crate::store::{AlertLedger, GridStore, LineRegistry, StoreError, UserDirectory};

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lines: Arc<RwLock<BTreeMap<LineId, Line>>>,
    alerts: Arc<RwLock<BTreeMap<AlertId, Alert>>>,
    users: Arc<RwLock<BTreeMap<String, User>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a line record verbatim, without touching
    /// `last_updated`. Intended for fixtures.
    pub async fn put_line(&self, line: Line) {
        self.lines.write().await.insert(line.id, line);
    }

    /// Insert or replace an alert record verbatim. Intended for fixtures.
    pub async fn put_alert(&self, alert: Alert) {
        self.alerts.write().await.insert(alert.id, alert);
    }

    /// Every alert ever recorded for a line, oldest first.
    pub async fn alerts_for(&self, line_id: LineId) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        let mut found: Vec<Alert> = alerts
            .values()
            .filter(|a| a.line_id == line_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.timestamp);
        found
    }
}

impl LineRegistry for MemoryStore {
    async fn list(&self) -> Result<Vec<Line>, StoreError> {
        let lines = self.lines.read().await;
        let mut all: Vec<Line> = lines.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Line>, StoreError> {
        let lines = self.lines.read().await;
        Ok(lines.values().find(|l| l.name == name).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let lines = self.lines.read().await;
        Ok(u64::try_from(lines.len()).unwrap_or(u64::MAX))
    }

    async fn insert_many(&self, new_lines: &[NewLine]) -> Result<u64, StoreError> {
        let mut lines = self.lines.write().await;
        let mut inserted: u64 = 0;
        for new_line in new_lines {
            if lines.values().any(|l| l.name == new_line.name) {
                continue;
            }
            let line = new_line.clone().into_line();
            lines.insert(line.id, line);
            inserted = inserted.saturating_add(1);
        }
        Ok(inserted)
    }

    async fn save(&self, line: &Line) -> Result<Line, StoreError> {
        let mut lines = self.lines.write().await;
        let slot = lines
            .get_mut(&line.id)
            .ok_or_else(|| StoreError::NotFound(format!("line {}", line.id)))?;
        let mut stored = line.clone();
        stored.last_updated = Utc::now();
        slot.clone_from(&stored);
        Ok(stored)
    }
}

impl AlertLedger for MemoryStore {
    async fn open_for(&self, line_id: LineId, line_name: &str) -> Result<Alert, StoreError> {
        // Lookup and insert happen under one write lock.
        let mut alerts = self.alerts.write().await;
        if let Some(existing) = alerts
            .values()
            .find(|a| a.line_id == line_id && a.is_active())
        {
            return Ok(existing.clone());
        }
        let alert = Alert::raise(line_id, line_name);
        alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn find_active_for(&self, line_id: LineId) -> Result<Option<Alert>, StoreError> {
        let alerts = self.alerts.read().await;
        Ok(alerts
            .values()
            .find(|a| a.line_id == line_id && a.is_active())
            .cloned())
    }

    async fn resolve(&self, line_id: LineId) -> Result<Option<Alert>, StoreError> {
        let mut alerts = self.alerts.write().await;
        let Some(alert) = alerts
            .values_mut()
            .find(|a| a.line_id == line_id && a.is_active())
        else {
            return Ok(None);
        };
        alert.resolve_at(Utc::now());
        Ok(Some(alert.clone()))
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        let alerts = self.alerts.read().await;
        let active = alerts.values().filter(|a| a.is_active()).count();
        Ok(u64::try_from(active).unwrap_or(u64::MAX))
    }

    async fn list_active(&self) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.read().await;
        let mut active: Vec<Alert> = alerts.values().filter(|a| a.is_active()).cloned().collect();
        active.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(active)
    }

    async fn list_resolved(&self, limit: u32) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.read().await;
        let mut resolved: Vec<Alert> = alerts
            .values()
            .filter(|a| a.status == AlertStatus::Resolved)
            .cloned()
            .collect();
        resolved.sort_by(|a, b| b.resolved_timestamp.cmp(&a.resolved_timestamp));
        resolved.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(resolved)
    }
}

impl UserDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }
        let user = user.into_user();
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

impl GridStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use gridwatch_types::LineStatus;

    use super::*;

    fn feeders() -> Vec<NewLine> {
        vec![
            NewLine::new("Feeder Line 02", "Kollam Industrial"),
            NewLine::new("Feeder Line 01", "Trivandrum North"),
        ]
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = MemoryStore::new();
        store.insert_many(&feeders()).await.unwrap();
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Feeder Line 01", "Feeder Line 02"]);
    }

    #[tokio::test]
    async fn insert_many_skips_taken_names() {
        let store = MemoryStore::new();
        assert_eq!(store.insert_many(&feeders()).await.unwrap(), 2);
        assert_eq!(store.insert_many(&feeders()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn save_replaces_record_and_refreshes_timestamp() {
        let store = MemoryStore::new();
        store.insert_many(&feeders()).await.unwrap();
        let mut line = store.get_by_name("Feeder Line 01").await.unwrap().unwrap();
        let before = line.last_updated;
        line.status = LineStatus::Fault;
        let saved = store.save(&line).await.unwrap();
        assert!(saved.last_updated >= before);
        let reloaded = store.get_by_name("Feeder Line 01").await.unwrap().unwrap();
        assert_eq!(reloaded.status, LineStatus::Fault);
    }

    #[tokio::test]
    async fn save_unknown_line_is_not_found() {
        let store = MemoryStore::new();
        let line = Line::new("Ghost", "Nowhere");
        assert!(matches!(
            store.save(&line).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_for_returns_existing_active_alert() {
        let store = MemoryStore::new();
        let line_id = LineId::new();
        let first = store.open_for(line_id, "Feeder Line 01").await.unwrap();
        let second = store.open_for(line_id, "Feeder Line 01").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resolve_without_active_alert_is_none() {
        let store = MemoryStore::new();
        assert!(store.resolve(LineId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn immediate_resolve_is_strictly_after_raise() {
        let store = MemoryStore::new();
        let line_id = LineId::new();
        let mut alert = Alert::raise(line_id, "Feeder Line 01");
        // Raised in the future relative to the store clock.
        alert.timestamp = Utc::now() + chrono::TimeDelta::hours(1);
        store.put_alert(alert.clone()).await;

        let resolved = store.resolve(line_id).await.unwrap().unwrap();
        assert!(resolved.resolved_timestamp.unwrap() > alert.timestamp);
    }

    #[tokio::test]
    async fn resolved_history_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        let lines: Vec<LineId> = (0..3).map(|_| LineId::new()).collect();
        for id in &lines {
            store.open_for(*id, "Feeder").await.unwrap();
            store.resolve(*id).await.unwrap();
        }
        let history = store.list_resolved(2).await.unwrap();
        assert_eq!(history.len(), 2);
        let first = history.first().unwrap();
        let second = history.get(1).unwrap();
        assert!(first.resolved_timestamp >= second.resolved_timestamp);
        assert_eq!(store.count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            first_name: String::from("Asha"),
            last_name: String::from("Nair"),
            email: String::from("asha@example.com"),
            password_hash: String::from("hash"),
        };
        store.insert(user.clone()).await.unwrap();
        assert!(matches!(
            store.insert(user).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
