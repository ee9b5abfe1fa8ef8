//! In-process scan store for tests.
//!
//! Batch writes are staged and only published once every insert has
//! succeeded, which gives the same all-or-nothing visibility as a database
//! transaction. [`InMemoryScanRepository::fail_after`] injects a storage
//! failure after a fixed number of successful inserts.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::ports::scans::ScanRepository;
use crate::domain::{NewScan, PageRequest, ScanPage, ScanRecord};
use crate::error::{Result, ScanError};

#[derive(Debug, Default)]
struct State {
    scans: Vec<ScanRecord>,
    inserts_before_failure: Option<usize>,
}

impl State {
    fn take_insert_slot(&mut self) -> Result<()> {
        match self.inserts_before_failure.as_mut() {
            Some(0) => Err(ScanError::Persistence(
                "simulated storage failure".to_string(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryScanRepository {
    state: Mutex<State>,
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `successful_inserts` more inserts, then fail every later one.
    pub async fn fail_after(&self, successful_inserts: usize) {
        self.state.lock().await.inserts_before_failure = Some(successful_inserts);
    }

    pub async fn clear_failure(&self) {
        self.state.lock().await.inserts_before_failure = None;
    }

    /// Number of committed records across all users.
    pub async fn len(&self) -> usize {
        self.state.lock().await.scans.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    async fn create(&self, scan: NewScan) -> Result<ScanRecord> {
        let mut state = self.state.lock().await;
        state.take_insert_slot()?;

        let record = scan.into_record(Uuid::now_v7());
        state.scans.push(record.clone());
        Ok(record)
    }

    async fn create_batch(&self, scans: Vec<NewScan>) -> Result<Vec<ScanRecord>> {
        let mut state = self.state.lock().await;

        let mut staged = Vec::with_capacity(scans.len());
        for scan in scans {
            state.take_insert_slot()?;
            staged.push(scan.into_record(Uuid::now_v7()));
        }

        state.scans.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<ScanRecord> {
        let state = self.state.lock().await;
        state
            .scans
            .iter()
            .find(|scan| scan.id == id && scan.user_id == user_id)
            .cloned()
            .ok_or_else(ScanError::scan_not_found)
    }

    async fn list(&self, user_id: Uuid, page: PageRequest) -> Result<ScanPage> {
        let state = self.state.lock().await;
        let mut owned: Vec<&ScanRecord> = state
            .scans
            .iter()
            .filter(|scan| scan.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| {
            b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
        });

        let total = owned.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = owned
            .into_iter()
            .skip(offset)
            .take(page.per_page() as usize)
            .cloned()
            .collect();

        Ok(ScanPage::new(items, total, page))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let mut state = self.state.lock().await;
        let position = state
            .scans
            .iter()
            .position(|scan| scan.id == id && scan.user_id == user_id)
            .ok_or_else(ScanError::scan_not_found)?;
        state.scans.remove(position);
        Ok(())
    }
}
